use serde::{Deserialize, Serialize};

use scholia_core::config::ChunkingConfig;
use scholia_core::error::{Result, ScholiaError};

/// A window over a document's text. Offsets are in chars.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Fixed-size, fixed-overlap sliding window. The same input always yields the
/// same chunks.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    size: usize,
    overlap: usize,
}

impl TextChunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        if config.chunk_size == 0 {
            return Err(ScholiaError::Config("chunk_size must be positive".into()));
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(ScholiaError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        Ok(Self {
            size: config.chunk_size,
            overlap: config.chunk_overlap,
        })
    }

    pub fn step(&self) -> usize {
        self.size - self.overlap
    }

    pub fn split(&self, text: &str) -> Vec<Chunk> {
        let chars: Vec<char> = text.chars().collect();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.size).min(chars.len());
            let slice: String = chars[start..end].iter().collect();
            if !slice.trim().is_empty() {
                chunks.push(Chunk {
                    index: chunks.len(),
                    text: slice,
                    start,
                    end,
                });
            }
            if end == chars.len() {
                break;
            }
            start += self.step();
        }

        chunks
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        let config = ChunkingConfig::default();
        Self {
            size: config.chunk_size,
            overlap: config.chunk_overlap,
        }
    }
}
