use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chunker::Chunk;
use crate::similarity::{best_first, QueryScorer};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// Embedded chunks of one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorIndex {
    pub doc_id: String,
    pub model: String,
    pub dims: usize,
    pub entries: Vec<IndexEntry>,
    pub built_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

impl VectorIndex {
    pub fn new(doc_id: impl Into<String>, model: impl Into<String>, entries: Vec<IndexEntry>) -> Self {
        let dims = entries.first().map(|e| e.vector.len()).unwrap_or(0);
        Self {
            doc_id: doc_id.into(),
            model: model.into(),
            dims,
            entries,
            built_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top `k` chunks by cosine similarity, best first. Equal scores keep
    /// document order. Entries whose dimensionality differs from the query
    /// are skipped.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredChunk> {
        if k == 0 || query.is_empty() {
            return Vec::new();
        }
        let scorer = QueryScorer::new(query);

        let mut hits: Vec<ScoredChunk> = self
            .entries
            .iter()
            .filter_map(|e| {
                scorer.score(&e.vector).map(|score| ScoredChunk {
                    score,
                    chunk: e.chunk.clone(),
                })
            })
            .collect();

        hits.sort_by(|a, b| best_first(a.score, b.score).then(a.chunk.index.cmp(&b.chunk.index)));
        hits.truncate(k);
        hits
    }
}
