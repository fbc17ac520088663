use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_S2_API_BASE: &str = "https://api.semanticscholar.org/graph/v1";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub anthropic_api_key: String,
    pub chat_model: String,
    pub embedding_url: Option<String>,
    pub embedding_model: String,
    pub layout_url: Option<String>,
    pub s2_api_base: String,
    pub server_host: String,
    pub server_port: u16,
    pub chunking: ChunkingConfig,
    pub retry: RetryConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let chunk_defaults = ChunkingConfig::default();
        let retry_defaults = RetryConfig::default();

        Self {
            data_dir: std::env::var("SCHOLIA_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            chat_model: std::env::var("SCHOLIA_CHAT_MODEL")
                .unwrap_or_else(|_| "claude-haiku-4-5-20251001".into()),
            embedding_url: non_empty_var("SCHOLIA_EMBEDDING_URL"),
            embedding_model: std::env::var("SCHOLIA_EMBEDDING_MODEL")
                .unwrap_or_else(|_| "all-minilm".into()),
            layout_url: non_empty_var("SCHOLIA_LAYOUT_URL"),
            s2_api_base: std::env::var("S2_API_BASE")
                .unwrap_or_else(|_| DEFAULT_S2_API_BASE.into()),
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: parsed_var("SERVER_PORT").unwrap_or(8080),
            chunking: ChunkingConfig {
                chunk_size: parsed_var("SCHOLIA_CHUNK_SIZE").unwrap_or(chunk_defaults.chunk_size),
                chunk_overlap: parsed_var("SCHOLIA_CHUNK_OVERLAP")
                    .unwrap_or(chunk_defaults.chunk_overlap),
            },
            retry: RetryConfig {
                max_attempts: parsed_var("SCHOLIA_RETRY_ATTEMPTS")
                    .unwrap_or(retry_defaults.max_attempts),
                base_delay_secs: parsed_var("SCHOLIA_RETRY_BASE_SECS")
                    .unwrap_or(retry_defaults.base_delay_secs),
            },
        }
    }

    pub fn parsed_dir(&self) -> PathBuf {
        self.data_dir.join("parsed")
    }

    pub fn index_dir(&self) -> PathBuf {
        self.data_dir.join("indexes")
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
