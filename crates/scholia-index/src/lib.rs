pub mod chunker;
pub mod embedder;
pub mod engine;
pub mod index;
pub mod similarity;
pub mod store;

use std::sync::Arc;

use scholia_core::capability::Embedder;
use scholia_core::config::AppConfig;
use scholia_core::error::Result;

pub use chunker::{Chunk, TextChunker};
pub use embedder::{HashEmbedder, HttpEmbedder};
pub use engine::RetrievalEngine;
pub use index::{ScoredChunk, VectorIndex};
pub use store::{FsIndexStore, IndexStore, MemoryIndexStore};

/// HTTP embeddings when an endpoint is configured, feature hashing otherwise.
pub fn embedder_from_config(config: &AppConfig) -> Result<Arc<dyn Embedder>> {
    match &config.embedding_url {
        Some(url) => Ok(Arc::new(HttpEmbedder::new(url.clone(), config.embedding_model.clone())?)),
        None => {
            tracing::warn!("SCHOLIA_EMBEDDING_URL not set, using feature-hash embeddings");
            Ok(Arc::new(HashEmbedder::default()))
        }
    }
}
