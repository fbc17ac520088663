use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use scholia_core::capability::Embedder;
use scholia_core::error::{Result, ScholiaError};

use crate::chunker::TextChunker;
use crate::index::{IndexEntry, ScoredChunk, VectorIndex};
use crate::store::IndexStore;

/// Builds, persists and queries per-document vector indexes.
///
/// Holds at most one loaded index at a time; `setup` and `load` replace it.
pub struct RetrievalEngine {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn IndexStore>,
    chunker: TextChunker,
    loaded: RwLock<Option<Arc<VectorIndex>>>,
}

impl RetrievalEngine {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn IndexStore>, chunker: TextChunker) -> Self {
        Self {
            embedder,
            store,
            chunker,
            loaded: RwLock::new(None),
        }
    }

    /// Chunks and embeds `text`, then replaces the index stored at `doc_id`.
    ///
    /// Every chunk is embedded before anything is written, so a failure
    /// leaves the previously stored index (if any) untouched.
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn setup(&self, text: &str, doc_id: &str) -> bool {
        match self.build(text, doc_id).await {
            Ok(index) => {
                info!(doc_id, chunks = index.len(), dims = index.dims, "Vector index built");
                *self.loaded.write().await = Some(Arc::new(index));
                true
            }
            Err(e) => {
                warn!(doc_id, error = %e, "Vector index build failed");
                false
            }
        }
    }

    async fn build(&self, text: &str, doc_id: &str) -> Result<VectorIndex> {
        let chunks = self.chunker.split(text);
        if chunks.is_empty() {
            return Err(ScholiaError::Index("no indexable text".into()));
        }

        let mut entries = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let vector = self.embedder.embed(&chunk.text).await?;
            entries.push(IndexEntry { chunk, vector });
        }

        let index = VectorIndex::new(doc_id, self.embedder.model(), entries);
        self.store.save(&index).await?;
        Ok(index)
    }

    /// Restores the index stored at `doc_id`. False means "unavailable".
    #[instrument(skip(self))]
    pub async fn load(&self, doc_id: &str) -> bool {
        match self.store.load(doc_id).await {
            Ok(Some(index)) => {
                debug!(doc_id, chunks = index.len(), "Vector index loaded");
                *self.loaded.write().await = Some(Arc::new(index));
                true
            }
            Ok(None) => {
                warn!(doc_id, "No vector index stored for document");
                false
            }
            Err(e) => {
                warn!(doc_id, error = %e, "Failed to load vector index");
                false
            }
        }
    }

    /// Up to `k` chunks from the loaded index, best first. Empty when nothing
    /// is loaded or the query cannot be embedded.
    pub async fn retrieve(&self, query: &str, k: usize) -> Vec<ScoredChunk> {
        let Some(index) = self.loaded.read().await.clone() else {
            return Vec::new();
        };

        match self.embedder.embed(query).await {
            Ok(vector) => index.search(&vector, k),
            Err(e) => {
                warn!(doc_id = %index.doc_id, error = %e, "Query embedding failed");
                Vec::new()
            }
        }
    }

    pub async fn is_loaded(&self) -> bool {
        self.loaded.read().await.is_some()
    }

    pub async fn loaded_doc_id(&self) -> Option<String> {
        self.loaded.read().await.as_ref().map(|i| i.doc_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::HashEmbedder;
    use crate::store::MemoryIndexStore;
    use async_trait::async_trait;
    use scholia_core::config::ChunkingConfig;

    struct BrokenEmbedder;

    #[async_trait]
    impl Embedder for BrokenEmbedder {
        fn model(&self) -> &str {
            "broken"
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(ScholiaError::Embedding("offline".into()))
        }
    }

    fn small_chunker() -> TextChunker {
        TextChunker::new(ChunkingConfig {
            chunk_size: 80,
            chunk_overlap: 20,
        })
        .unwrap()
    }

    const TEXT: &str = "Transformers rely on self attention to relate tokens. \
        Convolutional networks rely on local filters over pixels. \
        Recurrent networks process sequences one step at a time. \
        Retrieval systems rank passages by vector similarity to a query.";

    #[tokio::test]
    async fn setup_then_retrieve() {
        let store = Arc::new(MemoryIndexStore::new());
        let engine = RetrievalEngine::new(Arc::new(HashEmbedder::default()), store.clone(), small_chunker());

        assert!(engine.retrieve("attention", 3).await.is_empty());
        assert!(engine.setup(TEXT, "doc-1").await);
        assert!(engine.is_loaded().await);

        let hits = engine.retrieve("self attention tokens", 3).await;
        assert!(!hits.is_empty() && hits.len() <= 3);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(hits[0].chunk.text.contains("attention"));
    }

    #[tokio::test]
    async fn load_missing_index_is_false() {
        let engine = RetrievalEngine::new(
            Arc::new(HashEmbedder::default()),
            Arc::new(MemoryIndexStore::new()),
            small_chunker(),
        );
        assert!(!engine.load("nope").await);
        assert!(!engine.is_loaded().await);
    }

    #[tokio::test]
    async fn failed_rebuild_keeps_previous_index() {
        let store = Arc::new(MemoryIndexStore::new());
        let good = RetrievalEngine::new(Arc::new(HashEmbedder::default()), store.clone(), small_chunker());
        assert!(good.setup(TEXT, "doc-1").await);

        let broken = RetrievalEngine::new(Arc::new(BrokenEmbedder), store.clone(), small_chunker());
        assert!(!broken.setup("entirely different text", "doc-1").await);

        let kept = store.load("doc-1").await.unwrap().unwrap();
        assert_eq!(kept.model, "feature-hash");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn blank_text_does_not_build() {
        let engine = RetrievalEngine::new(
            Arc::new(HashEmbedder::default()),
            Arc::new(MemoryIndexStore::new()),
            small_chunker(),
        );
        assert!(!engine.setup("   ", "doc-1").await);
    }
}
