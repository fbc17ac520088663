use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use scholia_agent::{standard_registry, AgentOrchestrator, DocumentAnalyzer};
use scholia_citations::CitationGraphFetcher;
use scholia_core::api_types::{ChatTurn, DocumentRecord};
use scholia_core::capability::{ChatModel, Embedder};
use scholia_core::error::{Result, ScholiaError};
use scholia_core::parser::DocumentParser;
use scholia_core::AppConfig;
use scholia_index::{FsIndexStore, IndexStore, RetrievalEngine, TextChunker};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub parser: Arc<dyn DocumentParser>,
    pub model: Arc<dyn ChatModel>,
    pub embedder: Arc<dyn Embedder>,
    pub index_store: Arc<dyn IndexStore>,
    pub analyzer: Arc<DocumentAnalyzer>,
    pub citations: Arc<CitationGraphFetcher>,
    pub records: Arc<RecordRegistry>,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let model: Arc<dyn ChatModel> = Arc::new(scholia_agent::AnthropicChatModel::new(&config)?);
        Ok(Self {
            parser: scholia_parser::parser_from_config(&config)?,
            embedder: scholia_index::embedder_from_config(&config)?,
            index_store: Arc::new(FsIndexStore::new(config.index_dir())),
            analyzer: Arc::new(DocumentAnalyzer::new(model.clone())),
            citations: Arc::new(CitationGraphFetcher::from_config(&config)?),
            records: Arc::new(RecordRegistry::default()),
            model,
            config,
        })
    }

    /// A fresh engine over the shared store. Each request loads its own
    /// document, so concurrent chats on different documents do not collide.
    pub fn retrieval_engine(&self) -> Result<RetrievalEngine> {
        Ok(RetrievalEngine::new(
            self.embedder.clone(),
            self.index_store.clone(),
            TextChunker::new(self.config.chunking)?,
        ))
    }

    pub fn orchestrator(&self, engine: Arc<RetrievalEngine>) -> AgentOrchestrator {
        AgentOrchestrator::new(self.model.clone(), standard_registry(engine, self.model.clone()))
    }
}

/// In-memory document records keyed by id.
#[derive(Default)]
pub struct RecordRegistry {
    records: RwLock<HashMap<String, DocumentRecord>>,
}

impl RecordRegistry {
    pub async fn insert(&self, record: DocumentRecord) {
        self.records.write().await.insert(record.id.clone(), record);
    }

    pub async fn get(&self, id: &str) -> Option<DocumentRecord> {
        self.records.read().await.get(id).cloned()
    }

    /// Like [`get`](Self::get), with a missing id as [`ScholiaError::NotFound`].
    pub async fn require(&self, id: &str) -> Result<DocumentRecord> {
        self.get(id)
            .await
            .ok_or_else(|| ScholiaError::NotFound(format!("document {id}")))
    }

    /// Applies `f` to the record and returns the updated copy.
    pub async fn update<F>(&self, id: &str, f: F) -> Option<DocumentRecord>
    where
        F: FnOnce(&mut DocumentRecord),
    {
        let mut records = self.records.write().await;
        let record = records.get_mut(id)?;
        f(record);
        Some(record.clone())
    }

    pub async fn append_turn(&self, id: &str, turn: ChatTurn) -> bool {
        self.update(id, |record| record.chat_history.push(turn))
            .await
            .is_some()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholia_core::agent::AgentResponse;
    use scholia_core::api_types::ProcessingStatus;

    #[tokio::test]
    async fn update_and_history() {
        let registry = RecordRegistry::default();
        registry.insert(DocumentRecord::uploaded("d1", "paper.pdf")).await;

        let updated = registry
            .update("d1", |r| r.status = ProcessingStatus::Completed)
            .await
            .unwrap();
        assert_eq!(updated.status, ProcessingStatus::Completed);

        assert!(
            registry
                .append_turn(
                    "d1",
                    ChatTurn {
                        question: "q".into(),
                        response: AgentResponse::plain("a"),
                        asked_at: chrono::Utc::now(),
                    },
                )
                .await
        );
        assert_eq!(registry.get("d1").await.unwrap().chat_history.len(), 1);
        assert!(registry.update("missing", |_| {}).await.is_none());
        assert!(matches!(
            registry.require("missing").await,
            Err(ScholiaError::NotFound(_))
        ));
        assert_eq!(registry.len().await, 1);
    }
}
