use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::{AgentResponse, DocumentContext, DocumentInsights};
use crate::document::ParsedDataSummary;

// --- Health ---

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub parser_strategy: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub document_count: usize,
}

// --- Documents ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Uploaded,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub question: String,
    pub response: AgentResponse,
    pub asked_at: DateTime<Utc>,
}

/// The per-document record kept by the host application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub status: ProcessingStatus,
    pub title: Option<String>,
    pub authors: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub insights: Option<DocumentInsights>,
    pub source_id: Option<String>,
    pub related_papers_json: Option<String>,
    pub index_ready: bool,
    #[serde(default)]
    pub chat_history: Vec<ChatTurn>,
}

impl DocumentRecord {
    pub fn uploaded(id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
            uploaded_at: Utc::now(),
            status: ProcessingStatus::Uploaded,
            title: None,
            authors: None,
            abstract_text: None,
            insights: None,
            source_id: None,
            related_papers_json: None,
            index_ready: false,
            chat_history: Vec::new(),
        }
    }

    /// Overview handed to the agent. Without insights the abstract stands in
    /// for the summary, and the filename for a missing title.
    pub fn agent_context(&self) -> DocumentContext {
        let title = self.title.as_deref().unwrap_or(&self.filename);
        let context = DocumentContext::new(
            self.id.as_str(),
            title,
            self.abstract_text.as_deref().unwrap_or_default(),
        );
        match &self.insights {
            Some(insights) => context.with_insights(insights),
            None => context,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadParams {
    pub filename: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub message: String,
    pub document: DocumentRecord,
    pub parsed_data: ParsedDataSummary,
}

// --- Chat ---

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionRequest {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatHistoryResponse {
    pub document_id: String,
    pub turns: Vec<ChatTurn>,
}

// --- Citations ---

#[derive(Debug, Serialize, Deserialize)]
pub struct CitationRequest {
    pub title: String,
}
