use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagram {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub code: String,
}

/// The structured result of answering a question about a document.
///
/// Always well-formed: `answer` is a string and `diagram` is either absent
/// (`null`) or a complete diagram.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentResponse {
    pub answer: String,
    pub diagram: Option<Diagram>,
}

impl AgentResponse {
    pub fn plain(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            diagram: None,
        }
    }
}

/// The document overview handed to the agent alongside a question.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentContext {
    pub doc_id: String,
    pub title: String,
    pub summary: String,
    pub key_content: String,
    pub research_context: String,
}

impl DocumentContext {
    pub fn new(doc_id: impl Into<String>, title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            title: title.into(),
            summary: summary.into(),
            ..Default::default()
        }
    }

    /// Replaces the summary and fills key content and research context.
    pub fn with_insights(mut self, insights: &DocumentInsights) -> Self {
        self.summary = insights.summary.clone();
        self.key_content = insights.key_content.clone();
        self.research_context = insights.research_context.clone();
        self
    }
}

/// Model-derived overview of a document, produced all-or-nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentInsights {
    pub summary: String,
    pub key_content: String,
    pub terminology: String,
    pub research_context: String,
}
