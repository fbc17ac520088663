use serde::{Deserialize, Serialize};

/// Terminal payload when the title cannot be resolved to an external record.
pub const CITATIONS_NOT_FOUND: &str = "No bibliographic record found for this paper.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CitationGraphResult {
    pub source_id: Option<String>,
    /// Either a serialized [`CitationGraph`] or [`CITATIONS_NOT_FOUND`].
    pub references_json: String,
}

impl CitationGraphResult {
    pub fn not_found() -> Self {
        Self {
            source_id: None,
            references_json: CITATIONS_NOT_FOUND.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.references_json == CITATIONS_NOT_FOUND
    }

    /// Decodes the payload, returning `None` for the not-found sentinel.
    pub fn graph(&self) -> Option<CitationGraph> {
        if self.is_not_found() {
            return None;
        }
        serde_json::from_str(&self.references_json).ok()
    }
}

/// Papers a work references and papers that cite it, as reported upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CitationGraph {
    pub references: Vec<serde_json::Value>,
    pub citations: Vec<serde_json::Value>,
}
