use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::Document;

/// Element categories produced by a layout-analysis service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Title,
    NarrativeText,
    Table,
    Image,
    Formula,
    ListItem,
    Other,
}

impl ElementKind {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Title" => ElementKind::Title,
            "NarrativeText" => ElementKind::NarrativeText,
            "Table" => ElementKind::Table,
            "Image" | "Figure" => ElementKind::Image,
            "Formula" => ElementKind::Formula,
            "ListItem" => ElementKind::ListItem,
            _ => ElementKind::Other,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutElement {
    pub kind: ElementKind,
    pub text: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl LayoutElement {
    pub fn new(kind: ElementKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            metadata: serde_json::Value::Null,
        }
    }
}

/// Converts raw bytes into a structured [`Document`].
///
/// Implementations never fail: any internal error degrades to
/// [`Document::placeholder`].
#[async_trait]
pub trait DocumentParser: Send + Sync {
    fn strategy(&self) -> &str;
    async fn parse(&self, doc_id: &str, filename: &str, bytes: &[u8]) -> Document;
}
