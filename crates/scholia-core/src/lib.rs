pub mod agent;
pub mod api_types;
pub mod capability;
pub mod chat;
pub mod citation;
pub mod config;
pub mod document;
pub mod error;
pub mod parser;
pub mod storage;

pub use agent::{AgentResponse, Diagram, DocumentContext, DocumentInsights};
pub use capability::{complete_text, ChatModel, Embedder, LayoutSegmenter};
pub use chat::{ChatMessage, ChatReply, ChatRequest, ToolCall, ToolResult, ToolSpec};
pub use citation::{CitationGraph, CitationGraphResult, CITATIONS_NOT_FOUND};
pub use config::{AppConfig, ChunkingConfig, RetryConfig};
pub use document::{Artifact, Document, KeySections, ParsedDataSummary, Section};
pub use error::{Result, ScholiaError};
pub use parser::{DocumentParser, ElementKind, LayoutElement};
pub use storage::storage_key;
