use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScholiaError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid input for tool {tool}: {message}")]
    ToolInput { tool: String, message: String },

    #[error("Analysis failed: {0}")]
    Analysis(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ScholiaError>;
