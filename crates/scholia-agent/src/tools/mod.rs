pub mod diagram;
pub mod search;

pub use diagram::{DiagramKind, DiagramTool, FLOWCHART_TOOL, MINDMAP_TOOL};
pub use search::{SearchTool, KNOWLEDGE_BASE_UNAVAILABLE, NO_RELEVANT_CONTENT, SEARCH_TOOL};
