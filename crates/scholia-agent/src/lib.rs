pub mod analysis;
pub mod llm;
pub mod orchestrator;
pub mod prompt;
pub mod response;
pub mod tool;
pub mod tools;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

use std::sync::Arc;

use scholia_core::capability::ChatModel;
use scholia_index::RetrievalEngine;

pub use analysis::DocumentAnalyzer;
pub use llm::AnthropicChatModel;
pub use orchestrator::AgentOrchestrator;
pub use response::{parse_agent_output, strip_code_fence};
pub use tool::{Tool, ToolRegistry};
pub use tools::{DiagramKind, DiagramTool, SearchTool};

/// The search, mindmap and flowchart tools over one retrieval engine.
pub fn standard_registry(engine: Arc<RetrievalEngine>, model: Arc<dyn ChatModel>) -> ToolRegistry {
    let search = Arc::new(SearchTool::new(engine, model.clone()));
    let mut registry = ToolRegistry::new();
    registry
        .register(search.clone())
        .register(Arc::new(DiagramTool::mindmap(search.clone(), model.clone())))
        .register(Arc::new(DiagramTool::flowchart(search, model)));
    registry
}
