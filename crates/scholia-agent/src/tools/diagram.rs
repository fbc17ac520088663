use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use scholia_core::capability::{complete_text, ChatModel};
use scholia_core::error::Result;

use crate::response::strip_code_fence;
use crate::tool::{optional_string_arg, string_arg, Tool};
use crate::tools::search::{is_unusable, SearchTool};

pub const MINDMAP_TOOL: &str = "generate_mindmap";
pub const FLOWCHART_TOOL: &str = "generate_flowchart";

const DIAGRAM_MAX_TOKENS: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramKind {
    Mindmap,
    Flowchart,
}

impl DiagramKind {
    fn tool_name(self) -> &'static str {
        match self {
            DiagramKind::Mindmap => MINDMAP_TOOL,
            DiagramKind::Flowchart => FLOWCHART_TOOL,
        }
    }

    fn syntax(self) -> &'static str {
        match self {
            DiagramKind::Mindmap => "Mermaid `mindmap`",
            DiagramKind::Flowchart => "Mermaid `graph TD` (top-down flowchart)",
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagramKind::Mindmap => f.write_str("mindmap"),
            DiagramKind::Flowchart => f.write_str("flowchart"),
        }
    }
}

/// Produces Mermaid source for a topic, grounding itself through the search
/// tool when no content is supplied.
pub struct DiagramTool {
    kind: DiagramKind,
    search: Arc<SearchTool>,
    model: Arc<dyn ChatModel>,
}

impl DiagramTool {
    pub fn new(kind: DiagramKind, search: Arc<SearchTool>, model: Arc<dyn ChatModel>) -> Self {
        Self {
            kind,
            search,
            model,
        }
    }

    pub fn mindmap(search: Arc<SearchTool>, model: Arc<dyn ChatModel>) -> Self {
        Self::new(DiagramKind::Mindmap, search, model)
    }

    pub fn flowchart(search: Arc<SearchTool>, model: Arc<dyn ChatModel>) -> Self {
        Self::new(DiagramKind::Flowchart, search, model)
    }

    pub fn kind(&self) -> DiagramKind {
        self.kind
    }

    /// Never fails for missing content: that case yields a message naming
    /// the topic.
    pub async fn generate(&self, topic: &str, content: Option<String>) -> Result<String> {
        let content = match content {
            Some(content) => content,
            None => {
                debug!(kind = %self.kind, topic, "No content supplied, searching the document");
                let found = match self.search.search(topic).await {
                    Ok(found) => found,
                    Err(e) => {
                        warn!(kind = %self.kind, topic, error = %e, "Search for diagram content failed");
                        String::new()
                    }
                };
                if is_unusable(&found) {
                    warn!(kind = %self.kind, topic, "No grounding content for diagram");
                    return Ok(missing_content_message(self.kind, topic));
                }
                found
            }
        };

        let code = complete_text(
            self.model.as_ref(),
            None,
            &diagram_prompt(self.kind, topic, &content),
            DIAGRAM_MAX_TOKENS,
        )
        .await?;
        Ok(strip_code_fence(&code).to_string())
    }
}

pub fn missing_content_message(kind: DiagramKind, topic: &str) -> String {
    format!(
        "Unable to generate {kind} for topic '{topic}': no relevant content was found in the paper."
    )
}

fn diagram_prompt(kind: DiagramKind, topic: &str, content: &str) -> String {
    let role = match kind {
        DiagramKind::Mindmap => format!(
            "You are a data visualization expert. Condense the content below into its key points \
             and build a mind map centred on '{topic}' that shows the hierarchy clearly."
        ),
        DiagramKind::Flowchart => format!(
            "You are a flowchart expert. Condense the process described below into its key steps \
             and draw it as a top-down flowchart titled '{topic}'."
        ),
    };
    format!(
        "{role}\n\nContent:\n---\n{content}\n---\n\n\
         Output only {} code. Keep node labels short. No explanation, no commentary.",
        kind.syntax()
    )
}

#[async_trait]
impl Tool for DiagramTool {
    fn name(&self) -> &str {
        self.kind.tool_name()
    }

    fn description(&self) -> &str {
        match self.kind {
            DiagramKind::Mindmap => {
                "Generate a Mermaid mind map when the user asks for a mindmap. 'topic' is the \
                 central theme; 'content' is optional source text, and the paper is searched \
                 for it when omitted."
            }
            DiagramKind::Flowchart => {
                "Generate a Mermaid flowchart when the user asks for a flowchart of a process \
                 or procedure. 'topic' is the title; 'content' is optional source text, and the \
                 paper is searched for it when omitted."
            }
        }
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "topic": {
                    "type": "string",
                    "description": "Central topic or title of the diagram."
                },
                "content": {
                    "type": ["string", "null"],
                    "description": "Optional text to build the diagram from."
                }
            },
            "required": ["topic"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<String> {
        let topic = string_arg(self.name(), &input, "topic")?;
        let content = optional_string_arg(&input, "content");
        self.generate(&topic, content).await
    }
}
