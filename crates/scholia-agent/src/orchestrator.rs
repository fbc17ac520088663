//! Model-directed tool loop that answers one question about one document.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use scholia_core::agent::{AgentResponse, DocumentContext};
use scholia_core::capability::ChatModel;
use scholia_core::chat::{ChatMessage, ChatRequest, ToolCall, ToolResult};
use scholia_core::error::{Result, ScholiaError};

use crate::prompt::{opening_messages, system_prompt};
use crate::response::parse_agent_output;
use crate::tool::ToolRegistry;

const DEFAULT_MAX_ITERATIONS: usize = 6;
const ANSWER_MAX_TOKENS: u32 = 2048;

pub struct AgentOrchestrator {
    model: Arc<dyn ChatModel>,
    registry: ToolRegistry,
    max_iterations: usize,
}

impl AgentOrchestrator {
    pub fn new(model: Arc<dyn ChatModel>, registry: ToolRegistry) -> Self {
        Self {
            model,
            registry,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Upper bound on model round-trips per question.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Always returns a well-formed response. Loop failures (model errors,
    /// runaway tool use) become a plain answer describing the failure.
    #[instrument(skip(self, context), fields(doc_id = %context.doc_id))]
    pub async fn answer(&self, question: &str, context: &DocumentContext) -> AgentResponse {
        match self.try_answer(question, context).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Agent loop failed, returning plain failure answer");
                AgentResponse::plain(format!("Sorry, I could not answer this question: {e}"))
            }
        }
    }

    pub async fn try_answer(&self, question: &str, context: &DocumentContext) -> Result<AgentResponse> {
        let mut request = ChatRequest {
            system: Some(system_prompt(context, &self.registry.specs())),
            messages: opening_messages(question),
            tools: self.registry.specs(),
            max_tokens: ANSWER_MAX_TOKENS,
        };

        for iteration in 0..self.max_iterations {
            let reply = self.model.complete(&request).await?;

            if !reply.wants_tools() {
                debug!(iteration, "Agent produced final output");
                let response = parse_agent_output(&reply.text);
                info!(
                    iteration,
                    has_diagram = response.diagram.is_some(),
                    "Question answered"
                );
                return Ok(response);
            }

            debug!(
                iteration,
                calls = reply.tool_calls.len(),
                "Model requested tool calls"
            );
            let mut results = Vec::with_capacity(reply.tool_calls.len());
            for call in &reply.tool_calls {
                results.push(self.run_tool(call).await);
            }

            request.messages.push(ChatMessage::Assistant {
                content: reply.text,
                tool_calls: reply.tool_calls,
            });
            request.messages.push(ChatMessage::ToolResults { results });
        }

        Err(ScholiaError::Model(format!(
            "tool loop did not finish within {} iterations",
            self.max_iterations
        )))
    }

    /// Tool failures, unknown names included, go back to the model as error
    /// results so it can recover.
    async fn run_tool(&self, call: &ToolCall) -> ToolResult {
        match self.registry.invoke(&call.name, call.input.clone()).await {
            Ok(content) => {
                debug!(tool = %call.name, len = content.len(), "Tool call succeeded");
                ToolResult {
                    call_id: call.id.clone(),
                    content,
                    is_error: false,
                }
            }
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool call failed");
                ToolResult {
                    call_id: call.id.clone(),
                    content: e.to_string(),
                    is_error: true,
                }
            }
        }
    }
}
