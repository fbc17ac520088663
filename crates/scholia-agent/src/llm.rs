use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use scholia_core::capability::ChatModel;
use scholia_core::chat::{ChatMessage, ChatReply, ChatRequest, ToolCall, ToolSpec};
use scholia_core::config::AppConfig;
use scholia_core::error::{Result, ScholiaError};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// Anthropic Messages API types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<AnthropicTool<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicTool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

fn to_wire(message: &ChatMessage) -> Message {
    match message {
        ChatMessage::User { content } => Message {
            role: "user",
            content: vec![ContentBlock::Text {
                text: content.clone(),
            }],
        },
        ChatMessage::Assistant {
            content,
            tool_calls,
        } => {
            let mut blocks = Vec::with_capacity(tool_calls.len() + 1);
            if !content.is_empty() {
                blocks.push(ContentBlock::Text {
                    text: content.clone(),
                });
            }
            blocks.extend(tool_calls.iter().map(|call| ContentBlock::ToolUse {
                id: call.id.clone(),
                name: call.name.clone(),
                input: call.input.clone(),
            }));
            Message {
                role: "assistant",
                content: blocks,
            }
        }
        ChatMessage::ToolResults { results } => Message {
            role: "user",
            content: results
                .iter()
                .map(|r| ContentBlock::ToolResult {
                    tool_use_id: r.call_id.clone(),
                    content: r.content.clone(),
                    is_error: r.is_error,
                })
                .collect(),
        },
    }
}

fn to_wire_tool(spec: &ToolSpec) -> AnthropicTool<'_> {
    AnthropicTool {
        name: &spec.name,
        description: &spec.description,
        input_schema: &spec.input_schema,
    }
}

fn from_wire(response: AnthropicResponse) -> ChatReply {
    let mut text = String::new();
    let mut tool_calls = Vec::new();

    for block in response.content {
        match block {
            ContentBlock::Text { text: t } => text.push_str(&t),
            ContentBlock::ToolUse { id, name, input } => {
                tool_calls.push(ToolCall { id, name, input })
            }
            ContentBlock::ToolResult { .. } | ContentBlock::Other => {}
        }
    }

    ChatReply {
        text,
        tool_calls,
        stop_reason: response.stop_reason,
    }
}

// ---------------------------------------------------------------------------
// AnthropicChatModel
// ---------------------------------------------------------------------------

/// [`ChatModel`] backed by the Anthropic Messages API, with tool use.
pub struct AnthropicChatModel {
    client: Client,
    api_key: String,
    model: String,
}

impl AnthropicChatModel {
    pub fn new(config: &AppConfig) -> Result<Self> {
        if config.anthropic_api_key.is_empty() {
            return Err(ScholiaError::Config("ANTHROPIC_API_KEY is not set".into()));
        }
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            api_key: config.anthropic_api_key.clone(),
            model: config.chat_model.clone(),
        })
    }
}

#[async_trait]
impl ChatModel for AnthropicChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply> {
        let body = AnthropicRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            messages: request.messages.iter().map(to_wire).collect(),
            system: request.system.as_deref(),
            tools: request.tools.iter().map(to_wire_tool).collect(),
        };

        debug!(
            model = %self.model,
            messages = body.messages.len(),
            tools = body.tools.len(),
            "sending request to Anthropic API"
        );

        let resp = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ScholiaError::Model(format!("HTTP request to Anthropic failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".into());
            return Err(ScholiaError::Model(format!(
                "Anthropic API returned {status}: {body}"
            )));
        }

        let api_resp: AnthropicResponse = resp
            .json()
            .await
            .map_err(|e| ScholiaError::Model(format!("failed to parse Anthropic response: {e}")))?;

        let reply = from_wire(api_resp);
        debug!(
            stop_reason = ?reply.stop_reason,
            response_len = reply.text.len(),
            tool_calls = reply.tool_calls.len(),
            "received Anthropic API response"
        );

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholia_core::chat::ToolResult;
    use serde_json::json;

    #[test]
    fn assistant_tool_calls_become_tool_use_blocks() {
        let msg = ChatMessage::Assistant {
            content: String::new(),
            tool_calls: vec![ToolCall {
                id: "toolu_1".into(),
                name: "search_document".into(),
                input: json!({"query": "loss function"}),
            }],
        };
        let wire = serde_json::to_value(to_wire(&msg)).unwrap();
        assert_eq!(wire["role"], "assistant");
        assert_eq!(wire["content"].as_array().unwrap().len(), 1);
        assert_eq!(wire["content"][0]["type"], "tool_use");
        assert_eq!(wire["content"][0]["input"]["query"], "loss function");
    }

    #[test]
    fn tool_results_are_sent_as_user_turn() {
        let msg = ChatMessage::ToolResults {
            results: vec![ToolResult {
                call_id: "toolu_1".into(),
                content: "boom".into(),
                is_error: true,
            }],
        };
        let wire = serde_json::to_value(to_wire(&msg)).unwrap();
        assert_eq!(wire["role"], "user");
        assert_eq!(wire["content"][0]["type"], "tool_result");
        assert_eq!(wire["content"][0]["tool_use_id"], "toolu_1");
        assert_eq!(wire["content"][0]["is_error"], true);
    }

    #[test]
    fn response_blocks_are_collected() {
        let resp: AnthropicResponse = serde_json::from_value(json!({
            "content": [
                {"type": "thinking", "thinking": "hmm"},
                {"type": "text", "text": "Let me look that up."},
                {"type": "tool_use", "id": "toolu_2", "name": "generate_mindmap", "input": {"topic": "method"}}
            ],
            "stop_reason": "tool_use"
        }))
        .unwrap();
        let reply = from_wire(resp);
        assert_eq!(reply.text, "Let me look that up.");
        assert!(reply.wants_tools());
        assert_eq!(reply.tool_calls[0].input["topic"], "method");
        assert_eq!(reply.stop_reason.as_deref(), Some("tool_use"));
    }
}
