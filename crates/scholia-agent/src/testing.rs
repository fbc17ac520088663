//! Scripted chat model, shared by this crate's unit tests and the
//! cross-crate suite through the `testing` feature.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use scholia_core::capability::ChatModel;
use scholia_core::chat::{ChatReply, ChatRequest, ToolCall};
use scholia_core::error::{Result, ScholiaError};

/// Replays queued replies in order and records every request it sees.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<ChatReply>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn new(replies: impl IntoIterator<Item = ChatReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn texts<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(texts.into_iter().map(ChatReply::text))
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

pub fn tool_call(id: &str, name: &str, input: serde_json::Value) -> ChatReply {
    ChatReply {
        text: String::new(),
        tool_calls: vec![ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            input,
        }],
        stop_reason: Some("tool_use".into()),
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ScholiaError::Model("script exhausted".into()))
    }
}
