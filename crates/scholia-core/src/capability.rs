use async_trait::async_trait;

use crate::chat::{ChatReply, ChatRequest};
use crate::error::{Result, ScholiaError};
use crate::parser::LayoutElement;

/// Turns text into a vector for similarity comparison.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn model(&self) -> &str;
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// The reasoning/chat capability.
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn name(&self) -> &str;
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply>;
}

/// Splits raw document bytes into typed layout elements.
#[async_trait]
pub trait LayoutSegmenter: Send + Sync {
    async fn segment(&self, filename: &str, bytes: &[u8]) -> Result<Vec<LayoutElement>>;
}

/// Single-turn, tool-free completion returning only the text.
pub async fn complete_text(
    model: &dyn ChatModel,
    system: Option<&str>,
    prompt: &str,
    max_tokens: u32,
) -> Result<String> {
    let reply = model
        .complete(&ChatRequest::prompt(system, prompt, max_tokens))
        .await?;
    let text = reply.text.trim().to_string();
    if text.is_empty() {
        return Err(ScholiaError::Model(format!(
            "{} returned an empty completion",
            model.name()
        )));
    }
    Ok(text)
}
