use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use scholia_core::capability::{complete_text, ChatModel};
use scholia_core::error::Result;
use scholia_index::{RetrievalEngine, ScoredChunk};

use crate::tool::{string_arg, Tool};

pub const SEARCH_TOOL: &str = "search_document";
pub const KNOWLEDGE_BASE_UNAVAILABLE: &str =
    "Knowledge base unavailable: this document has not been indexed yet, so its full text cannot be searched.";
pub const NO_RELEVANT_CONTENT: &str = "No relevant content was found in the document for this query.";
/// Sentinel the model is asked to emit when the excerpts do not answer.
pub const NOT_FOUND_MARKER: &str = "NOT_FOUND";

const DEFAULT_TOP_K: usize = 3;
const SYNTHESIS_MAX_TOKENS: u32 = 1024;

/// Retrieves the closest chunks and has the model answer from them.
pub struct SearchTool {
    engine: Arc<RetrievalEngine>,
    model: Arc<dyn ChatModel>,
    top_k: usize,
    min_score: f32,
}

impl SearchTool {
    pub fn new(engine: Arc<RetrievalEngine>, model: Arc<dyn ChatModel>) -> Self {
        Self {
            engine,
            model,
            top_k: DEFAULT_TOP_K,
            min_score: 0.0,
        }
    }

    /// Chunks scoring at or below `min_score` are discarded.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub async fn search(&self, query: &str) -> Result<String> {
        if !self.engine.is_loaded().await {
            warn!(query, "Search requested with no index loaded");
            return Ok(KNOWLEDGE_BASE_UNAVAILABLE.to_string());
        }

        let hits: Vec<ScoredChunk> = self
            .engine
            .retrieve(query, self.top_k)
            .await
            .into_iter()
            .filter(|hit| hit.score > self.min_score)
            .collect();
        if hits.is_empty() {
            debug!(query, "No chunks above similarity threshold");
            return Ok(NO_RELEVANT_CONTENT.to_string());
        }

        debug!(query, hits = hits.len(), top_score = hits[0].score, "Synthesizing answer from chunks");
        let answer = complete_text(
            self.model.as_ref(),
            Some(SYNTHESIS_SYSTEM),
            &synthesis_prompt(query, &hits),
            SYNTHESIS_MAX_TOKENS,
        )
        .await?;

        if answer.contains(NOT_FOUND_MARKER) {
            return Ok(NO_RELEVANT_CONTENT.to_string());
        }
        Ok(answer)
    }
}

/// True for search output that carries no document content.
pub fn is_unusable(output: &str) -> bool {
    let output = output.trim();
    output.is_empty()
        || output == KNOWLEDGE_BASE_UNAVAILABLE
        || output == NO_RELEVANT_CONTENT
        || output.contains(NOT_FOUND_MARKER)
}

const SYNTHESIS_SYSTEM: &str = "You answer questions about an academic paper using only the \
excerpts provided. Explain in an authoritative but accessible way.";

fn synthesis_prompt(query: &str, hits: &[ScoredChunk]) -> String {
    let mut prompt = format!("Question:\n{query}\n\nExcerpts from the paper:\n");
    for (i, hit) in hits.iter().enumerate() {
        prompt.push_str(&format!("--- Excerpt {} ---\n{}\n\n", i + 1, sanitize(&hit.chunk.text)));
    }
    prompt.push_str(&format!(
        "Answer the question from these excerpts. If they do not contain the answer, \
         reply with exactly {NOT_FOUND_MARKER}."
    ));
    prompt
}

/// Strips control characters that PDF extraction leaves behind.
fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect()
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        SEARCH_TOOL
    }

    fn description(&self) -> &str {
        "Search the full text of the current paper and answer a specific question from the \
         most relevant passages. Input is the user's question or the topic to look up."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Natural-language question or topic to search for."
                }
            },
            "required": ["query"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<String> {
        let query = string_arg(SEARCH_TOOL, &input, "query")?;
        self.search(&query).await
    }
}
