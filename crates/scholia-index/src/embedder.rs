use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use scholia_core::capability::Embedder;
use scholia_core::error::{Result, ScholiaError};

use crate::similarity::normalize;

const MAX_PROMPT_CHARS: usize = 12_000;
pub const DEFAULT_HASH_DIMS: usize = 256;

/// Ollama-compatible `/api/embeddings` client.
pub struct HttpEmbedder {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let prompt = match text.char_indices().nth(MAX_PROMPT_CHARS) {
            Some((cut, _)) => &text[..cut],
            None => text,
        };

        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&EmbeddingsRequest {
                model: &self.model,
                prompt,
            })
            .send()
            .await
            .map_err(|e| ScholiaError::Embedding(format!("Embeddings request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScholiaError::Embedding(format!(
                "Embeddings endpoint returned status {status}"
            )));
        }

        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| ScholiaError::Embedding(format!("Failed to decode embeddings: {e}")))?;
        if body.embedding.is_empty() {
            return Err(ScholiaError::Embedding("Embeddings response was empty".into()));
        }
        Ok(body.embedding)
    }
}

/// Deterministic feature-hashing embedder. Needs no service, so it backs
/// tests and deployments without an embeddings endpoint.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }

    pub fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dims];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let h = fnv1a(token.to_lowercase().as_bytes());
            let slot = (h % self.dims as u64) as usize;
            let sign = if (h >> 63) & 1 == 0 { 1.0 } else { -1.0 };
            v[slot] += sign;
        }
        normalize(&mut v);
        v
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIMS)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in bytes {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn model(&self) -> &str {
        "feature-hash"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vectorize(text))
    }
}
