use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use scholia_core::capability::LayoutSegmenter;
use scholia_core::error::{Result, ScholiaError};
use scholia_core::parser::{ElementKind, LayoutElement};

/// Client for an Unstructured-style partition endpoint.
pub struct HttpLayoutSegmenter {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct PartitionElement {
    #[serde(rename = "type")]
    element_type: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    metadata: serde_json::Value,
}

impl HttpLayoutSegmenter {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent("scholia/0.1")
            .timeout(std::time::Duration::from_secs(300))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

fn into_elements(raw: Vec<PartitionElement>) -> Vec<LayoutElement> {
    raw.into_iter()
        .map(|e| LayoutElement {
            kind: ElementKind::from_label(&e.element_type),
            text: e.text,
            metadata: e.metadata,
        })
        .collect()
}

#[async_trait]
impl LayoutSegmenter for HttpLayoutSegmenter {
    async fn segment(&self, filename: &str, bytes: &[u8]) -> Result<Vec<LayoutElement>> {
        let part = Part::bytes(bytes.to_vec()).file_name(filename.to_string());
        let form = Form::new()
            .part("files", part)
            .text("strategy", "hi_res")
            .text("pdf_infer_table_structure", "true");

        let response = self
            .client
            .post(&self.url)
            .header("accept", "application/json")
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScholiaError::Parse(format!(
                "Layout service returned status {status}: {body}"
            )));
        }

        let raw: Vec<PartitionElement> = response.json().await?;
        debug!(filename, elements = raw.len(), "Received layout elements");
        Ok(into_elements(raw))
    }
}
