use std::sync::Arc;

use tracing::{info, instrument, warn};

use scholia_core::agent::DocumentInsights;
use scholia_core::capability::{complete_text, ChatModel};
use scholia_core::document::{Document, KeySections};
use scholia_core::error::{Result, ScholiaError};

const INSIGHT_MAX_TOKENS: u32 = 1024;
/// Characters of full text shown to the model for terminology.
const TERMINOLOGY_WINDOW: usize = 2000;
const MAX_REFERENCES_IN_PROMPT: usize = 20;

/// Derives the summary, key content, terminology and research context of a
/// parsed document.
pub struct DocumentAnalyzer {
    model: Arc<dyn ChatModel>,
}

impl DocumentAnalyzer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// All-or-nothing: the first failing step aborts the whole analysis with
    /// [`ScholiaError::Analysis`].
    #[instrument(skip(self, doc), fields(doc_id = %doc.id))]
    pub async fn analyze(&self, doc: &Document) -> Result<DocumentInsights> {
        match self.run(doc).await {
            Ok(insights) => {
                info!("Document insights generated");
                Ok(insights)
            }
            Err(e) => {
                warn!(error = %e, "Document analysis failed");
                Err(ScholiaError::Analysis(e.to_string()))
            }
        }
    }

    async fn run(&self, doc: &Document) -> Result<DocumentInsights> {
        let summary = if doc.title.is_empty() || doc.abstract_text.is_empty() {
            format!("This is an academic paper about {}.", or_untitled(&doc.title))
        } else {
            self.ask(&summary_prompt(&doc.title, &doc.abstract_text)).await?
        };

        let key_sections = doc.key_sections();
        let key_content = if key_sections.is_empty() {
            "No key sections could be identified in this paper.".to_string()
        } else {
            self.ask(&key_content_prompt(&doc.title, &key_sections)).await?
        };

        let terminology = if doc.full_text.trim().is_empty() {
            "No full text was extracted from this paper.".to_string()
        } else {
            let window: String = doc.full_text.chars().take(TERMINOLOGY_WINDOW).collect();
            self.ask(&terminology_prompt(&window)).await?
        };

        let research_context = self
            .ask(&research_context_prompt(doc, &key_content))
            .await?;

        Ok(DocumentInsights {
            summary,
            key_content,
            terminology,
            research_context,
        })
    }

    async fn ask(&self, prompt: &str) -> Result<String> {
        complete_text(self.model.as_ref(), None, prompt, INSIGHT_MAX_TOKENS).await
    }
}

fn or_untitled(title: &str) -> &str {
    if title.is_empty() {
        "an untitled topic"
    } else {
        title
    }
}

fn or_missing<'a>(text: &'a str, label: &str) -> std::borrow::Cow<'a, str> {
    if text.trim().is_empty() {
        format!("(no {label} section found)").into()
    } else {
        text.into()
    }
}

fn summary_prompt(title: &str, abstract_text: &str) -> String {
    format!(
        "Summarize the following academic paper in one or two plain sentences that a \
         non-specialist could follow, highlighting its core contribution.\n\n\
         Title: {title}\nAbstract: {abstract_text}\n\nKeep it under 60 words."
    )
}

fn key_content_prompt(title: &str, key: &KeySections) -> String {
    format!(
        "Extract the key information from this paper.\n\nTitle: {title}\n\n\
         <introduction>: {}\n<method>: {}\n<experiments>: {}\n<results>: {}\n<conclusion>: {}\n\n\
         Answer in this format, one or two sentences each:\n\
         1. Research problem:\n2. Goal:\n3. Main method:\n4. Experimental design:\n\
         5. Strengths and contributions:",
        or_missing(&key.introduction, "introduction"),
        or_missing(&key.methodology, "method"),
        or_missing(&key.experiments, "experiments"),
        or_missing(&key.results, "results"),
        or_missing(&key.conclusion, "conclusion"),
    )
}

fn terminology_prompt(text: &str) -> String {
    format!(
        "Identify 5 to 10 key technical terms in the following paper excerpt and explain each \
         in plain language.\n\n{text}\n\nOutput one term per line as `term: explanation`."
    )
}

fn research_context_prompt(doc: &Document, key_content: &str) -> String {
    let references = doc
        .references
        .iter()
        .take(MAX_REFERENCES_IN_PROMPT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Analyze the research context of this paper.\n\nTitle: {}\nAbstract: {}\n\
         Key content: {key_content}\nReferences:\n{references}\n\n\
         Cover the research field and direction, related classic work, where this study sits \
         in the field, and likely follow-up directions. Give a structured answer.",
        doc.title, doc.abstract_text
    )
}
