use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use scholia_core::capability::LayoutSegmenter;
use scholia_core::document::{Artifact, Document, Section};
use scholia_core::parser::{DocumentParser, ElementKind, LayoutElement};

use crate::cache::ArtifactCache;
use crate::rules::{Field, RuleTable};

const DEFAULT_SECTION_TITLE: &str = "Introduction";
const LIST_BULLET: &str = "• ";

/// Strategy backed by an external layout-analysis service that hands back
/// typed elements in reading order.
pub struct LayoutAwareParser {
    segmenter: Arc<dyn LayoutSegmenter>,
    narrative: RuleTable,
    cache: Option<ArtifactCache>,
}

impl LayoutAwareParser {
    pub fn new(segmenter: Arc<dyn LayoutSegmenter>) -> Self {
        Self {
            segmenter,
            narrative: RuleTable::narrative(),
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: ArtifactCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Folds a segmented element stream into a [`Document`].
    pub fn assemble(&self, doc_id: &str, filename: &str, elements: &[LayoutElement]) -> Document {
        let mut doc = Document::new(doc_id, "");
        let mut current: Option<usize> = None;
        let mut texts: Vec<&str> = Vec::with_capacity(elements.len());

        for element in elements {
            let text = element.text.trim();
            texts.push(&element.text);

            match element.kind {
                ElementKind::Title => {
                    if doc.title.is_empty() {
                        doc.title = text.to_string();
                    } else {
                        doc.sections.push(Section::new(text));
                        current = Some(doc.sections.len() - 1);
                    }
                }
                ElementKind::NarrativeText => match self.narrative.classify(text) {
                    Some(Field::Abstract) => doc.abstract_text = text.to_string(),
                    Some(Field::Authors) => doc.authors = text.to_string(),
                    Some(Field::Reference) => doc.references.push(text.to_string()),
                    _ => {
                        let idx = current_or_default(&mut doc, &mut current);
                        doc.sections[idx].content.push(text.to_string());
                    }
                },
                ElementKind::Table => doc
                    .tables
                    .push(Artifact::new(text, element.metadata.clone())),
                ElementKind::Image => doc
                    .images
                    .push(Artifact::new(text, element.metadata.clone())),
                ElementKind::Formula => doc
                    .formulas
                    .push(Artifact::new(text, element.metadata.clone())),
                ElementKind::ListItem => {
                    let idx = current_or_default(&mut doc, &mut current);
                    doc.sections[idx]
                        .content
                        .push(format!("{LIST_BULLET}{text}"));
                }
                ElementKind::Other => {}
            }
        }

        doc.full_text = texts.join("\n\n");
        if doc.title.is_empty() {
            doc.title = filename.to_string();
        }
        doc
    }
}

fn current_or_default(doc: &mut Document, current: &mut Option<usize>) -> usize {
    match *current {
        Some(idx) => idx,
        None => {
            doc.sections.push(Section::new(DEFAULT_SECTION_TITLE));
            let idx = doc.sections.len() - 1;
            *current = Some(idx);
            idx
        }
    }
}

#[async_trait]
impl DocumentParser for LayoutAwareParser {
    fn strategy(&self) -> &str {
        "layout"
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn parse(&self, doc_id: &str, filename: &str, bytes: &[u8]) -> Document {
        if bytes.is_empty() {
            warn!(doc_id, filename, "Empty upload, using placeholder document");
            return Document::placeholder(doc_id, filename);
        }

        let elements = match self.segmenter.segment(filename, bytes).await {
            Ok(elements) if !elements.is_empty() => elements,
            Ok(_) => {
                warn!(doc_id, filename, "Layout service returned no elements, using placeholder document");
                return Document::placeholder(doc_id, filename);
            }
            Err(e) => {
                warn!(doc_id, filename, error = %e, "Layout segmentation failed, using placeholder document");
                return Document::placeholder(doc_id, filename);
            }
        };

        let doc = self.assemble(doc_id, filename, &elements);
        info!(
            doc_id,
            title = %doc.title,
            elements = elements.len(),
            sections = doc.sections.len(),
            tables = doc.tables.len(),
            images = doc.images.len(),
            "Layout parse complete"
        );

        if let Some(cache) = &self.cache {
            cache.store(&doc).await;
        }

        doc
    }
}
