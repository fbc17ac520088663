use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PLACEHOLDER_SECTION_TITLE: &str = "Document";
pub const PLACEHOLDER_SECTION_TEXT: &str = "No structured content could be extracted from this file.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub title: String,
    pub content: Vec<String>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: Vec::new(),
        }
    }

    pub fn text(&self) -> String {
        self.content.join("\n")
    }
}

/// A non-prose element lifted out of the source (table, figure, formula).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artifact {
    pub content: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Artifact {
    pub fn new(content: impl Into<String>, metadata: serde_json::Value) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub authors: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub sections: Vec<Section>,
    pub tables: Vec<Artifact>,
    pub images: Vec<Artifact>,
    pub formulas: Vec<Artifact>,
    pub references: Vec<String>,
    pub full_text: String,
    pub parsed_at: DateTime<Utc>,
}

impl Document {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors: String::new(),
            abstract_text: String::new(),
            sections: Vec::new(),
            tables: Vec::new(),
            images: Vec::new(),
            formulas: Vec::new(),
            references: Vec::new(),
            full_text: String::new(),
            parsed_at: Utc::now(),
        }
    }

    /// The degraded result used whenever parsing cannot produce anything usable.
    pub fn placeholder(id: impl Into<String>, filename: &str) -> Self {
        let mut doc = Self::new(id, filename);
        let mut section = Section::new(PLACEHOLDER_SECTION_TITLE);
        section.content.push(PLACEHOLDER_SECTION_TEXT.to_string());
        doc.sections.push(section);
        doc.full_text = PLACEHOLDER_SECTION_TEXT.to_string();
        doc
    }

    pub fn is_placeholder(&self) -> bool {
        self.sections.len() == 1
            && self.sections[0].title == PLACEHOLDER_SECTION_TITLE
            && self.sections[0].content == [PLACEHOLDER_SECTION_TEXT]
    }

    pub fn summary_counts(&self) -> ParsedDataSummary {
        ParsedDataSummary {
            sections_count: self.sections.len(),
            tables_count: self.tables.len(),
            images_count: self.images.len(),
            formulas_count: self.formulas.len(),
            references_count: self.references.len(),
        }
    }

    /// Buckets section bodies into the canonical paper parts by title keyword.
    /// A later section with the same bucket replaces an earlier one.
    pub fn key_sections(&self) -> KeySections {
        let mut key = KeySections::default();

        for section in &self.sections {
            let title = section.title.to_lowercase();
            let has = |words: &[&str]| words.iter().any(|w| title.contains(w));
            let slot = if has(&["introduction", "背景", "引言"]) {
                &mut key.introduction
            } else if has(&["method", "approach", "方法", "算法"]) {
                &mut key.methodology
            } else if has(&["experiment", "evaluation", "实验", "评估"]) {
                &mut key.experiments
            } else if has(&["result", "finding", "结果", "发现"]) {
                &mut key.results
            } else if has(&["conclusion", "summary", "结论", "总结"]) {
                &mut key.conclusion
            } else {
                continue;
            };
            *slot = section.text();
        }

        key
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeySections {
    pub introduction: String,
    pub methodology: String,
    pub experiments: String,
    pub results: String,
    pub conclusion: String,
}

impl KeySections {
    pub fn is_empty(&self) -> bool {
        self.introduction.is_empty()
            && self.methodology.is_empty()
            && self.experiments.is_empty()
            && self.results.is_empty()
            && self.conclusion.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedDataSummary {
    pub sections_count: usize,
    pub tables_count: usize,
    pub images_count: usize,
    pub formulas_count: usize,
    pub references_count: usize,
}
