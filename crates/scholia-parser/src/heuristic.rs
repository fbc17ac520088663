use async_trait::async_trait;
use tracing::{info, instrument, warn};

use scholia_core::document::{Document, Section};
use scholia_core::parser::DocumentParser;

use crate::cache::ArtifactCache;
use crate::extract::extract_text;
use crate::rules::{is_reference_entry, Field, RuleTable};

const TITLE_SCAN_LINES: usize = 10;
const AUTHOR_SCAN_LINES: usize = 20;
const MAX_REFERENCES: usize = 50;

const ABSTRACT_KEYWORDS: &[&str] = &["abstract", "summary", "摘要", "概要"];
const ABSTRACT_BOUNDARIES: &[&str] = &[
    "introduction",
    "keywords",
    "index terms",
    "关键词",
    "引言",
    "\n1.",
    "\n1 ",
];
const MIN_ABSTRACT_CHARS: usize = 50;
const MAX_ABSTRACT_CHARS: usize = 2000;

const REFERENCE_HEADINGS: &[&str] = &["references", "bibliography", "参考文献"];

/// Text-only strategy: extract raw text, then classify lines with the rule
/// tables in [`crate::rules`].
pub struct HeuristicParser {
    headings: RuleTable,
    authors: RuleTable,
    cache: Option<ArtifactCache>,
}

impl Default for HeuristicParser {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicParser {
    pub fn new() -> Self {
        Self {
            headings: RuleTable::heading(),
            authors: RuleTable::authors(),
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: ArtifactCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Classifies already-extracted text. Returns the placeholder when the
    /// text is blank.
    pub fn parse_text(&self, doc_id: &str, filename: &str, text: &str) -> Document {
        if text.trim().is_empty() {
            warn!(doc_id, filename, "No text extracted, using placeholder document");
            return Document::placeholder(doc_id, filename);
        }

        let mut doc = Document::new(doc_id, extract_title(text).unwrap_or(filename));
        doc.abstract_text = extract_abstract(text).unwrap_or_default();
        doc.authors = self.extract_authors(text).unwrap_or_default();
        doc.sections = self.extract_sections(text);
        doc.references = extract_references(text);
        doc.full_text = text.to_string();
        doc
    }

    fn extract_authors(&self, text: &str) -> Option<String> {
        text.lines()
            .take(AUTHOR_SCAN_LINES)
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .find(|line| self.authors.classify(line) == Some(Field::Authors))
            .map(str::to_string)
    }

    fn extract_sections(&self, text: &str) -> Vec<Section> {
        let mut sections: Vec<Section> = Vec::new();

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if self.headings.classify(line) == Some(Field::SectionHeading) {
                sections.push(Section::new(line));
            } else if let Some(current) = sections.last_mut() {
                current.content.push(line.to_string());
            }
        }

        sections
    }
}

/// Longest of the first non-blank lines whose length is plausible for a title.
/// Ties keep the earliest line.
pub fn extract_title(text: &str) -> Option<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(TITLE_SCAN_LINES)
        .filter(|line| {
            let len = line.chars().count();
            len > 10 && len < 200
        })
        .fold(None, |best: Option<&str>, line| match best {
            Some(b) if b.chars().count() >= line.chars().count() => Some(b),
            _ => Some(line),
        })
}

/// The span between an abstract keyword and the nearest following section
/// boundary, flattened onto one line. Keywords are tried in order and the
/// first span of acceptable length wins.
pub fn extract_abstract(text: &str) -> Option<String> {
    if text.trim().chars().count() < MIN_ABSTRACT_CHARS {
        return None;
    }

    // ASCII lowering keeps byte offsets aligned with `text`.
    let lower = text.to_ascii_lowercase();

    for keyword in ABSTRACT_KEYWORDS {
        let Some(found) = lower.find(keyword) else {
            continue;
        };
        let start = found + keyword.len();
        let end = ABSTRACT_BOUNDARIES
            .iter()
            .filter_map(|b| lower[start..].find(b).map(|i| start + i))
            .min()
            .unwrap_or(text.len());

        let span = text[start..end].replace('\n', " ");
        let span = span
            .trim()
            .trim_start_matches([':', '.', '-'])
            .trim()
            .to_string();
        let len = span.chars().count();
        if (MIN_ABSTRACT_CHARS..MAX_ABSTRACT_CHARS).contains(&len) {
            return Some(span);
        }
    }

    None
}

/// Reference entries following the bibliography heading, capped.
pub fn extract_references(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();

    let standalone = lines.iter().position(|line| {
        let normalized = line
            .trim()
            .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ' ')
            .trim_end_matches(':')
            .trim()
            .to_lowercase();
        REFERENCE_HEADINGS.contains(&normalized.as_str())
    });

    let tail: Vec<&str> = match standalone {
        Some(idx) => lines[idx + 1..].to_vec(),
        None => {
            let lower = text.to_ascii_lowercase();
            let Some(idx) = REFERENCE_HEADINGS.iter().find_map(|k| lower.find(k)) else {
                return Vec::new();
            };
            text[idx..].lines().collect()
        }
    };

    tail.into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty() && is_reference_entry(line))
        .take(MAX_REFERENCES)
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl DocumentParser for HeuristicParser {
    fn strategy(&self) -> &str {
        "heuristic"
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn parse(&self, doc_id: &str, filename: &str, bytes: &[u8]) -> Document {
        if bytes.is_empty() {
            warn!(doc_id, filename, "Empty upload, using placeholder document");
            return Document::placeholder(doc_id, filename);
        }

        let text = match extract_text(bytes).await {
            Ok(text) => text,
            Err(e) => {
                warn!(doc_id, filename, error = %e, "Text extraction failed, using placeholder document");
                return Document::placeholder(doc_id, filename);
            }
        };

        let doc = self.parse_text(doc_id, filename, &text);
        if doc.is_placeholder() {
            return doc;
        }

        info!(
            doc_id,
            title = %doc.title,
            sections = doc.sections.len(),
            references = doc.references.len(),
            chars = doc.full_text.len(),
            "Heuristic parse complete"
        );

        if let Some(cache) = &self.cache {
            cache.store(&doc).await;
        }

        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAPER: &str = "\
Efficient Retrieval for Long Scientific Documents Using Overlapping Windows and Cosine Ranking
Alice Smith, Bob Jones, Carol White
Department of Computer Science, Example University

Abstract
We present a retrieval technique for long scientific documents
that splits text into overlapping windows and ranks them by
cosine similarity to the question.

1. Introduction
Long documents are hard to search.
Prior work uses keyword matching.
2. Method
We embed overlapping chunks.
3. Results
Recall improves substantially.

References
[1] Smith, A. Retrieval at scale. 2020.
[2] Jones, B. Windows and overlaps. 2021.
Appendix text that is not a reference.
";

    #[test]
    fn recovers_structure() {
        let doc = HeuristicParser::new().parse_text("doc-1", "paper.pdf", PAPER);

        assert_eq!(
            doc.title,
            "Efficient Retrieval for Long Scientific Documents Using Overlapping Windows and Cosine Ranking"
        );
        assert_eq!(doc.authors, "Alice Smith, Bob Jones, Carol White");
        assert!(doc.abstract_text.starts_with("We present a retrieval technique"));
        assert!(!doc.abstract_text.contains('\n'));

        let titles: Vec<&str> = doc.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["1. Introduction", "2. Method", "3. Results"]);
        assert_eq!(doc.sections[0].content.len(), 2);

        assert_eq!(doc.references.len(), 2);
        assert!(doc.references[0].starts_with("[1]"));
        assert_eq!(doc.full_text, PAPER);
    }

    #[test]
    fn abstract_stops_at_boundary() {
        let abstract_text = extract_abstract(PAPER).unwrap();
        let len = abstract_text.chars().count();
        assert!((50..2000).contains(&len));
        assert!(!abstract_text.to_lowercase().contains("introduction"));
    }

    #[test]
    fn short_abstract_is_dropped() {
        let text = format!("Abstract: too short.\nIntroduction\n{}", "body ".repeat(20));
        assert_eq!(extract_abstract(&text), None);
    }

    #[test]
    fn overlong_abstract_is_dropped() {
        let text = format!("Abstract {}", "word ".repeat(500));
        assert_eq!(extract_abstract(&text), None);
    }

    #[test]
    fn title_falls_back_to_filename() {
        let doc = HeuristicParser::new().parse_text("doc-2", "notes.txt", "short\nlines\nonly");
        assert_eq!(doc.title, "notes.txt");
    }

    #[test]
    fn title_prefers_first_of_equal_length() {
        assert_eq!(
            extract_title("first line xx\nsecond line x"),
            Some("first line xx")
        );
    }

    #[test]
    fn references_are_capped() {
        let mut text = String::from("References\n");
        for i in 1..=80 {
            text.push_str(&format!("[{i}] Author {i}. Title {i}.\n"));
        }
        assert_eq!(extract_references(&text).len(), MAX_REFERENCES);
    }

    #[test]
    fn references_without_standalone_heading() {
        let text = "see the references below\n[1] A. Paper.\n2. B. Paper.";
        assert_eq!(extract_references(text).len(), 2);
    }

    #[tokio::test]
    async fn empty_bytes_give_placeholder() {
        let doc = HeuristicParser::new().parse("doc-3", "empty.pdf", b"").await;
        assert!(doc.is_placeholder());
        assert_eq!(doc.title, "empty.pdf");
    }

    #[tokio::test]
    async fn corrupt_pdf_gives_placeholder() {
        let doc = HeuristicParser::new()
            .parse("doc-4", "broken.pdf", b"%PDF-1.4 garbage")
            .await;
        assert!(doc.is_placeholder());
        assert_eq!(doc.title, "broken.pdf");
    }

    #[tokio::test]
    async fn plain_text_upload_is_classified_and_cached() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ArtifactCache::new(dir.path());
        let parser = HeuristicParser::new().with_cache(cache.clone());

        let doc = parser.parse("doc-5", "paper.txt", PAPER.as_bytes()).await;
        assert!(!doc.is_placeholder());
        assert_eq!(doc.sections.len(), 3);
        assert!(cache.path_for("doc-5").exists());
    }
}
