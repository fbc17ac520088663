//! Ordered line/paragraph classification rules.
//!
//! Each rule is a named predicate mapped to a target [`Field`] with a
//! priority. A [`RuleTable`] evaluates rules highest priority first and the
//! first match wins, so every predicate can be exercised on its own.

const ABSTRACT_KEYWORDS: &[&str] = &["abstract", "summary", "摘要", "概要"];

const AFFILIATION_TOKENS: &[&str] = &[
    "@",
    "university",
    "department",
    "institute",
    "college",
    "email",
    "大学",
    "学院",
    "研究所",
    "实验室",
];

const SECTION_KEYWORDS: &[&str] = &[
    "introduction",
    "background",
    "method",
    "approach",
    "experiment",
    "result",
    "conclusion",
    "discussion",
    "related work",
    "future work",
    "引言",
    "背景",
    "方法",
    "实验",
    "结果",
    "结论",
    "讨论",
];

const REFERENCE_MARKERS: &[&str] = &[
    "references",
    "bibliography",
    "参考文献",
    "[1]",
    "[2]",
    "[3]",
    "(1)",
    "(2)",
    "(3)",
];

pub const MAX_AUTHOR_LINE_LEN: usize = 200;
pub const MAX_HEADING_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Abstract,
    Authors,
    Reference,
    SectionHeading,
    Body,
}

#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub field: Field,
    pub priority: u8,
    pub matches: fn(&str) -> bool,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("field", &self.field)
            .field("priority", &self.priority)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
    fallback: Option<Field>,
}

impl RuleTable {
    pub fn new(mut rules: Vec<Rule>, fallback: Option<Field>) -> Self {
        // Stable sort keeps declaration order among equal priorities.
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self { rules, fallback }
    }

    /// Routing for paragraphs coming out of a layout-analysis service.
    pub fn narrative() -> Self {
        Self::new(
            vec![
                Rule {
                    name: "abstract_paragraph",
                    field: Field::Abstract,
                    priority: 30,
                    matches: is_abstract_paragraph,
                },
                Rule {
                    name: "affiliation_block",
                    field: Field::Authors,
                    priority: 20,
                    matches: |text| {
                        text.chars().count() <= MAX_AUTHOR_LINE_LEN && has_affiliation_token(text)
                    },
                },
                Rule {
                    name: "reference_marker",
                    field: Field::Reference,
                    priority: 10,
                    matches: mentions_reference_marker,
                },
            ],
            Some(Field::Body),
        )
    }

    /// Detection of section boundaries in extracted plain text.
    pub fn heading() -> Self {
        Self::new(
            vec![
                Rule {
                    name: "numbered_heading",
                    field: Field::SectionHeading,
                    priority: 20,
                    matches: is_numbered_heading,
                },
                Rule {
                    name: "keyword_heading",
                    field: Field::SectionHeading,
                    priority: 10,
                    matches: |line| {
                        line.chars().count() <= MAX_HEADING_LEN && has_section_keyword(line)
                    },
                },
            ],
            None,
        )
    }

    /// Detection of author lines near the top of a document.
    pub fn authors() -> Self {
        Self::new(
            vec![
                Rule {
                    name: "affiliation_line",
                    field: Field::Authors,
                    priority: 20,
                    matches: has_affiliation_token,
                },
                Rule {
                    name: "name_list",
                    field: Field::Authors,
                    priority: 10,
                    matches: is_name_list,
                },
            ],
            None,
        )
    }

    pub fn classify(&self, text: &str) -> Option<Field> {
        self.matching_rule(text)
            .map(|rule| rule.field)
            .or(self.fallback)
    }

    pub fn matching_rule(&self, text: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| (rule.matches)(text))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

pub fn is_abstract_paragraph(text: &str) -> bool {
    let lower = text.to_lowercase();
    text.chars().count() > 50 && ABSTRACT_KEYWORDS.iter().any(|k| lower.contains(k))
}

pub fn has_affiliation_token(text: &str) -> bool {
    let lower = text.to_lowercase();
    AFFILIATION_TOKENS.iter().any(|t| lower.contains(t))
}

/// `Jane Doe, John Smith` style lines: comma separated, short, with the
/// leading words capitalized.
pub fn is_name_list(line: &str) -> bool {
    if !line.contains(',') || line.chars().count() >= MAX_AUTHOR_LINE_LEN {
        return false;
    }
    let words: Vec<&str> = line.split_whitespace().collect();
    words.len() >= 2
        && words
            .iter()
            .take(3)
            .all(|w| w.chars().next().is_some_and(char::is_uppercase))
}

/// `1. Introduction`, `2 Related Work`, `3.1 Setup`.
pub fn is_numbered_heading(line: &str) -> bool {
    if line.is_empty() || line.chars().count() > MAX_HEADING_LEN {
        return false;
    }
    let head: String = line.chars().take(5).collect();
    line.chars().next().is_some_and(|c| c.is_ascii_digit())
        && (head.contains('.') || head.contains(' '))
}

pub fn has_section_keyword(line: &str) -> bool {
    let lower = line.to_lowercase();
    SECTION_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// `[12] A. Author ...` or `12. A. Author ...` / `12) ...`.
pub fn is_reference_entry(line: &str) -> bool {
    let head10: String = line.chars().take(10).collect();
    if line.starts_with('[') && head10.contains(']') {
        return true;
    }
    let head5: String = line.chars().take(5).collect();
    line.chars().next().is_some_and(|c| c.is_ascii_digit())
        && (head5.contains('.') || head5.contains(')'))
}

pub fn mentions_reference_marker(text: &str) -> bool {
    let lower = text.to_lowercase();
    REFERENCE_MARKERS.iter().any(|m| lower.contains(m))
}
