//! Total mapping from raw model output to [`AgentResponse`].

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use scholia_core::agent::{AgentResponse, Diagram};

const DEFAULT_DIAGRAM_TYPE: &str = "mermaid";

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)\s*```\s*$").expect("valid fence pattern")
});

/// Returns the body of a single fenced code block, or the trimmed input when
/// it is not fenced.
pub fn strip_code_fence(text: &str) -> &str {
    match CODE_FENCE.captures(text).and_then(|c| c.get(1)) {
        Some(body) => body.as_str().trim(),
        None => text.trim(),
    }
}

/// Parses the orchestrator's final output.
///
/// A JSON object (optionally fenced) is read as `{answer, diagram}` with
/// defaults for anything missing; any other output becomes the answer text
/// verbatim with no diagram.
pub fn parse_agent_output(raw: &str) -> AgentResponse {
    let body = strip_code_fence(raw);

    if let Some(map) = parse_object(body) {
        return from_object(&map);
    }
    if let Some(map) = embedded_object(body) {
        return from_object(&map);
    }

    debug!(len = raw.len(), "Final output is not structured, wrapping as plain answer");
    AgentResponse::plain(raw.trim())
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// `Here is the chart: {...}`: accept the outermost braces only when they
/// hold one of our fields.
fn embedded_object(text: &str) -> Option<Map<String, Value>> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    parse_object(&text[start..=end])
        .filter(|map| map.contains_key("answer") || map.contains_key("diagram"))
}

fn from_object(map: &Map<String, Value>) -> AgentResponse {
    let answer = match map.get("answer") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    AgentResponse {
        answer,
        diagram: map.get("diagram").and_then(parse_diagram),
    }
}

fn parse_diagram(value: &Value) -> Option<Diagram> {
    let obj = value.as_object()?;
    let code = obj
        .get("code")
        .and_then(Value::as_str)
        .map(|c| strip_code_fence(c).to_string())
        .filter(|c| !c.is_empty())?;
    let kind = obj
        .get("type")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(DEFAULT_DIAGRAM_TYPE)
        .to_string();
    let title = obj
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some(Diagram { kind, title, code })
}
