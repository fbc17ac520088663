use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use scholia_core::chat::ToolSpec;
use scholia_core::error::{Result, ScholiaError};

/// A capability the reasoning model may call by name.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON Schema for the `input` object.
    fn input_schema(&self) -> serde_json::Value;
    async fn invoke(&self, input: serde_json::Value) -> Result<String>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Name-addressed tool table. Keeps registration order for advertising.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    order: Vec<String>,
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tool, replacing any earlier tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> &mut Self {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_none() {
            self.order.push(name);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.spec())
            .collect()
    }

    /// Dispatches by name. A name that is not registered is
    /// [`ScholiaError::UnknownTool`], never a silent no-op.
    pub async fn invoke(&self, name: &str, input: serde_json::Value) -> Result<String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ScholiaError::UnknownTool(name.to_string()))?;
        tool.invoke(input).await
    }
}

/// Reads a string argument from a tool input object. A bare JSON string is
/// accepted as the value of `key`.
pub fn string_arg(tool: &str, input: &serde_json::Value, key: &str) -> Result<String> {
    let value = match input {
        serde_json::Value::String(s) => Some(s.as_str()),
        other => other.get(key).and_then(|v| v.as_str()),
    };
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ScholiaError::ToolInput {
            tool: tool.to_string(),
            message: format!("missing string argument '{key}'"),
        }),
    }
}

/// Optional string argument; `null`, absent and blank all mean `None`.
pub fn optional_string_arg(input: &serde_json::Value, key: &str) -> Option<String> {
    input
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
