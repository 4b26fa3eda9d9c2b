use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use crate::errors::AppError;
use crate::fetcher::FetchError;
use crate::llm_client::ToolSpec;

/// Failure of a tool invocation.
///
/// `InvalidArguments` and `Fetch` are reported back to the model as the tool result;
/// `Fatal` aborts the conversation.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Fatal(AppError),
}

impl From<AppError> for ToolError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Fetch(fetch) => ToolError::Fetch(fetch),
            other => ToolError::Fatal(other),
        }
    }
}

/// A function the model can ask the driving process to execute.
#[async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> ToolSpec;

    async fn call(&self, args: Value) -> Result<String, ToolError>;
}

/// Ordered set of tools offered to the model, looked up by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Registers `tool`, replacing any tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.spec().name;
        self.tools.retain(|t| t.spec().name != name);
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.spec().name == name).cloned()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }
}

/// Builds the JSON schema for an object with required string properties.
pub fn string_params(props: &[(&str, &str)]) -> Value {
    let properties: serde_json::Map<String, Value> = props
        .iter()
        .map(|(name, description)| {
            (
                name.to_string(),
                json!({"type": "string", "description": description}),
            )
        })
        .collect();
    let required: Vec<&str> = props.iter().map(|(name, _)| *name).collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Reads the first present, non-empty string argument among `names`.
pub fn string_arg(args: &Value, names: &[&str]) -> Result<String, ToolError> {
    names
        .iter()
        .find_map(|name| {
            args.get(name)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        })
        .map(str::to_string)
        .ok_or_else(|| {
            ToolError::InvalidArguments(format!("missing string argument '{}'", names[0]))
        })
}
