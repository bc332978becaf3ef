//! Tool-related types.

use mcp::CallToolResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// A tool definition exposed to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Key used to carry argument text that was not valid JSON.
pub const RAW_ARGUMENTS_KEY: &str = "_raw";

/// Arguments ready to send with a tool invocation.
///
/// Built from whatever the model produced: an object is used as-is, a string
/// is decoded as JSON, anything else becomes an empty mapping. A string that
/// fails to decode is kept under [`RAW_ARGUMENTS_KEY`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments(pub Map<String, Value>);

impl ToolArguments {
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Value> for ToolArguments {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            Value::String(text) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(map)) => {
                    debug!(arguments = %text, "decoded string arguments");
                    Self(map)
                }
                Ok(other) => {
                    warn!(arguments = %other, "decoded arguments are not an object, using none");
                    Self::default()
                }
                Err(e) => {
                    warn!(error = %e, arguments = %text, "failed to decode arguments, passing raw text");
                    let mut map = Map::new();
                    map.insert(RAW_ARGUMENTS_KEY.to_string(), Value::String(text));
                    Self(map)
                }
            },
            _ => Self::default(),
        }
    }
}

/// What a tool invocation returned.
///
/// Hosts may hand back a typed MCP result or an arbitrary JSON value; the
/// normalizer in [`crate::normalize`] accepts both.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Mcp(CallToolResult),
    Raw(Value),
}

impl From<CallToolResult> for ToolOutput {
    fn from(result: CallToolResult) -> Self {
        Self::Mcp(result)
    }
}

impl From<Value> for ToolOutput {
    fn from(value: Value) -> Self {
        Self::Raw(value)
    }
}
