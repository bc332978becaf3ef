//! Tool result normalization.
//!
//! Whatever a tool returns is reduced to one string for the conversation.
//! First match wins:
//!
//! 1. a scalar data field (`structuredContent` for MCP results, `data` for
//!    raw values) is used directly;
//! 2. otherwise the content parts are joined with newlines, each part
//!    contributing its text or, lacking text, its JSON;
//! 3. otherwise the whole result is rendered as JSON;
//! 4. an absent result is the empty string.

use mcp::{CallToolResult, ContentPart};
use serde_json::Value;

use crate::tools::ToolOutput;

/// Reduce a tool result to text. Never fails.
pub fn result_to_text(output: Option<&ToolOutput>) -> String {
    match output {
        None => String::new(),
        Some(ToolOutput::Mcp(result)) => mcp_result_to_text(result),
        Some(ToolOutput::Raw(value)) => value_to_text(value),
    }
}

fn mcp_result_to_text(result: &CallToolResult) -> String {
    if let Some(data) = result.structured_content.as_ref().and_then(scalar_data) {
        return data;
    }

    if !result.content.is_empty() {
        return result
            .content
            .iter()
            .map(part_to_text)
            .collect::<Vec<_>>()
            .join("\n");
    }

    serde_json::to_string(result).unwrap_or_default()
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => return String::new(),
        Value::String(text) => return text.clone(),
        _ => {}
    }

    if let Some(data) = value.get("data").and_then(scalar_data) {
        return data;
    }

    let parts = value
        .get("content")
        .and_then(Value::as_array)
        .filter(|parts| !parts.is_empty());
    if let Some(parts) = parts {
        return parts
            .iter()
            .map(|part| match part.get("text").and_then(Value::as_str) {
                Some(text) => text.to_string(),
                None => part.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n");
    }

    value.to_string()
}

fn part_to_text(part: &ContentPart) -> String {
    match part.as_text() {
        Some(text) => text.to_string(),
        None => serde_json::to_string(part).unwrap_or_default(),
    }
}

/// Text of a scalar data value.
///
/// Structured output for non-object return values is conventionally wrapped
/// as `{"result": value}`; that wrapper is looked through.
fn scalar_data(data: &Value) -> Option<String> {
    match data {
        Value::String(text) => Some(text.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) if map.len() == 1 => map.get("result").and_then(scalar_data),
        _ => None,
    }
}
