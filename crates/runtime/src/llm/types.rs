//! Core chat types (provider-agnostic).
//!
//! These types represent the conversation as the orchestration loop sees it.
//! Wire formats belong in backend modules.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;

use crate::Result;
use crate::schema::FunctionTool;

/// Role of a message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A message in the conversation.
///
/// `tool_call_id` and `name` are only set on tool-role messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    /// Create a message with a role and text content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_call_id: None,
            name: None,
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a tool result message for the call `tool_call_id`.
    pub fn tool(
        tool_call_id: Option<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_call_id,
            name: Some(name.into()),
        }
    }
}

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlation id, if the model supplied one.
    pub id: Option<String>,
    /// Name of the tool to invoke.
    pub name: String,
    /// Arguments exactly as the model sent them: an object or a JSON string.
    pub arguments: Value,
}

/// The assistant side of a model turn.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantMessage {
    pub role: Role,
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl AssistantMessage {
    /// A plain text reply with no tool calls.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// A reply requesting the given tool calls.
    pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls,
        }
    }
}

/// Everything needed for one model request.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub messages: &'a [Message],
    pub tools: &'a [FunctionTool],
}

/// The response from a model.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub message: AssistantMessage,
}

/// Trait for chat model backends.
///
/// One call is one request/response exchange; implementations do not retry.
pub trait Backend: Send + Sync {
    fn chat(&self, request: ChatRequest<'_>) -> impl Future<Output = Result<ChatResponse>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_message_carries_correlation() {
        let msg = Message::tool(Some("call_1".into()), "current_date", "2026-01-26");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(msg.name.as_deref(), Some("current_date"));
    }

    #[test]
    fn plain_messages_serialize_without_tool_fields() {
        let value = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(value, json!({ "role": "user", "content": "hi" }));
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Role::Tool).unwrap(), json!("tool"));
    }
}
