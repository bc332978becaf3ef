//! Ollama chat backend (`POST /api/chat`).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use super::{AssistantMessage, Backend, ChatRequest, ChatResponse, Message, Role, ToolCall};
use crate::schema::FunctionTool;
use crate::{Error, Result};

/// Default Ollama endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default request timeout. Local inference can be slow.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

// How much of the outgoing payload to log.
const PAYLOAD_LOG_CHARS: usize = 500;

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    tools: &'a [FunctionTool],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<&'a Value>,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: Role,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

impl<'a> From<&'a Message> for ApiMessage<'a> {
    fn from(m: &'a Message) -> Self {
        Self {
            role: m.role,
            content: &m.content,
            tool_call_id: m.tool_call_id.as_deref(),
            name: m.name.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    message: Option<ApiResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    role: Option<Role>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ApiToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ApiToolCall {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<ApiFunction>,
}

#[derive(Debug, Deserialize)]
struct ApiFunction {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Value,
}

impl From<ApiToolCall> for ToolCall {
    fn from(call: ApiToolCall) -> Self {
        let (name, arguments) = match call.function {
            Some(f) => (f.name.unwrap_or_default(), f.arguments),
            None => (String::new(), Value::Null),
        };
        Self {
            id: call.id,
            name,
            arguments,
        }
    }
}

impl From<ApiResponse> for ChatResponse {
    fn from(response: ApiResponse) -> Self {
        let Some(message) = response.message else {
            return ChatResponse {
                message: AssistantMessage::text(""),
            };
        };
        ChatResponse {
            message: AssistantMessage {
                role: message.role.unwrap_or(Role::Assistant),
                content: message.content.unwrap_or_default(),
                tool_calls: message
                    .tool_calls
                    .unwrap_or_default()
                    .into_iter()
                    .map(ToolCall::from)
                    .collect(),
            },
        }
    }
}

/// Builder for creating an Ollama backend.
#[derive(Debug, Clone)]
pub struct OllamaBackendBuilder {
    model: String,
    base_url: String,
    timeout: Duration,
    options: Option<Value>,
}

impl OllamaBackendBuilder {
    /// Create a new builder for `model` with default endpoint and timeout.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            options: None,
        }
    }

    /// Set the server base URL (without the `/api/chat` path).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set model options (temperature, num_ctx, ...), passed through as-is.
    pub fn options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }

    /// Build the backend.
    pub fn build(self) -> Result<OllamaBackend> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::Config(format!("http client: {e}")))?;

        let chat_url = format!("{}/api/chat", self.base_url.trim_end_matches('/'));

        Ok(OllamaBackend {
            client,
            chat_url,
            model: self.model,
            options: self.options,
        })
    }
}

/// Ollama chat backend.
pub struct OllamaBackend {
    client: reqwest::Client,
    chat_url: String,
    model: String,
    options: Option<Value>,
}

impl OllamaBackend {
    /// Create a builder for the Ollama backend.
    pub fn builder(model: impl Into<String>) -> OllamaBackendBuilder {
        OllamaBackendBuilder::new(model)
    }

    /// The model identifier sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Display for OllamaBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ollama({}, {})", self.model, self.chat_url)
    }
}

impl Backend for OllamaBackend {
    async fn chat(&self, request: ChatRequest<'_>) -> Result<ChatResponse> {
        let api_request = ApiRequest {
            model: &self.model,
            messages: request.messages.iter().map(ApiMessage::from).collect(),
            tools: request.tools,
            stream: false,
            options: self.options.as_ref(),
        };

        if tracing::enabled!(tracing::Level::DEBUG) {
            let payload = serde_json::to_string(&api_request).unwrap_or_default();
            let preview: String = payload.chars().take(PAYLOAD_LOG_CHARS).collect();
            debug!(payload = %preview, "ollama request");
        }

        let response = self
            .client
            .post(&self.chat_url)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, url = %self.chat_url, "ollama request failed");
                Error::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "ollama returned an error status");
            return Err(Error::Api(format!("{status}: {body}")));
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "could not decode ollama response");
            Error::InvalidResponse(e.to_string())
        })?;

        Ok(api_response.into())
    }
}
