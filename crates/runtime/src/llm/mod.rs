//! Chat model types and backends.

mod ollama;
mod types;

pub use ollama::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, OllamaBackend, OllamaBackendBuilder};
pub use types::{AssistantMessage, Backend, ChatRequest, ChatResponse, Message, Role, ToolCall};
