//! Ferry runtime — the tool-calling loop between a chat model and an MCP
//! tool server.
//!
//! # Overview
//!
//! - **Session**: owns the conversation and drives each user turn, calling
//!   the model and running the tools it requests until it answers.
//! - **Backend**: a trait abstracting the chat endpoint (Ollama today).
//! - **ToolHost**: a trait abstracting tool discovery and invocation
//!   (an MCP server over stdio today).
//! - **schema** / **normalize**: conversions between MCP shapes and what
//!   the model sees.
//!
//! # Example
//!
//! ```ignore
//! use runtime::{McpToolHost, OllamaBackend, Session, SessionConfig};
//! use mcp::ServerConfig;
//!
//! # async fn example() -> runtime::Result<()> {
//! let backend = OllamaBackend::builder("llama3.1:8b").build()?;
//! let host = McpToolHost::connect(ServerConfig::new("weather", "python").args(["ollama_mcp.py"])).await?;
//!
//! let mut session = Session::new(backend, host, SessionConfig::default());
//! let turn = session.chat("Any weather alerts in CA?").await?;
//! println!("{}", turn.outcome);
//! # Ok(())
//! # }
//! ```

mod conversation;
mod error;
pub mod llm;
pub mod normalize;
pub mod schema;
mod session;
pub mod tools;

pub use conversation::Conversation;
pub use error::{Error, Result};
pub use llm::{
    AssistantMessage, Backend, ChatRequest, ChatResponse, Message, OllamaBackend, Role, ToolCall,
};
pub use normalize::result_to_text;
pub use schema::{FunctionTool, ToolDescriptor, translate};
pub use session::{
    DEFAULT_MAX_ITERATIONS, LOOP_LIMIT_NOTICE, NO_CONTENT, Session, SessionConfig, Turn,
    TurnOutcome, UserInput,
};
pub use tools::{
    EmptyToolHost, McpToolHost, ToolArguments, ToolError, ToolHost, ToolOutput, ToolSpec,
};
