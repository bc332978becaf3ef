//! MCP (Model Context Protocol) client library.
//!
//! This crate provides a client for communicating with MCP servers via stdio:
//! spawn a server, discover its tools once, then call them by name.
//!
//! # Example
//!
//! ```no_run
//! use mcp::{Server, ServerConfig};
//!
//! # async fn example() -> mcp::Result<()> {
//! let config = ServerConfig::new("weather", "python").args(["ollama_mcp.py"]);
//!
//! let server = Server::spawn(config).await?;
//! server.initialize().await?;
//!
//! let tools = server.tools().await;
//! for tool in tools {
//!     println!("Tool: {}", tool.name);
//! }
//!
//! let result = server
//!     .call_tool("get_alerts", Some(serde_json::json!({ "state": "CA" })))
//!     .await?;
//! for text in result.texts() {
//!     println!("{text}");
//! }
//!
//! server.shutdown().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod protocol;
mod server;

pub use error::{Error, Result};
pub use protocol::{
    CallToolParams, CallToolResult, ContentPart, InitializeParams, InitializeResult,
    JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, ListToolsResult,
    PROTOCOL_VERSION, RequestId, ResourceContents, ServerCapabilities, ServerInfo, Tool,
    ToolContent,
};
pub use server::{DEFAULT_TIMEOUT, MAX_OUTPUT_SIZE, Server, ServerConfig};
