//! Tool discovery and execution.

mod empty;
pub mod errors;
mod host;
mod mcp_host;
mod types;

pub use empty::EmptyToolHost;
pub use errors::ToolError;
pub use host::ToolHost;
pub use mcp_host::McpToolHost;
pub use types::{RAW_ARGUMENTS_KEY, ToolArguments, ToolOutput, ToolSpec};
