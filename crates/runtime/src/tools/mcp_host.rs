//! MCP-backed tool host.

use mcp::{Server, ServerConfig};
use serde_json::Value;
use tracing::{info, warn};

use super::{ToolArguments, ToolError, ToolHost, ToolOutput, ToolSpec};
use crate::{Error, Result};

/// Tool host backed by a single MCP server.
///
/// Tools are discovered once in [`McpToolHost::connect`] and never refreshed.
pub struct McpToolHost {
    server: Server,
    specs: Vec<ToolSpec>,
}

impl McpToolHost {
    /// Spawn the server, initialize it and cache its tool specs.
    pub async fn connect(config: ServerConfig) -> Result<Self> {
        let name = config.name.clone();
        let server = Server::spawn(config)
            .await
            .map_err(|e| Error::Discovery(format!("failed to spawn MCP server {name}: {e}")))?;

        server
            .initialize()
            .await
            .map_err(|e| Error::Discovery(format!("failed to initialize MCP server {name}: {e}")))?;

        let specs: Vec<ToolSpec> = server.tools().await.iter().map(ToolSpec::from).collect();
        info!(server = %name, count = specs.len(), "discovered tools");

        Ok(Self { server, specs })
    }

    /// Shutdown the server process.
    pub async fn shutdown(self) {
        if let Err(e) = self.server.shutdown().await {
            warn!(error = %e, "failed to stop MCP server");
        }
    }
}

impl ToolHost for McpToolHost {
    fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    async fn invoke(&self, name: &str, arguments: ToolArguments) -> Result<ToolOutput, ToolError> {
        let arguments = Value::Object(arguments.into_inner());
        self.server
            .call_tool(name, Some(arguments))
            .await
            .map(ToolOutput::Mcp)
            .map_err(|e| ToolError::Execution {
                name: name.to_string(),
                message: e.to_string(),
            })
    }
}
