//! MCP server management (spawn, communicate, lifecycle).

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, ListToolsParams, ListToolsResult,
    RequestId, Tool,
};

/// Default timeout for MCP operations.
///
/// Tools may call a model themselves, so this is generous.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Maximum output size (1MB).
/// Sized for large tool outputs (forecasts, calendar listings).
pub const MAX_OUTPUT_SIZE: usize = 1024 * 1024;

/// Configuration for an MCP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ServerConfig {
    /// Create a config for `command` with default timeout and no extra env.
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            env: HashMap::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the command arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Handle to a running MCP server.
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    process: Mutex<Child>,
    stdin: Mutex<ChildStdin>,
    stdout: Mutex<BufReader<ChildStdout>>,
    next_id: AtomicI64,
    server_info: Mutex<Option<InitializeResult>>,
    tools: Mutex<Option<Vec<Tool>>>,
}

impl Server {
    /// Spawn a new MCP server process.
    pub async fn spawn(config: ServerConfig) -> Result<Self> {
        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args)
            .envs(&config.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut process = cmd.spawn()?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| Error::Spawn(std::io::Error::other("failed to capture stdin")))?;

        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| Error::Spawn(std::io::Error::other("failed to capture stdout")))?;

        debug!(server = %config.name, command = %config.command, "spawned MCP server");

        Ok(Self {
            config,
            process: Mutex::new(process),
            stdin: Mutex::new(stdin),
            stdout: Mutex::new(BufReader::new(stdout)),
            next_id: AtomicI64::new(1),
            server_info: Mutex::new(None),
            tools: Mutex::new(None),
        })
    }

    /// Initialize the server and discover its tools.
    ///
    /// Must be called before [`Server::call_tool`]. The tool list is fetched
    /// once here and not refreshed afterwards.
    pub async fn initialize(&self) -> Result<&Self> {
        let params = InitializeParams::default();
        let result: InitializeResult = self.request("initialize", Some(params)).await?;
        info!(
            server = %self.config.name,
            remote = %result.server_info.name,
            protocol = %result.protocol_version,
            "MCP server initialized"
        );

        self.notify("notifications/initialized").await?;
        *self.server_info.lock().await = Some(result);

        let tools = self.discover_tools().await?;
        *self.tools.lock().await = Some(tools);

        Ok(self)
    }

    /// Check if the server is initialized.
    pub async fn is_initialized(&self) -> bool {
        self.tools.lock().await.is_some()
    }

    /// Get server info (after initialization).
    pub async fn server_info(&self) -> Option<InitializeResult> {
        self.server_info.lock().await.clone()
    }

    /// Get the tools discovered during initialization.
    pub async fn tools(&self) -> Vec<Tool> {
        self.tools.lock().await.clone().unwrap_or_default()
    }

    /// Call a tool by name.
    pub async fn call_tool(&self, name: &str, arguments: Option<Value>) -> Result<CallToolResult> {
        if !self.is_initialized().await {
            return Err(Error::NotInitialized);
        }

        let params = CallToolParams {
            name: name.to_string(),
            arguments,
        };

        let result: CallToolResult = self.request("tools/call", Some(params)).await?;

        if result.is_error {
            let error_text = result.texts().collect::<Vec<_>>().join("\n");
            return Err(Error::ToolCallFailed(error_text));
        }

        Ok(result)
    }

    /// Shut down the server.
    pub async fn shutdown(self) -> Result<()> {
        let mut process = self.process.lock().await;
        // Already-exited children report an error here; nothing to do then.
        let _ = process.kill().await;
        debug!(server = %self.config.name, "MCP server stopped");
        Ok(())
    }

    // --- Internal methods ---

    async fn discover_tools(&self) -> Result<Vec<Tool>> {
        let mut tools = Vec::new();
        let mut cursor = None;
        loop {
            let params = ListToolsParams { cursor };
            let page: ListToolsResult = self.request("tools/list", Some(params)).await?;
            tools.extend(page.tools);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(tools)
    }

    fn next_request_id(&self) -> RequestId {
        RequestId::Number(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn request<P, R>(&self, method: &str, params: Option<P>) -> Result<R>
    where
        P: serde::Serialize,
        R: serde::de::DeserializeOwned,
    {
        let id = self.next_request_id();
        let mut request = JsonRpcRequest::new(id.clone(), method);
        if let Some(p) = params {
            request = request.with_params(p)?;
        }

        // Hold the reader for the whole exchange so responses can't interleave.
        let mut stdout = self.stdout.lock().await;
        self.write_line(&serde_json::to_string(&request)?).await?;

        let response = timeout(self.config.timeout, self.read_response(&mut stdout, &id))
            .await
            .map_err(|_| Error::Timeout {
                method: method.to_string(),
            })??;

        let result_value = response.into_result()?;
        let result: R = serde_json::from_value(result_value)?;

        Ok(result)
    }

    async fn notify(&self, method: &str) -> Result<()> {
        let notification = JsonRpcNotification::new(method);
        self.write_line(&serde_json::to_string(&notification)?)
            .await
    }

    async fn write_line(&self, line: &str) -> Result<()> {
        let mut stdin = self.stdin.lock().await;
        stdin.write_all(line.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        Ok(())
    }

    /// Read lines until the response for `id` arrives.
    ///
    /// Notifications and server-initiated requests may be interleaved with
    /// responses; they are answered or skipped.
    async fn read_response(
        &self,
        stdout: &mut BufReader<ChildStdout>,
        id: &RequestId,
    ) -> Result<JsonRpcResponse> {
        loop {
            // One byte past the cap is enough to tell an oversized line apart.
            let mut buf = Vec::new();
            let bytes_read = (&mut *stdout)
                .take(MAX_OUTPUT_SIZE as u64 + 1)
                .read_until(b'\n', &mut buf)
                .await?;
            if bytes_read == 0 {
                return Err(Error::ServerExited);
            }

            if buf.len() > MAX_OUTPUT_SIZE {
                return Err(Error::OutputTooLarge {
                    size: buf.len(),
                    max: MAX_OUTPUT_SIZE,
                });
            }

            let line = String::from_utf8_lossy(&buf);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let message: Value = match serde_json::from_str(line) {
                Ok(message) => message,
                Err(e) => {
                    warn!(server = %self.config.name, error = %e, "skipping non-JSON line from server");
                    continue;
                }
            };

            if let Some(method) = message.get("method").and_then(Value::as_str) {
                match message.get("id") {
                    Some(request_id) => self.answer_server_request(method, request_id).await?,
                    None => debug!(server = %self.config.name, method, "server notification"),
                }
                continue;
            }

            let response: JsonRpcResponse = serde_json::from_value(message)?;
            if &response.id != id {
                warn!(
                    server = %self.config.name,
                    expected = ?id,
                    got = ?response.id,
                    "discarding response for another request"
                );
                continue;
            }
            return Ok(response);
        }
    }

    async fn answer_server_request(&self, method: &str, request_id: &Value) -> Result<()> {
        let reply = if method == "ping" {
            serde_json::json!({ "jsonrpc": "2.0", "id": request_id, "result": {} })
        } else {
            let error = JsonRpcError {
                code: -32601,
                message: format!("method not supported by client: {method}"),
                data: None,
            };
            serde_json::json!({ "jsonrpc": "2.0", "id": request_id, "error": error })
        };
        self.write_line(&serde_json::to_string(&reply)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_builder() {
        let config = ServerConfig::new("weather", "python")
            .args(["ollama_mcp.py"])
            .timeout(Duration::from_secs(5));
        assert_eq!(config.name, "weather");
        assert_eq!(config.args, vec!["ollama_mcp.py".to_string()]);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.env.is_empty());
    }

    #[tokio::test]
    async fn spawn_missing_command_fails() {
        let config = ServerConfig::new("missing", "ferry-definitely-not-a-command");
        assert!(matches!(Server::spawn(config).await, Err(Error::Spawn(_))));
    }
}
