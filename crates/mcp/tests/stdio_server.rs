//! Exercises the stdio client against scripted `sh` servers.

use std::time::Duration;

use mcp::{Error, Server, ServerConfig};
use serde_json::json;

fn scripted(script: &str) -> ServerConfig {
    ServerConfig::new("scripted", "sh")
        .args(["-c", script])
        .timeout(Duration::from_secs(5))
}

const INIT_RESPONSE: &str = r#"{"jsonrpc":"2.0","id":1,"result":{"protocolVersion":"2025-06-18","capabilities":{"tools":{}},"serverInfo":{"name":"fake","version":"0.0.1"}}}"#;

fn weather_server() -> String {
    format!(
        r#"
read -r line
echo '{{"jsonrpc":"2.0","method":"notifications/message","params":{{"level":"info","data":"booting"}}}}'
echo '{INIT_RESPONSE}'
read -r line
read -r line
echo '{{"jsonrpc":"2.0","id":2,"result":{{"tools":[{{"name":"current_date","description":"Today"}}],"nextCursor":"p2"}}}}'
read -r line
echo '{{"jsonrpc":"2.0","id":3,"result":{{"tools":[{{"name":"get_alerts","inputSchema":{{"type":"object"}}}}]}}}}'
read -r line
case "$line" in
  *'"state":"CA"'*) echo '{{"jsonrpc":"2.0","id":4,"result":{{"content":[{{"type":"text","text":"No active alerts for this state."}}]}}}}' ;;
  *) echo '{{"jsonrpc":"2.0","id":4,"error":{{"code":-32602,"message":"bad arguments"}}}}' ;;
esac
read -r line
echo '{{"jsonrpc":"2.0","id":5,"result":{{"content":[{{"type":"text","text":"unknown state"}}],"isError":true}}}}'
read -r line
"#
    )
}

#[tokio::test]
async fn discovers_tools_across_pages() {
    let server = Server::spawn(scripted(&weather_server())).await.unwrap();
    assert!(!server.is_initialized().await);

    server.initialize().await.unwrap();
    assert!(server.is_initialized().await);

    let info = server.server_info().await.unwrap();
    assert_eq!(info.server_info.name, "fake");

    let names: Vec<_> = server.tools().await.into_iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["current_date", "get_alerts"]);
}

#[tokio::test]
async fn calls_tool_and_surfaces_tool_errors() {
    let server = Server::spawn(scripted(&weather_server())).await.unwrap();
    server.initialize().await.unwrap();

    let result = server
        .call_tool("get_alerts", Some(json!({ "state": "CA" })))
        .await
        .unwrap();
    assert_eq!(
        result.texts().collect::<Vec<_>>(),
        vec!["No active alerts for this state."]
    );

    let err = server
        .call_tool("get_alerts", Some(json!({ "state": "ZZ" })))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ToolCallFailed(ref text) if text == "unknown state"));

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn call_before_initialize_is_rejected() {
    let server = Server::spawn(scripted(&weather_server())).await.unwrap();
    let err = server.call_tool("current_date", None).await.unwrap_err();
    assert!(matches!(err, Error::NotInitialized));
}

#[tokio::test]
async fn answers_ping_while_waiting() {
    let script = format!(
        r#"
read -r line
echo '{{"jsonrpc":"2.0","id":"srv-1","method":"ping"}}'
read -r reply
case "$reply" in
  *'"id":"srv-1"'*) echo '{INIT_RESPONSE}' ;;
  *) exit 1 ;;
esac
read -r line
read -r line
echo '{{"jsonrpc":"2.0","id":2,"result":{{"tools":[]}}}}'
read -r line
"#
    );
    let server = Server::spawn(scripted(&script)).await.unwrap();
    server.initialize().await.unwrap();
    assert!(server.tools().await.is_empty());
}

#[tokio::test]
async fn reports_server_exit() {
    let server = Server::spawn(scripted("read -r line; exit 0")).await.unwrap();
    let err = server.initialize().await.unwrap_err();
    assert!(matches!(err, Error::ServerExited));
}

#[tokio::test]
async fn times_out_on_silent_server() {
    let config = scripted("read -r line; sleep 5").timeout(Duration::from_millis(200));
    let server = Server::spawn(config).await.unwrap();
    let err = server.initialize().await.unwrap_err();
    assert!(matches!(err, Error::Timeout { ref method } if method == "initialize"));
}

#[tokio::test]
async fn oversized_line_is_rejected_without_waiting_for_newline() {
    // No newline follows, so only a bounded read can return before the timeout.
    let script = format!(
        "read -r line; head -c {} /dev/zero | tr '\\0' x; sleep 5",
        mcp::MAX_OUTPUT_SIZE + 1024
    );
    let config = scripted(&script).timeout(Duration::from_secs(3));
    let server = Server::spawn(config).await.unwrap();
    let err = server.initialize().await.unwrap_err();
    assert!(matches!(
        err,
        Error::OutputTooLarge { max, .. } if max == mcp::MAX_OUTPUT_SIZE
    ));
}
