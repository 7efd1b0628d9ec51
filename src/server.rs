//! JSON-RPC 2.0 over stdin/stdout, newline-delimited, speaking the MCP
//! `initialize` / `tools/list` / `tools/call` surface to a single client.
//!
//! Every `tools/call` runs as its own task, so a slow network round trip
//! never blocks the read loop; completions may reorder relative to
//! submission. Tool failures never become protocol errors: any handler
//! failure, unknown tool, or empty remote result collapses to `{}` with a
//! diagnostic on stderr. Downstream callers depend on that uniform shape,
//! so it is preserved even though it hides the failure cause.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::tools::ToolRegistry;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const PARSE_ERROR: i64 = -32700;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    // Omitting `arguments` is a legal call shape; handlers expect an
    // object, never null.
    #[serde(default = "empty_object")]
    arguments: Value,
}

fn empty_object() -> Value {
    json!({})
}

fn response(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message }
    })
}

/// Run one tool and normalize the outcome to the MCP result shape. A
/// failure, an unknown tool, or a null remote body all yield `{}`.
async fn call_tool(registry: &ToolRegistry, name: &str, arguments: &Value) -> Value {
    info!(tool = name, args = %arguments, "tool invocation");

    let result = match registry.execute(name, arguments).await {
        Ok(v) if v.is_null() => {
            warn!(tool = name, "remote returned no result");
            json!({})
        }
        Ok(v) => {
            info!(tool = name, "tool invocation succeeded");
            v
        }
        Err(e) => {
            warn!(tool = name, error = %e, "tool invocation failed");
            json!({})
        }
    };

    json!({
        "content": [{ "type": "text", "text": result.to_string() }],
        "isError": false
    })
}

/// Handle one request. Returns `None` for notifications (no id), which
/// never get a response.
pub async fn handle_request(registry: &ToolRegistry, req: JsonRpcRequest) -> Option<Value> {
    let Some(id) = req.id else {
        debug!(method = %req.method, "notification");
        return None;
    };

    let resp = match req.method.as_str() {
        "initialize" => response(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        ),
        "tools/list" => response(id, json!({ "tools": registry.schemas() })),
        "tools/call" => match serde_json::from_value::<CallParams>(req.params) {
            Ok(call) => {
                // An explicit `"arguments": null` bypasses the serde
                // default; treat it like an omitted member.
                let arguments = if call.arguments.is_null() {
                    empty_object()
                } else {
                    call.arguments
                };
                let result = call_tool(registry, &call.name, &arguments).await;
                response(id, result)
            }
            Err(e) => error_response(id, INVALID_PARAMS, &format!("invalid params: {e}")),
        },
        other => error_response(id, METHOD_NOT_FOUND, &format!("method not found: {other}")),
    };

    Some(resp)
}

/// Serve the registry over stdin/stdout until stdin closes.
pub async fn serve_stdio(registry: ToolRegistry) -> anyhow::Result<()> {
    let registry = Arc::new(registry);

    // All responses funnel through one writer task so concurrently
    // completing calls never interleave bytes on stdout.
    let (tx, mut rx) = mpsc::channel::<String>(64);
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = rx.recv().await {
            if stdout.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if stdout.write_all(b"\n").await.is_err() {
                break;
            }
            let _ = stdout.flush().await;
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let req: JsonRpcRequest = match serde_json::from_str(&line) {
            Ok(req) => req,
            Err(e) => {
                warn!(error = %e, "unparseable request line");
                let resp = error_response(Value::Null, PARSE_ERROR, "parse error");
                let _ = tx.send(resp.to_string()).await;
                continue;
            }
        };

        let registry = registry.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Some(resp) = handle_request(&registry, req).await {
                let _ = tx.send(resp.to_string()).await;
            }
        });
    }

    drop(tx);
    writer.await.ok();
    info!("stdin closed, shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::tools::ToolHandler;

    struct StaticHandler(Value);

    #[async_trait]
    impl ToolHandler for StaticHandler {
        async fn call(&self, _input: &Value) -> Result<Value, String> {
            Ok(self.0.clone())
        }
    }

    struct FailingHandler;

    #[async_trait]
    impl ToolHandler for FailingHandler {
        async fn call(&self, _input: &Value) -> Result<Value, String> {
            Err("network down".into())
        }
    }

    struct EchoArgsHandler;

    #[async_trait]
    impl ToolHandler for EchoArgsHandler {
        async fn call(&self, input: &Value) -> Result<Value, String> {
            Ok(json!({ "received": input.clone() }))
        }
    }

    fn test_registry() -> ToolRegistry {
        ToolRegistry::new()
            .add(
                "status",
                json!({"name": "status", "description": "d", "inputSchema": {"type": "object"}}),
                StaticHandler(json!({"template_name": "rk_lines", "status": "APPROVED"})),
            )
            .add(
                "nothing",
                json!({"name": "nothing", "description": "d", "inputSchema": {"type": "object"}}),
                StaticHandler(Value::Null),
            )
            .add(
                "broken",
                json!({"name": "broken", "description": "d", "inputSchema": {"type": "object"}}),
                FailingHandler,
            )
            .add(
                "echo_args",
                json!({"name": "echo_args", "description": "d", "inputSchema": {"type": "object"}}),
                EchoArgsHandler,
            )
    }

    fn request(body: Value) -> JsonRpcRequest {
        serde_json::from_value(body).unwrap()
    }

    /// Parse the JSON object back out of the MCP text content block.
    fn tool_result(resp: &Value) -> Value {
        let text = resp["result"]["content"][0]["text"].as_str().unwrap();
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn initialize_reports_tools_capability() {
        let reg = test_registry();
        let resp = handle_request(&reg, request(json!({"method": "initialize", "id": 1})))
            .await
            .unwrap();

        assert_eq!(resp["id"], 1);
        assert_eq!(resp["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert!(resp["result"]["capabilities"]["tools"].is_object());
        assert_eq!(resp["result"]["serverInfo"]["name"], "whatsapp-mcp");
    }

    #[tokio::test]
    async fn tools_list_returns_schemas() {
        let reg = test_registry();
        let resp = handle_request(&reg, request(json!({"method": "tools/list", "id": 2})))
            .await
            .unwrap();

        let tools = resp["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 4);
        assert_eq!(tools[0]["name"], "status");
        assert!(tools[0]["inputSchema"].is_object());
    }

    #[tokio::test]
    async fn successful_call_passes_result_through() {
        let reg = test_registry();
        let resp = handle_request(
            &reg,
            request(json!({
                "method": "tools/call",
                "id": 3,
                "params": {"name": "status", "arguments": {"template_name": "rk_lines"}}
            })),
        )
        .await
        .unwrap();

        assert_eq!(resp["result"]["isError"], false);
        assert_eq!(
            tool_result(&resp),
            json!({"template_name": "rk_lines", "status": "APPROVED"})
        );
    }

    #[tokio::test]
    async fn failed_call_collapses_to_empty_object() {
        let reg = test_registry();
        let resp = handle_request(
            &reg,
            request(json!({
                "method": "tools/call",
                "id": 4,
                "params": {"name": "broken", "arguments": {}}
            })),
        )
        .await
        .unwrap();

        assert_eq!(tool_result(&resp), json!({}));
        assert!(resp.get("error").is_none(), "tool failures are not protocol errors");
    }

    #[tokio::test]
    async fn null_result_collapses_to_empty_object() {
        let reg = test_registry();
        let resp = handle_request(
            &reg,
            request(json!({
                "method": "tools/call",
                "id": 5,
                "params": {"name": "nothing", "arguments": {}}
            })),
        )
        .await
        .unwrap();

        assert_eq!(tool_result(&resp), json!({}));
    }

    #[tokio::test]
    async fn unknown_tool_collapses_to_empty_object() {
        let reg = test_registry();
        let resp = handle_request(
            &reg,
            request(json!({
                "method": "tools/call",
                "id": 6,
                "params": {"name": "no_such_tool", "arguments": {}}
            })),
        )
        .await
        .unwrap();

        assert_eq!(tool_result(&resp), json!({}));
    }

    #[tokio::test]
    async fn unknown_method_is_a_protocol_error() {
        let reg = test_registry();
        let resp = handle_request(&reg, request(json!({"method": "resources/list", "id": 7})))
            .await
            .unwrap();

        assert_eq!(resp["error"]["code"], METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let reg = test_registry();
        let resp = handle_request(
            &reg,
            request(json!({"method": "notifications/initialized"})),
        )
        .await;

        assert!(resp.is_none());
    }

    #[tokio::test]
    async fn omitted_arguments_member_reaches_handler_as_empty_object() {
        let reg = test_registry();
        let resp = handle_request(
            &reg,
            request(json!({
                "method": "tools/call",
                "id": 9,
                "params": {"name": "echo_args"}
            })),
        )
        .await
        .unwrap();

        assert_eq!(tool_result(&resp), json!({"received": {}}));
    }

    #[tokio::test]
    async fn explicit_null_arguments_reach_handler_as_empty_object() {
        let reg = test_registry();
        let resp = handle_request(
            &reg,
            request(json!({
                "method": "tools/call",
                "id": 10,
                "params": {"name": "echo_args", "arguments": null}
            })),
        )
        .await
        .unwrap();

        assert_eq!(tool_result(&resp), json!({"received": {}}));
    }

    #[tokio::test]
    async fn malformed_call_params_is_invalid_params() {
        let reg = test_registry();
        let resp = handle_request(
            &reg,
            request(json!({
                "method": "tools/call",
                "id": 8,
                "params": {"arguments": {}}
            })),
        )
        .await
        .unwrap();

        assert_eq!(resp["error"]["code"], INVALID_PARAMS);
    }
}
