//! MCP server setup and lifecycle.
//!
//! Implements a JSON-RPC based MCP server over newline-delimited stdio.
//!
//! Every request runs in its own task and responses are written by a single
//! writer task, so a slow Confluence call never blocks `ping` or a
//! cancellation. `notifications/cancelled` aborts the matching in-flight
//! task, which drops its HTTP request.
//!
//! ## Claude Desktop Configuration
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "confluence": {
//!       "command": "confluence-mcp",
//!       "args": ["serve"],
//!       "env": {
//!         "CONFLUENCE_BASE_URL": "https://wiki.example.com",
//!         "CONFLUENCE_API_TOKEN": "..."
//!       }
//!     }
//!   }
//! }
//! ```

use super::dispatch::McpMethod;
use crate::mcp::ToolRegistry;
use crate::observability::{RequestContext, scope_request_context};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinSet};
use tracing::{Instrument, info_span};

/// Maximum request size (1MB).
pub const MAX_REQUEST_BODY_SIZE: usize = 1024 * 1024;

/// MCP protocol version.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name.
pub const SERVER_NAME: &str = "confluence-mcp";

/// In-flight requests keyed by their serialized JSON-RPC id.
type InFlight = Arc<Mutex<HashMap<String, AbortHandle>>>;

/// MCP server for Confluence.
pub struct McpServer {
    /// Tool registry.
    tools: Arc<ToolRegistry>,
}

impl McpServer {
    /// Creates a new MCP server.
    #[must_use]
    pub fn new(tools: ToolRegistry) -> Self {
        Self {
            tools: Arc::new(tools),
        }
    }

    /// Runs the server over stdin/stdout until stdin closes.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin cannot be read or stdout cannot be written.
    pub async fn run_stdio(&self) -> Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        self.serve(reader, tokio::io::stdout()).await
    }

    /// Runs the server over an arbitrary line-oriented stream.
    ///
    /// Returns once the reader is exhausted and every in-flight request has
    /// been answered.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing fails.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let writer_task = tokio::spawn(write_responses(writer, rx));
        let in_flight: InFlight = Arc::new(Mutex::new(HashMap::new()));
        let mut tasks = JoinSet::new();

        let mut lines = reader.lines();
        let read_result = loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break Ok(()),
                Err(e) => {
                    break Err(Error::OperationFailed {
                        operation: "read_stdin".to_string(),
                        cause: e.to_string(),
                    });
                },
            };

            if line.trim().is_empty() {
                continue;
            }

            self.accept(&line, &tx, &in_flight, &mut tasks);
            while tasks.try_join_next().is_some() {}
        };

        while tasks.join_next().await.is_some() {}
        drop(tx);

        let write_result = writer_task.await.map_err(|e| Error::OperationFailed {
            operation: "write_stdout".to_string(),
            cause: e.to_string(),
        })?;

        read_result?;
        write_result
    }

    /// Routes one incoming line: errors and notifications are handled
    /// inline, requests are spawned.
    fn accept(
        &self,
        line: &str,
        tx: &mpsc::UnboundedSender<String>,
        in_flight: &InFlight,
        tasks: &mut JoinSet<()>,
    ) {
        let request = match parse_request(line) {
            Ok(request) => request,
            Err(response) => {
                let _ = tx.send(response);
                return;
            },
        };

        let Some(id) = request.id.clone().filter(|_| !is_notification(&request)) else {
            handle_notification(&request, in_flight);
            return;
        };

        let key = id.to_string();
        let tools = Arc::clone(&self.tools);
        let tx = tx.clone();
        let registry = Arc::clone(in_flight);
        let task_key = key.clone();

        let mut guard = in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        let handle = tasks.spawn(async move {
            let response = handle_parsed(&tools, request).await;
            registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&task_key);
            let _ = tx.send(response);
        });
        guard.insert(key, handle);
    }

    /// Handles a single JSON-RPC line and returns the response, if any.
    ///
    /// Requests are handled to completion in the calling task; cancellation
    /// only applies under [`Self::serve`].
    pub async fn handle_request(&self, line: &str) -> Option<String> {
        let request = match parse_request(line) {
            Ok(request) => request,
            Err(response) => return Some(response),
        };
        if is_notification(&request) {
            tracing::debug!(method = %request.method, "Ignoring notification");
            return None;
        }
        Some(handle_parsed(&self.tools, request).await)
    }
}

/// Parses a line into a request, or returns the error response to send.
fn parse_request(line: &str) -> std::result::Result<JsonRpcRequest, String> {
    if line.len() > MAX_REQUEST_BODY_SIZE {
        tracing::warn!(
            request_size = line.len(),
            max_size = MAX_REQUEST_BODY_SIZE,
            "Request exceeds maximum size limit"
        );
        record_request("oversized", "error");
        return Err(format_error(
            None,
            -32600,
            &format!(
                "Request too large: {} bytes (max: {MAX_REQUEST_BODY_SIZE} bytes)",
                line.len()
            ),
        ));
    }

    serde_json::from_str(line).map_err(|e| {
        record_request("parse_error", "error");
        format_error(None, -32700, &format!("Parse error: {e}"))
    })
}

/// A message without an id, or one naming a notification method, is never
/// answered.
fn is_notification(request: &JsonRpcRequest) -> bool {
    request.id.is_none() || McpMethod::from(request.method.as_str()).is_notification()
}

/// Handles a notification. Never produces a response.
fn handle_notification(request: &JsonRpcRequest, in_flight: &InFlight) {
    match McpMethod::from(request.method.as_str()) {
        McpMethod::Cancelled => {
            let Some(key) = request
                .params
                .as_ref()
                .and_then(|p| p.get("requestId"))
                .map(Value::to_string)
            else {
                return;
            };
            let handle = in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&key);
            if let Some(handle) = handle {
                handle.abort();
                tracing::info!(rpc.id = %key, "Cancelled in-flight request");
                metrics::counter!("mcp_requests_cancelled_total").increment(1);
            }
        },
        method => tracing::debug!(method = %method, "Received notification"),
    }
}

/// Dispatches a parsed request and formats its response.
async fn handle_parsed(tools: &ToolRegistry, request: JsonRpcRequest) -> String {
    let start = Instant::now();
    let context = RequestContext::new();
    let span = info_span!(
        "mcp.request",
        rpc.method = %request.method,
        rpc.id = tracing::field::Empty,
        request_id = %context.request_id(),
        status = tracing::field::Empty
    );
    if let Some(id) = &request.id {
        span.record("rpc.id", id.to_string().as_str());
    }

    let method = McpMethod::from(request.method.as_str());
    let method_label = if method.is_known() {
        method.as_str().to_string()
    } else {
        "unknown".to_string()
    };
    let id = request.id;
    let result = scope_request_context(
        context,
        dispatch_method(tools, method, request.params),
    )
    .instrument(span.clone())
    .await;

    let status_label = if result.is_ok() { "success" } else { "error" };
    span.record("status", status_label);
    tracing::debug!(
        parent: &span,
        method = %method_label,
        status = status_label,
        elapsed_ms = start.elapsed().as_millis(),
        "Processed MCP request"
    );
    record_request(&method_label, status_label);
    metrics::histogram!("mcp_request_duration_ms", "method" => method_label)
        .record(start.elapsed().as_secs_f64() * 1000.0);

    format_response(id, result)
}

fn record_request(method: &str, status: &'static str) {
    metrics::counter!(
        "mcp_requests_total",
        "method" => method.to_string(),
        "status" => status
    )
    .increment(1);
}

/// Dispatches a method call.
async fn dispatch_method(
    tools: &ToolRegistry,
    method: McpMethod,
    params: Option<Value>,
) -> DispatchResult {
    match method {
        McpMethod::Initialize => Ok(handle_initialize()),
        McpMethod::ListTools => Ok(handle_list_tools(tools)),
        McpMethod::CallTool => handle_call_tool(tools, params).await,
        McpMethod::Ping => Ok(serde_json::json!({})),
        method @ (McpMethod::Initialized | McpMethod::Cancelled | McpMethod::Unknown(_)) => {
            Err((-32601, format!("Method not found: {method}")))
        },
    }
}

/// Handles the initialize method.
fn handle_initialize() -> Value {
    serde_json::json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

/// Handles tools/list.
fn handle_list_tools(tools: &ToolRegistry) -> Value {
    let tools: Vec<Value> = tools
        .list_tools()
        .iter()
        .map(|t| {
            serde_json::json!({
                "name": t.name,
                "description": t.description,
                "inputSchema": t.input_schema
            })
        })
        .collect();

    serde_json::json!({ "tools": tools })
}

/// Handles tools/call. Tool failures become `isError` results, never
/// JSON-RPC errors.
async fn handle_call_tool(tools: &ToolRegistry, params: Option<Value>) -> DispatchResult {
    let mut params = params.ok_or((-32602, "Missing params".to_string()))?;

    let name = params
        .get("name")
        .and_then(Value::as_str)
        .ok_or((-32602, "Missing tool name".to_string()))?
        .to_string();
    let arguments = params.get_mut("arguments").map(Value::take);

    let span = info_span!("mcp.tool.call", tool.name = name.as_str());
    let start = Instant::now();

    let result = tools.call(&name, arguments).instrument(span).await;
    let status_label = if result.is_error { "error" } else { "success" };

    metrics::counter!(
        "mcp_tool_calls_total",
        "tool" => name.clone(),
        "status" => status_label
    )
    .increment(1);
    if result.is_error {
        metrics::counter!("mcp_tool_errors_total", "tool" => name.clone()).increment(1);
    }
    metrics::histogram!(
        "mcp_tool_duration_ms",
        "tool" => name,
        "status" => status_label
    )
    .record(start.elapsed().as_secs_f64() * 1000.0);

    Ok(serde_json::json!({
        "content": result.content,
        "isError": result.is_error
    }))
}

/// Drains the response channel into the writer, one message per line.
async fn write_responses<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<String>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let written: std::io::Result<()> = async {
            writer.write_all(response.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await
        }
        .await;
        written.map_err(|e| Error::OperationFailed {
            operation: "write_stdout".to_string(),
            cause: e.to_string(),
        })?;
    }
    Ok(())
}

/// Formats a response.
fn format_response(id: Option<Value>, result: DispatchResult) -> String {
    match result {
        Ok(value) => {
            let response = JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                id,
                result: Some(value),
                error: None,
            };
            serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string())
        },
        Err((code, message)) => format_error(id, code, &message),
    }
}

/// Formats an error response.
fn format_error(id: Option<Value>, code: i32, message: &str) -> String {
    let response = JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        id,
        result: None,
        error: Some(JsonRpcError {
            code,
            message: message.to_string(),
            data: None,
        }),
    };
    serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string())
}

/// Result type for method dispatch.
type DispatchResult = std::result::Result<Value, (i32, String)>;

/// JSON-RPC request.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    /// JSON-RPC version (required by protocol but not used in code).
    #[serde(rename = "jsonrpc", default)]
    _jsonrpc: String,
    id: Option<Value>,
    method: String,
    params: Option<Value>,
}

/// JSON-RPC response.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}
