use anyhow::Context;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::tools::{definitions, ToolError, ToolOutput, TransferTools};

use super::protocol::{
    CallToolParams, CallToolResult, InitializeParams, Request, RequestId, Response, RpcError,
    JSONRPC_VERSION,
};

/// Protocol revision answered when the client does not ask for one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// MCP server exposing the transfer tools over newline-delimited JSON-RPC.
///
/// Requests are handled concurrently; responses may therefore arrive out of order and are
/// matched by id on the client side.
#[derive(Clone)]
pub struct McpServer {
    tools: TransferTools,
}

impl McpServer {
    pub fn new(tools: TransferTools) -> Self {
        Self { tools }
    }

    /// Read messages until `reader` is exhausted, writing one response line per request.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        self.serve_until(reader, writer, std::future::pending::<()>()).await
    }

    /// Like [`serve`](Self::serve), but stops reading once `shutdown` completes.
    ///
    /// Requests already read are always finished and answered before this returns. Reading
    /// also stops as soon as responses can no longer be written.
    pub async fn serve_until<R, W, S>(&self, reader: R, writer: W, shutdown: S) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
        S: Future<Output = ()>,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let writer_task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(line) = rx.recv().await {
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            Ok::<_, std::io::Error>(())
        });

        let mut lines = reader.lines();
        let mut in_flight = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            let line = tokio::select! {
                line = lines.next_line() => line.context("Failed to read request")?,
                () = &mut shutdown => {
                    tracing::info!("shutdown requested, no longer reading requests");
                    break;
                }
            };
            let Some(line) = line else {
                tracing::info!("input closed, finishing in-flight requests");
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            if writer_task.is_finished() {
                tracing::error!("response writer stopped, no longer reading requests");
                break;
            }

            let server = self.clone();
            let tx = tx.clone();
            in_flight.spawn(async move {
                if let Some(response) = server.handle_line(&line).await {
                    if tx.send(response).is_err() {
                        tracing::error!("response writer stopped, dropping response");
                    }
                }
            });

            while in_flight.try_join_next().is_some() {}
        }

        while in_flight.join_next().await.is_some() {}

        drop(tx);
        writer_task
            .await
            .context("Response writer panicked")?
            .context("Failed to write response")?;
        Ok(())
    }

    /// Handle one raw message. Returns the serialized response, or `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let response = match serde_json::from_str::<Value>(line) {
            Ok(value) => self.handle_value(value).await?,
            Err(err) => {
                tracing::warn!("unparseable message: {err}");
                Response::failure(None, RpcError::parse_error(err))
            }
        };

        match serde_json::to_string(&response) {
            Ok(encoded) => Some(encoded),
            Err(err) => {
                tracing::error!("failed to encode response: {err}");
                None
            }
        }
    }

    async fn handle_value(&self, value: Value) -> Option<Response> {
        let request: Request = match serde_json::from_value(value.clone()) {
            Ok(request) => request,
            Err(err) => {
                let id = value
                    .get("id")
                    .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());
                return Some(Response::failure(id, RpcError::invalid_request(err)));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(Response::failure(
                request.id,
                RpcError::invalid_request(format!("unsupported jsonrpc version {}", request.jsonrpc)),
            ));
        }

        match request.id {
            Some(id) => Some(self.handle_request(id, &request.method, request.params).await),
            None => {
                tracing::debug!(method = %request.method, "notification received");
                None
            }
        }
    }

    async fn handle_request(&self, id: RequestId, method: &str, params: Value) -> Response {
        tracing::debug!(%id, method, "request received");

        let result = match method {
            "initialize" => Ok(self.initialize(params)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": definitions() })),
            "tools/call" => self.call_tool(params).await,
            other => Err(RpcError::method_not_found(other)),
        };

        match result {
            Ok(result) => Response::success(id, result),
            Err(error) => Response::failure(Some(id), error),
        }
    }

    fn initialize(&self, params: Value) -> Value {
        let params: InitializeParams = serde_json::from_value(params).unwrap_or_default();
        let protocol_version = params
            .protocol_version
            .unwrap_or_else(|| DEFAULT_PROTOCOL_VERSION.to_string());

        tracing::info!(%protocol_version, "client initialized");
        json!({
            "protocolVersion": protocol_version,
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
        })
    }

    async fn call_tool(&self, params: Value) -> Result<Value, RpcError> {
        let params: CallToolParams =
            serde_json::from_value(params).map_err(RpcError::invalid_params)?;

        let result = match self.tools.call(&params.name, params.arguments).await {
            Ok(ToolOutput::Json(text)) => CallToolResult::text(text),
            Ok(ToolOutput::Empty) => CallToolResult::empty(),
            Err(ToolError::UnknownTool(name)) => {
                return Err(RpcError::invalid_params(format!("Unknown tool: {name}")));
            }
            Err(err) => CallToolResult::error(format!("{}: {err}", err.kind())),
        };

        serde_json::to_value(result).map_err(RpcError::internal)
    }
}
