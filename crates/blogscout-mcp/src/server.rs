//! MCP server implementation

use crate::protocol::*;
use crate::tools;
use anyhow::Result;
use blogscout_core::{BlogScoutError, ErrorKind, SearchPipeline};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

pub struct McpServer {
    pipeline: SearchPipeline,
}

impl McpServer {
    pub fn new(pipeline: SearchPipeline) -> Self {
        Self { pipeline }
    }

    /// Serve stdin/stdout until EOF
    pub async fn run(&self) -> Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = BufWriter::new(tokio::io::stdout());
        self.serve(reader, writer).await
    }

    /// Serve line-delimited JSON-RPC from `reader` until EOF
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
                Ok(r) => r,
                Err(e) => {
                    let response = JsonRpcResponse::error(
                        None,
                        codes::PARSE_ERROR,
                        &format!("Parse error: {}", e),
                    );
                    write_response(&mut writer, &response).await?;
                    continue;
                }
            };

            // Notifications get no reply
            if request.id.is_none() {
                tracing::debug!("Notification: {}", request.method);
                continue;
            }

            let response = self.handle_request(&request).await;
            write_response(&mut writer, &response).await?;
        }

        Ok(())
    }

    pub async fn handle_request(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!("MCP request: {}", request.method);
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,
            "resources/list" => self.handle_resources_list(request),
            "prompts/list" => self.handle_prompts_list(request),
            _ => JsonRpcResponse::error(
                request.id.clone(),
                codes::METHOD_NOT_FOUND,
                &format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let result = serde_json::json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {
                "tools": {},
                "resources": { "subscribe": false },
                "prompts": {}
            },
            "serverInfo": {
                "name": "blogscout",
                "version": env!("CARGO_PKG_VERSION")
            }
        });
        JsonRpcResponse::success(request.id.clone(), result)
    }

    fn handle_tools_list(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let tools = tools::all_tool_definitions();
        JsonRpcResponse::success(request.id.clone(), serde_json::json!({ "tools": tools }))
    }

    async fn handle_tools_call(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let name = request
            .params
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("");

        let arguments = request
            .params
            .get("arguments")
            .cloned()
            .unwrap_or(serde_json::json!({}));

        let result = match name {
            "natural_search" => tools::handle_natural_search(&self.pipeline, arguments).await,
            "raw_search" => tools::handle_raw_search(&self.pipeline, arguments).await,
            "validate_query" => tools::handle_validate_query(&self.pipeline, arguments).await,
            "collection_info" => tools::handle_collection_info(&self.pipeline).await,
            "health" => tools::handle_health(&self.pipeline).await,
            _ => Err(BlogScoutError::InvalidInput(format!("Unknown tool: {}", name)).into()),
        };

        let tool_result = result.unwrap_or_else(|e| {
            let (kind, status) = match e.downcast_ref::<BlogScoutError>() {
                Some(err) => (err.kind(), err.status_code()),
                None => (ErrorKind::Internal, 500),
            };
            tracing::warn!("Tool '{}' failed ({}): {}", name, status, e);
            ToolResult::failure(kind.as_str(), status, e.to_string())
        });

        match serde_json::to_value(tool_result) {
            Ok(value) => JsonRpcResponse::success(request.id.clone(), value),
            Err(e) => JsonRpcResponse::error(
                request.id.clone(),
                codes::INTERNAL_ERROR,
                &format!("Failed to encode result: {}", e),
            ),
        }
    }

    fn handle_resources_list(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(request.id.clone(), serde_json::json!({ "resources": [] }))
    }

    fn handle_prompts_list(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let prompts = vec![serde_json::json!({
            "name": "natural_search",
            "title": "Blog Search Guide",
            "description": "Ask about articles and authors in plain language"
        })];
        JsonRpcResponse::success(
            request.id.clone(),
            serde_json::json!({ "prompts": prompts }),
        )
    }
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &JsonRpcResponse,
) -> Result<()> {
    let json = serde_json::to_string(response)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

pub async fn start_server(pipeline: SearchPipeline) -> Result<()> {
    tracing::info!("Starting MCP server on stdio");
    let server = McpServer::new(pipeline);
    server.run().await
}
