//! MCP Server implementation
//!
//! Reads one message per line, answers each before reading the next, and
//! writes one response per line. Lines with a `jsonrpc` member are handled
//! as JSON-RPC 2.0; anything else is treated as the legacy envelope.

use devops_client::{Config, DevOpsClient, HttpUpstream, Upstream};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::audit::AuditLog;
use crate::error::OperationError;
use crate::handlers::ToolDispatcher;
use crate::protocol::{
    INVALID_PARAMS, INVALID_REQUEST, InitializeResult, JsonRpcRequest, JsonRpcResponse,
    LegacyCapabilities, LegacyInitializeOutputs, LegacyRequest, LegacyResponse, LegacyServerInfo,
    LegacyTool, METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION, SERVER_NAME, ServerCapabilities,
    ServerInfo, ToolCallParams, ToolsCapability,
};
use crate::settings::Settings;
use crate::tools::{ToolDefinition, ToolRegistry, ToolResult};
use crate::{Error, Result};

/// MCP Server for Azure DevOps search
///
/// # Example
///
/// ```ignore
/// use devops_search_mcp::{SearchMcpServer, Settings};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let settings = Settings::resolve(clap::Parser::parse())?;
///     SearchMcpServer::from_settings(settings)?.run().await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct SearchMcpServer<U = HttpUpstream> {
    dispatcher: ToolDispatcher<U>,
}

impl SearchMcpServer<HttpUpstream> {
    /// Build a server that talks to Azure DevOps over HTTPS
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let audit = settings
            .log_dir
            .map(AuditLog::in_dir)
            .unwrap_or_default();
        let client = DevOpsClient::new(settings.config)?;
        Ok(Self::new(ToolDispatcher::new(
            client,
            ToolRegistry::new(&settings.display_name),
            audit,
        )))
    }
}

impl<U: Upstream> SearchMcpServer<U> {
    pub fn new(dispatcher: ToolDispatcher<U>) -> Self {
        Self { dispatcher }
    }

    /// Convenience constructor over any upstream
    pub fn with_upstream(config: Config, upstream: U, registry: ToolRegistry, audit: AuditLog) -> Self {
        Self::new(ToolDispatcher::new(
            DevOpsClient::with_upstream(config, upstream),
            registry,
            audit,
        ))
    }

    pub fn dispatcher(&self) -> &ToolDispatcher<U> {
        &self.dispatcher
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        self.dispatcher.registry().definitions()
    }

    /// Serve stdin/stdout until stdin closes
    pub async fn run(&self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        tracing::info!(
            prefix = self.dispatcher.registry().prefix(),
            audit_log = %self.dispatcher.audit().path().display(),
            "MCP server ready, listening on stdio"
        );
        self.run_with(stdin, stdout).await
    }

    /// Serve line-delimited messages from `reader`, answering on `writer`
    pub async fn run_with<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            tracing::debug!(request = %line, "Received message");

            if let Some(response) = self.handle_message(&line).await? {
                writer.write_all(response.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        tracing::info!("Input closed, shutting down");
        Ok(())
    }

    /// Handle a single message
    ///
    /// Returns the serialized response, or `None` for notifications.
    pub async fn handle_message(&self, message: &str) -> Result<Option<String>> {
        let value: Value = match serde_json::from_str(message) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Unparsable message");
                let response = JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {e}"));
                return serialize(&response).map(Some);
            }
        };

        if value.get("jsonrpc").is_some() {
            self.handle_json_rpc(value).await
        } else {
            self.handle_legacy(value).await
        }
    }

    async fn handle_json_rpc(&self, value: Value) -> Result<Option<String>> {
        let fallback_id = value.get("id").cloned();
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                let response =
                    JsonRpcResponse::error(fallback_id, INVALID_REQUEST, format!("Invalid Request: {e}"));
                return serialize(&response).map(Some);
            }
        };

        let id = request.id;
        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, self.initialize_result()?),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": self.tools() })),
            "tools/call" => self.handle_tools_call(id, request.params).await?,
            method if id.is_none() => {
                tracing::debug!(method, "Notification");
                return Ok(None);
            }
            method => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {method}"),
            ),
        };

        serialize(&response).map(Some)
    }

    fn initialize_result(&self) -> Result<Value> {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION,
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            tools: self.tools(),
        };
        Ok(serde_json::to_value(result)?)
    }

    /// Tool failures are successful responses carrying `isError`
    async fn handle_tools_call(&self, id: Option<Value>, params: Value) -> Result<JsonRpcResponse> {
        let params: ToolCallParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                return Ok(JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    Error::InvalidParams(e.to_string()).to_string(),
                ));
            }
        };

        let tool_result = match self.dispatcher.call(&params.name, params.arguments).await {
            Ok(result) => ToolResult::text(serde_json::to_string_pretty(&result)?),
            Err(e) => ToolResult::error(serde_json::to_string_pretty(&OperationError::from(&e))?),
        };
        Ok(JsonRpcResponse::success(id, serde_json::to_value(tool_result)?))
    }

    async fn handle_legacy(&self, value: Value) -> Result<Option<String>> {
        let fallback_id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: LegacyRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                let response = LegacyResponse::error(fallback_id, format!("Invalid request: {e}"), None);
                return serialize(&response).map(Some);
            }
        };

        let id = request.id;
        if request.method.as_deref() == Some("initialize") {
            let outputs = serde_json::to_value(self.legacy_initialize_outputs())?;
            return serialize(&LegacyResponse::outputs(id, outputs)).map(Some);
        }

        let Some(inputs) = request.inputs else {
            let response = LegacyResponse::error(id, "Request inputs are required", None);
            return serialize(&response).map(Some);
        };

        let tool = inputs.tool.unwrap_or_default();
        // Editor methods that carry inputs but no known tool are acknowledged silently.
        if request.method.is_some() && self.dispatcher.registry().resolve(&tool).is_none() {
            return serialize(&LegacyResponse::empty(id)).map(Some);
        }

        let response = match self
            .dispatcher
            .call(&tool, Value::Object(inputs.arguments))
            .await
        {
            Ok(results) => {
                let mut outputs = Map::new();
                outputs.insert("results".to_string(), results);
                LegacyResponse::outputs(id, Value::Object(outputs))
            }
            Err(e) => {
                let reduced = OperationError::from(&e);
                LegacyResponse::error(id, reduced.message, reduced.details)
            }
        };
        serialize(&response).map(Some)
    }

    fn legacy_initialize_outputs(&self) -> LegacyInitializeOutputs<'_> {
        LegacyInitializeOutputs {
            server_info: LegacyServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                vendor: "devops-search".to_string(),
            },
            capabilities: LegacyCapabilities {
                tools: self.tools().iter().map(LegacyTool::from).collect(),
                text_document_sync: 1,
            },
        }
    }
}

fn serialize(response: &impl Serialize) -> Result<String> {
    serde_json::to_string(response).map_err(Error::from)
}
