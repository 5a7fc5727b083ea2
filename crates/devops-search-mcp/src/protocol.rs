//! Protocol message types
//!
//! Two line-delimited dialects share stdio:
//! - JSON-RPC 2.0 / MCP, recognized by its `jsonrpc` member
//! - the legacy envelope `{"id", "method"?, "inputs": {"tool", ...}}`

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::tools::ToolDefinition;

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "Azure DevOps Search MCP Server";

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

/// JSON-RPC 2.0 Request
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data: None,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Initialize response result
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult<'a> {
    pub protocol_version: &'static str,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
    /// The full catalog, so clients need no second round trip
    pub tools: &'a [ToolDefinition],
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: ToolsCapability,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    pub list_changed: bool,
}

#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// Tool call params
#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

// ============================================================================
// Legacy envelope
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LegacyRequest {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub inputs: Option<LegacyInputs>,
}

/// Tool name plus its arguments, flattened into one object
#[derive(Debug, Deserialize)]
pub struct LegacyInputs {
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(flatten)]
    pub arguments: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct LegacyResponse {
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<LegacyError>,
}

impl LegacyResponse {
    pub fn outputs(id: Value, outputs: Value) -> Self {
        Self {
            id,
            outputs: Some(outputs),
            error: None,
        }
    }

    pub fn error(id: Value, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            id,
            outputs: None,
            error: Some(LegacyError {
                message: message.into(),
                details,
            }),
        }
    }

    /// Acknowledge without outputs
    pub fn empty(id: Value) -> Self {
        Self {
            id,
            outputs: None,
            error: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LegacyError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyInitializeOutputs<'a> {
    pub server_info: LegacyServerInfo,
    pub capabilities: LegacyCapabilities<'a>,
}

#[derive(Debug, Serialize)]
pub struct LegacyServerInfo {
    pub name: String,
    pub version: String,
    pub vendor: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyCapabilities<'a> {
    pub tools: Vec<LegacyTool<'a>>,
    pub text_document_sync: u8,
}

/// Catalog entry as the legacy dialect spells it: `parameters`, not `inputSchema`
#[derive(Debug, Serialize)]
pub struct LegacyTool<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub parameters: &'a Value,
}

impl<'a> From<&'a ToolDefinition> for LegacyTool<'a> {
    fn from(tool: &'a ToolDefinition) -> Self {
        Self {
            name: &tool.name,
            description: &tool.description,
            parameters: &tool.input_schema,
        }
    }
}
