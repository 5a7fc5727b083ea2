//! MCP server for Azure DevOps search
//!
//! This crate exposes Azure DevOps wiki search, code search, file retrieval
//! and wiki page retrieval to agents over the Model Context Protocol.
//!
//! # Architecture
//!
//! ```text
//! [ MCP client (agent / IDE) ]
//!        | (JSON lines on stdio)
//!        v
//! [ devops-search-mcp ]  --> audit log (JSON lines)
//!        | (Rust API)
//!        v
//! [ devops-client ]
//!        | (HTTPS)
//!        v
//! [ Azure DevOps REST API ]
//! ```
//!
//! Both JSON-RPC 2.0 (MCP) and the older `{"id", "inputs": {"tool", ...}}`
//! envelope are accepted on the same stream.

pub mod audit;
pub mod error;
pub mod handlers;
pub mod protocol;
pub mod server;
pub mod settings;
pub mod tools;

pub use audit::AuditLog;
pub use error::{Error, ErrorKind, OperationError, Result};
pub use handlers::ToolDispatcher;
pub use server::SearchMcpServer;
pub use settings::{Args, FileSettings, Settings};
pub use tools::{ToolContent, ToolDefinition, ToolKind, ToolRegistry, ToolResult, tool_prefix};
