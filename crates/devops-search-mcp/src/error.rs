//! Error types for the MCP server

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Result type alias for MCP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during MCP server operations
#[derive(Debug, Error)]
pub enum Error {
    /// Error from the Azure DevOps client
    #[error(transparent)]
    Client(#[from] devops_client::Error),

    /// Unknown tool requested
    #[error("Tool not found: {0}")]
    UnknownTool(String),

    /// Malformed protocol parameters
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// Error during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be read or parsed
    #[error("failed to load config file {}: {message}", path.display())]
    ConfigFile { path: PathBuf, message: String },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Client(e) => match e {
                devops_client::Error::Config { .. } => ErrorKind::Config,
                devops_client::Error::Validation { .. } => ErrorKind::Validation,
                devops_client::Error::UpstreamHttp { .. } => ErrorKind::UpstreamHttp,
                devops_client::Error::UnsupportedApiVersion { .. } => {
                    ErrorKind::UnsupportedApiVersion
                }
                devops_client::Error::Transport { .. } => ErrorKind::Transport,
                devops_client::Error::Decode { .. } => ErrorKind::Decode,
            },
            Self::UnknownTool(_) => ErrorKind::UnknownOperation,
            Self::InvalidParams(_) | Self::Json(_) => ErrorKind::Validation,
            Self::Io(_) => ErrorKind::Transport,
            Self::ConfigFile { .. } => ErrorKind::Config,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Client(e) => e.status(),
            _ => None,
        }
    }
}

/// Closed classification of failures reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    Validation,
    UpstreamHttp,
    Transport,
    UnsupportedApiVersion,
    Decode,
    UnknownOperation,
    Config,
}

/// The caller-facing form of an [`Error`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Underlying causes, outermost first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&Error> for OperationError {
    fn from(err: &Error) -> Self {
        let message = err.to_string();
        let details = source_chain(err, &message);
        Self {
            kind: err.kind(),
            status: err.status(),
            message,
            details,
        }
    }
}

fn source_chain(err: &dyn std::error::Error, message: &str) -> Option<String> {
    let mut causes = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        let text = cause.to_string();
        if text != message && !causes.contains(&text) {
            causes.push(text);
        }
        current = cause.source();
    }
    (!causes.is_empty()).then(|| causes.join(": "))
}
