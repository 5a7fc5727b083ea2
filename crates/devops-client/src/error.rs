//! Error types for devops-client

use std::fmt;

use serde::Deserialize;

use crate::upstream::ResponseBody;

/// Result type for devops-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// The upstream operations the client performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    WikiSearch,
    CodeSearch,
    CodeRetrieval,
    WikiPage,
}

impl Operation {
    /// Human-readable label used in error messages
    pub fn label(self) -> &'static str {
        match self {
            Self::WikiSearch => "Wiki search",
            Self::CodeSearch => "Code search",
            Self::CodeRetrieval => "Code retrieval",
            Self::WikiPage => "Wiki page retrieval",
        }
    }

    /// Lowercase phrase used inside validation messages
    fn phrase(self) -> &'static str {
        match self {
            Self::WikiSearch => "wiki search",
            Self::CodeSearch => "code search",
            Self::CodeRetrieval => "code retrieval",
            Self::WikiPage => "wiki page retrieval",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors that can occur while talking to Azure DevOps
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or malformed configuration (organization URL, token)
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Caller-supplied arguments failed validation; no request was sent
    #[error("{message}")]
    Validation { message: String },

    /// Upstream answered with a non-2xx status
    #[error("{operation} failed with status {status}: {message}")]
    UpstreamHttp {
        operation: Operation,
        status: u16,
        message: String,
    },

    /// Upstream rejected the pinned api-version
    #[error(
        "{operation} rejected api-version {api_version} with status {status}: {message}",
        api_version = crate::urls::API_VERSION
    )]
    UnsupportedApiVersion {
        operation: Operation,
        status: u16,
        message: String,
    },

    /// No HTTP response was received
    #[error("{message}")]
    Transport {
        operation: Operation,
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Upstream body did not have the expected shape
    #[error("{operation} returned an unexpected response: {message}")]
    Decode { operation: Operation, message: String },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Validation error for a required argument that is absent or blank
    pub fn missing_field(operation: Operation, field: &str) -> Self {
        Self::validation(format!(
            "`{field}` is required for {}",
            operation.phrase()
        ))
    }

    /// Validation error for a project that neither the caller nor the configuration supplied
    pub fn missing_project(operation: Operation) -> Self {
        Self::validation(format!(
            "Project name is required for {}",
            operation.phrase()
        ))
    }

    pub fn transport(operation: Operation, source: reqwest::Error) -> Self {
        Self::Transport {
            operation,
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// HTTP status attached to the failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UpstreamHttp { status, .. } | Self::UnsupportedApiVersion { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// The operation that failed, when the failure happened upstream
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::UpstreamHttp { operation, .. }
            | Self::UnsupportedApiVersion { operation, .. }
            | Self::Transport { operation, .. }
            | Self::Decode { operation, .. } => Some(*operation),
            Self::Config { .. } | Self::Validation { .. } => None,
        }
    }

    /// Build the error for a non-2xx upstream response.
    ///
    /// The upstream `message` wins; otherwise the raw body text, then the
    /// status reason phrase.
    pub fn from_status(operation: Operation, status: u16, body: &ResponseBody) -> Self {
        let parsed = match body {
            ResponseBody::Json(value) => UpstreamErrorBody::deserialize(value).ok(),
            ResponseBody::Text(text) => serde_json::from_str::<UpstreamErrorBody>(text).ok(),
        }
        .unwrap_or_default();
        let version_mismatch = parsed.is_version_mismatch();

        let message = parsed
            .message
            .filter(|m| !m.trim().is_empty())
            .or_else(|| match body {
                ResponseBody::Text(text) if !text.trim().is_empty() => {
                    Some(truncate(text.trim(), 500))
                }
                _ => None,
            })
            .unwrap_or_else(|| {
                reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("HTTP error")
                    .to_string()
            });

        if version_mismatch {
            Self::UnsupportedApiVersion {
                operation,
                status,
                message,
            }
        } else {
            Self::UpstreamHttp {
                operation,
                status,
                message,
            }
        }
    }
}

/// Error payload Azure DevOps returns alongside non-2xx statuses
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct UpstreamErrorBody {
    message: Option<String>,
    type_key: Option<String>,
    type_name: Option<String>,
}

impl UpstreamErrorBody {
    fn is_version_mismatch(&self) -> bool {
        [self.type_key.as_deref(), self.type_name.as_deref()]
            .into_iter()
            .flatten()
            .any(|t| t.contains("VersionOutOfRange") || t.contains("InvalidApiVersion"))
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let boundary = s
        .char_indices()
        .take_while(|(i, _)| *i < max_len)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(max_len);
    format!("{}...", &s[..boundary])
}
