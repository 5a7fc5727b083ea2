//! Audit log of tool requests and failures.
//!
//! Entries are appended as JSON lines and never read back. Writes are
//! serialized by an in-process mutex plus an exclusive advisory lock on the
//! file. A failed write is reported through tracing and never fails the
//! invocation that triggered it.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::Serialize;
use serde_json::Value;

use crate::error::OperationError;
use crate::tools::ToolKind;

pub const LOG_FILE_NAME: &str = "search-requests.log";

/// `{temp}/azure-devops-search-mcp/logs`
pub fn default_log_dir() -> PathBuf {
    std::env::temp_dir()
        .join("azure-devops-search-mcp")
        .join("logs")
}

/// Kind of audit entry, written as the `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Wiki,
    Code,
    Retrieval,
    Page,
    Error,
}

impl From<ToolKind> for EntryType {
    fn from(kind: ToolKind) -> Self {
        match kind {
            ToolKind::WikiSearch => Self::Wiki,
            ToolKind::CodeSearch => Self::Code,
            ToolKind::CodeRetrieval => Self::Retrieval,
            ToolKind::WikiPage => Self::Page,
        }
    }
}

#[derive(Debug, Serialize)]
struct AuditEntry<'a> {
    timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    entry_type: EntryType,
    tool: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a OperationError>,
}

#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::in_dir(default_log_dir())
    }
}

impl AuditLog {
    /// Log to `{dir}/search-requests.log`; the directory is created on first write.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(LOG_FILE_NAME),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record the raw arguments of a tool call
    pub fn record_request(&self, kind: ToolKind, tool: &str, arguments: &Value) {
        self.record(&AuditEntry {
            timestamp: Utc::now(),
            entry_type: kind.into(),
            tool,
            request: Some(arguments),
            error: None,
        });
    }

    /// Record a failed tool call
    pub fn record_error(&self, tool: &str, error: &OperationError) {
        self.record(&AuditEntry {
            timestamp: Utc::now(),
            entry_type: EntryType::Error,
            tool,
            request: None,
            error: Some(error),
        });
    }

    fn record(&self, entry: &AuditEntry<'_>) {
        if let Err(e) = self.append(entry) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to write audit log entry");
        }
    }

    fn append(&self, entry: &AuditEntry<'_>) -> std::io::Result<()> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;
        let written = file.write_all(&line).and_then(|()| file.flush());
        file.unlock()?;
        written
    }
}
