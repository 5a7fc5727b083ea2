//! MCP Tool Handlers
//!
//! Routes a tool call to the matching client operation. Every call is
//! written to the audit log before it runs; every failure is written after.

use devops_client::{
    CodeRetrievalQuery, CodeSearchQuery, DevOpsClient, HttpUpstream, Upstream, WikiPageQuery,
    WikiSearchQuery, from_arguments,
};
use serde::Serialize;
use serde_json::Value;

use crate::audit::AuditLog;
use crate::error::OperationError;
use crate::tools::{ToolKind, ToolRegistry};
use crate::{Error, Result};

/// Binds the tool catalog to a client
#[derive(Debug)]
pub struct ToolDispatcher<U = HttpUpstream> {
    client: DevOpsClient<U>,
    registry: ToolRegistry,
    audit: AuditLog,
}

impl<U: Upstream> ToolDispatcher<U> {
    pub fn new(client: DevOpsClient<U>, registry: ToolRegistry, audit: AuditLog) -> Self {
        Self {
            client,
            registry,
            audit,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn client(&self) -> &DevOpsClient<U> {
        &self.client
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Handle a tool call by dispatching to the appropriate handler.
    ///
    /// Unknown names fail without touching the arguments or the network.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<Value> {
        let result = match self.registry.resolve(name) {
            Some(kind) => {
                tracing::info!(tool = name, "Dispatching tool call");
                self.audit.record_request(kind, name, &arguments);
                self.run(kind, arguments).await
            }
            None => Err(Error::UnknownTool(name.to_string())),
        };

        if let Err(e) = &result {
            let reduced = OperationError::from(e);
            tracing::error!(tool = name, kind = ?reduced.kind, error = %e, "Tool call failed");
            self.audit.record_error(name, &reduced);
        }
        result
    }

    async fn run(&self, kind: ToolKind, arguments: Value) -> Result<Value> {
        match kind {
            ToolKind::WikiSearch => {
                let query: WikiSearchQuery = from_arguments(arguments)?;
                to_value(self.client.search_wiki(&query).await?)
            }
            ToolKind::CodeSearch => {
                let query: CodeSearchQuery = from_arguments(arguments)?;
                to_value(self.client.search_code(&query).await?)
            }
            ToolKind::CodeRetrieval => {
                let query: CodeRetrievalQuery = from_arguments(arguments)?;
                to_value(self.client.retrieve_code(&query).await?)
            }
            ToolKind::WikiPage => {
                let query: WikiPageQuery = from_arguments(arguments)?;
                to_value(self.client.get_wiki_page(&query).await?)
            }
        }
    }
}

fn to_value(result: impl Serialize) -> Result<Value> {
    serde_json::to_value(result).map_err(Error::from)
}
