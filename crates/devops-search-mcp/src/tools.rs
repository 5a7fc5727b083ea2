//! MCP tool catalog
//!
//! The server exposes a fixed set of tools. Their registered names carry a
//! prefix derived from the configured display name, so two servers pointed at
//! different organizations can sit side by side in one agent.
//!
//! # Tools
//!
//! - `{prefix}_wiki_search` - Search the project wiki
//! - `{prefix}_code_search` - Search code across the project's repositories
//! - `{prefix}_code_retrieval` - Fetch one file from a Git repository
//! - `{prefix}_wiki_page` - Fetch a wiki page and optionally its children

use devops_client::CodeElement;
use devops_client::normalize::{DEFAULT_MAX_RESULTS, MAX_RESULTS_LIMIT};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Display name used when none is configured
pub const DEFAULT_DISPLAY_NAME: &str = "Azure DevOps";

/// Tool definition for MCP protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Result from a tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

/// Content types for tool results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolResult {
    /// Create a successful text result
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: content.into(),
            }],
            is_error: None,
        }
    }

    /// Create an error result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: Some(true),
        }
    }
}

/// The operations behind the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    WikiSearch,
    CodeSearch,
    CodeRetrieval,
    WikiPage,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        ToolKind::WikiSearch,
        ToolKind::CodeSearch,
        ToolKind::CodeRetrieval,
        ToolKind::WikiPage,
    ];

    /// Name without the registry prefix
    pub fn suffix(self) -> &'static str {
        match self {
            Self::WikiSearch => "wiki_search",
            Self::CodeSearch => "code_search",
            Self::CodeRetrieval => "code_retrieval",
            Self::WikiPage => "wiki_page",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::WikiSearch => "Search for content in Azure DevOps wiki",
            Self::CodeSearch => "Search for code in Azure DevOps repositories",
            Self::CodeRetrieval => {
                "Retrieve the content of a file from an Azure DevOps Git repository"
            }
            Self::WikiPage => {
                "Retrieve an Azure DevOps wiki page, optionally with its sub-pages"
            }
        }
    }

    pub fn input_schema(self) -> Value {
        match self {
            Self::WikiSearch => json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    },
                    "project": project_property(),
                    "maxResults": max_results_property(),
                    "skip": skip_property(),
                    "includeFacets": include_facets_property()
                },
                "required": ["query"]
            }),
            Self::CodeSearch => json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    },
                    "project": project_property(),
                    "repository": {
                        "type": "string",
                        "description": "The repository name to search in (optional)"
                    },
                    "branch": {
                        "type": "string",
                        "description": "The branch to search (optional)"
                    },
                    "path": {
                        "type": "string",
                        "description": "Path filter; takes precedence over fileExtensions"
                    },
                    "fileExtensions": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "File extensions to filter results (e.g., [\"js\", \"ts\"])"
                    },
                    "codeElements": {
                        "type": "array",
                        "items": {
                            "type": "string",
                            "enum": CodeElement::ALL.map(CodeElement::as_str)
                        },
                        "description": "Code element kinds to match"
                    },
                    "maxResults": max_results_property(),
                    "skip": skip_property(),
                    "includeFacets": include_facets_property()
                },
                "required": ["query"]
            }),
            Self::CodeRetrieval => json!({
                "type": "object",
                "properties": {
                    "repository": {
                        "type": "string",
                        "description": "The repository name"
                    },
                    "path": {
                        "type": "string",
                        "description": "Path of the file within the repository"
                    },
                    "project": project_property(),
                    "branch": {
                        "type": "string",
                        "description": "Branch to read from (default branch when omitted)"
                    }
                },
                "required": ["repository", "path"]
            }),
            Self::WikiPage => json!({
                "type": "object",
                "properties": {
                    "wikiIdentifier": {
                        "type": "string",
                        "description": "Wiki name or id"
                    },
                    "path": {
                        "type": "string",
                        "description": "Page path",
                        "default": "/"
                    },
                    "project": project_property(),
                    "recursionLevel": {
                        "type": "string",
                        "enum": ["none", "oneLevel", "full"],
                        "description": "How many levels of sub-pages to include",
                        "default": "none"
                    },
                    "includeContent": {
                        "type": "boolean",
                        "description": "Include page content",
                        "default": true
                    },
                    "version": {
                        "type": "string",
                        "description": "Wiki branch to read from (optional)"
                    }
                },
                "required": ["wikiIdentifier"]
            }),
        }
    }
}

fn project_property() -> Value {
    json!({
        "type": "string",
        "description": "The Azure DevOps project name (optional if specified in environment variables)"
    })
}

fn max_results_property() -> Value {
    json!({
        "type": "integer",
        "minimum": 0,
        "maximum": MAX_RESULTS_LIMIT,
        "description": format!("Maximum number of results to return (default: {DEFAULT_MAX_RESULTS})"),
        "default": DEFAULT_MAX_RESULTS
    })
}

fn skip_property() -> Value {
    json!({
        "type": "integer",
        "minimum": 0,
        "description": "Number of results to skip",
        "default": 0
    })
}

fn include_facets_property() -> Value {
    json!({
        "type": "boolean",
        "description": "Include facet counts in the results",
        "default": true
    })
}

/// Derive the tool name prefix from a display name.
///
/// `"Contoso Ops"` becomes `contoso_ops`; a name with no alphanumeric
/// characters falls back to the default prefix.
pub fn tool_prefix(display_name: &str) -> String {
    let prefix = sanitize_name(display_name);
    if prefix.is_empty() {
        sanitize_name(DEFAULT_DISPLAY_NAME)
    } else {
        prefix
    }
}

fn sanitize_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
        } else if !result.is_empty() && !result.ends_with('_') {
            result.push('_');
        }
    }
    result.trim_end_matches('_').to_string()
}

/// The prefixed tool catalog
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    prefix: String,
    definitions: Vec<ToolDefinition>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_DISPLAY_NAME)
    }
}

impl ToolRegistry {
    pub fn new(display_name: &str) -> Self {
        let prefix = tool_prefix(display_name);
        let definitions = ToolKind::ALL
            .iter()
            .map(|kind| ToolDefinition {
                name: format!("{prefix}_{}", kind.suffix()),
                description: kind.description().to_string(),
                input_schema: kind.input_schema(),
            })
            .collect();
        Self {
            prefix,
            definitions,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Registered name of `kind`
    pub fn name_of(&self, kind: ToolKind) -> String {
        format!("{}_{}", self.prefix, kind.suffix())
    }

    /// Look up a tool by its exact registered name
    pub fn resolve(&self, name: &str) -> Option<ToolKind> {
        let suffix = name.strip_prefix(&self.prefix)?.strip_prefix('_')?;
        ToolKind::ALL.into_iter().find(|kind| kind.suffix() == suffix)
    }
}
