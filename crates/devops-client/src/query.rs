//! Caller-facing query types
//!
//! These are the typed parameter contracts of each operation. They
//! deserialize straight from tool-call arguments (camelCase keys); anything
//! the caller leaves out is filled in by [`crate::normalize`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Search the project wiki
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WikiSearchQuery {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_facets: Option<bool>,
}

impl WikiSearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }
}

/// Kinds of code element a code search can be narrowed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeElement {
    Class,
    Function,
    Variable,
    Comment,
}

impl CodeElement {
    pub const ALL: [CodeElement; 4] = [
        CodeElement::Class,
        CodeElement::Function,
        CodeElement::Variable,
        CodeElement::Comment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Function => "function",
            Self::Variable => "variable",
            Self::Comment => "comment",
        }
    }
}

/// Search source code across repositories
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSearchQuery {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_extensions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_elements: Option<Vec<CodeElement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_facets: Option<bool>,
}

impl CodeSearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

/// Fetch one file from a Git repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeRetrievalQuery {
    pub repository: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl CodeRetrievalQuery {
    pub fn new(repository: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            path: path.into(),
            ..Self::default()
        }
    }
}

/// How many levels of child pages a wiki page lookup expands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecursionLevel {
    #[default]
    None,
    OneLevel,
    Full,
}

impl RecursionLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::OneLevel => "oneLevel",
            Self::Full => "full",
        }
    }
}

/// Look up a wiki page by path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WikiPageQuery {
    pub wiki_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recursion_level: Option<RecursionLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_content: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl WikiPageQuery {
    pub fn new(wiki_identifier: impl Into<String>) -> Self {
        Self {
            wiki_identifier: wiki_identifier.into(),
            ..Self::default()
        }
    }
}

/// Decode tool-call arguments into a typed query.
///
/// Missing arguments (`null`) are treated as an empty object so the
/// required-field error names the missing field.
///
/// # Errors
///
/// Returns [`Error::Validation`] for missing required fields and type mismatches.
pub fn from_arguments<T: serde::de::DeserializeOwned>(arguments: Value) -> Result<T> {
    let arguments = match arguments {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| Error::validation(format!("invalid arguments: {e}")))
}
