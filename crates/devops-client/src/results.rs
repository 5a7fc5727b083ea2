//! Stable result shapes returned to callers

use serde::{Deserialize, Serialize};

use crate::models::Facets;

/// Search hits plus the service's total count and optional facets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults<T> {
    pub count: u64,
    pub results: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<Facets>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WikiSearchHit {
    pub id: String,
    pub title: String,
    /// First highlighted snippet of the page body, tags stripped
    pub content: String,
    pub path: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSearchHit {
    pub repository: String,
    pub path: String,
    pub file_name: String,
    /// Always empty: the search service does not return file bodies
    pub content: String,
    pub url: String,
    pub matches: Vec<CodeMatch>,
}

/// Position of one match inside a file.
///
/// The search service reports character offsets, not line numbers, so
/// `line` is always 0 and `content` describes the offset and length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeMatch {
    pub line: u32,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedFile {
    pub repository: String,
    pub path: String,
    pub content: String,
    pub file_name: String,
    /// Byte length of `content`
    pub size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WikiPage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub path: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    pub is_parent_page: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_item_path: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_pages: Vec<WikiPage>,
}
