//! Wire types for the Azure DevOps REST API
//!
//! Request bodies are serialized exactly as the search service expects.
//! Response fields the service may omit are optional or defaulted. Defaulted
//! fields also accept an explicit `null`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Decode `null` the same way as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Search requests
// ============================================================================

/// Body of a wiki or code search request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequestBody {
    #[serde(rename = "searchText")]
    pub search_text: String,
    #[serde(rename = "$skip")]
    pub skip: u32,
    #[serde(rename = "$top")]
    pub top: u32,
    pub filters: SearchFilters,
    /// `null` asks for the service's default ordering
    #[serde(rename = "$orderBy")]
    pub order_by: Option<Vec<SortOption>>,
    #[serde(rename = "includeFacets")]
    pub include_facets: bool,
}

/// Search filters, serialized in the order they are applied
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(rename = "Project")]
    pub project: Vec<String>,
    #[serde(rename = "Repository", default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<Vec<String>>,
    #[serde(rename = "Branch", default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<Vec<String>>,
    #[serde(rename = "Path", default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<String>>,
    #[serde(rename = "CodeElement", default, skip_serializing_if = "Option::is_none")]
    pub code_element: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOption {
    pub field: String,
    #[serde(rename = "sortOrder")]
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "ASC")]
    Ascending,
    #[serde(rename = "DESC")]
    Descending,
}

// ============================================================================
// Search responses
// ============================================================================

/// Reference to a named upstream entity (project, repository, wiki collection)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NamedRef {
    pub name: Option<String>,
    pub id: Option<String>,
}

/// One facet bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Facet {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_count: Option<u64>,
}

/// Facets keyed by filter category (`Project`, `Repository`, ...)
pub type Facets = BTreeMap<String, Vec<Facet>>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WikiSearchResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub results: Vec<WikiResultItem>,
    pub facets: Option<Facets>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WikiResultItem {
    pub file_name: Option<String>,
    pub path: Option<String>,
    pub collection: Option<NamedRef>,
    pub wiki: Option<NamedRef>,
    pub project: Option<NamedRef>,
    pub content_id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub hits: Vec<WikiHit>,
}

/// Highlighted fragments for one field of a wiki result
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WikiHit {
    #[serde(deserialize_with = "null_as_default")]
    pub field_reference_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeSearchResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub results: Vec<CodeResultItem>,
    pub facets: Option<Facets>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeResultItem {
    pub file_name: Option<String>,
    pub path: Option<String>,
    pub matches: Option<CodeMatches>,
    pub repository: Option<NamedRef>,
    pub project: Option<NamedRef>,
    pub content_id: Option<String>,
}

/// Match offsets grouped by the field they hit
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeMatches {
    #[serde(deserialize_with = "null_as_default")]
    pub content: Vec<MatchOffset>,
    #[serde(deserialize_with = "null_as_default")]
    pub file_name: Vec<MatchOffset>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchOffset {
    #[serde(deserialize_with = "null_as_default")]
    pub char_offset: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub length: u64,
}

// ============================================================================
// Wiki pages
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WikiPageResponse {
    pub id: Option<u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub path: String,
    pub content: Option<String>,
    pub git_item_path: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_parent_page: bool,
    pub order: Option<i64>,
    pub remote_url: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub sub_pages: Vec<WikiPageResponse>,
}
