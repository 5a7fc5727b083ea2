//! Request normalization
//!
//! Turns a caller's partial query into a complete upstream request: required
//! fields are checked, defaults substituted, and code-search filters composed
//! in a fixed precedence order. Nothing here touches the network.

use serde_json::Value;

use crate::config::Config;
use crate::error::{Error, Operation, Result};
use crate::models::{SearchFilters, SearchRequestBody, SortOption, SortOrder};
use crate::query::{CodeRetrievalQuery, CodeSearchQuery, WikiPageQuery, WikiSearchQuery};
use crate::upstream::UpstreamRequest;
use crate::urls;

pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Largest page the search service accepts
pub const MAX_RESULTS_LIMIT: u32 = 1000;

/// Sort field for code search; always ascending, never caller-controlled
pub const CODE_SEARCH_SORT_FIELD: &str = "filename";

/// Build the wiki search request for an already-resolved project.
pub fn wiki_search(config: &Config, project: &str, query: &WikiSearchQuery) -> Result<UpstreamRequest> {
    let search_text = required(Operation::WikiSearch, "query", &query.query)?;

    let body = SearchRequestBody {
        search_text: search_text.to_string(),
        skip: query.skip.unwrap_or(0),
        top: page_size(Operation::WikiSearch, query.max_results)?,
        filters: SearchFilters {
            project: vec![project.to_string()],
            ..SearchFilters::default()
        },
        order_by: None,
        include_facets: query.include_facets.unwrap_or(true),
    };

    Ok(UpstreamRequest::post(
        Operation::WikiSearch,
        urls::wiki_search(config, project)?,
        to_value(Operation::WikiSearch, &body)?,
    ))
}

/// Build the code search request for an already-resolved project.
pub fn code_search(config: &Config, project: &str, query: &CodeSearchQuery) -> Result<UpstreamRequest> {
    let search_text = required(Operation::CodeSearch, "query", &query.query)?;

    let body = SearchRequestBody {
        search_text: search_text.to_string(),
        skip: query.skip.unwrap_or(0),
        top: page_size(Operation::CodeSearch, query.max_results)?,
        filters: code_search_filters(project, query),
        order_by: Some(vec![SortOption {
            field: CODE_SEARCH_SORT_FIELD.to_string(),
            sort_order: SortOrder::Ascending,
        }]),
        include_facets: query.include_facets.unwrap_or(true),
    };

    Ok(UpstreamRequest::post(
        Operation::CodeSearch,
        urls::code_search(config)?,
        to_value(Operation::CodeSearch, &body)?,
    ))
}

/// Compose code search filters.
///
/// Project, repository, branch, path, file extensions, code elements, in
/// that order. A path filter suppresses the extension filter entirely.
pub fn code_search_filters(project: &str, query: &CodeSearchQuery) -> SearchFilters {
    let path = non_blank(query.path.as_deref());

    let path_filter = match path {
        Some(path) => Some(vec![path.to_string()]),
        None => query
            .file_extensions
            .as_deref()
            .map(extension_globs)
            .filter(|globs| !globs.is_empty()),
    };

    SearchFilters {
        project: vec![project.to_string()],
        repository: non_blank(query.repository.as_deref()).map(|r| vec![r.to_string()]),
        branch: non_blank(query.branch.as_deref()).map(|b| vec![b.to_string()]),
        path: path_filter,
        code_element: query
            .code_elements
            .as_deref()
            .filter(|elements| !elements.is_empty())
            .map(|elements| elements.iter().map(|e| e.as_str().to_string()).collect()),
    }
}

/// Expand file extensions into `**/*.<ext>` globs.
///
/// Accepts `ts`, `.ts` and `*.ts` alike; blank entries are dropped.
pub fn extension_globs(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|ext| ext.trim().trim_start_matches('*').trim_start_matches('.'))
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!("**/*.{ext}"))
        .collect()
}

/// Build the Git items request for an already-resolved project.
pub fn code_retrieval(
    config: &Config,
    project: &str,
    query: &CodeRetrievalQuery,
) -> Result<UpstreamRequest> {
    let repository = required(Operation::CodeRetrieval, "repository", &query.repository)?;
    let path = file_path(required(Operation::CodeRetrieval, "path", &query.path)?);

    let url = urls::git_item(
        config,
        project,
        repository,
        &path,
        non_blank(query.branch.as_deref()),
    )?;
    Ok(UpstreamRequest::get(Operation::CodeRetrieval, url))
}

/// Build the wiki pages request for an already-resolved project.
pub fn wiki_page(config: &Config, project: &str, query: &WikiPageQuery) -> Result<UpstreamRequest> {
    let wiki = required(Operation::WikiPage, "wikiIdentifier", &query.wiki_identifier)?;
    let path = file_path(non_blank(query.path.as_deref()).unwrap_or("/"));

    let url = urls::wiki_pages(
        config,
        project,
        wiki,
        &path,
        query.recursion_level.unwrap_or_default(),
        query.include_content.unwrap_or(true),
        non_blank(query.version.as_deref()),
    )?;
    Ok(UpstreamRequest::get(Operation::WikiPage, url))
}

/// Ensure a repository path starts with `/`
pub fn file_path(path: &str) -> String {
    let path = path.trim();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

fn required<'a>(operation: Operation, field: &str, value: &'a str) -> Result<&'a str> {
    non_blank(Some(value)).ok_or_else(|| Error::missing_field(operation, field))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `$top` for a search; 0 means "use the default"
fn page_size(operation: Operation, max_results: Option<u32>) -> Result<u32> {
    match max_results {
        None | Some(0) => Ok(DEFAULT_MAX_RESULTS),
        Some(n) if n > MAX_RESULTS_LIMIT => Err(Error::validation(format!(
            "`maxResults` for {} must be at most {MAX_RESULTS_LIMIT}, got {n}",
            operation.label().to_lowercase()
        ))),
        Some(n) => Ok(n),
    }
}

fn to_value(operation: Operation, body: &SearchRequestBody) -> Result<Value> {
    serde_json::to_value(body).map_err(|e| Error::Decode {
        operation,
        message: format!("failed to encode request body: {e}"),
    })
}
