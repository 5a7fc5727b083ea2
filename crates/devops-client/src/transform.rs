//! Response transformation
//!
//! Maps upstream response shapes onto the stable result types in
//! [`crate::results`].

use serde_json::Value;

use crate::config::Config;
use crate::error::Result;
use crate::models::{CodeSearchResponse, WikiPageResponse, WikiSearchResponse};
use crate::results::{CodeMatch, CodeSearchHit, RetrievedFile, SearchResults, WikiPage, WikiSearchHit};
use crate::upstream::{ResponseBody, UpstreamResponse};
use crate::urls;

pub const HIGHLIGHT_OPEN: &str = "<highlighthit>";
pub const HIGHLIGHT_CLOSE: &str = "</highlighthit>";

/// Hit field whose highlights become the wiki snippet
const CONTENT_FIELD: &str = "content";

const UNKNOWN: &str = "Unknown";

/// Remove highlight markers, leaving every other character untouched
pub fn strip_highlight_tags(text: &str) -> String {
    text.replace(HIGHLIGHT_OPEN, "").replace(HIGHLIGHT_CLOSE, "")
}

pub fn wiki_search_results(
    config: &Config,
    project: &str,
    response: WikiSearchResponse,
) -> Result<SearchResults<WikiSearchHit>> {
    let results = response
        .results
        .into_iter()
        .map(|item| -> Result<WikiSearchHit> {
            let content = item
                .hits
                .iter()
                .find(|hit| hit.field_reference_name == CONTENT_FIELD)
                .and_then(|hit| hit.highlights.first())
                .map(|snippet| strip_highlight_tags(snippet))
                .unwrap_or_default();

            let path = item.path.unwrap_or_default();
            let wiki = item
                .collection
                .and_then(|c| c.name)
                .or_else(|| item.wiki.and_then(|w| w.name))
                .unwrap_or_default();
            let url = urls::wiki_hit_link(config, project, &wiki, &path)?;

            Ok(WikiSearchHit {
                id: item.content_id.unwrap_or_default(),
                title: item.file_name.unwrap_or_default(),
                content,
                path,
                url: url.into(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SearchResults {
        count: response.count,
        results,
        facets: response.facets,
    })
}

pub fn code_search_results(
    config: &Config,
    project: &str,
    response: CodeSearchResponse,
) -> Result<SearchResults<CodeSearchHit>> {
    let results = response
        .results
        .into_iter()
        .map(|item| -> Result<CodeSearchHit> {
            let matches = item
                .matches
                .map(|m| m.content)
                .unwrap_or_default()
                .into_iter()
                .map(|offset| CodeMatch {
                    line: 0,
                    content: format!(
                        "Match at offset {} with length {}",
                        offset.char_offset, offset.length
                    ),
                })
                .collect();

            let repository = item
                .repository
                .and_then(|r| r.name)
                .unwrap_or_else(|| UNKNOWN.to_string());
            let path = item.path.unwrap_or_default();
            let url = urls::git_file_link(config, project, &repository, &path)?;

            Ok(CodeSearchHit {
                url: url.into(),
                repository,
                path,
                file_name: item.file_name.unwrap_or_else(|| UNKNOWN.to_string()),
                content: String::new(),
                matches,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SearchResults {
        count: response.count,
        results,
        facets: response.facets,
    })
}

/// Shape a Git items response into a [`RetrievedFile`].
///
/// `path` must already be normalized.
pub fn retrieved_file(
    config: &Config,
    project: &str,
    repository: &str,
    path: &str,
    response: UpstreamResponse,
) -> Result<RetrievedFile> {
    let content = match response.body {
        ResponseBody::Text(text) => text,
        ResponseBody::Json(Value::String(text)) => text,
        ResponseBody::Json(Value::Object(mut item)) => match item.remove("content") {
            Some(Value::String(text)) => text,
            Some(other) => {
                item.insert("content".to_string(), other);
                Value::Object(item).to_string()
            }
            None => Value::Object(item).to_string(),
        },
        ResponseBody::Json(other) => other.to_string(),
    };

    let url = urls::git_file_link(config, project, repository, path)?;

    Ok(RetrievedFile {
        repository: repository.to_string(),
        path: path.to_string(),
        file_name: last_segment(path).unwrap_or("unknown").to_string(),
        size: content.len(),
        content,
        commit_id: response.commit_id,
        url: url.into(),
    })
}

/// Shape a wiki page tree, keeping upstream child order
pub fn wiki_page(
    config: &Config,
    project: &str,
    wiki: &str,
    page: WikiPageResponse,
) -> Result<WikiPage> {
    let url = match page.remote_url.filter(|u| !u.is_empty()) {
        Some(remote) => remote,
        None => urls::wiki_page_link(config, project, wiki, &page.path)?.into(),
    };

    let sub_pages = page
        .sub_pages
        .into_iter()
        .map(|child| wiki_page(config, project, wiki, child))
        .collect::<Result<Vec<_>>>()?;

    Ok(WikiPage {
        id: page.id,
        title: last_segment(&page.path).unwrap_or("/").to_string(),
        path: page.path,
        content: page.content,
        order: page.order,
        is_parent_page: page.is_parent_page,
        git_item_path: page.git_item_path,
        url,
        sub_pages,
    })
}

fn last_segment(path: &str) -> Option<&str> {
    path.rsplit('/').find(|s| !s.is_empty())
}
