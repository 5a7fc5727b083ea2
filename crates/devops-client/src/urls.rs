//! URL construction for REST endpoints and web UI deep links
//!
//! Every URL is assembled from segments through [`url::Url`], so project,
//! repository and wiki names containing spaces or reserved characters are
//! percent-encoded instead of concatenated raw.

use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::query::RecursionLevel;

/// REST api-version pinned for every call
pub const API_VERSION: &str = "7.1";

/// Derive the search service URL from the organization URL.
///
/// `dev.azure.com` becomes `almsearch.dev.azure.com` and
/// `{org}.visualstudio.com` becomes `{org}.almsearch.visualstudio.com`.
/// Any other host (on-premises servers) serves search itself.
pub fn search_base(org_url: &Url) -> Url {
    let Some(host) = org_url.host_str() else {
        return org_url.clone();
    };

    let search_host = if host.eq_ignore_ascii_case("dev.azure.com") {
        Some("almsearch.dev.azure.com".to_string())
    } else {
        host.strip_suffix(".visualstudio.com")
            .filter(|org| !org.is_empty() && !org.contains('.'))
            .map(|org| format!("{org}.almsearch.visualstudio.com"))
    };

    let mut url = org_url.clone();
    if let Some(search_host) = search_host {
        // Only fails for cannot-be-a-base URLs, which Config rejects.
        if url.set_host(Some(&search_host)).is_err() {
            return org_url.clone();
        }
    }
    url
}

/// Append path segments to `base`, percent-encoding each one.
///
/// Empty segments are skipped so `/`-separated paths can be passed split.
pub fn join_segments<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| Error::config(format!("`{base}` cannot be used as a base URL")))?;
        path.pop_if_empty();
        for segment in segments.into_iter().filter(|s| !s.is_empty()) {
            path.push(segment);
        }
    }
    Ok(url)
}

fn with_api_version(mut url: Url) -> Url {
    url.query_pairs_mut().append_pair("api-version", API_VERSION);
    url
}

/// Project-scoped wiki search resource
pub fn wiki_search(config: &Config, project: &str) -> Result<Url> {
    let url = join_segments(
        config.search_url(),
        [project, "_apis", "search", "wikisearchresults"],
    )?;
    Ok(with_api_version(url))
}

/// Organization-scoped code search resource; the project travels as a filter
pub fn code_search(config: &Config) -> Result<Url> {
    let url = join_segments(
        config.search_url(),
        ["_apis", "search", "codesearchresults"],
    )?;
    Ok(with_api_version(url))
}

/// Git items resource for one file, optionally pinned to a branch
pub fn git_item(
    config: &Config,
    project: &str,
    repository: &str,
    path: &str,
    branch: Option<&str>,
) -> Result<Url> {
    let mut url = join_segments(
        config.org_url(),
        [project, "_apis", "git", "repositories", repository, "items"],
    )?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("api-version", API_VERSION)
            .append_pair("path", path)
            .append_pair("includeContent", "true");
        if let Some(branch) = branch {
            query
                .append_pair("versionDescriptor.version", branch)
                .append_pair("versionDescriptor.versionType", "branch");
        }
    }
    Ok(url)
}

/// Wiki pages resource for one page and, depending on `recursion`, its children
pub fn wiki_pages(
    config: &Config,
    project: &str,
    wiki: &str,
    path: &str,
    recursion: RecursionLevel,
    include_content: bool,
    version: Option<&str>,
) -> Result<Url> {
    let mut url = join_segments(
        config.org_url(),
        [project, "_apis", "wiki", "wikis", wiki, "pages"],
    )?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("api-version", API_VERSION)
            .append_pair("path", path)
            .append_pair("recursionLevel", recursion.as_str())
            .append_pair("includeContent", if include_content { "true" } else { "false" });
        if let Some(version) = version {
            query
                .append_pair("versionDescriptor.version", version)
                .append_pair("versionDescriptor.versionType", "branch");
        }
    }
    Ok(url)
}

/// Web link to a wiki search hit: `{org}/{project}/_wiki/wikis/{wiki}{path}`
pub fn wiki_hit_link(config: &Config, project: &str, wiki: &str, path: &str) -> Result<Url> {
    let segments = [project, "_wiki", "wikis", wiki]
        .into_iter()
        .chain(path.split('/'));
    join_segments(config.org_url(), segments)
}

/// Web link to a wiki page: `{org}/{project}/_wiki/wikis/{wiki}?pagePath={path}`
pub fn wiki_page_link(config: &Config, project: &str, wiki: &str, path: &str) -> Result<Url> {
    let mut url = join_segments(config.org_url(), [project, "_wiki", "wikis", wiki])?;
    set_link_query(&mut url, "pagePath", path);
    Ok(url)
}

/// Web link to a file: `{org}/{project}/_git/{repository}?path={path}`
pub fn git_file_link(config: &Config, project: &str, repository: &str, path: &str) -> Result<Url> {
    let mut url = join_segments(config.org_url(), [project, "_git", repository])?;
    set_link_query(&mut url, "path", path);
    Ok(url)
}

/// Single-pair query for web UI links; spaces become `%20`, not `+`
fn set_link_query(url: &mut Url, key: &str, value: &str) {
    // A literal `+` is serialized as `%2B`, so every remaining `+` is a space.
    let encoded = url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    url.set_query(Some(&format!("{key}={encoded}")));
}
