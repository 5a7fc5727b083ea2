//! The search client
//!
//! [`DevOpsClient`] runs each operation end to end: resolve the project,
//! normalize the query, execute one upstream call, and transform the
//! response. Every step returns early on failure, so a caller receives
//! either a complete result or an error, never a mix.

use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::{Error, Operation, Result};
use crate::models::{CodeSearchResponse, WikiPageResponse, WikiSearchResponse};
use crate::normalize;
use crate::query::{CodeRetrievalQuery, CodeSearchQuery, WikiPageQuery, WikiSearchQuery};
use crate::results::{CodeSearchHit, RetrievedFile, SearchResults, WikiPage, WikiSearchHit};
use crate::transform;
use crate::upstream::{HttpUpstream, ResponseBody, Upstream, UpstreamRequest, UpstreamResponse};

/// Azure DevOps search client over an [`Upstream`]
#[derive(Debug)]
pub struct DevOpsClient<U = HttpUpstream> {
    config: Config,
    upstream: U,
}

impl DevOpsClient<HttpUpstream> {
    /// Create a client that talks to Azure DevOps over HTTPS.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP transport cannot be set up.
    pub fn new(config: Config) -> Result<Self> {
        let upstream = HttpUpstream::new(&config)?;
        Ok(Self::with_upstream(config, upstream))
    }
}

impl<U: Upstream> DevOpsClient<U> {
    pub fn with_upstream(config: Config, upstream: U) -> Self {
        Self { config, upstream }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn upstream(&self) -> &U {
        &self.upstream
    }

    /// Search the wiki of one project
    pub async fn search_wiki(&self, query: &WikiSearchQuery) -> Result<SearchResults<WikiSearchHit>> {
        let operation = Operation::WikiSearch;
        let project = self.config.resolve_project(query.project.as_deref(), operation)?;
        let request = normalize::wiki_search(&self.config, &project, query)?;

        let response = self.send(request).await?;
        let body: WikiSearchResponse = decode(operation, response.body)?;
        transform::wiki_search_results(&self.config, &project, body)
    }

    /// Search code across the repositories of one project
    pub async fn search_code(&self, query: &CodeSearchQuery) -> Result<SearchResults<CodeSearchHit>> {
        let operation = Operation::CodeSearch;
        let project = self.config.resolve_project(query.project.as_deref(), operation)?;
        let request = normalize::code_search(&self.config, &project, query)?;

        let response = self.send(request).await?;
        let body: CodeSearchResponse = decode(operation, response.body)?;
        transform::code_search_results(&self.config, &project, body)
    }

    /// Fetch one file's content
    pub async fn retrieve_code(&self, query: &CodeRetrievalQuery) -> Result<RetrievedFile> {
        let operation = Operation::CodeRetrieval;
        let project = self.config.resolve_project(query.project.as_deref(), operation)?;
        let request = normalize::code_retrieval(&self.config, &project, query)?;

        let response = self.send(request).await?;
        transform::retrieved_file(
            &self.config,
            &project,
            query.repository.trim(),
            &normalize::file_path(&query.path),
            response,
        )
    }

    /// Fetch a wiki page, optionally with its child pages
    pub async fn get_wiki_page(&self, query: &WikiPageQuery) -> Result<WikiPage> {
        let operation = Operation::WikiPage;
        let project = self.config.resolve_project(query.project.as_deref(), operation)?;
        let request = normalize::wiki_page(&self.config, &project, query)?;

        let response = self.send(request).await?;
        let body: WikiPageResponse = decode(operation, response.body)?;
        transform::wiki_page(&self.config, &project, query.wiki_identifier.trim(), body)
    }

    /// Execute one call and turn non-2xx statuses into errors
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse> {
        let operation = request.operation;
        let response = self.upstream.execute(request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            let err = Error::from_status(operation, response.status, &response.body);
            tracing::warn!(%operation, status = response.status, error = %err, "Upstream call failed");
            Err(err)
        }
    }
}

fn decode<T: DeserializeOwned>(operation: Operation, body: ResponseBody) -> Result<T> {
    let decoded = match body {
        ResponseBody::Json(value) => serde_json::from_value(value),
        ResponseBody::Text(text) => serde_json::from_str(&text),
    };
    decoded.map_err(|e| Error::Decode {
        operation,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays one canned response and records what was sent
    struct Canned {
        response: Mutex<Option<Result<UpstreamResponse>>>,
        sent: Mutex<Vec<UpstreamRequest>>,
    }

    impl Canned {
        fn new(response: Result<UpstreamResponse>) -> Self {
            Self {
                response: Mutex::new(Some(response)),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Upstream for Canned {
        async fn execute(&self, request: UpstreamRequest) -> Result<UpstreamResponse> {
            self.sent.lock().unwrap().push(request);
            self.response
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(UpstreamResponse::json(500, json!({}))))
        }
    }

    fn client(response: Result<UpstreamResponse>) -> DevOpsClient<Canned> {
        let config = Config::new("https://dev.azure.com/contoso", "token").unwrap();
        DevOpsClient::with_upstream(config, Canned::new(response))
    }

    #[tokio::test]
    async fn unresolved_project_makes_no_call() {
        let client = client(Ok(UpstreamResponse::json(200, json!({}))));
        let err = client
            .search_wiki(&WikiSearchQuery::new("deployment"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(client.upstream().calls(), 0);
    }

    #[tokio::test]
    async fn non_success_status_becomes_upstream_error() {
        let client = client(Ok(UpstreamResponse::json(
            404,
            json!({ "message": "Project Infra not found" }),
        )));
        let err = client
            .search_wiki(&WikiSearchQuery::new("deployment").project("Infra"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Wiki search failed with status 404: Project Infra not found"
        );
        assert_eq!(client.upstream().calls(), 1);
    }

    #[tokio::test]
    async fn unexpected_body_is_a_decode_error() {
        let client = client(Ok(UpstreamResponse::text(200, "<html>login</html>")));
        let err = client
            .search_code(&CodeSearchQuery {
                project: Some("Infra".into()),
                ..CodeSearchQuery::new("TODO")
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                operation: Operation::CodeSearch,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn transport_failure_is_passed_through() {
        let client = client(Err(Error::Transport {
            operation: Operation::CodeRetrieval,
            message: "connection refused".into(),
            source: None,
        }));
        let query = CodeRetrievalQuery {
            project: Some("Infra".into()),
            ..CodeRetrievalQuery::new("svc", "src/app.ts")
        };
        let err = client.retrieve_code(&query).await.unwrap_err();
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn retrieval_reports_normalized_path() {
        let client = client(Ok(UpstreamResponse::json(
            200,
            json!({ "content": "export {};" }),
        )));
        let query = CodeRetrievalQuery {
            project: Some("Infra".into()),
            ..CodeRetrievalQuery::new("svc", "src/app.ts")
        };
        let file = client.retrieve_code(&query).await.unwrap();
        assert_eq!(file.path, "/src/app.ts");
        assert_eq!(file.file_name, "app.ts");
        assert_eq!(file.size, 10);
    }
}
