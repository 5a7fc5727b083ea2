//! The HTTP exchange with Azure DevOps
//!
//! [`Upstream`] is the seam between request building and the network.
//! [`HttpUpstream`] is the real implementation; tests substitute a recorder.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use serde_json::Value;
use url::Url;

use crate::config::Config;
use crate::error::{Error, Operation, Result};

/// Response header carrying the commit a Git item was read from
pub const COMMIT_ID_HEADER: &str = "x-tfsgit-commitid";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A fully built upstream call
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub operation: Operation,
    pub method: Method,
    pub url: Url,
    pub body: Option<Value>,
}

impl UpstreamRequest {
    pub fn get(operation: Operation, url: Url) -> Self {
        Self {
            operation,
            method: Method::Get,
            url,
            body: None,
        }
    }

    pub fn post(operation: Operation, url: Url, body: Value) -> Self {
        Self {
            operation,
            method: Method::Post,
            url,
            body: Some(body),
        }
    }
}

/// Response body as received: parsed JSON when possible, raw text otherwise
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// Classify raw response text
    pub fn from_text(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub commit_id: Option<String>,
    pub body: ResponseBody,
}

impl UpstreamResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            commit_id: None,
            body: ResponseBody::Json(body),
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            commit_id: None,
            body: ResponseBody::Text(body.into()),
        }
    }

    pub fn with_commit_id(mut self, commit_id: impl Into<String>) -> Self {
        self.commit_id = Some(commit_id.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes one upstream call.
///
/// Implementations return `Ok` for every HTTP response, whatever its status;
/// `Err` is reserved for failures where no response arrived.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn execute(&self, request: UpstreamRequest) -> Result<UpstreamResponse>;
}

#[async_trait]
impl<U: Upstream + ?Sized> Upstream for Arc<U> {
    async fn execute(&self, request: UpstreamRequest) -> Result<UpstreamResponse> {
        (**self).execute(request).await
    }
}

/// [`Upstream`] over reqwest with basic-auth credentials
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    authorization: HeaderValue,
}

impl HttpUpstream {
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the token cannot form a header value or
    /// the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let mut authorization = HeaderValue::from_str(&config.authorization_header())
            .map_err(|e| Error::config(format!("access token is not a valid header value: {e}")))?;
        authorization.set_sensitive(true);

        let client = reqwest::Client::builder()
            .user_agent(concat!("devops-search/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            authorization,
        })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn execute(&self, request: UpstreamRequest) -> Result<UpstreamResponse> {
        let operation = request.operation;
        tracing::debug!(%operation, url = %request.url, "Sending upstream request");

        let builder = match request.method {
            Method::Get => self.client.get(request.url),
            Method::Post => self.client.post(request.url),
        }
        .header(AUTHORIZATION, self.authorization.clone())
        .header(ACCEPT, "application/json");

        let builder = match request.body {
            Some(body) => builder.json(&body),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| Error::transport(operation, e))?;

        let status = response.status().as_u16();
        let commit_id = response
            .headers()
            .get(COMMIT_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response
            .text()
            .await
            .map_err(|e| Error::transport(operation, e))?;

        tracing::debug!(%operation, status, bytes = text.len(), "Upstream responded");

        Ok(UpstreamResponse {
            status,
            commit_id,
            body: ResponseBody::from_text(text),
        })
    }
}
