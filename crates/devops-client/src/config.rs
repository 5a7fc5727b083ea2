//! Connection configuration
//!
//! A [`Config`] is built once at startup and shared by reference with every
//! request. Construction fails fast when the organization URL or the access
//! token is missing, so no invocation is ever accepted without them.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use url::Url;

use crate::error::{Error, Operation, Result};
use crate::urls;

/// Validated connection settings for one Azure DevOps organization
#[derive(Clone)]
pub struct Config {
    org_url: Url,
    search_url: Url,
    token: String,
    default_project: Option<String>,
}

impl Config {
    /// Create a configuration from an organization URL and a personal access token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when either value is blank, the URL does not
    /// parse, or it is not an http(s) URL.
    pub fn new(org_url: &str, token: &str) -> Result<Self> {
        let org_url = org_url.trim();
        let token = token.trim();
        if org_url.is_empty() || token.is_empty() {
            return Err(Error::config(
                "Azure DevOps organization URL and personal access token are required",
            ));
        }

        let org_url = Url::parse(org_url)
            .map_err(|e| Error::config(format!("invalid organization URL `{org_url}`: {e}")))?;
        if !matches!(org_url.scheme(), "http" | "https") || org_url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "organization URL must be an http(s) URL, got `{org_url}`"
            )));
        }

        let search_url = urls::search_base(&org_url);

        Ok(Self {
            org_url,
            search_url,
            token: token.to_string(),
            default_project: None,
        })
    }

    /// Set the project used when a caller does not name one
    pub fn with_default_project(mut self, project: impl Into<String>) -> Self {
        let project = project.into();
        self.default_project = (!project.trim().is_empty()).then(|| project.trim().to_string());
        self
    }

    /// Organization URL, e.g. `https://dev.azure.com/contoso`
    pub fn org_url(&self) -> &Url {
        &self.org_url
    }

    /// Search service URL derived from the organization URL
    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    pub fn default_project(&self) -> Option<&str> {
        self.default_project.as_deref()
    }

    /// Pick the caller's project, falling back to the configured default.
    ///
    /// # Errors
    ///
    /// Returns a validation error when neither is available.
    pub fn resolve_project(&self, requested: Option<&str>, operation: Operation) -> Result<String> {
        requested
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .or(self.default_project.as_deref())
            .map(str::to_string)
            .ok_or_else(|| Error::missing_project(operation))
    }

    /// `Authorization` header value: basic auth with an empty user name
    pub fn authorization_header(&self) -> String {
        format!("Basic {}", STANDARD.encode(format!(":{}", self.token)))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("org_url", &self.org_url.as_str())
            .field("search_url", &self.search_url.as_str())
            .field("token", &"<redacted>")
            .field("default_project", &self.default_project)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "token")]
    #[case("https://dev.azure.com/contoso", "")]
    #[case("   ", "   ")]
    fn missing_values_fail_fast(#[case] org: &str, #[case] token: &str) {
        let err = Config::new(org, token).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("organization URL"));
    }

    #[rstest]
    #[case("not a url")]
    #[case("ftp://dev.azure.com/contoso")]
    #[case("mailto:ops@contoso.com")]
    fn malformed_urls_are_rejected(#[case] org: &str) {
        let err = Config::new(org, "token").unwrap_err();
        assert!(matches!(err, Error::Config { .. }), "{err}");
    }

    #[test]
    fn authorization_header_uses_empty_user_name() {
        let config = Config::new("https://dev.azure.com/contoso", "secret").unwrap();
        // base64(":secret")
        assert_eq!(config.authorization_header(), "Basic OnNlY3JldA==");
    }

    #[test]
    fn project_resolution_prefers_caller() {
        let config = Config::new("https://dev.azure.com/contoso", "t")
            .unwrap()
            .with_default_project("Platform");

        assert_eq!(
            config
                .resolve_project(Some("Infra"), Operation::WikiSearch)
                .unwrap(),
            "Infra"
        );
        assert_eq!(
            config.resolve_project(None, Operation::WikiSearch).unwrap(),
            "Platform"
        );
        assert_eq!(
            config
                .resolve_project(Some("  "), Operation::WikiSearch)
                .unwrap(),
            "Platform"
        );
    }

    #[test]
    fn unresolvable_project_is_a_validation_error() {
        let config = Config::new("https://dev.azure.com/contoso", "t").unwrap();
        let err = config
            .resolve_project(None, Operation::CodeSearch)
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn blank_default_project_is_ignored() {
        let config = Config::new("https://dev.azure.com/contoso", "t")
            .unwrap()
            .with_default_project("  ");
        assert_eq!(config.default_project(), None);
    }

    #[test]
    fn debug_output_redacts_token() {
        let config = Config::new("https://dev.azure.com/contoso", "super-secret").unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
