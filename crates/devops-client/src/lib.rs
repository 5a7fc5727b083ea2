//! Azure DevOps search client
//!
//! This crate turns loosely-typed search and retrieval requests into calls
//! against the Azure DevOps REST API and shapes the answers into stable
//! result types.
//!
//! # Architecture
//!
//! ```text
//! [ query (caller input) ]
//!        | normalize
//!        v
//! [ UpstreamRequest ] --> [ Upstream (HTTP or mock) ]
//!                                 |
//!                                 v
//! [ results (stable shapes) ] <-- transform
//! ```
//!
//! # Operations
//!
//! - Wiki search over one project
//! - Code search with repository, branch, path, extension and element filters
//! - Code retrieval of a single file from a Git repository
//! - Wiki page retrieval with optional child pages

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod query;
pub mod results;
pub mod transform;
pub mod upstream;
pub mod urls;

pub use client::DevOpsClient;
pub use config::Config;
pub use error::{Error, Operation, Result};
pub use query::{
    CodeElement, CodeRetrievalQuery, CodeSearchQuery, RecursionLevel, WikiPageQuery, WikiSearchQuery,
    from_arguments,
};
pub use results::{CodeMatch, CodeSearchHit, RetrievedFile, SearchResults, WikiPage, WikiSearchHit};
pub use upstream::{HttpUpstream, Method, ResponseBody, Upstream, UpstreamRequest, UpstreamResponse};
