//! Shared test utilities for the devops-search workspace.
//!
//! This crate is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`upstream`]: [`MockUpstream`], a scripted stand-in for Azure DevOps
//! - [`fixtures`]: configurations and canned upstream payloads

pub mod fixtures;
pub mod upstream;

pub use fixtures::{TEST_ORG_URL, TEST_PROJECT, TEST_TOKEN, log_dir, test_config, test_config_with_project};
pub use upstream::MockUpstream;
