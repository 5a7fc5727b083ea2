//! Startup configuration
//!
//! Values come from, in increasing priority: an optional TOML file, the
//! environment (including a `.env` file), and command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use devops_client::Config;
use serde::Deserialize;

use crate::tools::DEFAULT_DISPLAY_NAME;
use crate::{Error, Result};

/// MCP server for Azure DevOps wiki and code search
#[derive(Parser, Debug, Default)]
#[command(name = "devops-search-mcp")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Organization URL, e.g. https://dev.azure.com/contoso
    #[arg(long, env = "AZURE_DEVOPS_ORG_URL")]
    pub org_url: Option<String>,

    /// Personal access token
    #[arg(long, env = "AZURE_DEVOPS_PAT", hide_env_values = true)]
    pub token: Option<String>,

    /// Project used when a tool call names none
    #[arg(long, env = "AZURE_DEVOPS_PROJECT")]
    pub project: Option<String>,

    /// Display name; tool names are prefixed with its snake_case form
    #[arg(long, env = "AZURE_DEVOPS_DISPLAY_NAME")]
    pub display_name: Option<String>,

    /// Directory for the audit log
    #[arg(long, env = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// TOML config file; flags and environment override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Contents of the optional TOML config file
#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    pub org_url: Option<String>,
    pub token: Option<String>,
    pub project: Option<String>,
    pub display_name: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl FileSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| Error::ConfigFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Validated settings the server runs with
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: Config,
    pub display_name: String,
    /// `None` selects the default audit directory
    pub log_dir: Option<PathBuf>,
}

impl Settings {
    /// Merge the config file (if any) under `args` and validate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigFile`] for an unreadable file and a client
    /// configuration error when the organization URL or token is missing
    /// or malformed.
    pub fn resolve(args: Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileSettings::load(path)?,
            None => FileSettings::default(),
        };
        Self::merge(args, file)
    }

    fn merge(args: Args, file: FileSettings) -> Result<Self> {
        let org_url = args.org_url.or(file.org_url).unwrap_or_default();
        let token = args.token.or(file.token).unwrap_or_default();

        let mut config = Config::new(&org_url, &token)?;
        if let Some(project) = args.project.or(file.project) {
            config = config.with_default_project(project);
        }

        Ok(Self {
            config,
            display_name: args
                .display_name
                .or(file.display_name)
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
            log_dir: args.log_dir.or(file.log_dir),
        })
    }
}
