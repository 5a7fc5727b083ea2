//! Azure DevOps Search MCP Server
//!
//! # Usage
//!
//! ```bash
//! devops-search-mcp --org-url https://dev.azure.com/contoso --token <pat> [--project <name>]
//! ```
//!
//! # Environment Variables
//!
//! - `AZURE_DEVOPS_ORG_URL`, `AZURE_DEVOPS_PAT`, `AZURE_DEVOPS_PROJECT`,
//!   `AZURE_DEVOPS_DISPLAY_NAME`, `LOG_DIR`: fallbacks for the flags
//! - `RUST_LOG`: Control log verbosity (default: `devops_search_mcp=info`)
//!
//! A `.env` file in the working directory is loaded first.
//!
//! # Protocol
//!
//! Requests and responses go through stdin/stdout, one JSON message per
//! line. Logs go to stderr.

use clap::Parser;
use devops_search_mcp::{Args, SearchMcpServer, Settings};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging to stderr (stdout is reserved for the protocol)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("devops_search_mcp=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let settings = match Settings::resolve(args) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    tracing::info!(
        org_url = %settings.config.org_url(),
        project = settings.config.default_project(),
        "Starting devops-search-mcp server"
    );

    let server = SearchMcpServer::from_settings(settings)?;
    server.run().await?;

    Ok(())
}
