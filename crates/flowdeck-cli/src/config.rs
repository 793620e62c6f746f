//! CLI configuration.
//!
//! ```text
//! Cli
//! ├── client: ReqwestConfig   # Service URL, timeout, user agent, key case
//! ├── workflow_id             # Workflow used by `show` and `push`
//! └── command: Command        # What to do
//! ```
//!
//! Every option can be given as an argument or an environment variable.

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
use flowdeck_client::NodeCategory;
use flowdeck_client::reqwest::ReqwestConfig;
use flowdeck_editor::DEFAULT_WORKFLOW_ID;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "flowdeck")]
#[command(about = "Inspect and edit workflows on the flowdeck service")]
#[command(version)]
pub struct Cli {
    /// Workflow service client configuration.
    #[clap(flatten)]
    pub client: ReqwestConfig,

    /// Workflow to show or push
    #[arg(
        long = "workflow-id",
        env = "FLOWDECK_WORKFLOW_ID",
        default_value = DEFAULT_WORKFLOW_ID,
        global = true
    )]
    pub workflow_id: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands; each prints pretty JSON to stdout.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the node catalog, or all three categories
    Nodes {
        /// Only this category (triggers, activities or controllers)
        #[arg(long)]
        category: Option<NodeCategory>,
    },
    /// Show the parameter fields of one node type
    Node {
        /// Catalog name of the node
        name: String,
    },
    /// Fetch the workflow and print it as an editor graph
    Show,
    /// Replace the workflow definition with an editor graph read from a file
    Push {
        #[arg(long)]
        file: PathBuf,
    },
    /// Convert a stored workflow definition into an editor graph, offline
    Convert {
        #[arg(long)]
        file: PathBuf,
    },
}

impl Command {
    /// Whether the command talks to the service.
    pub fn is_online(&self) -> bool {
        !matches!(self, Self::Convert { .. })
    }
}

impl Cli {
    /// Loads `.env` (if enabled) and parses the arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing from `RUST_LOG`, defaulting to `info`.
    pub fn init_tracing() -> anyhow::Result<()> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.command.is_online() {
            self.client
                .parsed_base_url()
                .context("invalid base URL")?;
        }

        anyhow::ensure!(!self.workflow_id.is_empty(), "workflow id must not be empty");
        Ok(())
    }

    /// Logs build information and configuration.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            base_url = %self.client.base_url,
            http_timeout = self.client.http_timeout,
            request_key_case = %self.client.request_key_case,
            workflow_id = %self.workflow_id,
            "Client configuration"
        );
    }

    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use flowdeck_core::case::KeyCase;

    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["flowdeck", "show"]).unwrap();
        assert_eq!(cli.workflow_id, "twflow_7c671147ef");
        assert_eq!(cli.client.base_url, "https://rubik.valyx.com");
        assert_eq!(cli.client.request_key_case, KeyCase::Camel);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_subcommand_arguments() {
        let cli = Cli::try_parse_from([
            "flowdeck",
            "nodes",
            "--category",
            "triggers",
            "--workflow-id",
            "twflow_1",
        ])
        .unwrap();
        assert_eq!(cli.workflow_id, "twflow_1");
        assert!(matches!(
            cli.command,
            Command::Nodes { category: Some(NodeCategory::Triggers) }
        ));

        assert!(Cli::try_parse_from(["flowdeck", "nodes", "--category", "loops"]).is_err());
    }

    #[test]
    fn test_invalid_base_url_is_rejected_for_online_commands() {
        let cli = Cli::try_parse_from(["flowdeck", "--base-url", "not a url", "show"]).unwrap();
        assert!(cli.validate().is_err());

        let cli = Cli::try_parse_from([
            "flowdeck",
            "--base-url",
            "not a url",
            "convert",
            "--file",
            "definition.json",
        ])
        .unwrap();
        assert!(cli.validate().is_ok());
    }
}
