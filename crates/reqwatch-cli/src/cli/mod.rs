//! CLI for the reqwatch request watcher.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use reqwatch_core::config::{self, WatcherConfig};
use std::path::{Path, PathBuf};

use commands::{run_check, run_completions, run_config_path, run_watch};

/// Top-level CLI for reqwatch.
#[derive(Debug, Parser)]
#[command(name = "reqwatch")]
#[command(about = "reqwatch: flag media and file downloads in browser network traffic", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the XDG config dir.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Read JSON-lines host events and print matched requests as JSON lines.
    Watch {
        /// Event file (default: stdin).
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// JSON object mapping tab ids to {"title", "url"}.
        #[arg(long, value_name = "FILE")]
        tabs: Option<PathBuf>,
    },

    /// Evaluate the configured rules against a URL and response headers.
    Check {
        /// Response URL.
        url: String,

        /// Request method used for the tracking pre-filter.
        #[arg(long, default_value = "GET")]
        method: String,

        /// Response header as "Name: value" (repeatable).
        #[arg(long = "header", short = 'H', value_name = "HEADER")]
        headers: Vec<String>,
    },

    /// Print the config file path.
    ConfigPath,

    /// Print shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Watch { input, tabs } => {
                let cfg = load_config(cli.config.as_deref())?;
                run_watch(&cfg, input.as_deref(), tabs.as_deref()).await?;
            }
            CliCommand::Check {
                url,
                method,
                headers,
            } => {
                let cfg = load_config(cli.config.as_deref())?;
                run_check(&cfg, &url, &method, &headers)?;
            }
            CliCommand::ConfigPath => run_config_path(cli.config.as_deref())?,
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(())
    }
}

fn load_config(path: Option<&Path>) -> Result<WatcherConfig> {
    let cfg = match path {
        Some(p) => config::load_from_path(p)?,
        None => config::load_or_init()?,
    };
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

#[cfg(test)]
mod tests;
