//! CLI for the infra repository scaffolder.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use infra_core::config;
use std::path::PathBuf;

use commands::{run_create, run_layout, run_tools, ToolsChoice};

/// Top-level CLI for the infra scaffolder.
#[derive(Debug, Parser)]
#[command(name = "infra")]
#[command(about = "Scaffold an infrastructure repository and bootstrap its Helm charts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Create the directory layout, then optionally pull the Helm charts.
    Create {
        /// Base folder of the new repository.
        base: PathBuf,
        /// Tool list of `helm repo add` lines (default from config: src/list-tools.txt).
        #[arg(long, value_name = "PATH")]
        tools_file: Option<PathBuf>,
        /// Load all tools without asking.
        #[arg(long, short = 'y', conflicts_with = "skip_tools")]
        yes: bool,
        /// Only create directories; never pull charts.
        #[arg(long)]
        skip_tools: bool,
    },

    /// Add the Helm repositories and pull/extract every chart in the tool list.
    Tools {
        /// Base folder of the repository.
        base: PathBuf,
        /// Tool list of `helm repo add` lines (default from config: src/list-tools.txt).
        #[arg(long, value_name = "PATH")]
        tools_file: Option<PathBuf>,
        /// Print the fetch report as JSON instead of progress lines.
        #[arg(long)]
        json: bool,
    },

    /// Print the directories `create` would make, without touching the disk.
    Layout {
        /// Base folder of the repository.
        base: PathBuf,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Create {
                base,
                tools_file,
                yes,
                skip_tools,
            } => {
                let choice = ToolsChoice::from_flags(yes, skip_tools);
                run_create(&cfg, &base, tools_file.as_deref(), choice)?;
            }
            CliCommand::Tools {
                base,
                tools_file,
                json,
            } => run_tools(&cfg, &base, tools_file.as_deref(), json)?,
            CliCommand::Layout { base } => run_layout(&base),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
