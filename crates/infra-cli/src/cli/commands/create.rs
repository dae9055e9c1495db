//! `infra create <base>`: build the layout, then optionally bootstrap charts.

use anyhow::{Context, Result};
use infra_core::config::InfraConfig;
use infra_core::layout::Layout;
use std::io;
use std::path::Path;

use super::prompt;
use super::tools::{fetch_charts, HelmCheck};

/// Whether to pull charts after creating the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolsChoice {
    Ask,
    Yes,
    Skip,
}

impl ToolsChoice {
    pub fn from_flags(yes: bool, skip_tools: bool) -> Self {
        match (yes, skip_tools) {
            (_, true) => ToolsChoice::Skip,
            (true, false) => ToolsChoice::Yes,
            (false, false) => ToolsChoice::Ask,
        }
    }
}

pub fn run_create(
    cfg: &InfraConfig,
    base: &Path,
    tools_file: Option<&Path>,
    choice: ToolsChoice,
) -> Result<()> {
    Layout::new(base)
        .create_with(|dir| println!("Created directory: {}", dir.display()))
        .context("failed to create directory structure")?;
    println!("All directories created successfully.");

    let load = match choice {
        ToolsChoice::Yes => true,
        ToolsChoice::Skip => false,
        ToolsChoice::Ask => prompt::confirm(
            &mut io::stdin().lock(),
            &mut io::stdout(),
            "Do you want to load all tools",
        )?,
    };
    if !load {
        println!("Skipping tool installation.");
        return Ok(());
    }

    if let HelmCheck::Missing = HelmCheck::run(cfg) {
        println!("Helm is not installed. Please install Helm and rerun the command: infra tools");
        return Ok(());
    }

    fetch_charts(cfg, base, tools_file, false)?;
    println!("Infrastructure setup completed successfully.");
    Ok(())
}
