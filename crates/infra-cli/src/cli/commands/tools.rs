//! `infra tools <base>`: add repos, pull and extract every chart in the tool list.
//! With `--json`, stdout carries only the report.

use anyhow::{Context, Result};
use infra_core::chart::{helm_installed, ChartFetcher, FetchEvent, FetchReport, HelmCli};
use infra_core::config::InfraConfig;
use std::path::{Path, PathBuf};

pub(super) enum HelmCheck {
    Found,
    Missing,
}

impl HelmCheck {
    pub(super) fn run(cfg: &InfraConfig) -> Self {
        if helm_installed(&cfg.helm_binary) {
            HelmCheck::Found
        } else {
            tracing::warn!(binary = %cfg.helm_binary, "helm not found");
            HelmCheck::Missing
        }
    }
}

pub fn run_tools(
    cfg: &InfraConfig,
    base: &Path,
    tools_file: Option<&Path>,
    json: bool,
) -> Result<()> {
    if let HelmCheck::Missing = HelmCheck::run(cfg) {
        anyhow::bail!(
            "Helm is not installed (looked for `{}`); install Helm and rerun",
            cfg.helm_binary
        );
    }

    let report = fetch_charts(cfg, base, tools_file, json)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Installed {} chart(s), {} failed.",
            report.installed.len(),
            report.failed.len()
        );
    }
    Ok(())
}

pub(super) fn fetch_charts(
    cfg: &InfraConfig,
    base: &Path,
    tools_file: Option<&Path>,
    quiet: bool,
) -> Result<FetchReport> {
    let list = resolve_tools_file(cfg, tools_file);
    // quiet callers print a machine-readable report on stdout; keep helm off it
    let helm = HelmCli::new(cfg.helm_binary.clone()).with_stdout_to_stderr(quiet);
    let fetcher = ChartFetcher::new(base, helm).with_limits(cfg.extract_limits());
    fetcher
        .add_and_pull_charts_with(&list, |event| {
            if !quiet {
                print_event(&event);
            }
        })
        .context("failed to add and pull Helm charts")
}

fn resolve_tools_file(cfg: &InfraConfig, tools_file: Option<&Path>) -> PathBuf {
    tools_file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cfg.tools_file.clone())
}

fn print_event(event: &FetchEvent<'_>) {
    match event {
        FetchEvent::AddingRepo(repo) => println!("Adding repository: {}", repo.repo_name),
        FetchEvent::PullingChart(repo) => println!(
            "Pulling chart for repo: {}, chart: {}",
            repo.repo_name, repo.chart_name
        ),
        FetchEvent::Installed(chart) => println!(
            "Extracted {} ({} entries, sha256 {})",
            chart.archive,
            chart.extracted.entries_written(),
            chart.sha256
        ),
        FetchEvent::Failed(failed) => {
            println!("Error processing Helm repo command: {}", failed.error)
        }
    }
}
