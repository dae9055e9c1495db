//! Helm chart bootstrap.
//!
//! Reads a tool list of `helm repo add` lines and, for each one, adds the
//! repository, pulls the chart into `<base>/tools`, extracts the archive in
//! place and deletes it. A failing line is recorded and skipped; only I/O on
//! the tool list itself and the final `list-tools` cleanup are fatal.

mod helm;
mod locate;
mod parse;

pub use helm::{helm_installed, HelmCli, HelmError, HelmRunner};
pub use locate::find_chart_archive;
pub use parse::{parse_repo_line, RepoLine, REPO_ADD_PREFIX};

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::archive::{self, ExtractSummary};
use crate::checksum;
use crate::config::ExtractConfig;
use crate::layout::TOOLS_DIR;

/// Directory under the base path removed once all charts are processed.
pub const LIST_TOOLS_DIR: &str = "list-tools";

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error(
        "invalid repo line: {0}. Format should be: helm repo add <repo_name> <repo_url> <chart_name>"
    )]
    InvalidLine(String),
    #[error("no .tgz file found for chart {0}")]
    ArchiveNotFound(String),
    #[error("error reading directory {path}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A chart that was pulled and extracted.
#[derive(Debug, Clone, Serialize)]
pub struct InstalledChart {
    #[serde(flatten)]
    pub repo: RepoLine,
    /// File name of the pulled archive (deleted after extraction).
    pub archive: String,
    pub sha256: String,
    pub extracted: ExtractSummary,
}

/// A tool-list line that could not be processed.
#[derive(Debug, Clone, Serialize)]
pub struct FailedLine {
    /// 1-based line number in the tool list.
    pub line_no: usize,
    pub line: String,
    pub error: String,
}

/// Outcome of one pass over the tool list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchReport {
    pub installed: Vec<InstalledChart>,
    pub failed: Vec<FailedLine>,
    pub list_tools_removed: bool,
}

impl FetchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Progress notifications emitted while fetching, in order.
#[derive(Debug)]
pub enum FetchEvent<'a> {
    AddingRepo(&'a RepoLine),
    PullingChart(&'a RepoLine),
    Installed(&'a InstalledChart),
    Failed(&'a FailedLine),
}

/// Pulls and unpacks charts into `<base>/tools` using a [`HelmRunner`].
#[derive(Debug)]
pub struct ChartFetcher<H> {
    base: PathBuf,
    helm: H,
    limits: ExtractConfig,
}

/// Lossy so a stray non-UTF-8 byte in a comment cannot abort the run; only the
/// ASCII `helm repo add` lines matter. A trailing `\r` is dropped.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

impl<H: HelmRunner> ChartFetcher<H> {
    pub fn new(base: impl Into<PathBuf>, helm: H) -> Self {
        Self {
            base: base.into(),
            helm,
            limits: ExtractConfig::default(),
        }
    }

    pub fn with_limits(mut self, limits: ExtractConfig) -> Self {
        self.limits = limits;
        self
    }

    pub fn tools_dir(&self) -> PathBuf {
        self.base.join(TOOLS_DIR)
    }

    pub fn list_tools_dir(&self) -> PathBuf {
        self.base.join(LIST_TOOLS_DIR)
    }

    pub fn add_and_pull_charts(&self, list_file: &Path) -> Result<FetchReport> {
        self.add_and_pull_charts_with(list_file, |_| {})
    }

    /// Process every `helm repo add` line of `list_file`, reporting progress to `on_event`.
    pub fn add_and_pull_charts_with(
        &self,
        list_file: &Path,
        mut on_event: impl FnMut(FetchEvent<'_>),
    ) -> Result<FetchReport> {
        let file = File::open(list_file)
            .with_context(|| format!("error opening file {}", list_file.display()))?;

        let mut report = FetchReport::default();
        for (idx, line) in BufReader::new(file).split(b'\n').enumerate() {
            let line =
                line.with_context(|| format!("error reading file {}", list_file.display()))?;
            let line = decode_line(&line);
            let Some(parsed) = parse_repo_line(&line) else {
                continue;
            };

            let outcome = parsed
                .map_err(anyhow::Error::from)
                .and_then(|repo| self.install(repo, &mut on_event));
            match outcome {
                Ok(installed) => {
                    on_event(FetchEvent::Installed(&installed));
                    report.installed.push(installed);
                }
                Err(err) => {
                    tracing::warn!(line = idx + 1, "error processing helm repo command: {:#}", err);
                    let failed = FailedLine {
                        line_no: idx + 1,
                        line,
                        error: format!("{err:#}"),
                    };
                    on_event(FetchEvent::Failed(&failed));
                    report.failed.push(failed);
                }
            }
        }

        let list_tools = self.list_tools_dir();
        report.list_tools_removed = archive::remove_dir_if_exists(&list_tools)
            .with_context(|| format!("error removing {} directory", list_tools.display()))?;
        if report.list_tools_removed {
            tracing::debug!(path = %list_tools.display(), "removed list-tools directory");
        }

        tracing::info!(
            installed = report.installed.len(),
            failed = report.failed.len(),
            "chart fetch finished"
        );
        Ok(report)
    }

    fn install(
        &self,
        repo: RepoLine,
        on_event: &mut impl FnMut(FetchEvent<'_>),
    ) -> Result<InstalledChart> {
        let tools = self.tools_dir();

        on_event(FetchEvent::AddingRepo(&repo));
        tracing::info!(repo = %repo.repo_name, url = %repo.repo_url, "adding repository");
        self.helm
            .repo_add(&repo.repo_name, &repo.repo_url)
            .with_context(|| format!("error adding repo {}", repo.repo_name))?;

        on_event(FetchEvent::PullingChart(&repo));
        tracing::info!(repo = %repo.repo_name, chart = %repo.chart_name, "pulling chart");
        fs::create_dir_all(&tools)
            .with_context(|| format!("error creating directory {}", tools.display()))?;
        self.helm
            .pull(&repo.repo_name, &repo.chart_name, &tools)
            .with_context(|| format!("error pulling chart {}", repo.chart_name))?;

        let archive_path = find_chart_archive(&tools, &repo.chart_name)
            .with_context(|| format!("error finding .tgz file for chart {}", repo.chart_name))?;
        let sha256 = checksum::sha256_path(&archive_path)?;
        tracing::debug!(archive = %archive_path.display(), %sha256, "pulled chart archive");

        let extracted = archive::extract_tgz_with(&archive_path, &self.limits)
            .with_context(|| format!("error extracting chart {}", repo.chart_name))?;

        fs::remove_file(&archive_path).with_context(|| {
            format!("error removing .tgz file {}", archive_path.display())
        })?;

        let archive_name = archive_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(InstalledChart {
            repo,
            archive: archive_name,
            sha256,
            extracted,
        })
    }
}
