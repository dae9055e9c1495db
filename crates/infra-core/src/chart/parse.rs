//! Parse `helm repo add <repo_name> <repo_url> <chart_name>` lines from the tool list.

use serde::Serialize;

use super::ChartError;

/// Prefix that marks a line as a chart to install. Every other line is ignored.
pub const REPO_ADD_PREFIX: &str = "helm repo add";

/// One chart to install, taken from a `helm repo add` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoLine {
    pub repo_name: String,
    pub repo_url: String,
    pub chart_name: String,
}

/// `None` for lines without the prefix; `Some(Err)` when the line has too few tokens.
/// Tokens past the chart name are ignored.
pub fn parse_repo_line(line: &str) -> Option<Result<RepoLine, ChartError>> {
    if !line.starts_with(REPO_ADD_PREFIX) {
        return None;
    }
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 6 {
        return Some(Err(ChartError::InvalidLine(line.to_string())));
    }
    Some(Ok(RepoLine {
        repo_name: parts[3].to_string(),
        repo_url: parts[4].to_string(),
        chart_name: parts[5].to_string(),
    }))
}
