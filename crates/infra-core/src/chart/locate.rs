use std::fs;
use std::path::{Path, PathBuf};

use super::ChartError;

/// Find the archive `helm pull` wrote for `chart` in `dir`: `<chart>-<version>.tgz`.
///
/// Names whose version part starts with a digit (or `v` + digit) win over other
/// prefix matches, so `redis-18.1.0.tgz` is chosen over `redis-cluster-9.0.0.tgz`.
/// Ties are broken by file name.
pub fn find_chart_archive(dir: &Path, chart: &str) -> Result<PathBuf, ChartError> {
    let entries = fs::read_dir(dir).map_err(|source| ChartError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let prefix = format!("{chart}-");
    let mut candidates: Vec<(bool, String)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ChartError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if let Some(rest) = name.strip_prefix(&prefix) {
            if name.ends_with(".tgz") {
                candidates.push((!looks_like_version(rest), name));
            }
        }
    }

    candidates.sort();
    candidates
        .into_iter()
        .next()
        .map(|(_, name)| dir.join(name))
        .ok_or_else(|| ChartError::ArchiveNotFound(chart.to_string()))
}

fn looks_like_version(rest: &str) -> bool {
    let rest = rest.strip_prefix('v').unwrap_or(rest);
    rest.starts_with(|c: char| c.is_ascii_digit())
}
