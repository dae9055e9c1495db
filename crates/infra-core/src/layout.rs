//! Fixed directory tree of an infrastructure repository.
//!
//! `Layout::create` behaves like `mkdir -p` for each entry, so running it
//! twice over the same base path is harmless.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directories created under the base path, in creation order.
pub const DIRECTORIES: &[&str] = &[
    "app/app1",
    "app/app2",
    "terraform/dev",
    "terraform/production",
    "terraform/staging",
    "tools/app-tools",
    "tools/argocd-installer-prod",
    "tools/argocd-installer-staging",
    "tools/list-tools/argocd",
    "tools/list-tools/prometheus",
    "tools/list-tools/elk",
    "tools/list-tools/grafana",
    "tools/list-tools/redis",
    "tools/list-tools/mongo",
    "tools/list-tools/kafka",
    "tools/list-tools/outline",
    "tools/list-tools/vault",
];

/// Subdirectory that receives pulled and extracted charts.
pub const TOOLS_DIR: &str = "tools";

/// Directory tree rooted at a base path.
#[derive(Debug, Clone)]
pub struct Layout {
    base: PathBuf,
}

impl Layout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn tools_dir(&self) -> PathBuf {
        self.base.join(TOOLS_DIR)
    }

    /// Every directory of the layout joined onto the base path.
    pub fn directories(&self) -> Vec<PathBuf> {
        DIRECTORIES.iter().map(|d| self.base.join(d)).collect()
    }

    /// Creates every directory in order, stopping at the first failure.
    /// Calls `on_created` after each directory so callers can report progress.
    pub fn create_with(&self, mut on_created: impl FnMut(&Path)) -> Result<Vec<PathBuf>> {
        let dirs = self.directories();
        for dir in &dirs {
            fs::create_dir_all(dir)
                .with_context(|| format!("error creating directory {}", dir.display()))?;
            tracing::debug!(path = %dir.display(), "created directory");
            on_created(dir);
        }
        Ok(dirs)
    }

    pub fn create(&self) -> Result<Vec<PathBuf>> {
        self.create_with(|_| {})
    }
}
