use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default location of the tool list, relative to the working directory.
pub const DEFAULT_TOOLS_FILE: &str = "src/list-tools.txt";

/// Archive extraction limits (optional section in config.toml).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Reject archive entries whose declared size exceeds this many bytes (None = no cap).
    #[serde(default)]
    pub max_entry_bytes: Option<u64>,
}

/// Global configuration loaded from `~/.config/infra/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfraConfig {
    /// Name or path of the helm executable.
    pub helm_binary: String,
    /// Tool list consulted when `--tools-file` is not given.
    pub tools_file: PathBuf,
    /// Optional extraction limits; if missing, built-in defaults are used.
    #[serde(default)]
    pub extract: Option<ExtractConfig>,
}

impl Default for InfraConfig {
    fn default() -> Self {
        Self {
            helm_binary: "helm".to_string(),
            tools_file: PathBuf::from(DEFAULT_TOOLS_FILE),
            extract: None,
        }
    }
}

impl InfraConfig {
    /// Extraction limits, falling back to defaults when the section is absent.
    pub fn extract_limits(&self) -> ExtractConfig {
        self.extract.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("infra")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<InfraConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = InfraConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data =
        fs::read_to_string(&path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: InfraConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
