//! TOML configuration for both tools.
//!
//! Every section is optional. A missing config file is not an error for the
//! `tidy` binary: it falls back to [`Config::minimal`], which carries the
//! documented defaults (`mongodb://localhost:27017`, a 10 MiB folder-mode
//! cutoff, `file_contents.txt` as the export name).

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub viewer: ViewerConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Settings for the cleanup tool's database connection and listings.
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_uri")]
    pub default_uri: String,
    /// Databases hidden from the listing. They can still be named explicitly.
    #[serde(default = "default_reserved")]
    pub reserved: Vec<String>,
    #[serde(default = "default_selection_timeout")]
    pub server_selection_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_uri: default_uri(),
            reserved: default_reserved(),
            server_selection_timeout_secs: default_selection_timeout(),
        }
    }
}

fn default_uri() -> String {
    "mongodb://localhost:27017".to_string()
}
fn default_reserved() -> Vec<String> {
    vec![
        "admin".to_string(),
        "config".to_string(),
        "local".to_string(),
    ]
}
fn default_selection_timeout() -> u64 {
    5
}

/// Settings for file ingestion and presentation.
#[derive(Debug, Deserialize, Clone)]
pub struct ViewerConfig {
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    #[serde(default = "default_export_name")]
    pub export_name: String,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            export_name: default_export_name(),
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

/// 10 MiB.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

fn default_max_file_bytes() -> u64 {
    DEFAULT_MAX_FILE_BYTES
}
fn default_export_name() -> String {
    "file_contents.txt".to_string()
}
fn default_include_globs() -> Vec<String> {
    vec!["**/*".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8501".to_string()
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Loads `path` if it exists, otherwise returns [`Config::minimal`].
///
/// A file that exists but fails to parse or validate is still an error.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::minimal())
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.store.default_uri.trim().is_empty() {
        bail!("store.default_uri must not be empty");
    }

    if config.viewer.max_file_bytes == 0 {
        bail!("viewer.max_file_bytes must be > 0");
    }

    if config.viewer.export_name.trim().is_empty() {
        bail!("viewer.export_name must not be empty");
    }

    if config.server.bind.trim().is_empty() {
        bail!("server.bind must not be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn minimal_has_documented_defaults() {
        let cfg = Config::minimal();
        assert_eq!(cfg.store.default_uri, "mongodb://localhost:27017");
        assert_eq!(cfg.store.reserved, vec!["admin", "config", "local"]);
        assert_eq!(cfg.viewer.max_file_bytes, 10 * 1024 * 1024);
        assert_eq!(cfg.viewer.export_name, "file_contents.txt");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tidy.toml");
        std::fs::write(&path, "[store]\ndefault_uri = \"mongodb://db:27017\"\n").unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.store.default_uri, "mongodb://db:27017");
        assert_eq!(cfg.store.reserved.len(), 3);
        assert_eq!(cfg.server.bind, "127.0.0.1:8501");
    }

    #[test]
    fn zero_size_cutoff_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tidy.toml");
        std::fs::write(&path, "[viewer]\nmax_file_bytes = 0\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("max_file_bytes"));
    }

    #[test]
    fn missing_file_falls_back() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_or_default(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.viewer.export_name, "file_contents.txt");
    }
}
