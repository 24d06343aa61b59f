//! `AppConfig` struct and TOML read/write.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reelscout_core::Theme;
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `[omdb] api_key`.
pub const API_KEY_ENV: &str = "OMDB_API_KEY";

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// OMDb access settings.
    #[serde(default)]
    pub omdb: OmdbConfig,
    /// Interface defaults.
    #[serde(default)]
    pub ui: UiConfig,
}

/// OMDb access configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct OmdbConfig {
    /// API key sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Endpoint override (defaults to the public OMDb endpoint).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Interface configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UiConfig {
    /// Theme used until one is saved with `theme set` or `theme toggle`.
    #[serde(default)]
    pub theme: Theme,
}

impl AppConfig {
    /// Config file location.
    ///
    /// - `{dir}/config.toml` when `dir` is given.
    /// - `$XDG_CONFIG_HOME/reelscout/config.toml` when that is an absolute path.
    /// - `~/.config/reelscout/config.toml` otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if neither `XDG_CONFIG_HOME` nor `HOME` is usable.
    pub fn resolve_path(dir: Option<&Path>) -> Result<PathBuf> {
        if let Some(d) = dir {
            return Ok(d.join("config.toml"));
        }
        let root = config_root(std::env::var_os("XDG_CONFIG_HOME"), std::env::var_os("HOME"))
            .context("HOME environment variable is not set")?;
        Ok(root.join("reelscout").join("config.toml"))
    }

    /// Loads the config file for `dir` (see [`AppConfig::resolve_path`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be resolved or the file is invalid.
    pub fn load_for(dir: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(dir)?;
        tracing::debug!(path = %path.display(), "loading config");
        Self::load(&path)
    }

    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Saves config to a TOML file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config to TOML")?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }

    /// API key from [`API_KEY_ENV`], falling back to `[omdb] api_key`.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        pick_api_key(std::env::var(API_KEY_ENV).ok(), self.omdb.api_key.as_deref())
    }
}

/// Absolute `xdg_config_home` wins, otherwise `{home}/.config`.
fn config_root(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    xdg_config_home
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(|| {
            home.filter(|h| !h.is_empty())
                .map(|h| PathBuf::from(h).join(".config"))
        })
}

/// Non-blank `from_env` wins over non-blank `configured`.
fn pick_api_key(from_env: Option<String>, configured: Option<&str>) -> Option<String> {
    from_env
        .filter(|k| !k.trim().is_empty())
        .or_else(|| {
            configured
                .filter(|k| !k.trim().is_empty())
                .map(String::from)
        })
}
