//! Installer configuration
//!
//! A single optional TOML file tunes the installation layout and the release
//! endpoints. Every field has a default matching a stock SourceMod package,
//! so most operators never create one.
//!
//! # Location
//!
//! Resolved in this order:
//!
//! 1. `--config <path>` (or the `SMINSTALL_CONFIG` environment variable, which
//!    the CLI maps onto the same flag)
//! 2. `~/.sminstall/config.toml` (Windows: `%LOCALAPPDATA%\sminstall\config.toml`)
//! 3. Built-in defaults
//!
//! An explicitly named file must exist. The default file is optional.
//!
//! # Example
//!
//! ```toml
//! # Treat the bundled GeoIP database as package data, not operator config
//! refresh_config_dirs = ["addons/sourcemod/configs/geoip"]
//!
//! # New plugins land in plugins/disabled until enabled by hand
//! new_plugins_disabled = true
//!
//! default_version = "1.11"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::constants::{
    CONFIGS_SUBDIR, DEFAULT_DOWNLOADS_PAGE_URL, DEFAULT_MOD_DIR, DEFAULT_PLUGIN_EXTENSION,
    DEFAULT_RELEASE_BASE_URL, DEFAULT_USER_AGENT, DEFAULT_VERSION, GAME_CONFIG_DIR, PLUGINS_SUBDIR,
};
use crate::core::InstallerError;
use crate::merge::{MergeLayout, RelPath};

/// Settings read from `config.toml`.
///
/// Directory fields are relative to the game directory and use `/` as the
/// separator on every platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallerConfig {
    /// Mod root. Its absence in the game directory means a first install.
    pub mod_dir: String,

    /// Plugin subtree. Defaults to `<mod_dir>/plugins`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins_dir: Option<String>,

    /// Protected configuration subtrees. Defaults to `<mod_dir>/configs`
    /// and `cfg/sourcemod`; setting this replaces both.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_dirs: Option<Vec<String>>,

    /// Plugin binary extension, with or without the leading dot.
    pub plugin_extension: String,

    /// Subtrees of the config directories that ship package data and should be
    /// refreshed on upgrade.
    pub refresh_config_dirs: Vec<String>,

    pub new_plugins_disabled: bool,

    /// Release line used when neither `--version` nor `--branch` is given.
    pub default_version: String,

    pub user_agent: String,

    pub release_base_url: String,

    pub downloads_page_url: String,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            mod_dir: DEFAULT_MOD_DIR.to_string(),
            plugins_dir: None,
            config_dirs: None,
            plugin_extension: DEFAULT_PLUGIN_EXTENSION.to_string(),
            refresh_config_dirs: Vec::new(),
            new_plugins_disabled: false,
            default_version: DEFAULT_VERSION.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            release_base_url: DEFAULT_RELEASE_BASE_URL.to_string(),
            downloads_page_url: DEFAULT_DOWNLOADS_PAGE_URL.to_string(),
        }
    }
}

impl InstallerConfig {
    /// Loads from `path` when given, otherwise from the default location if
    /// that file exists, otherwise returns defaults.
    ///
    /// # Errors
    ///
    /// Fails if an explicit `path` is missing, or any file read cannot be parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from(&path).await;
        }

        match Self::default_path() {
            Ok(path) if path.exists() => Self::load_from(&path).await,
            Ok(path) => {
                debug!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(err) => {
                debug!("Config location unavailable ({err}), using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Loads and parses a specific config file.
    ///
    /// ```rust,no_run
    /// use sminstall_cli::config::InstallerConfig;
    /// use std::path::Path;
    ///
    /// # async fn example() -> anyhow::Result<()> {
    /// let config = InstallerConfig::load_from(Path::new("/etc/sminstall.toml")).await?;
    /// println!("mod dir: {}", config.mod_dir);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid TOML for this schema.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Platform-appropriate default config path.
    ///
    /// # Errors
    ///
    /// Fails when the home (or local data) directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("sminstall")
        } else {
            crate::utils::platform::get_home_dir()?.join(".sminstall")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Validates the directory settings and builds the merge layout.
    ///
    /// # Errors
    ///
    /// [`InstallerError::ConfigError`] for absolute paths, `..` segments,
    /// empty directories or an empty plugin extension.
    pub fn layout(&self) -> Result<MergeLayout, InstallerError> {
        let mod_dir = RelPath::parse(&self.mod_dir)?;
        let plugins_dir = match &self.plugins_dir {
            Some(dir) => RelPath::parse(dir)?,
            None => mod_dir.join(PLUGINS_SUBDIR),
        };
        let config_dirs = match &self.config_dirs {
            Some(dirs) => dirs.iter().map(|dir| RelPath::parse(dir)).collect::<Result<Vec<_>, _>>()?,
            None => vec![mod_dir.join(CONFIGS_SUBDIR), RelPath::normalize(GAME_CONFIG_DIR)],
        };

        let plugin_extension = self.plugin_extension.trim_start_matches('.').to_string();
        if plugin_extension.is_empty() {
            return Err(InstallerError::ConfigError {
                message: "plugin_extension must not be empty".to_string(),
            });
        }

        let refresh_config_dirs = self
            .refresh_config_dirs
            .iter()
            .map(|dir| RelPath::parse(dir))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MergeLayout {
            mod_dir,
            plugins_dir,
            config_dirs,
            plugin_extension,
            refresh_config_dirs,
            new_plugins_disabled: self.new_plugins_disabled,
        })
    }
}
