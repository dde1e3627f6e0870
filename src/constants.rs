//! Global constants used throughout the sminstall codebase.
//!
//! Directory names, release endpoints and retry parameters live here so the
//! defaults in [`crate::config::InstallerConfig`] and the tests agree.

use std::time::Duration;

/// Mod root inside a game directory.
pub const DEFAULT_MOD_DIR: &str = "addons/sourcemod";

/// Plugin subtree, relative to the mod root.
pub const PLUGINS_SUBDIR: &str = "plugins";

/// Operator configuration, relative to the mod root.
pub const CONFIGS_SUBDIR: &str = "configs";

/// Game-level configuration written by SourceMod on first start, relative to
/// the game directory.
pub const GAME_CONFIG_DIR: &str = "cfg/sourcemod";

/// Where SourceMod keeps plugins that should not load.
pub const DISABLED_PLUGINS_SUBDIR: &str = "disabled";

/// Compiled plugin extension.
pub const DEFAULT_PLUGIN_EXTENSION: &str = "smx";

/// License shipped at the mod root of every package.
pub const LICENSE_FILE: &str = "LICENSE.txt";

/// Release line installed when neither `--version` nor `--branch` is given.
pub const DEFAULT_VERSION: &str = "1.10";

/// User agent sent to sourcemod.net.
pub const DEFAULT_USER_AGENT: &str = "SourceMod Update Utility";

/// Base of the `latest.php` redirect endpoint.
pub const DEFAULT_RELEASE_BASE_URL: &str = "https://sourcemod.net";

/// Page listing downloads for a branch.
pub const DEFAULT_DOWNLOADS_PAGE_URL: &str = "https://www.sourcemod.net/downloads.php";

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV_VAR: &str = "SMINSTALL_CONFIG";

/// Starting delay for exponential backoff on metadata requests (200ms).
pub const FETCH_BACKOFF_START_MS: u64 = 200;

/// Maximum backoff delay between metadata request attempts (2s).
pub const FETCH_BACKOFF_MAX_DELAY: Duration = Duration::from_secs(2);

/// Number of retries after the first failed metadata request.
pub const FETCH_RETRIES: usize = 3;

/// Timeout for a single HTTP request (including the archive download).
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(300);

pub const LICENSE_PROMPT: &str = "\
SourceMod is licensed under GPLv3.  For more information, see https://www.sourcemod.net/license.php
You must acknowledge and comply with the license agreement to install and use SourceMod.
Proceed with installation?";
