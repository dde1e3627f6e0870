//! Directory layout of a SourceMod installation as seen by the merge engine.

use super::types::RelPath;
use crate::constants::{
    CONFIGS_SUBDIR, DEFAULT_MOD_DIR, DEFAULT_PLUGIN_EXTENSION, DISABLED_PLUGINS_SUBDIR,
    GAME_CONFIG_DIR, LICENSE_FILE, PLUGINS_SUBDIR,
};

/// Where the interesting directories live, relative to the game directory.
///
/// Built from [`crate::config::InstallerConfig::layout`] in normal runs; the
/// [`Default`] matches a stock SourceMod package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeLayout {
    /// Root of the mod itself (`addons/sourcemod`). Its absence in the
    /// target marks a first install.
    pub mod_dir: RelPath,
    /// Root of the plugin subtree searched for relocated plugins.
    pub plugins_dir: RelPath,
    /// Subtrees of protected operator configuration: the mod's own
    /// `configs` and the game-level `cfg/sourcemod`.
    pub config_dirs: Vec<RelPath>,
    /// Extension, without the dot, identifying plugin binaries.
    pub plugin_extension: String,
    /// Config subtrees that hold package data and are refreshed like ordinary files.
    pub refresh_config_dirs: Vec<RelPath>,
    /// Place brand-new plugins under `<plugins_dir>/disabled` on upgrade.
    pub new_plugins_disabled: bool,
}

impl Default for MergeLayout {
    fn default() -> Self {
        let mod_dir = RelPath::normalize(DEFAULT_MOD_DIR);
        Self {
            plugins_dir: mod_dir.join(PLUGINS_SUBDIR),
            config_dirs: vec![mod_dir.join(CONFIGS_SUBDIR), RelPath::normalize(GAME_CONFIG_DIR)],
            mod_dir,
            plugin_extension: DEFAULT_PLUGIN_EXTENSION.to_string(),
            refresh_config_dirs: Vec::new(),
            new_plugins_disabled: false,
        }
    }
}

impl MergeLayout {
    /// Directory that receives new plugins when `new_plugins_disabled` is set.
    #[must_use]
    pub fn disabled_plugins_dir(&self) -> RelPath {
        self.plugins_dir.join(DISABLED_PLUGINS_SUBDIR)
    }

    /// License file shipped inside the package.
    #[must_use]
    pub fn license_file(&self) -> RelPath {
        self.mod_dir.join(LICENSE_FILE)
    }
}
