//! Install and upgrade pipeline.
//!
//! One entry point, [`Installer::run`], covers both cases. The mode is decided
//! by the game directory, never by a flag:
//!
//! - **Fresh install**: `<mod_dir>` does not exist. The package license must
//!   be accepted through a [`LicenseGate`] before anything is written, then
//!   every package file is copied in.
//! - **Upgrade**: `<mod_dir>` exists. The installation is indexed and the
//!   package merged into it: existing configuration is preserved, relocated
//!   plugins are updated where they are, and nothing is deleted.
//!
//! Both modes share the same plan/apply machinery from [`crate::merge`]. On a
//! fresh install the index is empty (or holds whatever partial files exist),
//! so the plan reduces to `Create`/`Overwrite` actions.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sminstall_cli::installer::{AcceptLicense, InstallOptions, Installer};
//! use sminstall_cli::merge::MergeLayout;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let installer = Installer::new(MergeLayout::default(), InstallOptions::default());
//! let summary = installer.run(Path::new("/tmp/sourcemod"), Path::new("/srv/tf2/tf"), &mut AcceptLicense)?;
//! println!("{:?}: {} failed", summary.mode, summary.report.summary().failed);
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::core::InstallerError;
use crate::merge::{InstallationIndex, MergeExecutor, MergeLayout, MergePlanner, MergeReport, PathClassifier, PlanOptions};
use crate::utils::progress::ProgressBar;

/// Whether the run installs from scratch or upgrades an existing installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallMode {
    FreshInstall,
    Upgrade,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// Leave plugin binaries untouched on upgrade. Ignored on a fresh install.
    pub skip_plugins: bool,
    /// Plan and report without writing or asking for the license.
    pub dry_run: bool,
    pub show_progress: bool,
}

/// Decides whether the package license is accepted on a fresh install.
pub trait LicenseGate {
    /// Returns `Ok(true)` to proceed.
    ///
    /// # Errors
    ///
    /// Implementations fail when they cannot ask, e.g. a closed terminal.
    fn accept(&mut self, license: &str) -> Result<bool>;
}

/// Accepts without showing anything. Used for `--accept-license`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptLicense;

impl LicenseGate for AcceptLicense {
    fn accept(&mut self, _license: &str) -> Result<bool> {
        Ok(true)
    }
}

impl<F> LicenseGate for F
where
    F: FnMut(&str) -> Result<bool>,
{
    fn accept(&mut self, license: &str) -> Result<bool> {
        self(license)
    }
}

/// Result of one run.
#[derive(Debug, Clone, Serialize)]
pub struct InstallSummary {
    pub mode: InstallMode,
    pub dry_run: bool,
    pub report: MergeReport,
}

impl InstallSummary {
    /// Converts failed actions into [`InstallerError::UpgradeIncomplete`].
    ///
    /// # Errors
    ///
    /// When at least one action failed.
    pub fn ensure_complete(&self) -> Result<(), InstallerError> {
        let failed = self.report.failed().count();
        if failed > 0 {
            return Err(InstallerError::UpgradeIncomplete { failed });
        }
        Ok(())
    }
}

pub struct Installer {
    layout: MergeLayout,
    options: InstallOptions,
}

impl Installer {
    #[must_use]
    pub const fn new(layout: MergeLayout, options: InstallOptions) -> Self {
        Self { layout, options }
    }

    #[must_use]
    pub const fn layout(&self) -> &MergeLayout {
        &self.layout
    }

    /// Determines the mode from the game directory.
    ///
    /// # Errors
    ///
    /// [`InstallerError::TargetNotDirectory`] if the game directory exists but is a file.
    pub fn detect_mode(&self, target_root: &Path) -> Result<InstallMode, InstallerError> {
        if target_root.exists() && !target_root.is_dir() {
            return Err(InstallerError::TargetNotDirectory {
                path: target_root.to_path_buf(),
            });
        }
        if self.layout.mod_dir.to_path(target_root).is_dir() {
            Ok(InstallMode::Upgrade)
        } else {
            Ok(InstallMode::FreshInstall)
        }
    }

    /// Installs or upgrades `target_root` from the package at `source_root`.
    ///
    /// Per-file failures do not make this return an error; they are in the
    /// report (see [`InstallSummary::ensure_complete`]).
    ///
    /// # Errors
    ///
    /// - [`InstallerError::SourceTreeMissing`] / [`InstallerError::SourceTreeUnreadable`]
    ///   before anything is planned
    /// - [`InstallerError::TargetNotDirectory`]
    /// - [`InstallerError::LicenseNotFound`] or [`InstallerError::LicenseDeclined`]
    ///   on a fresh install
    pub fn run(&self, source_root: &Path, target_root: &Path, gate: &mut dyn LicenseGate) -> Result<InstallSummary> {
        if !source_root.is_dir() {
            return Err(InstallerError::SourceTreeMissing {
                path: source_root.to_path_buf(),
            }
            .into());
        }

        let mode = self.detect_mode(target_root)?;
        debug!("Installing into {} as {:?}", target_root.display(), mode);

        let plan_options = match mode {
            InstallMode::FreshInstall => {
                info!("Performing full install of SourceMod");
                if !self.options.dry_run {
                    self.confirm_license(source_root, gate)?;
                }
                PlanOptions::default()
            }
            InstallMode::Upgrade => {
                info!("Upgrading existing SourceMod installation");
                PlanOptions {
                    skip_plugins: self.options.skip_plugins,
                    new_plugins_disabled: self.layout.new_plugins_disabled,
                }
            }
        };

        let classifier = PathClassifier::new(&self.layout);
        let index = InstallationIndex::build(target_root, &classifier);
        let plan = MergePlanner::new(&classifier, &self.layout)
            .with_options(plan_options)
            .plan(source_root, &index)?;

        let report = if self.options.dry_run {
            MergeReport::from_plan(plan)
        } else {
            let progress = ProgressBar::new(plan.actions.len() as u64, self.options.show_progress);
            progress.set_prefix("Applying");
            let report = MergeExecutor::new(target_root).with_progress(progress.clone()).apply(plan);
            progress.finish_and_clear();
            report
        };

        Ok(InstallSummary {
            mode,
            dry_run: self.options.dry_run,
            report,
        })
    }

    fn confirm_license(&self, source_root: &Path, gate: &mut dyn LicenseGate) -> Result<()> {
        let license_path = self.layout.license_file().to_path(source_root);
        if !license_path.is_file() {
            return Err(InstallerError::LicenseNotFound {
                path: license_path,
            }
            .into());
        }
        let license = fs::read_to_string(&license_path)
            .with_context(|| format!("Failed to read license file: {}", license_path.display()))?;

        if gate.accept(&license)? {
            Ok(())
        } else {
            Err(InstallerError::LicenseDeclined.into())
        }
    }
}
