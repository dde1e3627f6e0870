//! Applying a merge plan to the installation.
//!
//! The executor is the only part of the merge engine that writes. Every
//! writing action goes through [`atomic_copy`], so an interrupted run leaves
//! each target with either its old or its new bytes. Nothing is ever
//! deleted: files in the installation that the package does not mention are
//! not visited at all.
//!
//! A failed action is recorded as [`Outcome::Failed`] and the remaining
//! actions still run. There is no rollback; re-running the same command
//! retries exactly the failed entries, since everything else now reports
//! [`Outcome::Unchanged`].

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::planner::MergePlan;
use super::report::{MergeReport, ReportEntry};
use super::types::{ActionKind, MergeAction, Outcome};
use crate::utils::fs::{atomic_copy, files_identical};
use crate::utils::progress::ProgressBar;

pub struct MergeExecutor {
    target_root: PathBuf,
    progress: Option<ProgressBar>,
}

impl MergeExecutor {
    #[must_use]
    pub fn new(target_root: &Path) -> Self {
        Self {
            target_root: target_root.to_path_buf(),
            progress: None,
        }
    }

    /// Advances `progress` once per action.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Executes every action in plan order and reports each outcome.
    ///
    /// Never returns an error: per-file problems become [`Outcome::Failed`]
    /// entries and plan warnings are carried into the report.
    pub fn apply(&self, plan: MergePlan) -> MergeReport {
        let mut entries = Vec::with_capacity(plan.actions.len());

        for action in plan.actions {
            let outcome = self.apply_one(&action);
            match &outcome {
                Outcome::Failed { reason } => {
                    warn!(target: "merge::apply", "Failed to {} {}: {}", action.kind, action.target, reason);
                }
                Outcome::Applied => info!(target: "merge::apply", "{} {}", action.kind, action.target),
                _ => debug!(target: "merge::apply", "{} {}: {:?}", action.kind, action.target, outcome),
            }
            if let Some(progress) = &self.progress {
                progress.inc(1);
            }
            entries.push(ReportEntry { action, outcome });
        }

        MergeReport {
            entries,
            warnings: plan.warnings,
        }
    }

    /// Absolute path an action writes to. Relocations keep the path the
    /// file was found at during indexing.
    #[must_use]
    pub fn resolve_target(&self, action: &MergeAction) -> PathBuf {
        match (&action.kind, &action.existing) {
            (ActionKind::RelocateOverwrite, Some(existing)) => existing.clone(),
            _ => action.target.to_path(&self.target_root),
        }
    }

    fn apply_one(&self, action: &MergeAction) -> Outcome {
        if !action.kind.writes() {
            return Outcome::Skipped;
        }

        let target = self.resolve_target(action);
        match files_identical(&action.source.source, &target) {
            Ok(true) => return Outcome::Unchanged,
            Ok(false) => {}
            Err(err) => {
                return Outcome::Failed {
                    reason: format!("{err:#}"),
                };
            }
        }

        match atomic_copy(&action.source.source, &target) {
            Ok(bytes) => {
                debug!(target: "merge::apply", "Wrote {} bytes to {}", bytes, target.display());
                Outcome::Applied
            }
            Err(err) => Outcome::Failed {
                reason: format!("{err:#}"),
            },
        }
    }
}
