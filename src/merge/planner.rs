//! Merge planning: deciding what happens to every file in the package.
//!
//! Planning is pure with respect to the installation: it reads the source
//! tree and consults a prebuilt [`InstallationIndex`], and never writes. The
//! result is an ordered [`MergePlan`] that the executor applies later.
//!
//! # Decision table
//!
//! | Category | Installation state | Action |
//! |---|---|---|
//! | `Config` | same path exists | `SkipPreserve` |
//! | `Config` | absent | `Create` |
//! | `PluginBinary` | installed at its own package path | `RelocateOverwrite` at that path |
//! | `PluginBinary` | no usable file with that name anywhere under plugins | `Create` at source path |
//! | `PluginBinary` | exactly one usable | `RelocateOverwrite` at the existing path |
//! | `PluginBinary` | several usable | `RelocateOverwrite` at the first in segment-wise order + warning |
//! | `PluginSupport`/`Ordinary` | same path exists | `Overwrite` |
//! | `PluginSupport`/`Ordinary` | absent | `Create` |
//!
//! A plugin's own package path always wins over a same-named file elsewhere.
//! Relocation only considers installed files that are not themselves the
//! package path of another plugin and that no earlier action already writes,
//! so a package shipping `plugins/x.smx` and `plugins/disabled/x.smx` settles
//! after one run instead of swapping contents between the two.
//!
//! Ties are broken by [`RelPath`] ordering, which compares segment by
//! segment: `plugins/a/x.smx` comes before `plugins/a-b/x.smx` even though
//! `-` sorts before `/` as plain text.
//!
//! Source files are visited in [`RelPath`] order so the same trees always
//! produce the same plan.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use super::classifier::PathClassifier;
use super::index::{IndexedFile, InstallationIndex};
use super::layout::MergeLayout;
use super::types::{ActionKind, Category, FileEntry, MergeAction, RelPath, SkipReason};
use crate::core::{InstallerError, MergeWarning};

/// Upgrade-only planning switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanOptions {
    /// Preserve every plugin binary instead of updating it.
    pub skip_plugins: bool,
    /// Create brand-new plugins under the disabled directory.
    pub new_plugins_disabled: bool,
}

/// The ordered, fully decided list of actions for one run.
#[derive(Debug, Clone, Default)]
pub struct MergePlan {
    pub actions: Vec<MergeAction>,
    pub warnings: Vec<MergeWarning>,
}

impl MergePlan {
    /// Number of actions of a given kind.
    #[must_use]
    pub fn count(&self, kind: ActionKind) -> usize {
        self.actions.iter().filter(|action| action.kind == kind).count()
    }

    #[must_use]
    pub fn find(&self, target: &RelPath) -> Option<&MergeAction> {
        self.actions.iter().find(|action| &action.target == target)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Targets other package files have a stronger claim on.
struct Claims<'a> {
    /// Package paths of every plugin binary in the package.
    package_plugins: &'a HashSet<RelPath>,
    /// Targets already written by earlier actions, with their source.
    writers: &'a HashMap<RelPath, RelPath>,
}

/// Installed files a plugin at `rel` may update, first in segment-wise order.
///
/// An installed file at `rel` itself is the only candidate. Otherwise files
/// at another plugin's package path, or already written this run, are
/// excluded.
fn relocation_candidates<'i>(rel: &RelPath, matches: Vec<&'i IndexedFile>, claims: &Claims<'_>) -> Vec<&'i IndexedFile> {
    if let Some(exact) = matches.iter().find(|found| &found.rel == rel) {
        return vec![*exact];
    }
    matches
        .into_iter()
        .filter(|found| !claims.package_plugins.contains(&found.rel) && !claims.writers.contains_key(&found.rel))
        .collect()
}

pub struct MergePlanner<'a> {
    classifier: &'a PathClassifier,
    layout: &'a MergeLayout,
    options: PlanOptions,
}

impl<'a> MergePlanner<'a> {
    #[must_use]
    pub fn new(classifier: &'a PathClassifier, layout: &'a MergeLayout) -> Self {
        Self {
            classifier,
            layout,
            options: PlanOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: PlanOptions) -> Self {
        self.options = options;
        self
    }

    /// Lists and classifies every regular file in the package, sorted by path.
    ///
    /// # Errors
    ///
    /// [`InstallerError::SourceTreeMissing`] if `source_root` is not a directory,
    /// [`InstallerError::SourceTreeUnreadable`] if any part of it cannot be read.
    /// A package must be read completely or not at all.
    pub fn scan_source(&self, source_root: &Path) -> Result<Vec<FileEntry>, InstallerError> {
        if !source_root.is_dir() {
            return Err(InstallerError::SourceTreeMissing {
                path: source_root.to_path_buf(),
            });
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(source_root).follow_links(true) {
            let entry = entry.map_err(|err| InstallerError::SourceTreeUnreadable {
                path: err.path().map_or_else(|| source_root.to_path_buf(), Path::to_path_buf),
                reason: err.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(rel) = entry.path().strip_prefix(source_root).ok().and_then(RelPath::from_relative_path)
            else {
                warn!(target: "merge::plan", "Ignoring package file with unusable name: {}", entry.path().display());
                continue;
            };

            entries.push(FileEntry {
                category: self.classifier.classify(&rel),
                rel,
                source: entry.path().to_path_buf(),
                size: entry.metadata().ok().map(|meta| meta.len()),
            });
        }

        entries.sort_by(|a, b| a.rel.cmp(&b.rel));
        debug!(target: "merge::plan", "Scanned {} package files under {}", entries.len(), source_root.display());
        Ok(entries)
    }

    /// Scans `source_root` and plans it against `index`.
    ///
    /// # Errors
    ///
    /// Only source-tree failures from [`Self::scan_source`]; planning itself cannot fail.
    pub fn plan(&self, source_root: &Path, index: &InstallationIndex) -> Result<MergePlan, InstallerError> {
        let entries = self.scan_source(source_root)?;
        Ok(self.plan_entries(entries, index))
    }

    /// Plans already scanned entries. Entries are sorted here as well so the
    /// output order does not depend on the caller.
    #[must_use]
    pub fn plan_entries(&self, mut entries: Vec<FileEntry>, index: &InstallationIndex) -> MergePlan {
        entries.sort_by(|a, b| a.rel.cmp(&b.rel));

        let mut plan = MergePlan {
            actions: Vec::with_capacity(entries.len()),
            warnings: index.warnings().to_vec(),
        };
        let package_plugins: HashSet<RelPath> = entries
            .iter()
            .filter(|entry| entry.category == Category::PluginBinary)
            .map(|entry| entry.rel.clone())
            .collect();
        let mut writers: HashMap<RelPath, RelPath> = HashMap::new();

        for entry in entries {
            let claims = Claims {
                package_plugins: &package_plugins,
                writers: &writers,
            };
            let action = self.decide(entry, index, &claims, &mut plan.warnings);
            trace!(target: "merge::plan", "{} {} ({})", action.kind, action.target, action.source.category);

            if action.kind.writes()
                && let Some(first) = writers.insert(action.target.clone(), action.source.rel.clone())
            {
                warn!(target: "merge::plan", "Multiple package files target {}", action.target);
                plan.warnings.push(MergeWarning::TargetCollision {
                    target: action.target.clone(),
                    first,
                    second: action.source.rel.clone(),
                });
            }
            plan.actions.push(action);
        }

        debug!(
            target: "merge::plan",
            "Planned {} actions: {} create, {} overwrite, {} relocate, {} preserve",
            plan.actions.len(),
            plan.count(ActionKind::Create),
            plan.count(ActionKind::Overwrite),
            plan.count(ActionKind::RelocateOverwrite),
            plan.count(ActionKind::SkipPreserve)
        );
        plan
    }

    fn decide(
        &self,
        entry: FileEntry,
        index: &InstallationIndex,
        claims: &Claims<'_>,
        warnings: &mut Vec<MergeWarning>,
    ) -> MergeAction {
        match entry.category {
            Category::Config => match index.get(&entry.rel) {
                Some(existing) => MergeAction {
                    target: entry.rel.clone(),
                    kind: ActionKind::SkipPreserve,
                    existing: Some(existing.path.clone()),
                    skip_reason: Some(SkipReason::ProtectedConfig),
                    source: entry,
                },
                None => Self::create(entry),
            },
            Category::PluginBinary => self.decide_plugin(entry, index, claims, warnings),
            Category::PluginSupport | Category::Ordinary => match index.get(&entry.rel) {
                Some(existing) => MergeAction {
                    target: entry.rel.clone(),
                    kind: ActionKind::Overwrite,
                    existing: Some(existing.path.clone()),
                    skip_reason: None,
                    source: entry,
                },
                None => Self::create(entry),
            },
        }
    }

    fn decide_plugin(
        &self,
        entry: FileEntry,
        index: &InstallationIndex,
        claims: &Claims<'_>,
        warnings: &mut Vec<MergeWarning>,
    ) -> MergeAction {
        let name = entry.rel.file_name().unwrap_or_default().to_string();
        let matches = relocation_candidates(&entry.rel, index.plugin_matches(&name), claims);

        if self.options.skip_plugins {
            return MergeAction {
                target: matches.first().map_or_else(|| entry.rel.clone(), |found| found.rel.clone()),
                kind: ActionKind::SkipPreserve,
                existing: matches.first().map(|found| found.path.clone()),
                skip_reason: Some(SkipReason::PluginsExcluded),
                source: entry,
            };
        }

        let Some(chosen) = matches.first() else {
            let target = self.layout.disabled_plugins_dir().join(&name);
            if self.options.new_plugins_disabled
                && !claims.package_plugins.contains(&target)
                && !claims.writers.contains_key(&target)
            {
                debug!(target: "merge::plan", "New plugin {} goes to {}", entry.rel, target);
                return MergeAction {
                    existing: index.get(&target).map(|found| found.path.clone()),
                    kind: if index.contains(&target) { ActionKind::Overwrite } else { ActionKind::Create },
                    target,
                    skip_reason: None,
                    source: entry,
                };
            }
            return Self::create(entry);
        };

        if matches.len() > 1 {
            let candidates: Vec<RelPath> = matches.iter().map(|found| found.rel.clone()).collect();
            warn!(
                target: "merge::plan",
                "Plugin {} found at {} locations, updating {}",
                name,
                candidates.len(),
                chosen.rel
            );
            warnings.push(MergeWarning::AmbiguousRelocation {
                name,
                chosen: chosen.rel.clone(),
                candidates,
            });
        }

        MergeAction {
            target: chosen.rel.clone(),
            kind: ActionKind::RelocateOverwrite,
            existing: Some(chosen.path.clone()),
            skip_reason: None,
            source: entry,
        }
    }

    fn create(entry: FileEntry) -> MergeAction {
        MergeAction {
            target: entry.rel.clone(),
            kind: ActionKind::Create,
            existing: None,
            skip_reason: None,
            source: entry,
        }
    }
}
