//! Index of the files already present in an installation.
//!
//! The index is built from one recursive walk of the game directory and is
//! read-only afterwards. Files are stored in an arena (`Vec<IndexedFile>`);
//! both lookups hold arena indices:
//!
//! - exact relative path → file
//! - plugin file name → every plugin binary with that name, at any depth
//!   under the plugins directory
//!
//! The second map is what lets the planner find a plugin the operator moved
//! into a subdirectory and update it there.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::classifier::PathClassifier;
use super::types::{Category, RelPath};
use crate::core::MergeWarning;

/// A file found in the installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFile {
    pub rel: RelPath,
    /// Absolute path at index time.
    pub path: PathBuf,
    pub category: Category,
    pub size: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct InstallationIndex {
    root: PathBuf,
    files: Vec<IndexedFile>,
    by_path: HashMap<RelPath, usize>,
    plugins_by_name: HashMap<String, Vec<usize>>,
    warnings: Vec<MergeWarning>,
}

impl InstallationIndex {
    /// An index with no files, used when the installation does not exist yet.
    #[must_use]
    pub fn empty(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            files: Vec::new(),
            by_path: HashMap::new(),
            plugins_by_name: HashMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Walks `root` and indexes every regular file.
    ///
    /// Unreadable directories do not fail the build: each one is recorded as
    /// [`MergeWarning::IndexBuildPartial`] and its contents are simply absent.
    /// A missing root yields an empty index.
    #[must_use]
    pub fn build(root: &Path, classifier: &PathClassifier) -> Self {
        let mut index = Self::empty(root);
        if !root.exists() {
            debug!(target: "merge::index", "Installation root {} does not exist yet", root.display());
            return index;
        }

        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
                    warn!(target: "merge::index", "Skipping unreadable path {}: {}", path.display(), err);
                    index.warnings.push(MergeWarning::IndexBuildPartial {
                        path,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let Some(rel) = entry
                .path()
                .strip_prefix(root)
                .ok()
                .and_then(RelPath::from_relative_path)
            else {
                debug!(target: "merge::index", "Ignoring non UTF-8 path {}", entry.path().display());
                continue;
            };

            let category = classifier.classify(&rel);
            let size = entry.metadata().ok().map(|meta| meta.len());
            index.insert(IndexedFile {
                rel,
                path: entry.path().to_path_buf(),
                category,
                size,
            });
        }

        debug!(
            target: "merge::index",
            "Indexed {} files ({} plugin names) under {}",
            index.files.len(),
            index.plugins_by_name.len(),
            root.display()
        );
        index
    }

    fn insert(&mut self, file: IndexedFile) {
        let slot = self.files.len();
        if file.category == Category::PluginBinary
            && let Some(name) = file.rel.file_name()
        {
            self.plugins_by_name.entry(name.to_string()).or_default().push(slot);
        }
        self.by_path.insert(file.rel.clone(), slot);
        self.files.push(file);
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn get(&self, rel: &RelPath) -> Option<&IndexedFile> {
        self.by_path.get(rel).map(|&slot| &self.files[slot])
    }

    #[must_use]
    pub fn contains(&self, rel: &RelPath) -> bool {
        self.by_path.contains_key(rel)
    }

    /// Installed plugin binaries named `name`, smallest path first.
    #[must_use]
    pub fn plugin_matches(&self, name: &str) -> Vec<&IndexedFile> {
        let mut matches: Vec<&IndexedFile> = self
            .plugins_by_name
            .get(name)
            .map(|slots| slots.iter().map(|&slot| &self.files[slot]).collect())
            .unwrap_or_default();
        matches.sort_by(|a, b| a.rel.cmp(&b.rel));
        matches
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexedFile> {
        self.files.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[must_use]
    pub fn warnings(&self) -> &[MergeWarning] {
        &self.warnings
    }
}
