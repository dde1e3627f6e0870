//! Value types shared by the merge engine.
//!
//! Every path the engine reasons about is a [`RelPath`]: a sequence of
//! forward-slash segments relative to a tree root. Platform separators only
//! appear when a [`RelPath`] is turned back into a [`PathBuf`] under a concrete
//! root with [`RelPath::to_path`].

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::core::InstallerError;

/// A normalized path relative to a tree root.
///
/// Ordering is segment-wise lexicographic, which is the order the planner
/// emits actions in and the order used to break relocation ties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelPath {
    segments: Vec<String>,
}

impl RelPath {
    /// Splits `raw` on both `/` and `\`, dropping empty and `.` segments.
    ///
    /// This is the lenient form used for classification: it never fails and
    /// keeps `..` segments as-is. Use [`RelPath::parse`] for user input.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sminstall_cli::merge::RelPath;
    ///
    /// let path = RelPath::normalize(r"addons\sourcemod//plugins/./admin.smx");
    /// assert_eq!(path.to_string(), "addons/sourcemod/plugins/admin.smx");
    /// ```
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        let segments = raw
            .split(['/', '\\'])
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .map(str::to_string)
            .collect();
        Self {
            segments,
        }
    }

    /// Parses a relative path supplied by configuration or the command line.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::ConfigError`] if the path is absolute, has a
    /// drive prefix, contains a `..` segment, or is empty.
    pub fn parse(raw: &str) -> Result<Self, InstallerError> {
        let invalid = |why: &str| InstallerError::ConfigError {
            message: format!("Invalid relative path '{raw}': {why}"),
        };

        if raw.starts_with('/') || raw.starts_with('\\') || raw.contains(':') {
            return Err(invalid("must be relative to the game directory"));
        }

        let path = Self::normalize(raw);
        if path.segments.iter().any(|segment| segment == "..") {
            return Err(invalid("parent directory segments are not allowed"));
        }
        if path.is_empty() {
            return Err(invalid("path is empty"));
        }
        Ok(path)
    }

    /// Converts a path produced by stripping a walk root back into segments.
    ///
    /// Returns `None` for anything that is not a plain relative path (root,
    /// prefix or parent components), or for non UTF-8 names.
    #[must_use]
    pub fn from_relative_path(path: &Path) -> Option<Self> {
        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(name) => segments.push(name.to_str()?.to_string()),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        Some(Self {
            segments,
        })
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Final segment, if any.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Extension of the final segment without the dot.
    ///
    /// Dotfiles such as `.htaccess` have no extension.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name()?;
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
            _ => None,
        }
    }

    /// True when `prefix` is a proper ancestor directory of this path.
    #[must_use]
    pub fn is_under(&self, prefix: &Self) -> bool {
        self.segments.len() > prefix.segments.len() && self.segments.starts_with(&prefix.segments)
    }

    #[must_use]
    pub fn join(&self, name: &str) -> Self {
        let mut joined = self.clone();
        joined.segments.extend(Self::normalize(name).segments);
        joined
    }

    /// Resolves this path under a concrete filesystem root.
    #[must_use]
    pub fn to_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in &self.segments {
            path.push(segment);
        }
        path
    }
}

impl fmt::Display for RelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl Serialize for RelPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// How the merge engine treats a file, decided purely from its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Operator configuration; existing copies are never overwritten.
    Config,
    /// A compiled plugin loaded by the server, possibly relocated by the operator.
    PluginBinary,
    /// Non-binary content under the plugins directory.
    PluginSupport,
    /// Redistributable package content.
    Ordinary,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Config => "config",
            Self::PluginBinary => "plugin",
            Self::PluginSupport => "plugin-support",
            Self::Ordinary => "ordinary",
        };
        f.write_str(name)
    }
}

/// A classified file from the fetched package tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub rel: RelPath,
    pub category: Category,
    /// Absolute location of the file inside the source tree.
    pub source: PathBuf,
    /// Size in bytes when metadata was readable during the scan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// The decision made for one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Create,
    Overwrite,
    SkipPreserve,
    RelocateOverwrite,
}

impl ActionKind {
    /// Whether applying this kind touches the filesystem.
    #[must_use]
    pub const fn writes(self) -> bool {
        !matches!(self, Self::SkipPreserve)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Overwrite => "overwrite",
            Self::SkipPreserve => "preserve",
            Self::RelocateOverwrite => "relocate",
        };
        f.write_str(name)
    }
}

/// Why a file was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Existing operator configuration.
    ProtectedConfig,
    /// Plugin upgrades were turned off for this run.
    PluginsExcluded,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProtectedConfig => f.write_str("existing configuration"),
            Self::PluginsExcluded => f.write_str("plugin upgrades disabled"),
        }
    }
}

/// One fully decided step of a merge plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeAction {
    /// Where the file ends up, relative to the installation root.
    pub target: RelPath,
    pub kind: ActionKind,
    pub source: FileEntry,
    /// Absolute path of the file being replaced or preserved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<SkipReason>,
}

/// What happened when an action was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Bytes were written to the target.
    Applied,
    /// The target already held identical bytes; nothing was written.
    Unchanged,
    /// `SkipPreserve`; nothing was written by design.
    Skipped,
    /// Dry run; the action was planned but not executed.
    Planned,
    /// Writing the target failed. Other actions still ran.
    Failed { reason: String },
}

impl Outcome {
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
