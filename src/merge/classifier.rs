//! Path-based file classification.
//!
//! Classification is an ordered list of [`ClassificationRule`]s evaluated
//! first-match-wins, with [`Category::Ordinary`] as the fallback. The order
//! built by [`PathClassifier::new`] is:
//!
//! 1. refreshable config subtrees → `Ordinary`
//! 2. anything under one of the config directories → `Config`
//! 3. plugin extension under the plugins directory (any depth) → `PluginBinary`
//! 4. anything else under the plugins directory → `PluginSupport`
//!
//! Rule 1 is empty unless `refresh_config_dirs` is configured, so by default
//! every file under a config directory is protected.
//!
//! # Examples
//!
//! ```rust
//! use sminstall_cli::merge::{Category, MergeLayout, PathClassifier, RelPath};
//!
//! let classifier = PathClassifier::new(&MergeLayout::default());
//! let category = classifier.classify(&RelPath::normalize("addons/sourcemod/plugins/fun/slap.smx"));
//! assert_eq!(category, Category::PluginBinary);
//! ```

use super::layout::MergeLayout;
use super::types::{Category, RelPath};

/// What part of a path a rule inspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatcher {
    /// Path lies strictly below the directory.
    Under(RelPath),
    /// Path lies below the directory at any depth and carries the extension
    /// (ASCII case-insensitive).
    UnderWithExtension { dir: RelPath, extension: String },
}

impl PathMatcher {
    #[must_use]
    pub fn matches(&self, path: &RelPath) -> bool {
        match self {
            Self::Under(dir) => path.is_under(dir),
            Self::UnderWithExtension {
                dir,
                extension,
            } => {
                path.is_under(dir)
                    && path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule {
    pub matcher: PathMatcher,
    pub category: Category,
}

impl ClassificationRule {
    #[must_use]
    pub const fn new(matcher: PathMatcher, category: Category) -> Self {
        Self {
            matcher,
            category,
        }
    }
}

/// Pure, deterministic path classifier.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    rules: Vec<ClassificationRule>,
}

impl PathClassifier {
    /// Builds the standard rule list for a layout.
    #[must_use]
    pub fn new(layout: &MergeLayout) -> Self {
        let mut rules: Vec<ClassificationRule> = layout
            .refresh_config_dirs
            .iter()
            .map(|dir| ClassificationRule::new(PathMatcher::Under(dir.clone()), Category::Ordinary))
            .collect();

        rules.extend(
            layout
                .config_dirs
                .iter()
                .map(|dir| ClassificationRule::new(PathMatcher::Under(dir.clone()), Category::Config)),
        );
        rules.push(ClassificationRule::new(
            PathMatcher::UnderWithExtension {
                dir: layout.plugins_dir.clone(),
                extension: layout.plugin_extension.trim_start_matches('.').to_string(),
            },
            Category::PluginBinary,
        ));
        rules.push(ClassificationRule::new(
            PathMatcher::Under(layout.plugins_dir.clone()),
            Category::PluginSupport,
        ));

        Self::with_rules(rules)
    }

    /// Uses an explicit rule list; order is significant.
    #[must_use]
    pub const fn with_rules(rules: Vec<ClassificationRule>) -> Self {
        Self {
            rules,
        }
    }

    #[must_use]
    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    #[must_use]
    pub fn classify(&self, path: &RelPath) -> Category {
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(path))
            .map_or(Category::Ordinary, |rule| rule.category)
    }

    /// Convenience wrapper for raw path strings with any separator.
    #[must_use]
    pub fn classify_str(&self, path: &str) -> Category {
        self.classify(&RelPath::normalize(path))
    }
}
