//! Test utilities for sminstall
//!
//! Helpers shared by unit and integration tests: one-time logging setup and
//! [`TestTree`], a temporary directory builder for package and installation
//! trees.
//!
//! # Example
//!
//! ```rust,no_run
//! use sminstall_cli::test_utils::TestTree;
//!
//! let package = TestTree::new()
//!     .file("addons/sourcemod/LICENSE.txt", "GPLv3")
//!     .file("addons/sourcemod/plugins/admin.smx", "v2");
//! assert!(package.exists("addons/sourcemod/plugins/admin.smx"));
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG` when set, otherwise leaves
/// logging off. Safe to call from every test.
///
/// ```bash
/// RUST_LOG=merge::plan=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// Removes ANSI colour sequences so rendered output can be compared as text
/// whatever `colored` decided about the terminal.
///
/// # Panics
///
/// Never in practice; the pattern is a constant.
#[must_use]
pub fn strip_ansi(text: &str) -> String {
    let ansi = regex::Regex::new(r"\x1b\[[0-9;]*m").expect("valid ANSI pattern");
    ansi.replace_all(text, "").into_owned()
}

/// A directory tree in a temporary directory, removed on drop.
///
/// Paths are relative and use `/`. Builder methods panic on I/O errors,
/// which is what a test wants.
pub struct TestTree {
    dir: TempDir,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// # Panics
    ///
    /// If the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    /// Adds a file, creating parent directories.
    ///
    /// # Panics
    ///
    /// On any I/O error.
    #[must_use]
    pub fn file(self, rel: &str, content: impl AsRef<[u8]>) -> Self {
        self.write(rel, content);
        self
    }

    /// Adds an empty directory.
    ///
    /// # Panics
    ///
    /// On any I/O error.
    #[must_use]
    pub fn dir(self, rel: &str) -> Self {
        fs::create_dir_all(self.path(rel)).expect("create dir");
        self
    }

    /// Writes a file in place, for changing a tree between runs.
    ///
    /// # Panics
    ///
    /// On any I/O error.
    pub fn write(&self, rel: &str, content: impl AsRef<[u8]>) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, content).expect("write file");
    }

    /// # Panics
    ///
    /// If the file is missing or not UTF-8.
    #[must_use]
    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).unwrap_or_else(|e| panic!("read {rel}: {e}"))
    }

    #[must_use]
    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    #[must_use]
    pub fn path(&self, rel: &str) -> PathBuf {
        rel.split('/').filter(|segment| !segment.is_empty()).fold(self.root().to_path_buf(), |path, segment| path.join(segment))
    }

    /// Every file below the root as sorted relative `/` paths.
    #[must_use]
    pub fn files(&self) -> Vec<String> {
        let mut files: Vec<String> = walkdir::WalkDir::new(self.root())
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let rel = entry.path().strip_prefix(self.root()).ok()?;
                Some(rel.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/"))
            })
            .collect();
        files.sort();
        files
    }
}
