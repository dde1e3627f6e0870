//! sminstall - SourceMod installer and upgrader
//!
//! Installs SourceMod into a Source dedicated server's game directory, or
//! upgrades an existing installation in place. An upgrade is a merge, not a
//! copy: the package is laid over the installation file by file, with rules
//! that keep what the operator changed.
//!
//! # Architecture Overview
//!
//! ```text
//! release ──► package tree on disk
//!                  │
//!                  ▼
//! merge:  classify ─► index installation ─► plan ─► apply ─► report
//!                                                    │
//! installer: fresh install vs upgrade, license gate ─┘
//! ```
//!
//! ## Merge rules
//!
//! - Files under `addons/sourcemod/configs` and `cfg/sourcemod` that already exist are never
//!   overwritten.
//! - A plugin binary (`*.smx` under `addons/sourcemod/plugins`) the operator
//!   moved into a subdirectory is updated where it was moved to, and no
//!   second copy appears at the default location.
//! - Everything else is created or overwritten at its package path.
//! - Nothing is deleted.
//! - Writes are atomic per file; a failed file is reported and the rest of
//!   the run continues. Re-running the same package is a no-op apart from
//!   retrying earlier failures.
//!
//! # Core Modules
//!
//! - [`merge`] - Classification, installation index, planning, execution and reporting
//! - [`installer`] - Fresh install / upgrade pipeline and license acceptance
//! - [`release`] - Release lookup, download and archive extraction
//! - [`config`] - Optional `~/.sminstall/config.toml`
//! - [`core`] - Error types and user-facing error rendering
//! - [`cli`] - Command-line interface
//! - [`utils`] - Atomic file operations, hashing, path expansion, progress bars
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Install or upgrade using the default release line
//! sminstall ~/tf2/tf
//!
//! # Upgrade from a local package without touching plugins
//! sminstall ~/tf2/tf --archive ./sourcemod-1.11.0-git6934-linux.tar.gz --no-upgrade-plugins
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod installer;
pub mod merge;
pub mod release;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
