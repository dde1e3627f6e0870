//! File system utilities for cross-platform file operations
//!
//! The merge executor only ever needs three things from the filesystem:
//! scoped directory creation, atomic replacement of a single file, and a
//! content comparison to avoid rewriting identical bytes.
//!
//! - [`dirs`]: [`ensure_dir`], [`ensure_parent_dir`]
//! - [`atomic`]: [`atomic_copy`]
//! - [`checksum`]: [`compute_sha256`], [`files_identical`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use sminstall_cli::utils::fs::{atomic_copy, files_identical};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let source = Path::new("pkg/addons/sourcemod/bin/sourcemod.logic.so");
//! let target = Path::new("tf/addons/sourcemod/bin/sourcemod.logic.so");
//! if !files_identical(source, target)? {
//!     atomic_copy(source, target)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod checksum;
pub mod dirs;

pub use atomic::atomic_copy;
pub use checksum::{compute_sha256, files_identical};
pub use dirs::{ensure_dir, ensure_parent_dir};
