//! Cross-platform utilities and helpers
//!
//! # Modules
//!
//! - [`fs`] - Atomic file replacement, directory creation and content hashing
//! - [`platform`] - Path expansion and external command lookup
//! - [`progress`] - Progress bars for downloads and file application
//!
//! # Example
//!
//! ```rust,no_run
//! use sminstall_cli::utils::{ensure_dir, atomic_copy};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new("tf/addons/sourcemod/plugins/disabled"))?;
//! atomic_copy(Path::new("pkg/core.cfg"), Path::new("tf/addons/sourcemod/configs/core.cfg"))?;
//! # Ok(())
//! # }
//! ```

pub mod fs;
pub mod platform;
pub mod progress;

pub use fs::{atomic_copy, compute_sha256, ensure_dir, ensure_parent_dir, files_identical};
pub use platform::{find_command, get_home_dir, is_windows, resolve_path};
pub use progress::{ProgressBar, ProgressStyle};
