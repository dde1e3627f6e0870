//! Atomic file replacement using a temp-and-rename strategy.
//!
//! A reader of the installation (a running game server, for example) sees
//! either the old file or the new file, never a partial write.

use crate::utils::fs::dirs::ensure_parent_dir;
use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically copies `source` over `target`, creating parent directories.
///
/// The bytes are streamed into a temporary file in the target's own
/// directory, synced, given the source's permissions, and then renamed over
/// the target. Staying in the same directory keeps the rename on one
/// filesystem.
///
/// Returns the number of bytes copied.
///
/// # Examples
///
/// ```rust,no_run
/// use sminstall_cli::utils::fs::atomic_copy;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let bytes = atomic_copy(
///     Path::new("package/addons/sourcemod/plugins/admin.smx"),
///     Path::new("tf/addons/sourcemod/plugins/extra/admin.smx"),
/// )?;
/// println!("wrote {bytes} bytes");
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Fails if the source cannot be read, the parent directory cannot be
/// created, or the final rename fails (for example when `target` is a
/// directory). The previous target content is untouched in every case.
pub fn atomic_copy(source: &Path, target: &Path) -> Result<u64> {
    let safe_source = crate::utils::platform::windows_long_path(source);
    let safe_target = crate::utils::platform::windows_long_path(target);

    ensure_parent_dir(&safe_target)?;
    let parent = safe_target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut reader = fs::File::open(&safe_source)
        .with_context(|| format!("Failed to open source file: {}", source.display()))?;
    let permissions = reader
        .metadata()
        .with_context(|| format!("Failed to read metadata: {}", source.display()))?
        .permissions();

    let mut temp = NamedTempFile::new_in(parent).with_context(|| {
        let platform_help = if crate::utils::platform::is_windows() {
            "On Windows: Check file permissions, path length, and that directory exists"
        } else {
            "Check file permissions and that directory exists"
        };

        format!("Failed to create temp file in: {}\n\n{}", parent.display(), platform_help)
    })?;

    let copied = io::copy(&mut reader, temp.as_file_mut())
        .with_context(|| format!("Failed to copy {} to temp file", source.display()))?;
    temp.as_file().sync_all().with_context(|| "Failed to sync file to disk")?;
    fs::set_permissions(temp.path(), permissions)
        .with_context(|| format!("Failed to set permissions on {}", temp.path().display()))?;

    temp.persist(&safe_target)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace file: {}", target.display()))?;

    Ok(copied)
}
