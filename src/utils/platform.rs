//! Cross-platform helpers for paths and external commands.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::core::InstallerError;

/// Checks if the current platform is Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Returns the home directory of the current user.
///
/// # Errors
///
/// Fails when the platform reports no home directory (e.g. `HOME` unset on Unix).
pub fn get_home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| {
        let hint = if is_windows() {
            "Check that the USERPROFILE environment variable is set"
        } else {
            "Check that the HOME environment variable is set"
        };
        anyhow::anyhow!("Could not determine home directory.\n\n{hint}")
    })
}

/// Resolves a user-supplied path with tilde and environment variable expansion.
///
/// Game directories are often given as `~/servers/tf` or `$STEAM/tf` in
/// service files, so both forms are accepted.
///
/// ```rust,no_run
/// use sminstall_cli::utils::platform::resolve_path;
///
/// # fn example() -> anyhow::Result<()> {
/// let game_dir = resolve_path("~/servers/tf")?;
/// println!("Installing into {}", game_dir.display());
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Fails on undefined environment variables or when the home directory is unknown.
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path).with_context(|| {
        let platform_vars = if is_windows() {
            "Common Windows variables: $USERPROFILE, $APPDATA"
        } else {
            "Common Unix variables: $HOME, $USER"
        };
        format!(
            "Failed to expand path: {path}\n\n\
            Check for undefined environment variables.\n\
            {platform_vars}"
        )
    })?;

    Ok(windows_long_path(Path::new(expanded.as_ref())))
}

/// Adds the `\\?\` prefix to paths longer than 260 characters on Windows.
#[cfg(windows)]
pub fn windows_long_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    if path_str.len() > 260 && !path_str.starts_with(r"\\?\") {
        let absolute_path = if path.is_relative() {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(path)
        } else {
            path.to_path_buf()
        };

        let absolute_str = absolute_path.to_string_lossy();
        if let Some(stripped) = absolute_str.strip_prefix(r"\\") {
            PathBuf::from(format!(r"\\?\UNC\{stripped}"))
        } else {
            PathBuf::from(format!(r"\\?\{absolute_str}"))
        }
    } else {
        path.to_path_buf()
    }
}

/// No-op on platforms without a path length limit.
#[cfg(not(windows))]
#[must_use]
pub fn windows_long_path(path: &Path) -> PathBuf {
    path.to_path_buf()
}

/// Locates an external command on `PATH`.
///
/// # Errors
///
/// [`InstallerError::CommandNotFound`] when the command is not installed.
pub fn find_command(cmd: &str) -> Result<PathBuf, InstallerError> {
    which::which(cmd).map_err(|_| InstallerError::CommandNotFound {
        command: cmd.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_plain_path() {
        let resolved = resolve_path("servers/tf").unwrap();
        assert_eq!(resolved, PathBuf::from("servers/tf"));
    }

    #[test]
    fn test_resolve_tilde() {
        if let Some(home) = dirs::home_dir() {
            let resolved = resolve_path("~/servers").unwrap();
            assert_eq!(resolved, home.join("servers"));
        }
    }

    #[test]
    fn test_resolve_undefined_variable_fails() {
        let err = resolve_path("$SMINSTALL_SURELY_UNDEFINED_VAR/tf").unwrap_err();
        assert!(err.to_string().contains("Failed to expand path"));
    }

    #[test]
    fn test_find_missing_command() {
        let err = find_command("sminstall-no-such-command").unwrap_err();
        assert!(matches!(err, InstallerError::CommandNotFound { .. }));
    }
}
