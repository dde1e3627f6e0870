//! Error handling for sminstall
//!
//! The installer separates two kinds of failure:
//!
//! - **Fatal errors** ([`InstallerError`]) stop the run before or instead of
//!   touching the installation: a missing source tree, a declined license, a
//!   failed download.
//! - **Recoverable conditions** ([`MergeWarning`]) are carried as values in the
//!   merge plan and report. They never abort a run. Per-file write failures
//!   are recorded the same way, as [`crate::merge::Outcome::Failed`].
//!
//! Any `anyhow::Error` reaching the CLI boundary goes through
//! [`user_friendly_error`], which produces an [`ErrorContext`] with details and
//! a suggestion, rendered in colour by [`ErrorContext::display`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use sminstall_cli::core::{ErrorContext, InstallerError, user_friendly_error};
//!
//! let error = InstallerError::LicenseDeclined;
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//!
//! let manual = ErrorContext::new(InstallerError::LicenseDeclined)
//!     .with_suggestion("Re-run with --accept-license");
//! eprintln!("{manual}");
//! ```

use colored::Colorize;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::merge::RelPath;

/// Fatal conditions for an install or upgrade run.
#[derive(Error, Debug)]
pub enum InstallerError {
    /// The package collaborator did not provide a usable tree; planning never starts.
    #[error("Source tree not found or not a directory: {}", path.display())]
    SourceTreeMissing { path: PathBuf },

    /// A directory inside the package could not be read while scanning it.
    #[error("Failed to read source tree at {}: {reason}", path.display())]
    SourceTreeUnreadable { path: PathBuf, reason: String },

    #[error("Game directory exists but is not a directory: {}", path.display())]
    TargetNotDirectory { path: PathBuf },

    #[error("License file not found in package: {}", path.display())]
    LicenseNotFound { path: PathBuf },

    #[error("License agreement was not accepted; installation cancelled")]
    LicenseDeclined,

    #[error("Failed to resolve branch name '{branch}' to a version")]
    BranchResolutionFailed { branch: String },

    #[error("Failed to download {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Unsupported archive format: {}", path.display())]
    UnsupportedArchive { path: PathBuf },

    #[error("Failed to extract {}: {reason}", path.display())]
    ArchiveExtractionFailed { path: PathBuf, reason: String },

    #[error("Required command '{command}' was not found in PATH")]
    CommandNotFound { command: String },

    #[error("Unknown platform '{value}' (expected linux, windows or mac)")]
    InvalidPlatform { value: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// The run completed but at least one file could not be written.
    #[error("Upgrade finished with {failed} failed file(s)")]
    UpgradeIncomplete { failed: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Recoverable conditions surfaced in the plan and report.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MergeWarning {
    /// Part of the installation could not be walked. Files below `path` are
    /// missing from the index and are treated as new.
    #[error("Could not index {}: {reason}", path.display())]
    IndexBuildPartial { path: PathBuf, reason: String },

    /// More than one installed plugin shares a file name; the path that sorts
    /// first segment by segment was chosen.
    #[error(
        "Plugin '{name}' exists at {} locations; updating {chosen}, the first in segment-wise path order (also at: {})",
        candidates.len(),
        join_paths(candidates, chosen)
    )]
    AmbiguousRelocation { name: String, chosen: RelPath, candidates: Vec<RelPath> },

    /// Two package files resolved to the same target; the later one wins.
    #[error("{target} is written by both {first} and {second}; {second} wins")]
    TargetCollision { target: RelPath, first: RelPath, second: RelPath },
}

fn join_paths(paths: &[RelPath], skip: &RelPath) -> String {
    paths.iter().filter(|path| *path != skip).map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// An [`InstallerError`] plus the extra text shown to the operator.
#[derive(Debug)]
pub struct ErrorContext {
    pub error: InstallerError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: InstallerError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Prints the error to stderr with colour.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Converts any error reaching the CLI into an [`ErrorContext`].
///
/// Known error types get tailored suggestions. Anything else keeps its full
/// `anyhow` context chain as the message.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let error = match error.downcast::<InstallerError>() {
        Ok(installer_error) => return create_error_context(installer_error),
        Err(error) => error,
    };

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(InstallerError::Io(std::io::Error::new(
                    io_error.kind(),
                    format!("{error:#}"),
                )))
                .with_suggestion(
                    "Run as the user that owns the game server files, or fix the directory permissions",
                );
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(InstallerError::Io(std::io::Error::new(
                    io_error.kind(),
                    format!("{error:#}"),
                )))
                .with_suggestion("Check that the path exists and is spelled correctly");
            }
            _ => {}
        }
    }

    if error.downcast_ref::<toml::de::Error>().is_some() {
        return ErrorContext::new(InstallerError::ConfigError {
            message: format!("{error:#}"),
        })
        .with_suggestion("Check the TOML syntax of your sminstall config file");
    }

    if let Some(http_error) = error.downcast_ref::<reqwest::Error>() {
        let url = http_error.url().map_or_else(|| "<unknown>".to_string(), ToString::to_string);
        return ErrorContext::new(InstallerError::DownloadFailed {
            url,
            reason: http_error.to_string(),
        })
        .with_suggestion("Check your internet connection, or install from a local package with --archive")
        .with_details(format!("{error:#}"));
    }

    ErrorContext::new(InstallerError::Io(std::io::Error::other(format!("{error:#}"))))
}

fn create_error_context(error: InstallerError) -> ErrorContext {
    match error {
        InstallerError::SourceTreeMissing { .. } | InstallerError::SourceTreeUnreadable { .. } => {
            ErrorContext::new(error)
                .with_suggestion("Check the --archive path, or download the package again")
                .with_details("No files were changed; the installation was not planned")
        }
        InstallerError::LicenseDeclined => ErrorContext::new(error)
            .with_suggestion("Re-run interactively to review the license, or pass --accept-license")
            .with_details("SourceMod is licensed under GPLv3. See https://www.sourcemod.net/license.php"),
        InstallerError::LicenseNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Make sure the package is a complete SourceMod release"),
        InstallerError::BranchResolutionFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Use 'stable' or 'dev', or pass an explicit --version"),
        InstallerError::UnsupportedArchive { .. } => ErrorContext::new(error)
            .with_suggestion("Supported packages are .zip, .tar.gz, .tgz and .tar, or an extracted directory"),
        InstallerError::CommandNotFound { ref command } => {
            let hint = format!("Install '{command}' or extract the package yourself and pass the directory with --archive");
            ErrorContext::new(error).with_suggestion(hint)
        }
        InstallerError::InvalidPlatform { .. } => {
            ErrorContext::new(error).with_suggestion("Use --platform linux, --platform windows or --platform mac")
        }
        InstallerError::UpgradeIncomplete { .. } => ErrorContext::new(error)
            .with_suggestion("Fix the reported problems and run the same command again; applied files are kept")
            .with_details("Files that were written successfully are not rolled back"),
        InstallerError::DownloadFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Check your internet connection, or install from a local package with --archive"),
        _ => ErrorContext::new(error),
    }
}
