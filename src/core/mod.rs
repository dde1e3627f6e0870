//! Core error types for sminstall
//!
//! - [`InstallerError`] - fatal conditions that stop a run
//! - [`MergeWarning`] - recoverable conditions carried through the plan and report
//! - [`ErrorContext`] / [`user_friendly_error`] - operator-facing rendering

pub mod error;

pub use error::{ErrorContext, InstallerError, MergeWarning, user_friendly_error};
