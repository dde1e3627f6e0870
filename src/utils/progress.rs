//! Progress indicators for downloads, extraction and file application.
//!
//! All bars are created through [`ProgressBar`] so they share one look and
//! can be switched off in one place. A disabled bar is an
//! `indicatif::ProgressBar::hidden()`; callers never branch on whether
//! progress is shown.
//!
//! ```rust
//! use sminstall_cli::utils::progress::ProgressBar;
//!
//! let progress = ProgressBar::new(3, false);
//! progress.set_message("Applying files");
//! for _ in 0..3 {
//!     progress.inc(1);
//! }
//! progress.finish_and_clear();
//! ```

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::time::Duration;

/// A progress bar with consistent styling.
///
/// Cheap to clone; clones drive the same bar.
#[derive(Clone)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// A bar counting `len` discrete steps.
    #[must_use]
    pub fn new(len: u64, enabled: bool) -> Self {
        let bar = if enabled {
            let bar = IndicatifBar::new(len);
            bar.set_style(ProgressStyle::default_style());
            bar
        } else {
            IndicatifBar::hidden()
        };
        Self { inner: bar }
    }

    /// A byte counter for a transfer; `total` comes from `Content-Length` when known.
    #[must_use]
    pub fn new_download(total: Option<u64>, enabled: bool) -> Self {
        if !enabled {
            return Self { inner: IndicatifBar::hidden() };
        }
        let bar = match total {
            Some(total) => {
                let bar = IndicatifBar::new(total);
                bar.set_style(ProgressStyle::download());
                bar
            }
            None => {
                let bar = IndicatifBar::new_spinner();
                bar.set_style(ProgressStyle::spinner());
                bar.enable_steady_tick(Duration::from_millis(100));
                bar
            }
        };
        Self { inner: bar }
    }

    /// A spinner for work of unknown length, such as archive extraction.
    #[must_use]
    pub fn new_spinner(enabled: bool) -> Self {
        let bar = if enabled {
            let bar = IndicatifBar::new_spinner();
            bar.set_style(ProgressStyle::spinner());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            IndicatifBar::hidden()
        };
        Self { inner: bar }
    }

    pub fn set_message(&self, msg: impl Into<String>) {
        self.inner.set_message(msg.into());
    }

    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.inner.set_prefix(prefix.into());
    }

    pub fn inc(&self, delta: u64) {
        self.inner.inc(delta);
    }

    #[must_use]
    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    pub fn finish_with_message(&self, msg: impl Into<String>) {
        self.inner.finish_with_message(msg.into());
    }

    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }
}

/// Shared bar styles.
pub struct ProgressStyle;

impl ProgressStyle {
    /// `{prefix} [{bar:40.cyan/blue}] {pos}/{len} {msg}`
    #[must_use]
    pub fn default_style() -> IndicatifStyle {
        IndicatifStyle::default_bar()
            .template("{prefix:.bold} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| IndicatifStyle::default_bar())
            .progress_chars("━╸━")
    }

    /// `{prefix} {spinner} {msg}`
    #[must_use]
    pub fn spinner() -> IndicatifStyle {
        IndicatifStyle::default_spinner()
            .template("{prefix:.bold} {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| IndicatifStyle::default_spinner())
    }

    /// Byte progress for downloads.
    ///
    /// ```text
    /// sourcemod [━━━━━━━━━━━━━━━━━━━━╸━━━━━━━━━━━━━━━━━━━] 10.3 MiB/21.0 MiB (00:05)
    /// ```
    #[must_use]
    pub fn download() -> IndicatifStyle {
        IndicatifStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .unwrap_or_else(|_| IndicatifStyle::default_bar())
            .progress_chars("━╸━")
    }
}
