//! Locating and downloading SourceMod release packages.
//!
//! sourcemod.net has two endpoints of interest:
//!
//! - `latest.php?version=<v>&os=<os>` redirects to the newest build of a
//!   release line for one platform.
//! - `downloads.php?branch=<name>` is an HTML page; the first linked `.zip`
//!   sits in a directory named after the branch's release line. This is the
//!   only way to turn `stable` or `dev` into a version.

use anyhow::{Context, Result};
use regex::Regex;
use reqwest::{Client, Url};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, info};

use super::platform::Platform;
use crate::config::InstallerConfig;
use crate::constants::{FETCH_BACKOFF_MAX_DELAY, FETCH_BACKOFF_START_MS, FETCH_RETRIES, HTTP_TIMEOUT};
use crate::core::InstallerError;
use crate::utils::progress::ProgressBar;

/// File name used when the final download URL has no usable last segment.
const FALLBACK_PACKAGE_NAME: &str = "sourcemod-package.zip";

/// Extracts the release line from a `downloads.php` page.
///
/// Returns the parent directory name of the first `.zip` link in document
/// order, e.g. `.../sourcemod/1.11/sourcemod-1.11.0-git6934-linux.zip`
/// gives `1.11`.
#[must_use]
pub fn version_from_downloads_page(html: &str) -> Option<String> {
    let href_regex = Regex::new(r#"(?i)<a\s[^>]*?href\s*=\s*["']([^"']+)["']"#).ok()?;
    href_regex
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|href| href.as_str())
        .filter(|href| href.contains(".zip"))
        .find_map(|href| {
            let path = href.split(['?', '#']).next().unwrap_or(href);
            let mut segments = path.trim_end_matches('/').rsplit('/');
            segments.next()?;
            segments.next().filter(|parent| !parent.is_empty()).map(ToString::to_string)
        })
}

pub struct ReleaseResolver {
    client: Client,
    release_base_url: String,
    downloads_page_url: String,
    show_progress: bool,
}

impl ReleaseResolver {
    /// Builds a resolver with an HTTP client carrying the configured user agent.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be constructed (for example a broken TLS backend).
    pub fn new(config: &InstallerConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self::from_client(client, config))
    }

    /// Uses an existing client; endpoints still come from `config`.
    #[must_use]
    pub fn from_client(client: Client, config: &InstallerConfig) -> Self {
        Self {
            client,
            release_base_url: config.release_base_url.trim_end_matches('/').to_string(),
            downloads_page_url: config.downloads_page_url.clone(),
            show_progress: false,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Resolves a branch name (`stable`, `dev`, `master`) to a release line.
    ///
    /// # Errors
    ///
    /// [`InstallerError::DownloadFailed`] when the page cannot be fetched after
    /// retries, [`InstallerError::BranchResolutionFailed`] when it holds no package link.
    pub async fn resolve_branch(&self, branch: &str) -> Result<String, InstallerError> {
        let mut url = Url::parse(&self.downloads_page_url).map_err(|e| InstallerError::ConfigError {
            message: format!("Invalid downloads_page_url '{}': {e}", self.downloads_page_url),
        })?;
        url.query_pairs_mut().append_pair("branch", branch);

        let strategy = ExponentialBackoff::from_millis(FETCH_BACKOFF_START_MS)
            .max_delay(FETCH_BACKOFF_MAX_DELAY)
            .take(FETCH_RETRIES);

        let page = Retry::spawn(strategy, || {
            let request = self.client.get(url.clone());
            async move {
                let response = request.send().await?.error_for_status()?;
                response.text().await
            }
        })
        .await
        .map_err(|e| {
            debug!("Fetching {url} failed: {e}");
            InstallerError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        let version = version_from_downloads_page(&page).ok_or_else(|| {
            InstallerError::BranchResolutionFailed {
                branch: branch.to_string(),
            }
        })?;
        info!("Resolved branch name {branch} to version {version}");
        Ok(version)
    }

    /// URL of the newest package for a release line and platform.
    ///
    /// # Errors
    ///
    /// [`InstallerError::ConfigError`] if `release_base_url` is not a valid URL.
    pub fn latest_url(&self, version: &str, platform: Platform) -> Result<Url, InstallerError> {
        Url::parse_with_params(
            &format!("{}/latest.php", self.release_base_url),
            &[("version", version), ("os", platform.as_query())],
        )
        .map_err(|e| InstallerError::ConfigError {
            message: format!("Invalid release_base_url '{}': {e}", self.release_base_url),
        })
    }

    /// Streams `url` into `dir`, named after the last segment of the final
    /// (post-redirect) URL so the extension identifies the archive format.
    ///
    /// # Errors
    ///
    /// [`InstallerError::DownloadFailed`] on transport errors or a non-success
    /// status; I/O errors writing the file are returned with context.
    pub async fn download(&self, url: &str, dir: &Path) -> Result<PathBuf> {
        let download_failed = |reason: String| InstallerError::DownloadFailed {
            url: url.to_string(),
            reason,
        };

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| download_failed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(download_failed(format!("server returned {}", response.status())).into());
        }

        let file_name = response
            .url()
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_PACKAGE_NAME)
            .to_string();
        let path = dir.join(&file_name);
        info!("Downloading SourceMod package {file_name}");

        let progress = ProgressBar::new_download(response.content_length(), self.show_progress);
        progress.set_prefix(file_name.clone());

        let mut file = tokio::fs::File::create(&path)
            .await
            .with_context(|| format!("Failed to create {}", path.display()))?;
        while let Some(chunk) = response.chunk().await.map_err(|e| download_failed(e.to_string()))? {
            file.write_all(&chunk)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            progress.inc(chunk.len() as u64);
        }
        file.flush().await.with_context(|| format!("Failed to write {}", path.display()))?;
        progress.finish_with_message(format!("Downloaded {file_name}"));

        debug!("Downloaded {} bytes to {}", progress.position(), path.display());
        Ok(path)
    }
}
