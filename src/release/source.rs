//! Turning the operator's package choice into a directory on disk.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{info, warn};

use super::archive::extract_archive;
use super::platform::Platform;
use super::resolver::ReleaseResolver;
use crate::core::InstallerError;
use crate::utils::progress::ProgressBar;

/// Where the package comes from, after precedence has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSource {
    /// An already extracted package.
    Directory(PathBuf),
    /// A local `.zip`/`.tar.gz` package.
    ArchiveFile(PathBuf),
    /// A package at an explicit URL.
    Url(String),
    /// The newest build of a release line. `branch`, when set, is resolved
    /// to a version first and wins over `version`.
    Release {
        version: String,
        branch: Option<String>,
        platform: Platform,
    },
}

/// Raw package options as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    pub archive: Option<PathBuf>,
    pub url: Option<String>,
    pub version: Option<String>,
    pub branch: Option<String>,
    pub platform: Option<Platform>,
}

impl PackageSource {
    /// Applies the precedence `--archive` > `--url` > branch/version.
    ///
    /// An `--archive` path that does not exist is ignored with a warning and
    /// the next option applies.
    #[must_use]
    pub fn select(options: SourceOptions, default_version: &str) -> Self {
        if let Some(archive) = options.archive {
            if archive.is_dir() {
                return Self::Directory(archive);
            }
            if archive.is_file() {
                return Self::ArchiveFile(archive);
            }
            warn!("Archive {} does not exist; falling back to download", archive.display());
        }

        if let Some(url) = options.url {
            return Self::Url(url);
        }

        Self::Release {
            version: options.version.unwrap_or_else(|| default_version.to_string()),
            branch: options.branch,
            platform: options.platform.unwrap_or_default(),
        }
    }

    /// Produces a directory holding the package contents.
    ///
    /// Downloads and extractions happen in temporary directories owned by the
    /// returned [`MaterializedSource`].
    ///
    /// # Errors
    ///
    /// Any resolution, download or extraction failure. A result whose root is
    /// not a directory is reported as [`InstallerError::SourceTreeMissing`].
    pub async fn materialize(self, resolver: &ReleaseResolver, show_progress: bool) -> Result<MaterializedSource> {
        let source = match self {
            Self::Directory(path) => MaterializedSource {
                root: path,
                temp_dirs: Vec::new(),
            },
            Self::ArchiveFile(path) => unpack(&path, Vec::new(), show_progress).await?,
            Self::Url(url) => download_and_unpack(resolver, &url, show_progress).await?,
            Self::Release {
                version,
                branch,
                platform,
            } => {
                let version = match branch {
                    Some(branch) => resolver.resolve_branch(&branch).await?,
                    None => version,
                };
                let url = resolver.latest_url(&version, platform)?;
                info!("Installing SourceMod {version} for {platform}");
                download_and_unpack(resolver, url.as_str(), show_progress).await?
            }
        };

        if !source.root.is_dir() {
            return Err(InstallerError::SourceTreeMissing {
                path: source.root,
            }
            .into());
        }
        Ok(source)
    }
}

async fn download_and_unpack(resolver: &ReleaseResolver, url: &str, show_progress: bool) -> Result<MaterializedSource> {
    let download_dir = TempDir::new().context("Failed to create download directory")?;
    let archive = resolver.download(url, download_dir.path()).await?;
    unpack(&archive, vec![download_dir], show_progress).await
}

async fn unpack(archive: &Path, mut temp_dirs: Vec<TempDir>, show_progress: bool) -> Result<MaterializedSource> {
    let extract_dir = TempDir::new().context("Failed to create extraction directory")?;
    let root = extract_dir.path().to_path_buf();

    let spinner = ProgressBar::new_spinner(show_progress);
    spinner.set_message(format!("Extracting {}", archive.display()));

    let archive_path = archive.to_path_buf();
    let dest = root.clone();
    tokio::task::spawn_blocking(move || extract_archive(&archive_path, &dest))
        .await
        .context("Extraction task panicked")??;
    spinner.finish_and_clear();

    temp_dirs.push(extract_dir);
    Ok(MaterializedSource {
        root,
        temp_dirs,
    })
}

/// A package tree on disk. Temporary directories backing it are removed on drop.
#[derive(Debug)]
pub struct MaterializedSource {
    root: PathBuf,
    temp_dirs: Vec<TempDir>,
}

impl MaterializedSource {
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the tree lives in a temporary directory.
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        !self.temp_dirs.is_empty()
    }
}
