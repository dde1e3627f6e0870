//! Unpacking release packages.
//!
//! Windows packages are `.zip` and are read in-process. Linux and macOS
//! packages are `.tar.gz`; those are handed to the system `tar`, which every
//! server that can run a Source dedicated server already has.

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

use crate::core::InstallerError;
use crate::utils::platform::find_command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarGz,
    Tar,
}

impl ArchiveKind {
    /// Detects the format from the file name, case-insensitively.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

/// Unpacks `archive` into `dest`, creating `dest` if needed.
///
/// # Errors
///
/// - [`InstallerError::UnsupportedArchive`] for unknown extensions
/// - [`InstallerError::CommandNotFound`] when a tarball is given and `tar` is missing
/// - [`InstallerError::ArchiveExtractionFailed`] for corrupt archives or a failing `tar`
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<(), InstallerError> {
    let kind = ArchiveKind::from_path(archive).ok_or_else(|| InstallerError::UnsupportedArchive {
        path: archive.to_path_buf(),
    })?;
    fs::create_dir_all(dest)?;
    debug!("Extracting {} ({kind:?}) into {}", archive.display(), dest.display());

    match kind {
        ArchiveKind::Zip => extract_zip(archive, dest),
        ArchiveKind::TarGz => extract_tar(archive, dest, true),
        ArchiveKind::Tar => extract_tar(archive, dest, false),
    }
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<(), InstallerError> {
    let failed = |reason: String| InstallerError::ArchiveExtractionFailed {
        path: archive.to_path_buf(),
        reason,
    };

    let file = fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| failed(e.to_string()))?;
    // Entries escaping `dest` are rejected by the zip crate
    zip.extract(dest).map_err(|e| failed(e.to_string()))
}

fn extract_tar(archive: &Path, dest: &Path, gzip: bool) -> Result<(), InstallerError> {
    let tar = find_command("tar")?;
    let flags = if gzip { "-xzf" } else { "-xf" };

    let output = Command::new(tar)
        .arg(flags)
        .arg(archive)
        .arg("-C")
        .arg(dest)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        Err(InstallerError::ArchiveExtractionFailed {
            path: archive.to_path_buf(),
            reason: if stderr.is_empty() { format!("tar exited with {}", output.status) } else { stderr },
        })
    }
}
