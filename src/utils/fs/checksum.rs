//! Content hashing for change detection.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;

/// Computes the SHA-256 checksum of a file in `sha256:<hex>` form.
///
/// The file is streamed through the hasher, so package binaries of any
/// size are fine.
///
/// # Errors
///
/// Fails if the file cannot be opened or read.
pub fn compute_sha256(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)
        .with_context(|| format!("Failed to read file for checksum: {}", path.display()))?;

    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("Failed to read file for checksum: {}", path.display()))?;

    Ok(format!("sha256:{}", hex::encode(hasher.finalize())))
}

/// Returns `true` when both files exist and hold the same bytes.
///
/// Sizes are compared first; hashes are only computed when they match. A
/// missing `b` is simply "not identical".
///
/// # Errors
///
/// Fails if `a` cannot be read, or `b` exists but cannot be read.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool> {
    let b_meta = match fs::metadata(b) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read metadata: {}", b.display()));
        }
    };
    if !b_meta.is_file() {
        return Ok(false);
    }

    let a_meta =
        fs::metadata(a).with_context(|| format!("Failed to read metadata: {}", a.display()))?;
    if a_meta.len() != b_meta.len() {
        return Ok(false);
    }

    Ok(compute_sha256(a)? == compute_sha256(b)?)
}
