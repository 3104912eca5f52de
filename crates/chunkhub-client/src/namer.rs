//! Content-addressed file naming.
//!
//! The storage name of a file is `<sha256-hex>.<ext>`: the lowercase hex
//! SHA-256 digest of the entire content, then the substring of the original
//! name after the last `.` — or the whole name when there is no dot, kept
//! for wire compatibility with existing clients. Byte-identical content
//! therefore always resolves to the same stored name.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use chunkhub_core::error::{AppError, ErrorKind};
use chunkhub_core::result::AppResult;

/// Compute the storage name for the file at `path`.
///
/// Hashing a large file is CPU- and I/O-bound, so it runs on a blocking
/// worker thread and never stalls the async runtime. A read failure is
/// reported as a distinct hash error rather than producing a wrong name.
pub async fn storage_name(path: &Path) -> AppResult<String> {
    let path = PathBuf::from(path);
    tokio::task::spawn_blocking(move || hash_name(&path))
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Hash, "Hashing task failed", e))?
}

fn hash_name(path: &Path) -> AppResult<String> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::validation(format!("No file name in path: {}", path.display())))?;

    let mut file = std::fs::File::open(path).map_err(|e| {
        AppError::with_source(
            ErrorKind::Hash,
            format!("Cannot open file for hashing: {}", path.display()),
            e,
        )
    })?;

    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(|e| {
        AppError::with_source(
            ErrorKind::Hash,
            format!("Cannot read file for hashing: {}", path.display()),
            e,
        )
    })?;

    let digest = hex::encode(hasher.finalize());
    let ext = extension_of(file_name);
    Ok(format!("{digest}.{ext}"))
}

/// Everything after the last `.`, or the whole name when there is no dot.
fn extension_of(file_name: &str) -> &str {
    file_name.rsplit('.').next().unwrap_or(file_name)
}
