//! On-disk layout for staged chunks and finalized files.
//!
//! Two directory trees back the whole protocol: `public/<filename>` holds
//! completed files, `staging/<filename>/<chunkFileName>` holds in-flight
//! chunks. Operations on different filenames never share state, so no
//! in-process locking is needed.

use std::path::{Path, PathBuf};
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use tokio::fs;

use chunkhub_core::config::storage::StorageConfig;
use chunkhub_core::error::{AppError, ErrorKind};
use chunkhub_core::result::AppResult;
use chunkhub_core::types::{ChunkStatus, validate_path_component};

/// A byte stream type used for reading request bodies and file contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Manages the staging and final storage directory trees.
#[derive(Debug, Clone)]
pub struct ChunkStore {
    /// Directory for completed, finalized files.
    public_root: PathBuf,
    /// Directory holding one subdirectory of chunks per in-flight filename.
    staging_root: PathBuf,
}

impl ChunkStore {
    /// Create a store rooted at the configured directories, creating both
    /// if absent.
    pub async fn new(config: &StorageConfig) -> AppResult<Self> {
        let public_root = PathBuf::from(&config.public_dir);
        let staging_root = PathBuf::from(&config.staging_dir);

        for root in [&public_root, &staging_root] {
            fs::create_dir_all(root).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create storage root: {}", root.display()),
                    e,
                )
            })?;
        }

        Ok(Self {
            public_root,
            staging_root,
        })
    }

    /// Path of the finalized file for `filename`.
    pub fn public_path(&self, filename: &str) -> AppResult<PathBuf> {
        validate_path_component(filename)?;
        Ok(self.public_root.join(filename))
    }

    /// Staging directory for `filename`.
    pub fn staging_dir(&self, filename: &str) -> AppResult<PathBuf> {
        validate_path_component(filename)?;
        Ok(self.staging_root.join(filename))
    }

    /// Staging file path for one chunk of `filename`.
    pub fn chunk_path(&self, filename: &str, chunk_file_name: &str) -> AppResult<PathBuf> {
        validate_path_component(chunk_file_name)?;
        Ok(self.staging_dir(filename)?.join(chunk_file_name))
    }

    /// Whether the finalized file already exists.
    ///
    /// An existence check that itself fails is treated as "not there"; the
    /// caller then proceeds as for a fresh upload.
    pub async fn final_exists(&self, filename: &str) -> AppResult<bool> {
        let path = self.public_path(filename)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    /// Create the staging directory for `filename` if it does not exist.
    ///
    /// `create_dir_all` succeeds when another concurrent caller created the
    /// directory first, which is exactly the required behavior.
    pub async fn ensure_staging_dir(&self, filename: &str) -> AppResult<PathBuf> {
        let dir = self.staging_dir(filename)?;
        fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create staging directory: {}", dir.display()),
                e,
            )
        })?;
        Ok(dir)
    }

    /// List every staged chunk of `filename` with its current on-disk size.
    ///
    /// Returns an empty list when no staging directory exists.
    pub async fn list_chunks(&self, filename: &str) -> AppResult<Vec<ChunkStatus>> {
        let dir = self.staging_dir(filename)?;
        // A failed existence check counts as absent, same as in final_exists.
        if !fs::try_exists(&dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let mut chunks = Vec::new();
        let mut entries = fs::read_dir(&dir).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to list staging directory: {}", dir.display()),
                e,
            )
        })?;

        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read staging entry", e)
        })? {
            let meta = entry.metadata().await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to stat staged chunk", e)
            })?;
            if !meta.is_file() {
                continue;
            }
            chunks.push(ChunkStatus {
                chunk_file_name: entry.file_name().to_string_lossy().to_string(),
                size: meta.len(),
            });
        }

        chunks.sort_by(|a, b| a.chunk_file_name.cmp(&b.chunk_file_name));
        Ok(chunks)
    }

    /// Remove the staging directory of `filename` and everything in it.
    pub async fn remove_staging(&self, filename: &str) -> AppResult<()> {
        let dir = self.staging_dir(filename)?;
        if fs::try_exists(&dir).await.unwrap_or(false) {
            fs::remove_dir_all(&dir).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to remove staging directory: {}", dir.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Root directory for finalized files.
    pub fn public_root(&self) -> &Path {
        &self.public_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_in(dir: &tempfile::TempDir) -> ChunkStore {
        let config = StorageConfig {
            public_dir: dir.path().join("public").to_string_lossy().to_string(),
            staging_dir: dir.path().join("staging").to_string_lossy().to_string(),
            ..StorageConfig::default()
        };
        ChunkStore::new(&config).await.unwrap()
    }

    #[tokio::test]
    async fn test_roots_created() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;
        assert!(dir.path().join("public").is_dir());
        assert!(dir.path().join("staging").is_dir());
        assert!(!store.final_exists("abc.bin").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_chunks_reports_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        let staging = store.ensure_staging_dir("abc.bin").await.unwrap();
        fs::write(staging.join("abc.bin-0"), b"12345").await.unwrap();
        fs::write(staging.join("abc.bin-1"), b"67").await.unwrap();

        let chunks = store.list_chunks("abc.bin").await.unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chunk_file_name, "abc.bin-0");
        assert_eq!(chunks[0].size, 5);
        assert_eq!(chunks[1].size, 2);
    }

    #[tokio::test]
    async fn test_list_chunks_without_staging_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;
        assert!(store.list_chunks("ghost.bin").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_staging() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        let staging = store.ensure_staging_dir("abc.bin").await.unwrap();
        fs::write(staging.join("abc.bin-0"), b"x").await.unwrap();

        store.remove_staging("abc.bin").await.unwrap();
        assert!(!staging.exists());

        // Removing again is a no-op.
        store.remove_staging("abc.bin").await.unwrap();
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;
        assert!(store.public_path("../escape").is_err());
        assert!(store.chunk_path("abc.bin", "../../etc/passwd").is_err());
    }
}
