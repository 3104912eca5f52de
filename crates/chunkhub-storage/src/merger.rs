//! Concurrent reconstruction of a file from its staged chunks.

use std::io::SeekFrom;
use std::path::PathBuf;

use tokio::fs;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio::task::JoinSet;
use tracing::{info, warn};

use chunkhub_core::error::{AppError, ErrorKind};
use chunkhub_core::result::AppResult;
use chunkhub_core::types::parse_chunk_index;

use crate::store::ChunkStore;

/// Merges staged chunks into the finalized file.
///
/// Every chunk except the last is exactly the nominal chunk size, so chunk
/// `i` lands at absolute offset `i * chunk_size`. The target byte ranges
/// are disjoint, which lets all per-chunk copies run concurrently with no
/// synchronization beyond joining them.
#[derive(Debug, Clone)]
pub struct ChunkMerger {
    store: ChunkStore,
    /// Nominal chunk size shared with the client's splitter.
    chunk_size: u64,
}

impl ChunkMerger {
    /// Create a merger over the given store.
    pub fn new(store: ChunkStore, chunk_size: u64) -> Self {
        Self { store, chunk_size }
    }

    /// Reconstruct `filename` from its staged chunks.
    ///
    /// Refuses to run unless the staged indices form a dense `0..N-1` set;
    /// merging with a gap would silently finalize a corrupt file. On any
    /// copy failure the staging directory is left intact so the merge can
    /// be retried; partial output-file writes are harmless residue that a
    /// successful retry overwrites. Returns the total bytes written.
    pub async fn merge(&self, filename: &str) -> AppResult<u64> {
        let chunks = self.store.list_chunks(filename).await?;
        if chunks.is_empty() {
            return Err(AppError::new(
                ErrorKind::Merge,
                format!("No staged chunks for '{filename}'"),
            ));
        }

        let mut indexed: Vec<(u64, String)> = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            indexed.push((parse_chunk_index(&chunk.chunk_file_name)?, chunk.chunk_file_name.clone()));
        }
        indexed.sort_by_key(|(index, _)| *index);

        // Dense 0..N-1 or the output would have holes.
        for (expected, (actual, name)) in indexed.iter().enumerate() {
            if *actual != expected as u64 {
                return Err(AppError::new(
                    ErrorKind::Merge,
                    format!(
                        "Staged chunks for '{filename}' are incomplete: expected index {expected}, found '{name}'"
                    ),
                ));
            }
        }

        let output_path = self.store.public_path(filename)?;
        let mut tasks = JoinSet::new();

        for (index, chunk_file_name) in indexed {
            let source = self.store.chunk_path(filename, &chunk_file_name)?;
            let target = output_path.clone();
            let offset = index * self.chunk_size;
            tasks.spawn(copy_chunk(source, target, offset));
        }

        let mut total_bytes = 0u64;
        let mut failure: Option<AppError> = None;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(bytes)) => total_bytes += bytes,
                Ok(Err(e)) => {
                    warn!(filename, error = %e, "Chunk copy failed");
                    failure.get_or_insert(e);
                }
                Err(e) => {
                    failure.get_or_insert(AppError::with_source(
                        ErrorKind::Merge,
                        "Chunk copy task panicked",
                        e,
                    ));
                }
            }
        }

        if let Some(e) = failure {
            // Staging stays on disk for a retry.
            return Err(e);
        }

        self.store.remove_staging(filename).await?;

        info!(filename, bytes = total_bytes, "Merge complete");
        Ok(total_bytes)
    }
}

/// Copy one staged chunk into the output file at its absolute offset.
async fn copy_chunk(source: PathBuf, target: PathBuf, offset: u64) -> AppResult<u64> {
    let mut reader = fs::File::open(&source).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Merge,
            format!("Failed to open staged chunk: {}", source.display()),
            e,
        )
    })?;

    let mut writer = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .open(&target)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Merge,
                format!("Failed to open output file: {}", target.display()),
                e,
            )
        })?;

    writer.seek(SeekFrom::Start(offset)).await.map_err(|e| {
        AppError::with_source(ErrorKind::Merge, format!("Failed to seek to offset {offset}"), e)
    })?;

    let bytes = tokio::io::copy(&mut reader, &mut writer)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Merge,
                format!("Failed to copy chunk at offset {offset}"),
                e,
            )
        })?;

    writer.flush().await.map_err(|e| {
        AppError::with_source(ErrorKind::Merge, "Failed to flush output file", e)
    })?;

    Ok(bytes)
}
