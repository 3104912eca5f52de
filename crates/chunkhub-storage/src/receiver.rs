//! Byte-offset chunk reception.

use std::io::SeekFrom;

use futures::StreamExt;
use tokio::fs;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tracing::debug;

use chunkhub_core::error::{AppError, ErrorKind};
use chunkhub_core::result::AppResult;

use crate::store::{ByteStream, ChunkStore};

/// What happened to an incoming chunk stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveOutcome {
    /// Bytes flushed to the staging file by this request.
    pub bytes_written: u64,
    /// The client went away mid-stream. Not an error: whatever was flushed
    /// stays on disk and a later verify call reports it for resume.
    pub aborted: bool,
}

/// Writes incoming chunk streams into staging files at a caller-supplied
/// byte offset.
///
/// Two different chunks of the same filename may be received in parallel;
/// they target different staging files and never interfere. The receiver
/// deliberately does not cross-check `start_offset` against the on-disk
/// size — the caller derives it from the verify step.
#[derive(Debug, Clone)]
pub struct ChunkReceiver {
    store: ChunkStore,
}

impl ChunkReceiver {
    /// Create a receiver over the given store.
    pub fn new(store: ChunkStore) -> Self {
        Self { store }
    }

    /// Write `stream` into the staging file for `chunk_file_name`, starting
    /// at `start_offset`.
    ///
    /// Bytes before the offset are preserved; everything from the offset
    /// onward is replaced. The file is truncated to the offset first, so a
    /// shorter rewrite never leaves stale tail bytes behind and an offset
    /// of 0 fully overwrites, making whole-chunk retries always safe.
    pub async fn receive(
        &self,
        filename: &str,
        chunk_file_name: &str,
        start_offset: u64,
        mut stream: ByteStream,
    ) -> AppResult<ReceiveOutcome> {
        self.store.ensure_staging_dir(filename).await?;
        let path = self.store.chunk_path(filename, chunk_file_name)?;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .open(&path)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to open staging file: {}", path.display()),
                    e,
                )
            })?;

        // Drop any stale bytes past the rewrite point, e.g. an oversized
        // leftover being resent from scratch.
        file.set_len(start_offset).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to truncate staging file to {start_offset}"),
                e,
            )
        })?;

        file.seek(SeekFrom::Start(start_offset)).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to seek to offset {start_offset}"),
                e,
            )
        })?;

        let mut bytes_written = 0u64;
        let mut aborted = false;

        while let Some(next) = stream.next().await {
            match next {
                Ok(data) => {
                    file.write_all(&data).await.map_err(|e| {
                        AppError::with_source(
                            ErrorKind::Storage,
                            format!("Failed to write chunk data: {}", path.display()),
                            e,
                        )
                    })?;
                    bytes_written += data.len() as u64;
                }
                Err(e) => {
                    // The connection dropped. Flush what arrived and stop;
                    // the partial bytes are what makes resume possible.
                    debug!(
                        chunk = chunk_file_name,
                        bytes_written,
                        error = %e,
                        "Client aborted mid-chunk"
                    );
                    aborted = true;
                    break;
                }
            }
        }

        file.flush().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to flush staging file", e)
        })?;

        debug!(
            filename,
            chunk = chunk_file_name,
            start_offset,
            bytes_written,
            aborted,
            "Chunk received"
        );

        Ok(ReceiveOutcome {
            bytes_written,
            aborted,
        })
    }
}
