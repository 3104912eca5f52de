//! Resumable upload driver.
//!
//! Drives the full protocol for one file: verify the content-addressed
//! name, skip chunks already fully staged, byte-offset-resume partial ones,
//! upload the rest with bounded concurrency, then trigger the merge.

use std::io::SeekFrom;
use std::path::Path;

use futures::{StreamExt, TryStreamExt};
use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use chunkhub_core::config::storage::StorageConfig;
use chunkhub_core::error::{AppError, ErrorKind};
use chunkhub_core::result::AppResult;
use chunkhub_core::types::{UploadPlan, chunk_file_name};

use crate::namer;

/// Default number of chunks in flight at once.
const DEFAULT_CONCURRENCY: usize = 4;

/// Server response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[allow(dead_code)]
    success: bool,
    data: T,
}

/// Result of driving one file upload.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// The content-addressed storage name.
    pub filename: String,
    /// The server already had this content; nothing was sent.
    pub skipped: bool,
    /// Bytes actually transferred by this run.
    pub bytes_sent: u64,
}

/// One chunk still to send.
#[derive(Debug, Clone)]
struct ChunkJob {
    chunk_file_name: String,
    /// Absolute offset of the chunk within the source file.
    file_offset: u64,
    /// Full length of this chunk.
    len: u64,
    /// Offset within the chunk to resume from.
    start: u64,
}

/// HTTP client for the ChunkHub upload protocol.
#[derive(Debug, Clone)]
pub struct Uploader {
    http: reqwest::Client,
    base_url: String,
    chunk_size: u64,
    max_file_size: u64,
    concurrency: usize,
}

impl Uploader {
    /// Create an uploader against `base_url`, splitting per the shared
    /// storage configuration.
    pub fn new(base_url: impl Into<String>, storage: &StorageConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            chunk_size: storage.chunk_size_bytes,
            max_file_size: storage.max_upload_size_bytes,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Override the number of chunks uploaded in parallel.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Upload the file at `path`, resuming any earlier partial attempt.
    pub async fn upload(&self, path: &Path) -> AppResult<UploadOutcome> {
        let size = tokio::fs::metadata(path)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Validation,
                    format!("Cannot stat file: {}", path.display()),
                    e,
                )
            })?
            .len();

        if size == 0 {
            return Err(AppError::validation("Refusing to upload an empty file"));
        }
        if size > self.max_file_size {
            return Err(AppError::validation(format!(
                "File is {size} bytes, exceeding the {} byte limit",
                self.max_file_size
            )));
        }

        let filename = namer::storage_name(path).await?;
        let plan = self.verify(&filename).await?;

        if !plan.need_upload {
            info!(filename, "Content already stored, skipping upload");
            return Ok(UploadOutcome {
                filename,
                skipped: true,
                bytes_sent: 0,
            });
        }

        let jobs = self.plan_jobs(&filename, size, &plan);
        debug!(filename, remaining = jobs.len(), "Uploading chunks");

        let sent: Vec<u64> = futures::stream::iter(
            jobs.iter().map(|job| self.send_chunk(path, &filename, job)),
        )
        .buffer_unordered(self.concurrency)
        .try_collect()
        .await?;

        self.merge(&filename).await?;

        let bytes_sent = sent.iter().sum();
        info!(filename, bytes_sent, "Upload complete");
        Ok(UploadOutcome {
            filename,
            skipped: false,
            bytes_sent,
        })
    }

    /// Decide what remains to send, given the server's plan.
    fn plan_jobs(&self, filename: &str, size: u64, plan: &UploadPlan) -> Vec<ChunkJob> {
        let total_chunks = size.div_ceil(self.chunk_size);
        let mut jobs = Vec::new();

        for index in 0..total_chunks {
            let file_offset = index * self.chunk_size;
            let len = self.chunk_size.min(size - file_offset);
            let name = chunk_file_name(filename, index);

            let start = match plan.staged_size(&name) {
                Some(staged) if staged == len => continue,
                Some(staged) if staged < len => staged,
                // Oversized leftovers are resent from scratch.
                Some(_) => 0,
                None => 0,
            };

            jobs.push(ChunkJob {
                chunk_file_name: name,
                file_offset,
                len,
                start,
            });
        }

        jobs
    }

    /// Stream one chunk's remaining bytes to the server.
    async fn send_chunk(&self, path: &Path, filename: &str, job: &ChunkJob) -> AppResult<u64> {
        let mut file = tokio::fs::File::open(path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Cannot open file: {}", path.display()),
                e,
            )
        })?;
        file.seek(SeekFrom::Start(job.file_offset + job.start))
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Cannot seek to chunk offset", e)
            })?;

        let remaining = job.len - job.start;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file.take(remaining)));

        let url = format!("{}/upload/{}", self.base_url, filename);
        let response = self
            .http
            .post(&url)
            .query(&[
                ("chunkFileName", job.chunk_file_name.as_str()),
                ("start", &job.start.to_string()),
            ])
            .body(body)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Chunk upload failed: {}", job.chunk_file_name),
                    e,
                )
            })?;

        if !response.status().is_success() {
            return Err(AppError::storage(format!(
                "Server rejected chunk {} with status {}",
                job.chunk_file_name,
                response.status()
            )));
        }

        debug!(chunk = %job.chunk_file_name, bytes = remaining, "Chunk sent");
        Ok(remaining)
    }

    /// Ask the server what is already stored or staged for `filename`.
    pub async fn verify(&self, filename: &str) -> AppResult<UploadPlan> {
        let url = format!("{}/verify/{}", self.base_url, filename);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Verify request failed", e))?
            .error_for_status()
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Verify request rejected", e))?;

        let envelope: Envelope<UploadPlan> = response.json().await.map_err(|e| {
            AppError::with_source(ErrorKind::Serialization, "Malformed verify response", e)
        })?;
        Ok(envelope.data)
    }

    /// Trigger the server-side merge once every chunk is acknowledged.
    pub async fn merge(&self, filename: &str) -> AppResult<()> {
        let url = format!("{}/merge/{}", self.base_url, filename);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Merge, "Merge request failed", e))?;

        if !response.status().is_success() {
            return Err(AppError::merge(format!(
                "Server failed to merge '{filename}' (status {})",
                response.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkhub_core::types::ChunkStatus;

    fn uploader() -> Uploader {
        let storage = StorageConfig {
            chunk_size_bytes: 10,
            ..StorageConfig::default()
        };
        Uploader::new("http://localhost:8080/", &storage)
    }

    fn plan_with(entries: Vec<(&str, u64)>) -> UploadPlan {
        UploadPlan::needs_upload(
            entries
                .into_iter()
                .map(|(name, size)| ChunkStatus {
                    chunk_file_name: name.to_string(),
                    size,
                })
                .collect(),
        )
    }

    #[test]
    fn test_jobs_for_fresh_upload() {
        let jobs = uploader().plan_jobs("h.bin", 25, &plan_with(vec![]));
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0].file_offset, 0);
        assert_eq!(jobs[0].len, 10);
        assert_eq!(jobs[2].file_offset, 20);
        // Last chunk is short.
        assert_eq!(jobs[2].len, 5);
        assert!(jobs.iter().all(|j| j.start == 0));
    }

    #[test]
    fn test_complete_chunk_skipped_partial_resumed() {
        let plan = plan_with(vec![("h.bin-0", 10), ("h.bin-1", 4)]);
        let jobs = uploader().plan_jobs("h.bin", 25, &plan);

        // Chunk 0 is complete, chunk 1 resumes at 4, chunk 2 is fresh.
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].chunk_file_name, "h.bin-1");
        assert_eq!(jobs[0].start, 4);
        assert_eq!(jobs[1].chunk_file_name, "h.bin-2");
        assert_eq!(jobs[1].start, 0);
    }

    #[test]
    fn test_oversized_leftover_resent_from_scratch() {
        let plan = plan_with(vec![("h.bin-2", 9)]);
        let jobs = uploader().plan_jobs("h.bin", 25, &plan);
        let last = jobs.iter().find(|j| j.chunk_file_name == "h.bin-2").unwrap();
        // Chunk 2 is only 5 bytes long; 9 staged bytes cannot be trusted.
        assert_eq!(last.start, 0);
    }
}
