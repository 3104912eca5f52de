//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tower::ServiceExt;

use chunkhub_api::router::build_router;
use chunkhub_api::state::AppState;
use chunkhub_core::config::AppConfig;
use chunkhub_storage::ChunkStore;

/// Small nominal chunk size so tests exercise multi-chunk files cheaply.
pub const TEST_CHUNK_SIZE: u64 = 8;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Application config
    pub config: AppConfig,
    _tmp: tempfile::TempDir,
}

impl TestApp {
    /// Create a new test application over a fresh temp directory
    pub async fn new() -> Self {
        let tmp = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config = AppConfig::default();
        config.storage.public_dir = tmp.path().join("public").to_string_lossy().to_string();
        config.storage.staging_dir = tmp.path().join("staging").to_string_lossy().to_string();
        config.storage.chunk_size_bytes = TEST_CHUNK_SIZE;

        let store = ChunkStore::new(&config.storage)
            .await
            .expect("Failed to init store");
        let router = build_router(AppState::new(config.clone(), store));

        Self {
            router,
            config,
            _tmp: tmp,
        }
    }

    /// Path of a finalized file on disk
    pub fn public_path(&self, filename: &str) -> PathBuf {
        PathBuf::from(&self.config.storage.public_dir).join(filename)
    }

    /// Path of a staged chunk on disk
    pub fn chunk_path(&self, filename: &str, chunk_file_name: &str) -> PathBuf {
        PathBuf::from(&self.config.storage.staging_dir)
            .join(filename)
            .join(chunk_file_name)
    }

    /// Issue a GET request and return status + parsed JSON body
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    /// Upload one chunk's bytes at the given offset
    pub async fn upload_chunk(
        &self,
        filename: &str,
        chunk_file_name: &str,
        start: u64,
        data: Vec<u8>,
    ) -> (StatusCode, Value) {
        let uri = format!("/upload/{filename}?chunkFileName={chunk_file_name}&start={start}");
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/octet-stream")
                    .body(Body::from(data))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    /// Split `data` by the test chunk size and upload every chunk at offset 0
    pub async fn upload_all_chunks(&self, filename: &str, data: &[u8]) {
        for (i, chunk) in data.chunks(TEST_CHUNK_SIZE as usize).enumerate() {
            let (status, _) = self
                .upload_chunk(filename, &format!("{filename}-{i}"), 0, chunk.to_vec())
                .await;
            assert_eq!(status, StatusCode::OK, "chunk {i} upload failed");
        }
    }
}

/// Content-addressed name the client would compute for `data`
pub fn storage_name(data: &[u8], ext: &str) -> String {
    format!("{}.{ext}", hex::encode(Sha256::digest(data)))
}
