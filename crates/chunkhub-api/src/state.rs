//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use chunkhub_core::config::AppConfig;
use chunkhub_storage::{ChunkMerger, ChunkReceiver, ChunkStore, ResumePlanner};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Resume planner backing the verify endpoint.
    pub planner: Arc<ResumePlanner>,
    /// Chunk receiver backing the upload endpoint.
    pub receiver: Arc<ChunkReceiver>,
    /// Merger backing the merge endpoint.
    pub merger: Arc<ChunkMerger>,
}

impl AppState {
    /// Wire the protocol services over one store.
    pub fn new(config: AppConfig, store: ChunkStore) -> Self {
        let chunk_size = config.storage.chunk_size_bytes;
        Self {
            config: Arc::new(config),
            planner: Arc::new(ResumePlanner::new(store.clone())),
            receiver: Arc::new(ChunkReceiver::new(store.clone())),
            merger: Arc::new(ChunkMerger::new(store, chunk_size)),
        }
    }
}
