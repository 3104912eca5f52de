//! # chunkhub-api
//!
//! HTTP API layer for ChunkHub built on Axum.
//!
//! Exposes the verify/upload/merge protocol endpoints, middleware (CORS,
//! tracing, request logging, body limit), DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
