//! # chunkhub-core
//!
//! Core crate for ChunkHub. Contains configuration schemas, the chunk
//! naming types shared between client and server, the verify-plan DTO,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other ChunkHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
