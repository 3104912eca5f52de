//! # chunkhub-client
//!
//! Client side of the ChunkHub protocol: content-addressed file naming and
//! the upload driver that verifies, skips or resumes chunks, and triggers
//! the merge.

pub mod namer;
pub mod uploader;

pub use namer::storage_name;
pub use uploader::{UploadOutcome, Uploader};
