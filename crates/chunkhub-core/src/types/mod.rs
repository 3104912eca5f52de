//! Shared domain types.

pub mod chunk;
pub mod plan;

pub use chunk::{chunk_file_name, parse_chunk_index, validate_path_component};
pub use plan::{ChunkStatus, UploadPlan};
