//! Request DTOs.

use serde::{Deserialize, Serialize};

/// Query parameters of the chunk upload endpoint.
///
/// camelCase on the wire: `?chunkFileName=<hash>.<ext>-<index>&start=N`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadChunkParams {
    /// Staging file name for this chunk, `<filename>-<index>`.
    pub chunk_file_name: String,
    /// Byte offset to write at; 0 for a fresh submission, the previously
    /// reported partial size when resuming.
    #[serde(default)]
    pub start: u64,
}
