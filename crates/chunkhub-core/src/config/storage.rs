//! Upload storage configuration.

use serde::{Deserialize, Serialize};

/// Top-level storage configuration.
///
/// `chunk_size_bytes` is the nominal fixed chunk size the client splits
/// with and the merger multiplies by to place each chunk — both sides must
/// agree on it, it is never negotiated per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding completed, finalized files.
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
    /// Directory holding in-flight chunks, one subdirectory per upload.
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,
    /// Nominal chunk size in bytes (default 100 MB).
    #[serde(default = "default_chunk_size")]
    pub chunk_size_bytes: u64,
    /// Maximum upload size in bytes (default 2 GB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            public_dir: default_public_dir(),
            staging_dir: default_staging_dir(),
            chunk_size_bytes: default_chunk_size(),
            max_upload_size_bytes: default_max_upload(),
        }
    }
}

fn default_public_dir() -> String {
    "./data/public".to_string()
}

fn default_staging_dir() -> String {
    "./data/staging".to_string()
}

fn default_chunk_size() -> u64 {
    104_857_600 // 100 MB
}

fn default_max_upload() -> u64 {
    2_147_483_648 // 2 GB
}
