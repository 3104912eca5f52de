//! Verify-plan DTO shared by server and client.

use serde::{Deserialize, Serialize};

/// Result of the verify/plan step for a target filename.
///
/// Field names are camelCase on the wire for compatibility with existing
/// upload clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPlan {
    /// `false` when the finished file already exists and the caller must
    /// skip the upload entirely.
    pub need_upload: bool,
    /// One entry per staging chunk already (partially) present. Absent
    /// chunks are simply omitted.
    #[serde(default)]
    pub upload_list: Vec<ChunkStatus>,
}

impl UploadPlan {
    /// Plan for a file that is already finalized.
    pub fn already_stored() -> Self {
        Self {
            need_upload: false,
            upload_list: Vec::new(),
        }
    }

    /// Plan listing the chunks currently staged.
    pub fn needs_upload(upload_list: Vec<ChunkStatus>) -> Self {
        Self {
            need_upload: true,
            upload_list,
        }
    }

    /// Bytes already staged for the given chunk file name, if any.
    pub fn staged_size(&self, chunk_file_name: &str) -> Option<u64> {
        self.upload_list
            .iter()
            .find(|c| c.chunk_file_name == chunk_file_name)
            .map(|c| c.size)
    }
}

/// Current on-disk state of one staged chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkStatus {
    /// Staging file name, `<filename>-<index>`.
    pub chunk_file_name: String,
    /// Bytes currently flushed to disk; smaller than the nominal chunk size
    /// when a previous attempt was cut off.
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let plan = UploadPlan::needs_upload(vec![ChunkStatus {
            chunk_file_name: "h.bin-0".to_string(),
            size: 42,
        }]);
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["needUpload"], true);
        assert_eq!(json["uploadList"][0]["chunkFileName"], "h.bin-0");
        assert_eq!(json["uploadList"][0]["size"], 42);
    }

    #[test]
    fn test_staged_size_lookup() {
        let plan = UploadPlan::needs_upload(vec![ChunkStatus {
            chunk_file_name: "h.bin-1".to_string(),
            size: 10,
        }]);
        assert_eq!(plan.staged_size("h.bin-1"), Some(10));
        assert_eq!(plan.staged_size("h.bin-0"), None);
    }
}
