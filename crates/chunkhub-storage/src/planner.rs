//! Resume planning for a target filename.

use tracing::debug;

use chunkhub_core::result::AppResult;
use chunkhub_core::types::UploadPlan;

use crate::store::ChunkStore;

/// Reports whether a file still needs uploading and which chunks are
/// already (partially) staged.
///
/// Pure read: the plan may be stale by the time the caller acts on it,
/// which is tolerated because chunk reception is idempotent at offset 0.
#[derive(Debug, Clone)]
pub struct ResumePlanner {
    store: ChunkStore,
}

impl ResumePlanner {
    /// Create a planner over the given store.
    pub fn new(store: ChunkStore) -> Self {
        Self { store }
    }

    /// Plan the upload of `filename`.
    ///
    /// When the finished file already exists the caller must skip the upload
    /// entirely; otherwise every staged chunk is listed with its current
    /// size so the caller can skip complete chunks and byte-offset-resume
    /// partial ones.
    pub async fn plan(&self, filename: &str) -> AppResult<UploadPlan> {
        if self.store.final_exists(filename).await? {
            debug!(filename, "File already finalized, no upload needed");
            return Ok(UploadPlan::already_stored());
        }

        let staged = self.store.list_chunks(filename).await?;
        debug!(filename, staged = staged.len(), "Planned upload");
        Ok(UploadPlan::needs_upload(staged))
    }
}
