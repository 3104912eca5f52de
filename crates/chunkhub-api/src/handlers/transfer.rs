//! Verify, chunk upload, and merge handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use futures::TryStreamExt;

use chunkhub_core::types::UploadPlan;

use crate::dto::request::UploadChunkParams;
use crate::dto::response::{ApiResponse, MergeResponse, UploadChunkResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /verify/{filename}
///
/// Reports whether the file still needs uploading and which chunks are
/// already staged. Read-only; staleness between this call and the uploads
/// is tolerated because chunk writes are idempotent at offset 0.
pub async fn verify_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<ApiResponse<UploadPlan>>, ApiError> {
    let plan = state.planner.plan(&filename).await?;
    Ok(Json(ApiResponse::ok(plan)))
}

/// POST /upload/{filename}?chunkFileName=...&start=N
///
/// Streams the raw request body into the chunk's staging file at the given
/// offset. A client abort mid-stream is not an error: the bytes already
/// flushed stay on disk and show up in the next verify call.
pub async fn upload_chunk(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Query(params): Query<UploadChunkParams>,
    body: Body,
) -> Result<Json<ApiResponse<UploadChunkResponse>>, ApiError> {
    let stream = body.into_data_stream().map_err(std::io::Error::other);

    let outcome = state
        .receiver
        .receive(
            &filename,
            &params.chunk_file_name,
            params.start,
            Box::pin(stream),
        )
        .await?;

    Ok(Json(ApiResponse::ok(UploadChunkResponse {
        chunk_file_name: params.chunk_file_name,
        bytes_written: outcome.bytes_written,
    })))
}

/// GET /merge/{filename}
///
/// Reconstructs the finalized file from its staged chunks. Fails without
/// touching the staging directory when chunks are missing or a copy fails,
/// so the caller can retry.
pub async fn merge_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<ApiResponse<MergeResponse>>, ApiError> {
    let size_bytes = state.merger.merge(&filename).await?;
    Ok(Json(ApiResponse::ok(MergeResponse {
        filename,
        size_bytes,
    })))
}
