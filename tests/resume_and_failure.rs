//! Resume, partial-chunk, and failure-path behavior over the HTTP API.

mod common;

use axum::http::StatusCode;

use common::{TEST_CHUNK_SIZE, TestApp, storage_name};

#[tokio::test]
async fn test_resume_cut_off_chunk_at_reported_offset() {
    let app = TestApp::new().await;

    let data: Vec<u8> = (0u8..24).collect();
    let filename = storage_name(&data, "bin");
    let chunk1 = format!("{filename}-1");

    // Chunks 0 and 2 arrive whole; chunk 1 is cut off after 3 bytes.
    app.upload_chunk(&filename, &format!("{filename}-0"), 0, data[..8].to_vec())
        .await;
    app.upload_chunk(&filename, &format!("{filename}-2"), 0, data[16..].to_vec())
        .await;
    app.upload_chunk(&filename, &chunk1, 0, data[8..11].to_vec())
        .await;

    // Verify reports the partial size.
    let (status, body) = app.get(&format!("/verify/{filename}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["needUpload"], true);
    let entry = body["data"]["uploadList"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["chunkFileName"] == chunk1.as_str())
        .expect("partial chunk missing from plan");
    assert_eq!(entry["size"], 3);

    // Resume chunk 1 from byte 3.
    let (status, _) = app
        .upload_chunk(&filename, &chunk1, 3, data[11..16].to_vec())
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&format!("/merge/{filename}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(std::fs::read(app.public_path(&filename)).unwrap(), data);
}

#[tokio::test]
async fn test_merge_with_missing_chunk_fails_and_preserves_staging() {
    let app = TestApp::new().await;

    let data: Vec<u8> = (0u8..20).collect();
    let filename = storage_name(&data, "bin");

    // Chunk 1 is never submitted.
    app.upload_chunk(&filename, &format!("{filename}-0"), 0, data[..8].to_vec())
        .await;
    app.upload_chunk(&filename, &format!("{filename}-2"), 0, data[16..].to_vec())
        .await;

    let (status, body) = app.get(&format!("/merge/{filename}")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "MERGE_FAILED");

    // Staged chunks survive for a retry.
    assert!(app.chunk_path(&filename, &format!("{filename}-0")).exists());
    assert!(app.chunk_path(&filename, &format!("{filename}-2")).exists());

    // Supplying the missing chunk makes the retry succeed.
    app.upload_chunk(&filename, &format!("{filename}-1"), 0, data[8..16].to_vec())
        .await;
    let (status, _) = app.get(&format!("/merge/{filename}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(std::fs::read(app.public_path(&filename)).unwrap(), data);
}

#[tokio::test]
async fn test_resend_over_oversized_leftover_discards_stale_tail() {
    let app = TestApp::new().await;

    let data: Vec<u8> = (0u8..13).collect();
    let filename = storage_name(&data, "bin");
    let chunk1 = format!("{filename}-1");

    app.upload_chunk(&filename, &format!("{filename}-0"), 0, data[..8].to_vec())
        .await;
    // A bad earlier attempt left chunk 1 longer than its real 5 bytes.
    app.upload_chunk(&filename, &chunk1, 0, vec![b'X'; 9]).await;

    // The client resends the whole chunk from scratch.
    let (status, _) = app
        .upload_chunk(&filename, &chunk1, 0, data[8..].to_vec())
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&format!("/merge/{filename}")).await;
    assert_eq!(status, StatusCode::OK);
    // The finalized file is exactly the source bytes, no junk tail.
    assert_eq!(std::fs::read(app.public_path(&filename)).unwrap(), data);
}

#[tokio::test]
async fn test_merge_copy_failure_preserves_staging() {
    let app = TestApp::new().await;

    let data: Vec<u8> = (0u8..20).collect();
    let filename = storage_name(&data, "bin");
    app.upload_all_chunks(&filename, &data).await;

    // A directory squatting on the output path makes every chunk copy fail
    // after the completeness check has already passed.
    std::fs::create_dir(app.public_path(&filename)).unwrap();

    let (status, body) = app.get(&format!("/merge/{filename}")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "MERGE_FAILED");

    // Staged chunks survive for a retry.
    for i in 0..3 {
        assert!(app.chunk_path(&filename, &format!("{filename}-{i}")).exists());
    }

    // Clearing the obstruction makes the retry succeed.
    std::fs::remove_dir(app.public_path(&filename)).unwrap();
    let (status, _) = app.get(&format!("/merge/{filename}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(std::fs::read(app.public_path(&filename)).unwrap(), data);
}

#[tokio::test]
async fn test_merge_without_any_chunks_fails() {
    let app = TestApp::new().await;
    let (status, _) = app.get("/merge/nothing-here.bin").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_traversal_names_rejected() {
    let app = TestApp::new().await;

    let (status, body) = app
        .upload_chunk("file.bin", "..", 0, b"evil".to_vec())
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_sequential_and_concurrent_submission_agree() {
    // Same content uploaded two ways must finalize to identical bytes.
    let data: Vec<u8> = (0..5 * TEST_CHUNK_SIZE as usize).map(|i| i as u8).collect();

    let sequential = TestApp::new().await;
    let filename = storage_name(&data, "bin");
    sequential.upload_all_chunks(&filename, &data).await;
    sequential.get(&format!("/merge/{filename}")).await;
    let seq_bytes = std::fs::read(sequential.public_path(&filename)).unwrap();

    let concurrent = std::sync::Arc::new(TestApp::new().await);
    let mut handles = Vec::new();
    for (i, chunk) in data.chunks(TEST_CHUNK_SIZE as usize).enumerate() {
        let app = std::sync::Arc::clone(&concurrent);
        let filename = filename.clone();
        let chunk = chunk.to_vec();
        handles.push(tokio::spawn(async move {
            app.upload_chunk(&filename, &format!("{filename}-{i}"), 0, chunk)
                .await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    concurrent.get(&format!("/merge/{filename}")).await;
    let conc_bytes = std::fs::read(concurrent.public_path(&filename)).unwrap();

    assert_eq!(seq_bytes, conc_bytes);
    assert_eq!(seq_bytes, data);
}
