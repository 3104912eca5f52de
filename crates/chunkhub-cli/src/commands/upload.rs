//! File upload CLI command.

use std::path::PathBuf;

use clap::Args;

use chunkhub_client::Uploader;
use chunkhub_core::config::AppConfig;
use chunkhub_core::error::AppError;

/// Arguments for the upload command
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Path to the file to upload
    pub file: PathBuf,

    /// Server base URL
    #[arg(short, long, default_value = "http://localhost:8080")]
    pub server: String,

    /// Number of chunks to upload in parallel
    #[arg(short, long, default_value_t = 4)]
    pub concurrency: usize,
}

/// Execute the upload command
pub async fn execute(args: &UploadArgs, env: &str) -> Result<(), AppError> {
    if !args.file.exists() {
        return Err(AppError::not_found(format!(
            "File not found: {}",
            args.file.display()
        )));
    }

    let config = AppConfig::load(env)?;
    let uploader =
        Uploader::new(&args.server, &config.storage).with_concurrency(args.concurrency);

    println!("Uploading '{}'...", args.file.display());
    let outcome = uploader.upload(&args.file).await?;

    if outcome.skipped {
        println!(
            "Content already stored as '{}', nothing sent",
            outcome.filename
        );
    } else {
        println!(
            "Stored as '{}' ({} bytes sent)",
            outcome.filename, outcome.bytes_sent
        );
    }

    Ok(())
}
