//! CLI command definitions and dispatch.

pub mod serve;
pub mod upload;

use clap::{Parser, Subcommand};

use chunkhub_core::error::AppError;

/// ChunkHub — resumable chunked file uploads
#[derive(Debug, Parser)]
#[command(name = "chunkhub", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment overlay (config/<env>.toml)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the ChunkHub server
    Serve(serve::ServeArgs),
    /// Upload a file, resuming any earlier partial attempt
    Upload(upload::UploadArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.env).await,
            Commands::Upload(args) => upload::execute(args, &self.env).await,
        }
    }
}
