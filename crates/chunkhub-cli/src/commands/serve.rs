//! Server CLI command.

use clap::Args;

use chunkhub_core::config::AppConfig;
use chunkhub_core::error::AppError;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the bind port
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, env: &str) -> Result<(), AppError> {
    let mut config = AppConfig::load(env)?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    chunkhub_api::run_server(config).await
}
