//! Media Picker Proxy - relays picker requests to Pexels with a server-held key.
//!
//! The picker talks to this server in proxy mode so the API key never reaches
//! the browser. Paths and query strings are forwarded unchanged.

mod handler;
mod server;

use anyhow::Result;
use clap::Parser;
use media_picker_core::PexelsConfig;
use server::ProxyConfig;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "media-picker-proxy")]
#[command(about = "Pexels API relay for the media picker")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "8787")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Upstream API base URL
    #[arg(long, default_value = PexelsConfig::API_BASE)]
    upstream: String,

    /// Path prefix the relay is mounted under (e.g. /api/pexels)
    #[arg(long, default_value = "")]
    base_path: String,

    /// Pexels API key
    #[arg(long, env = "PEXELS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting media picker proxy");

    if args.api_key.as_deref().map_or(true, str::is_empty) {
        warn!(
            "{} is not set; every relayed request will fail with 500",
            PexelsConfig::API_KEY_ENV_VAR
        );
    }

    let config = ProxyConfig::new(args.upstream)
        .api_key(args.api_key)
        .base_path(args.base_path);

    let addr = server::start_server(config, &args.host, args.port).await?;
    info!("Proxy running on {}", addr);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
