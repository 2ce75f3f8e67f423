//! Sherpa example server.
//!
//! Serves the example API (`sum`, `echo`, `concat`, `divide`, `int64Test`,
//! `stats`) so clients and the browser script can be tried out.

use anyhow::Result;
use clap::Parser;
use sherpa_core::config::ServerConfig;
use sherpa_server::{example::example_api, start_server, ServerOptions};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "sherpa-example")]
#[command(about = "Serve the Sherpa example API")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "0")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = ServerConfig::DEFAULT_HOST)]
    host: String,

    /// Base URL advertised in the descriptor; also decides the mount path.
    /// Defaults to http://HOST:PORT/ for a fixed port, or / otherwise.
    #[arg(long)]
    base_url: Option<String>,

    /// Maximum request body size in bytes
    #[arg(long, default_value_t = ServerConfig::MAX_BODY_BYTES)]
    max_body_bytes: usize,

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

    info!("Starting Sherpa example server");

    let base_url = match args.base_url {
        Some(url) => url,
        None if args.port != 0 => format!("http://{}:{}/", args.host, args.port),
        None => "/".to_string(),
    };
    let api = example_api(&base_url)?;

    let options = ServerOptions {
        host: args.host,
        port: args.port,
        max_body_bytes: args.max_body_bytes,
    };
    let addr = start_server(api, &options).await?;

    // Machine-readable port for scripts that launch the server
    println!("SHERPA_PORT={}", addr.port());

    info!("Example API running on {}", addr);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
