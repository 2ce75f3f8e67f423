//! HTTP server bootstrap using Axum.

use crate::router::mounted_router;
use axum::Router;
use sherpa_core::config::ServerConfig;
use sherpa_core::Api;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

/// Listener settings.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub host: String,
    /// Port to listen on (0 = auto-assign)
    pub port: u16,
    pub max_body_bytes: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: ServerConfig::DEFAULT_HOST.to_string(),
            port: 0,
            max_body_bytes: ServerConfig::MAX_BODY_BYTES,
        }
    }
}

/// Router for `api`, nested under the path of its base URL.
pub fn app(api: Arc<Api>, max_body_bytes: usize) -> Router {
    mounted_router(api, max_body_bytes)
}

/// Start serving `api` in the background.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_server(api: Api, options: &ServerOptions) -> anyhow::Result<SocketAddr> {
    let mount = api.base_url().path().to_string();
    let app = app(Arc::new(api), options.max_body_bytes);

    let addr: SocketAddr = format!("{}:{}", options.host, options.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Sherpa API listening on {}{}", actual_addr, mount);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Server error: {}", e);
        }
    });

    Ok(actual_addr)
}
