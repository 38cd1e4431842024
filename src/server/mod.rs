//! HTTP surface for crawls.
//!
//! `GET /crawler/:target` runs one crawl and returns its envelope.

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Config;
use crate::services::Crawler;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub crawler: Arc<Crawler>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            crawler: Arc::new(Crawler::from_config(config)),
        }
    }
}

/// Start the web server.
pub async fn serve(config: &Config, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(AppState::new(config));

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
