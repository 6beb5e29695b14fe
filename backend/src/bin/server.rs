//! ArtScope HTTP Server Binary
//!
//! This is the main entry point for the ArtScope server. It loads the
//! configuration, initializes the repository and media root, sets up the
//! HTTP router, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin artscope-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `MEDIA_ROOT`: Directory for uploads and QR codes (default: media)
//! - `MAX_UPLOAD_BYTES`: Request body limit (default: 20 MiB)
//! - `SESSION_TTL_SECS`: Session lifetime (default: two weeks)
//! - `SESSION_COOKIE_SECURE`: Mark the session cookie `Secure`
//! - `RUST_LOG`: Log level (default: info)
//!
//! Settings may also come from an `artscope.toml` file; environment variables
//! take precedence.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use artscope::config::AppConfig;
use artscope::db::LocalRepository;
use artscope::http::{create_router, AppState};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting ArtScope HTTP Server");

    let config = AppConfig::load()?;
    let addr = config.bind_address()?;

    tokio::fs::create_dir_all(&config.media.root).await?;
    info!("Media root: {}", config.media.root.display());

    let repository = Arc::new(LocalRepository::new());
    info!("Repository initialized successfully");

    // Create application state
    let state = AppState::new(repository, config);

    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            let purged = sessions.purge_expired();
            if purged > 0 {
                debug!("Purged {} expired sessions", purged);
            }
        }
    });

    // Create router with all endpoints
    let app = create_router(state);

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
