//! Application state for the HTTP server.

use std::sync::Arc;

use crate::auth::SessionStore;
use crate::config::AppConfig;
use crate::db::repository::FullRepository;
use crate::media::MediaStorage;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    pub sessions: SessionStore,
    pub media: MediaStorage,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Create the application state from a repository and configuration.
    pub fn new(repository: Arc<dyn FullRepository>, config: AppConfig) -> Self {
        Self {
            repository,
            sessions: SessionStore::new(config.session.ttl_secs),
            media: MediaStorage::new(config.media.root.clone(), config.media.url.clone()),
            config: Arc::new(config),
        }
    }
}
