use std::sync::Arc;

use crate::config::ServerConfig;
use crate::storage::FileStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: buildtrack_db::DbPool,
    /// Server configuration (JWT secret, timeouts, storage root).
    pub config: Arc<ServerConfig>,
    /// Uploaded-file storage rooted at `config.storage_root`.
    pub files: Arc<FileStore>,
}
