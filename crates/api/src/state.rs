use std::sync::Arc;

use filmoteca_core::storage::FileStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
/// Nothing in here is mutated by handlers; per-request database work goes
/// through connections checked out of `pool` for the duration of a call.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: filmoteca_db::DbPool,
    /// Server configuration (upload limits are read by handlers).
    pub config: Arc<ServerConfig>,
    /// Blob storage for posters and photos.
    pub files: Arc<dyn FileStore>,
}
