//! Album record access over a pooled SQLite store.
//!
//! Callers load an [`AppConfig`], open a [`DbPool`] with [`open_pool`] and
//! hand it to [`SqliteAlbumRepository`].

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{AppConfig, ConfigError, ConfigResult, LoggingConfig, StoreConfig};
pub use db::schema::{ensure_schema, seed_sample_albums};
pub use db::{open_pool, open_pool_in_memory, DbError, DbPool, DbResult, PooledConn};
pub use logging::{default_log_level, init_logging, LogDestination};
pub use model::album::{Album, AlbumId, NewAlbum};
pub use repo::album_repo::{AlbumRepository, RepoError, RepoResult, SqliteAlbumRepository};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
