//! Pool bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Build file-backed or in-memory connection pools.
//! - Configure per-connection pragmas required by core behavior.
//! - Apply the album schema before handing the pool out.
//!
//! # Invariants
//! - Returned pools hand out connections with `foreign_keys=ON`.
//! - The `album` table exists once a pool is returned.

use super::schema::ensure_schema;
use super::{DbPool, DbResult};
use crate::config::StoreConfig;
use log::{error, info};
use r2d2_sqlite::SqliteConnectionManager;
use std::time::{Duration, Instant};

const MEMORY_BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const MEMORY_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a pool over the configured SQLite database file.
///
/// # Side effects
/// - Creates the database file when missing.
/// - Emits `db_open` logging events with duration and status.
pub fn open_pool(config: &StoreConfig) -> DbResult<DbPool> {
    let started_at = Instant::now();
    info!(
        "event=db_open module=db status=start mode=file pool_max_size={}",
        config.pool_max_size
    );

    let manager = with_bootstrap(
        SqliteConnectionManager::file(&config.database_path),
        Duration::from_millis(config.busy_timeout_ms),
    );
    let built = r2d2::Pool::builder()
        .max_size(config.pool_max_size)
        .connection_timeout(Duration::from_millis(config.connect_timeout_ms))
        .build(manager);

    finish_open(built, "file", started_at)
}

/// Opens a single-connection pool over a private in-memory database.
///
/// The pool never recycles its connection, since dropping it would lose
/// the data.
pub fn open_pool_in_memory() -> DbResult<DbPool> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory pool_max_size=1");

    let manager = with_bootstrap(SqliteConnectionManager::memory(), MEMORY_BUSY_TIMEOUT);
    let built = r2d2::Pool::builder()
        .max_size(1)
        .min_idle(Some(1))
        .idle_timeout(None)
        .max_lifetime(None)
        .connection_timeout(MEMORY_CONNECT_TIMEOUT)
        .build(manager);

    finish_open(built, "memory", started_at)
}

fn with_bootstrap(
    manager: SqliteConnectionManager,
    busy_timeout: Duration,
) -> SqliteConnectionManager {
    manager.with_init(move |conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(busy_timeout)
    })
}

fn finish_open(
    built: Result<DbPool, r2d2::Error>,
    mode: &str,
    started_at: Instant,
) -> DbResult<DbPool> {
    let pool = match built {
        Ok(pool) => pool,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match pool
        .get()
        .map_err(Into::into)
        .and_then(|conn| ensure_schema(&conn))
    {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(pool)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}
