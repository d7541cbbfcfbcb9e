//! Album repository contract and pooled SQLite implementation.
//!
//! # Responsibility
//! - Provide the three album access operations: by artist, by id, insert.
//! - Keep SQL details and connection checkout inside the persistence boundary.
//!
//! # Invariants
//! - Every statement is placeholder-bound; input is never spliced into SQL.
//! - Each call holds one pooled connection for its whole duration and
//!   releases it on every exit path.
//! - A row decode failure fails the whole call; partial results are dropped.
//! - Errors carry the operation name (and the id for id lookups), never the
//!   caller's titles or artists, since callers log them.

use crate::db::{DbPool, PooledConn};
use crate::model::album::{Album, AlbumId, NewAlbum};
use log::{debug, error};
use rusqlite::{params, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const ALBUM_SELECT_SQL: &str = "SELECT
    id,
    title,
    artist,
    price
FROM album";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for album persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// No connection could be checked out of the pool.
    Connection {
        context: String,
        source: r2d2::Error,
    },
    /// Statement execution or row decoding failed.
    Query {
        context: String,
        source: rusqlite::Error,
    },
    /// Id lookup matched zero rows.
    NotFound(AlbumId),
}

impl RepoError {
    /// Operation context attached to this error.
    pub fn context(&self) -> String {
        match self {
            Self::Connection { context, .. } | Self::Query { context, .. } => context.clone(),
            Self::NotFound(id) => format!("album_by_id {id}"),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection { context, source } => write!(f, "{context}: {source}"),
            Self::Query { context, source } => write!(f, "{context}: {source}"),
            Self::NotFound(id) => write!(f, "album_by_id {id}: no such album"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connection { source, .. } => Some(source),
            Self::Query { source, .. } => Some(source),
            Self::NotFound(_) => None,
        }
    }
}

/// Repository interface for album access.
pub trait AlbumRepository {
    /// Returns every album whose artist equals `artist`, in store order.
    fn albums_by_artist(&self, artist: &str) -> RepoResult<Vec<Album>>;
    /// Returns the album with the given id.
    fn album_by_id(&self, id: AlbumId) -> RepoResult<Album>;
    /// Inserts a new album and returns the id assigned by the store.
    fn add_album(&self, album: &NewAlbum) -> RepoResult<AlbumId>;
}

/// SQLite-backed album repository over a shared connection pool.
///
/// Cloning is cheap; clones share the same pool.
#[derive(Clone)]
pub struct SqliteAlbumRepository {
    pool: DbPool,
}

impl SqliteAlbumRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    fn checkout(&self, op: &str, context: impl Fn() -> String) -> RepoResult<PooledConn> {
        self.pool.get().map_err(|source| {
            error!(
                "event=db_checkout module=repo status=error op={} error={}",
                op, source
            );
            RepoError::Connection {
                context: context(),
                source,
            }
        })
    }
}

impl AlbumRepository for SqliteAlbumRepository {
    fn albums_by_artist(&self, artist: &str) -> RepoResult<Vec<Album>> {
        let started_at = Instant::now();
        let context = || "albums_by_artist".to_string();
        let query_err = |source| RepoError::Query {
            context: context(),
            source,
        };

        let conn = self.checkout("albums_by_artist", context)?;
        let mut stmt = conn
            .prepare(&format!("{ALBUM_SELECT_SQL} WHERE artist = ?1;"))
            .map_err(query_err)?;
        let mut rows = stmt.query([artist]).map_err(query_err)?;

        let mut albums = Vec::new();
        while let Some(row) = rows.next().map_err(query_err)? {
            albums.push(parse_album_row(row).map_err(query_err)?);
        }

        debug!(
            "event=album_query module=repo op=albums_by_artist status=ok rows={} duration_ms={}",
            albums.len(),
            started_at.elapsed().as_millis()
        );
        Ok(albums)
    }

    fn album_by_id(&self, id: AlbumId) -> RepoResult<Album> {
        let started_at = Instant::now();
        let context = || format!("album_by_id {id}");

        let conn = self.checkout("album_by_id", context)?;
        let result = conn.query_row(
            &format!("{ALBUM_SELECT_SQL} WHERE id = ?1;"),
            [id],
            parse_album_row,
        );

        match result {
            Ok(album) => {
                debug!(
                    "event=album_query module=repo op=album_by_id status=ok id={} duration_ms={}",
                    id,
                    started_at.elapsed().as_millis()
                );
                Ok(album)
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                debug!(
                    "event=album_query module=repo op=album_by_id status=not_found id={}",
                    id
                );
                Err(RepoError::NotFound(id))
            }
            Err(source) => Err(RepoError::Query {
                context: context(),
                source,
            }),
        }
    }

    fn add_album(&self, album: &NewAlbum) -> RepoResult<AlbumId> {
        let started_at = Instant::now();
        let context = || "add_album".to_string();

        let conn = self.checkout("add_album", context)?;
        let id = conn
            .query_row(
                "INSERT INTO album (title, artist, price)
                 VALUES (?1, ?2, ?3)
                 RETURNING id;",
                params![album.title.as_str(), album.artist.as_str(), album.price],
                |row| row.get::<_, AlbumId>(0),
            )
            .map_err(|source| RepoError::Query {
                context: context(),
                source,
            })?;

        debug!(
            "event=album_insert module=repo op=add_album status=ok id={} duration_ms={}",
            id,
            started_at.elapsed().as_millis()
        );
        Ok(id)
    }
}

fn parse_album_row(row: &Row<'_>) -> rusqlite::Result<Album> {
    Ok(Album {
        id: row.get("id")?,
        title: row.get("title")?,
        artist: row.get("artist")?,
        price: row.get("price")?,
    })
}

#[cfg(test)]
mod tests {
    use super::{AlbumRepository, RepoError, SqliteAlbumRepository};
    use crate::model::album::NewAlbum;
    use r2d2_sqlite::SqliteConnectionManager;
    use std::time::Duration;

    fn unreachable_repo() -> SqliteAlbumRepository {
        let manager =
            SqliteConnectionManager::file("/nonexistent-albumstore-dir/nested/albums.db");
        let pool = r2d2::Pool::builder()
            .max_size(1)
            .connection_timeout(Duration::from_millis(200))
            .build_unchecked(manager);
        SqliteAlbumRepository::new(pool)
    }

    #[test]
    fn checkout_failure_maps_to_connection_error_with_context() {
        let repo = unreachable_repo();

        let err = repo.add_album(&NewAlbum::new("X", "Y", 1.0)).unwrap_err();
        assert!(matches!(&err, RepoError::Connection { context, .. } if context == "add_album"));
        assert!(err.to_string().starts_with("add_album: "));

        let err = repo.album_by_id(7).unwrap_err();
        assert!(matches!(err, RepoError::Connection { .. }));
        assert_eq!(err.context(), "album_by_id 7");

        let err = repo.albums_by_artist("Y").unwrap_err();
        assert!(matches!(err, RepoError::Connection { .. }));
    }

    #[test]
    fn connection_error_does_not_echo_the_artist() {
        let repo = unreachable_repo();

        let err = repo.albums_by_artist("Secret Artist Name").unwrap_err();
        assert_eq!(err.context(), "albums_by_artist");
        let rendered = err.to_string();
        assert!(rendered.starts_with("albums_by_artist: "));
        assert!(!rendered.contains("Secret Artist Name"));
    }

    #[test]
    fn not_found_message_names_the_id() {
        let err = RepoError::NotFound(42);
        assert_eq!(err.to_string(), "album_by_id 42: no such album");
        assert!(std::error::Error::source(&err).is_none());
    }
}
