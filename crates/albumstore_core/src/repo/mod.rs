//! Repository layer for album persistence.
//!
//! # Responsibility
//! - Define the album access contract.
//! - Isolate SQLite query details and pool checkout from callers.
//!
//! # Invariants
//! - Repository APIs return a semantic `NotFound` in addition to connection
//!   and query errors.

pub mod album_repo;
