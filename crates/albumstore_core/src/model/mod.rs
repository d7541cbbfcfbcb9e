//! Domain model for album records.
//!
//! # Responsibility
//! - Define the record shapes read from and written to the `album` table.
//!
//! # Invariants
//! - Identifiers are assigned by the store only; insert payloads carry none.
//! - Records are immutable once materialized; there is no update path.

pub mod album;
