//! Album domain model.
//!
//! # Responsibility
//! - Define the stored `Album` record and the `NewAlbum` insert payload.
//!
//! # Invariants
//! - `Album::id` comes from the store and is never reassigned.
//! - `NewAlbum` has no id field, so callers cannot pick one.
//! - `price` is expected to be non-negative but is not enforced.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Store-generated album identifier.
pub type AlbumId = i64;

/// One row of the `album` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    /// Generated by the store on insert.
    pub id: AlbumId,
    pub title: String,
    /// Non-unique lookup key.
    pub artist: String,
    pub price: f64,
}

/// Insert payload for a new album.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAlbum {
    pub title: String,
    pub artist: String,
    pub price: f64,
}

impl NewAlbum {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, price: f64) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            price,
        }
    }
}

impl Display for Album {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} {} by {} ({:.2})",
            self.id, self.title, self.artist, self.price
        )
    }
}
