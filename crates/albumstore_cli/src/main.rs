//! Album store demo entry point.
//!
//! # Responsibility
//! - Run the fixed demo sequence: albums by artist, album by id, insert.
//! - Treat every error as fatal; nothing after a failing step runs.

use albumstore_core::{
    init_logging, open_pool, seed_sample_albums, AlbumRepository, AppConfig, NewAlbum,
    SqliteAlbumRepository,
};
use log::error;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=demo_run module=cli status=error error={}", err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_logging(&config.logging.level, config.logging.log_dir.as_deref())?;

    let pool = open_pool(&config.store)?;
    {
        let mut conn = pool.get()?;
        seed_sample_albums(&mut conn)?;
    }
    let repo = SqliteAlbumRepository::new(pool);

    let albums = repo.albums_by_artist("John Coltrane")?;
    println!("Albums found: {albums:?}");

    let album = repo.album_by_id(2)?;
    println!("Album found: {album}");

    let id = repo.add_album(&NewAlbum::new(
        "The Modern Sound of Betty Carter",
        "Betty Carter",
        49.99,
    ))?;
    println!("ID of added album: {id}");

    Ok(())
}
