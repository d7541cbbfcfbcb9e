use albumstore_core::{
    open_pool, open_pool_in_memory, seed_sample_albums, Album, AlbumRepository, NewAlbum,
    RepoError, SqliteAlbumRepository, StoreConfig,
};
use std::collections::HashSet;
use std::thread;

fn in_memory_repo() -> SqliteAlbumRepository {
    SqliteAlbumRepository::new(open_pool_in_memory().unwrap())
}

fn seeded_repo() -> SqliteAlbumRepository {
    let repo = in_memory_repo();
    let mut conn = repo.pool().get().unwrap();
    seed_sample_albums(&mut conn).unwrap();
    drop(conn);
    repo
}

#[test]
fn insert_then_get_by_id_returns_inserted_fields() {
    let repo = in_memory_repo();

    let id = repo.add_album(&NewAlbum::new("X", "Y", 9.99)).unwrap();
    assert!(id > 0);

    let loaded = repo.album_by_id(id).unwrap();
    assert_eq!(
        loaded,
        Album {
            id,
            title: "X".to_string(),
            artist: "Y".to_string(),
            price: 9.99,
        }
    );
}

#[test]
fn insert_is_not_idempotent() {
    let repo = in_memory_repo();
    let album = NewAlbum::new("Kind of Blue", "Miles Davis", 29.99);

    let first = repo.add_album(&album).unwrap();
    let second = repo.add_album(&album).unwrap();
    assert_ne!(first, second);

    let stored = repo.albums_by_artist("Miles Davis").unwrap();
    assert_eq!(stored.len(), 2);
}

#[test]
fn albums_by_artist_returns_exactly_the_matching_rows() {
    let repo = seeded_repo();

    let albums = repo.albums_by_artist("John Coltrane").unwrap();
    let titles: HashSet<_> = albums.iter().map(|album| album.title.as_str()).collect();
    assert_eq!(titles, HashSet::from(["Blue Train", "Giant Steps"]));
    assert!(albums.iter().all(|album| album.artist == "John Coltrane"));

    let blue_train = albums
        .iter()
        .find(|album| album.title == "Blue Train")
        .unwrap();
    assert_eq!(blue_train.price, 56.99);
    assert_eq!(repo.album_by_id(blue_train.id).unwrap(), *blue_train);
}

#[test]
fn albums_by_artist_with_no_match_is_empty_not_an_error() {
    let repo = seeded_repo();

    assert!(repo.albums_by_artist("NoSuchArtist").unwrap().is_empty());
    assert!(repo.albums_by_artist("").unwrap().is_empty());
}

#[test]
fn albums_by_artist_binds_input_instead_of_splicing_it() {
    let repo = seeded_repo();

    let hostile = "x' OR '1'='1";
    assert!(repo.albums_by_artist(hostile).unwrap().is_empty());

    let id = repo.add_album(&NewAlbum::new("Quoted", hostile, 1.0)).unwrap();
    let matched = repo.albums_by_artist(hostile).unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].id, id);
}

#[test]
fn album_by_id_missing_returns_not_found_with_id() {
    let repo = seeded_repo();

    let err = repo.album_by_id(9_999).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(9_999)));
    assert_eq!(err.to_string(), "album_by_id 9999: no such album");
}

#[test]
fn decode_failure_fails_whole_call_without_partial_rows() {
    let repo = seeded_repo();
    {
        let conn = repo.pool().get().unwrap();
        conn.execute(
            "INSERT INTO album (title, artist, price) VALUES ('Broken', 'John Coltrane', 'n/a');",
            [],
        )
        .unwrap();
    }

    let err = repo.albums_by_artist("John Coltrane").unwrap_err();
    assert!(!err.to_string().contains("John Coltrane"));
    match err {
        RepoError::Query { context, .. } => assert_eq!(context, "albums_by_artist"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn decode_failure_on_id_lookup_is_query_error_not_not_found() {
    let repo = in_memory_repo();
    let id: i64 = {
        let conn = repo.pool().get().unwrap();
        conn.query_row(
            "INSERT INTO album (title, artist, price) VALUES ('Broken', 'Nobody', 'n/a')
             RETURNING id;",
            [],
            |row| row.get(0),
        )
        .unwrap()
    };

    let err = repo.album_by_id(id).unwrap_err();
    assert!(matches!(err, RepoError::Query { .. }));
    assert_eq!(err.context(), format!("album_by_id {id}"));
}

#[test]
fn concurrent_inserts_through_shared_pool_get_distinct_ids() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        pool_max_size: 4,
        ..StoreConfig::at(dir.path().join("albums.db"))
    };
    let repo = SqliteAlbumRepository::new(open_pool(&config).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let repo = repo.clone();
            thread::spawn(move || {
                (0..10)
                    .map(|n| {
                        repo.add_album(&NewAlbum::new(
                            format!("Take {n}"),
                            format!("Worker {worker}"),
                            1.5,
                        ))
                        .unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let ids: Vec<i64> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();
    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(ids.len(), 40);
    assert_eq!(unique.len(), 40);

    assert_eq!(repo.albums_by_artist("Worker 2").unwrap().len(), 10);
}
