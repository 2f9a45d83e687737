use std::{fs, path::Path};

use playlistr::{
    management::{
        DataOrder, PlaylistFile, PlaylistFileError,
        playlist_file::{discover, load_directory},
    },
    types::TrackQuery,
};

const ROAD_TRIP: &str = "\
name: Road Trip
Song A - Artist X
Song B - Artist Y
";

#[test]
fn test_playlist_name_from_name_line() {
    let file = PlaylistFile::from_contents("/lists/road.txt", ROAD_TRIP);
    assert_eq!(file.playlist_name(), "Road Trip");
}

#[test]
fn test_playlist_name_line_is_case_insensitive() {
    let file = PlaylistFile::from_contents("/lists/road.txt", "  NAME:  Loud: Live  \nA - B\n");
    assert_eq!(file.playlist_name(), "Loud: Live");
}

#[test]
fn test_playlist_name_falls_back_to_filename() {
    let file = PlaylistFile::from_contents("/lists/summer hits.txt", "Song A - Artist X\n");
    assert_eq!(file.playlist_name(), "summer hits.txt");
    assert_eq!(file.filename, "summer hits.txt");
}

#[test]
fn test_playlist_items_track_artist() {
    let file = PlaylistFile::from_contents("/lists/road.txt", ROAD_TRIP);

    assert_eq!(
        file.playlist_items(" - ", DataOrder::TrackArtist),
        vec![
            TrackQuery::new("Song A", "Artist X"),
            TrackQuery::new("Song B", "Artist Y"),
        ]
    );
}

#[test]
fn test_playlist_items_artist_track() {
    let file = PlaylistFile::from_contents("/lists/road.txt", "Artist X;Song A\nArtist Y ; Song B\n");

    assert_eq!(
        file.playlist_items(";", DataOrder::ArtistTrack),
        vec![
            TrackQuery::new("Song A", "Artist X"),
            TrackQuery::new("Song B", "Artist Y"),
        ]
    );
}

#[test]
fn test_playlist_items_skip_lines_without_delimiter() {
    let contents = "name: Mixed\n\nSong A - Artist X\njust a comment\nSong B - Artist Y - Live\n";
    let file = PlaylistFile::from_contents("/lists/mixed.txt", contents);

    // Extra fields after the first two are ignored
    assert_eq!(
        file.playlist_items(" - ", DataOrder::TrackArtist),
        vec![
            TrackQuery::new("Song A", "Artist X"),
            TrackQuery::new("Song B", "Artist Y"),
        ]
    );
}

#[test]
fn test_to_spec() {
    let spec = PlaylistFile::from_contents("/lists/road.txt", ROAD_TRIP)
        .to_spec(" - ", DataOrder::TrackArtist);

    assert_eq!(spec.name, "Road Trip");
    assert_eq!(spec.tracks.len(), 2);
}

#[test]
fn test_data_order_parse_and_display() {
    for raw in DataOrder::ALLOWED {
        let order: DataOrder = raw.parse().unwrap();
        assert_eq!(order.to_string(), raw);
    }
    assert_eq!("track-artist".parse::<DataOrder>(), Err("track-artist".to_string()));
}

#[tokio::test]
async fn test_discover_returns_sorted_textfiles_only() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.txt"), "B - b").unwrap();
    fs::write(dir.path().join("a.txt"), "A - a").unwrap();
    fs::write(dir.path().join("notes.md"), "ignored").unwrap();
    fs::create_dir(dir.path().join("nested.txt")).unwrap();

    let paths = discover(dir.path()).await.unwrap();
    assert_eq!(
        paths,
        vec![dir.path().join("a.txt"), dir.path().join("b.txt")]
    );

    let files = load_directory(dir.path()).await.unwrap();
    let names: Vec<String> = files.iter().map(PlaylistFile::playlist_name).collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
}

#[tokio::test]
async fn test_discover_rejects_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");

    let err = discover(&missing).await.unwrap_err();
    assert!(matches!(err, PlaylistFileError::NotADirectory(ref p) if *p == missing));
}

#[tokio::test]
async fn test_discover_rejects_file_path() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("a.txt");
    fs::write(&file, "A - a").unwrap();

    let err = discover(&file).await.unwrap_err();
    assert!(matches!(err, PlaylistFileError::NotADirectory(_)));
}

#[tokio::test]
async fn test_discover_requires_textfiles() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("readme.md"), "nothing here").unwrap();

    let err = discover(dir.path()).await.unwrap_err();
    assert!(matches!(err, PlaylistFileError::NoTextFiles(_)));
    assert!(err.to_string().ends_with("contains no textfiles"));
}

#[tokio::test]
async fn test_discover_surfaces_other_io_errors() {
    let err = discover(Path::new("lists\0broken")).await.unwrap_err();
    assert!(matches!(err, PlaylistFileError::Io { .. }));
}

#[tokio::test]
async fn test_discover_matches_txt_extension_only() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "A - a").unwrap();
    fs::write(dir.path().join("b.TXT"), "B - b").unwrap();
    fs::write(dir.path().join("c.txt.bak"), "C - c").unwrap();

    let paths = discover(dir.path()).await.unwrap();
    assert_eq!(paths, vec![dir.path().join("a.txt")]);
}
