use std::{
    fmt,
    io,
    path::{Path, PathBuf},
    str::FromStr,
};

use futures::TryStreamExt;
use thiserror::Error;

use crate::types::{PlaylistSpec, TrackQuery};

#[derive(Debug, Error)]
pub enum PlaylistFileError {
    #[error("\"{}\" is not a directory.", .0.display())]
    NotADirectory(PathBuf),
    #[error("\"{}\" contains no textfiles", .0.display())]
    NoTextFiles(PathBuf),
    #[error("Cannot read \"{}\": {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Field layout of a playlist line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrder {
    TrackArtist,
    ArtistTrack,
}

impl DataOrder {
    pub const ALLOWED: [&'static str; 2] = ["track artist", "artist track"];

    /// `(track, artist)` field positions.
    fn indices(self) -> (usize, usize) {
        match self {
            DataOrder::TrackArtist => (0, 1),
            DataOrder::ArtistTrack => (1, 0),
        }
    }
}

impl FromStr for DataOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "track artist" => Ok(DataOrder::TrackArtist),
            "artist track" => Ok(DataOrder::ArtistTrack),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for DataOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataOrder::TrackArtist => f.write_str("track artist"),
            DataOrder::ArtistTrack => f.write_str("artist track"),
        }
    }
}

/// A playlist description file: one `track<delimiter>artist` pair per line
/// and an optional `name:` line.
#[derive(Debug, Clone)]
pub struct PlaylistFile {
    pub path: PathBuf,
    pub filename: String,
    lines: Vec<String>,
}

impl PlaylistFile {
    pub fn from_contents(path: impl Into<PathBuf>, contents: &str) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        PlaylistFile {
            path,
            filename,
            lines: contents.lines().map(|l| l.trim().to_string()).collect(),
        }
    }

    pub async fn load(path: &Path) -> Result<Self, PlaylistFileError> {
        let contents = async_fs::read_to_string(path)
            .await
            .map_err(|source| PlaylistFileError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_contents(path, &contents))
    }

    /// Text after the first `name:` line's colon, or the file name.
    pub fn playlist_name(&self) -> String {
        self.lines
            .iter()
            .find(|l| l.to_lowercase().starts_with("name:"))
            .and_then(|l| l.split_once(':'))
            .map(|(_, name)| name.trim().to_string())
            .unwrap_or_else(|| self.filename.clone())
    }

    /// Every line with at least two delimited fields, in file order.
    pub fn playlist_items(&self, delimiter: &str, order: DataOrder) -> Vec<TrackQuery> {
        let (track_index, artist_index) = order.indices();

        self.lines
            .iter()
            .filter_map(|line| {
                let fields: Vec<&str> = line.split(delimiter).collect();
                if fields.len() < 2 {
                    return None;
                }
                Some(TrackQuery::new(
                    fields[track_index].trim(),
                    fields[artist_index].trim(),
                ))
            })
            .collect()
    }

    pub fn to_spec(&self, delimiter: &str, order: DataOrder) -> PlaylistSpec {
        PlaylistSpec {
            name: self.playlist_name(),
            tracks: self.playlist_items(delimiter, order),
        }
    }
}

/// Paths of all `.txt` files directly inside `directory`, sorted by name.
///
/// A missing path or a path that is not a directory is
/// [`PlaylistFileError::NotADirectory`]; any other filesystem failure is
/// returned as [`PlaylistFileError::Io`].
pub async fn discover(directory: &Path) -> Result<Vec<PathBuf>, PlaylistFileError> {
    let io_err = |source: io::Error| PlaylistFileError::Io {
        path: directory.to_path_buf(),
        source,
    };

    match async_fs::metadata(directory).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(PlaylistFileError::NotADirectory(directory.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(PlaylistFileError::NotADirectory(directory.to_path_buf()));
        }
        Err(e) => return Err(io_err(e)),
    }

    let mut entries = async_fs::read_dir(directory).await.map_err(io_err)?;
    let mut textfiles = Vec::new();
    while let Some(entry) = entries.try_next().await.map_err(io_err)? {
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "txt") {
            continue;
        }

        // dangling symlinks are not playlist files
        let meta = match async_fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(source) => return Err(PlaylistFileError::Io { path, source }),
        };
        if meta.is_file() {
            textfiles.push(path);
        }
    }

    if textfiles.is_empty() {
        return Err(PlaylistFileError::NoTextFiles(directory.to_path_buf()));
    }

    textfiles.sort();
    Ok(textfiles)
}

pub async fn load_directory(directory: &Path) -> Result<Vec<PlaylistFile>, PlaylistFileError> {
    let mut files = Vec::new();
    for path in discover(directory).await? {
        files.push(PlaylistFile::load(&path).await?);
    }
    Ok(files)
}
