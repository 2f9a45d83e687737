use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::spotify::TRACK_URI_PREFIX;

/// Application credentials plus the long-lived refresh token obtained once
/// through `playlistr auth`.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// A bearer token together with the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

/// One `(track, artist)` line of a playlist description, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackQuery {
    pub track: String,
    pub artist: String,
}

impl TrackQuery {
    pub fn new(track: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            track: track.into(),
            artist: artist.into(),
        }
    }
}

impl fmt::Display for TrackQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.track, self.artist)
    }
}

/// Opaque track identity assigned by Spotify.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `spotify:track:<id>` form expected by the playlist endpoints.
    pub fn uri(&self) -> String {
        format!("{}{}", TRACK_URI_PREFIX, self.0)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSpec {
    pub name: String,
    pub tracks: Vec<TrackQuery>,
}

/// Pending authorization shared between the auth flow and the callback handler.
#[derive(Debug, Clone)]
pub struct AuthorizationState {
    pub state: String,
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistHandle {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationCodeResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: TrackPage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackPage {
    #[serde(default)]
    pub items: Vec<Option<SearchTrack>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchTrack {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUserResponse {
    pub id: String,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub file: String,
    pub name: String,
    pub tracks: usize,
}

#[derive(Tabled)]
pub struct PublishTableRow {
    pub playlist: String,
    pub added: usize,
    pub unresolved: usize,
}
