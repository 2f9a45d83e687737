//! # Spotify Integration Module
//!
//! This module is the authenticated client that turns track queries into
//! playlist contents on Spotify. It covers token handling for API calls,
//! track lookup and playlist population, plus the one-off interactive
//! authorization used to obtain a refresh token.
//!
//! ## Architecture
//!
//! ```text
//! CLI (convert, auth)
//!          ↓
//! PlaylistPublisher ──→ TrackResolver
//!          ↓                 ↓
//!        SpotifyClient (bearer auth, typed failures)
//!          ↓
//!        TokenManager (refresh-token grant, expiry margin)
//!          ↓
//! Spotify Web API / Accounts service
//! ```
//!
//! ## Core Modules
//!
//! - [`client`] - [`SpotifyClient`], the single place where HTTP requests are
//!   issued and non-success responses are turned into [`SpotifyError`]s.
//! - [`tracks`] - [`TrackResolver`]: search, saved-track check and the
//!   preferred-saved-else-first selection.
//! - [`playlist`] - [`PlaylistPublisher`]: playlist creation and batched
//!   inserts of at most [`MAX_TRACKS_PER_REQUEST`] tracks per call.
//! - [`auth`] - Authorization-code flow with a local callback listener.
//!
//! ## Error Handling
//!
//! Nothing in this module retries. Token refresh failures are
//! [`SpotifyError::Auth`], error statuses are [`SpotifyError::Api`] and
//! network or decoding problems are [`SpotifyError::Transport`]. A search
//! without results is not an error; it yields no track.
//!
//! ## API Coverage
//!
//! - `POST /api/token` - Refresh-token and authorization-code grants
//! - `GET /search` - Track search with an `artist:` filter
//! - `GET /me/tracks/contains` - Saved-track check for up to 20 ids
//! - `GET /me` - Current user id (authorization only)
//! - `POST /users/{user_id}/playlists` - Create a playlist
//! - `POST /playlists/{playlist_id}/tracks` - Add up to 100 tracks

pub mod auth;
pub mod client;
pub mod error;
pub mod playlist;
pub mod tracks;

pub use client::SpotifyClient;
pub use error::SpotifyError;
pub use playlist::{LookupFailurePolicy, PlaylistPublisher, PublishReport};
pub use tracks::TrackResolver;

/// Prefix turning a bare track id into a track URI.
pub const TRACK_URI_PREFIX: &str = "spotify:track:";

/// Candidates requested per search; also the saved-check id limit.
pub const SEARCH_LIMIT: usize = 20;

/// Items Spotify accepts in a single add-tracks request.
pub const MAX_TRACKS_PER_REQUEST: usize = 100;
