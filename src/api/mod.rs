//! # API Module
//!
//! HTTP endpoints served by the local listener during `playlistr auth`.
//!
//! - [`callback`] - Receives the authorization code redirected from Spotify
//!   and hands it to the waiting auth flow through shared state.

mod callback;

pub use callback::callback;
