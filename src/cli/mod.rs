//! # CLI Module
//!
//! User-facing commands. Each one loads its configuration, calls into the
//! library and reports the outcome with the crate's output macros. Fatal
//! errors end the process through [`crate::error!`] with a single message.
//!
//! - [`auth`] - One-off authorization that stores a refresh token and user id
//! - [`convert`] - Creates one Spotify playlist per playlist file
//! - [`preview`] - Shows what would be converted without touching Spotify

mod auth;
mod convert;
mod preview;

pub use auth::auth;
pub use convert::convert;
pub use preview::preview;
