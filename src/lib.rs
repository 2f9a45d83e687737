//! Playlistr Library
//!
//! Turns plain-text track lists into Spotify playlists. Each playlist file is
//! resolved track by track against the Spotify catalogue, preferring versions
//! already saved in the user's library, and the matches are added to a newly
//! created playlist in batches.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints for the local authorization callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `management` - Token lifecycle and playlist file handling
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Prints an informational message with a blue bullet point.
///
/// Accepts the same arguments as `println!`.
///
/// # Example
///
/// ```
/// info!("Converting {} playlists", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// Accepts the same arguments as `println!`.
///
/// # Example
///
/// ```
/// success!("Playlist {} created", name);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Terminates the process with exit code 1 right after printing. Only the
/// command-line layer uses it; library code returns errors instead.
///
/// # Example
///
/// ```
/// error!("Failed to load configuration: {}", e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues such as a track that could not be found.
///
/// # Example
///
/// ```
/// warning!("Could not find track: {} by {}", track, artist);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
