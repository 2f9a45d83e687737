mod auth;
pub mod playlist_file;

pub use auth::DEFAULT_EXPIRES_IN_SECS;
pub use auth::REFRESH_MARGIN_SECS;
pub use auth::TokenManager;
pub use auth::needs_refresh;
pub use playlist_file::DataOrder;
pub use playlist_file::PlaylistFile;
pub use playlist_file::PlaylistFileError;
