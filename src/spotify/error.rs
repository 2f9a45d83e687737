use thiserror::Error;

/// Failures surfaced by the authenticated Spotify client.
///
/// None of these are retried internally. `Auth` is always fatal for the run;
/// `Api` and `Transport` are fatal for the operation that raised them unless
/// the caller explicitly chooses to skip a single track lookup.
#[derive(Debug, Error)]
pub enum SpotifyError {
    /// The token endpoint rejected the refresh or could not be reached.
    #[error("token refresh failed: {0}")]
    Auth(String),

    /// The Web API answered with a non-success status.
    #[error("Spotify API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// Network failure, timeout or a body that could not be decoded.
    #[error("request to Spotify failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl SpotifyError {
    /// Whether the failure belongs to a single HTTP call rather than to the
    /// credentials as a whole.
    pub fn is_call_failure(&self) -> bool {
        matches!(self, SpotifyError::Api { .. } | SpotifyError::Transport(_))
    }
}
