use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, header::AUTHORIZATION};
use tokio::sync::Mutex;

use crate::{
    spotify::SpotifyError,
    types::{AccessToken, Credentials, TokenResponse},
    utils,
};

/// Tokens are renewed once they are this close to expiring.
pub const REFRESH_MARGIN_SECS: i64 = 300;

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Owns the access token for one set of credentials.
///
/// The cached token lives behind an async mutex that stays locked for the
/// whole check-and-refresh, so concurrent callers never trigger two refreshes
/// or observe a token while it is being replaced. Nothing is written to disk.
pub struct TokenManager {
    http: Client,
    token_url: String,
    credentials: Credentials,
    token: Mutex<Option<AccessToken>>,
}

impl TokenManager {
    pub fn new(http: Client, token_url: impl Into<String>, credentials: Credentials) -> Self {
        TokenManager {
            http,
            token_url: token_url.into(),
            credentials,
            token: Mutex::new(None),
        }
    }

    /// Returns a token with at least [`REFRESH_MARGIN_SECS`] of validity left,
    /// refreshing first when there is no token yet or the cached one is too
    /// close to its expiry.
    pub async fn get_valid_token(&self) -> Result<AccessToken, SpotifyError> {
        let mut current = self.token.lock().await;

        if let Some(token) = current.as_ref() {
            if !needs_refresh(token, Utc::now()) {
                return Ok(token.clone());
            }
        }

        let fresh = self.refresh_token().await?;
        *current = Some(fresh.clone());
        Ok(fresh)
    }

    async fn refresh_token(&self) -> Result<AccessToken, SpotifyError> {
        let res = self
            .http
            .post(&self.token_url)
            .header(
                AUTHORIZATION,
                utils::basic_auth_header(
                    &self.credentials.client_id,
                    &self.credentials.client_secret,
                ),
            )
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.credentials.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SpotifyError::Auth(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(SpotifyError::Auth(format!("{} {}", status, body)));
        }

        let json: TokenResponse = res
            .json()
            .await
            .map_err(|e| SpotifyError::Auth(e.to_string()))?;

        let lifetime = json.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        let expires_at = Duration::try_seconds(lifetime)
            .and_then(|d| Utc::now().checked_add_signed(d))
            .ok_or_else(|| SpotifyError::Auth(format!("invalid expires_in: {}", lifetime)))?;

        Ok(AccessToken {
            value: json.access_token,
            expires_at,
        })
    }
}

/// True when `token` expires within [`REFRESH_MARGIN_SECS`] of `now`.
pub fn needs_refresh(token: &AccessToken, now: DateTime<Utc>) -> bool {
    now + Duration::seconds(REFRESH_MARGIN_SECS) >= token.expires_at
}
