use std::sync::Arc;

use reqwest::{Client, Method};
use serde::{Serialize, de::DeserializeOwned};

use crate::{management::TokenManager, spotify::SpotifyError};

/// Authenticated access to the Spotify Web API.
///
/// Every request carries a bearer token taken from the shared
/// [`TokenManager`]. Non-success statuses become [`SpotifyError::Api`];
/// network failures, timeouts and undecodable bodies become
/// [`SpotifyError::Transport`]. Nothing is retried here.
#[derive(Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    tokens: Arc<TokenManager>,
}

impl SpotifyClient {
    pub fn new(http: Client, api_url: impl Into<String>, tokens: Arc<TokenManager>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        SpotifyClient {
            http,
            api_url,
            tokens,
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, SpotifyError> {
        self.call::<T, ()>(Method::GET, endpoint, query, None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, SpotifyError> {
        self.call(Method::POST, endpoint, &[], Some(body)).await
    }

    /// Issues one request against `endpoint` and decodes the JSON response.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method
    /// * `endpoint` - Path relative to the API base URL, starting with `/`
    /// * `query` - Query parameters; left off the URL when empty
    /// * `body` - Optional JSON body
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(T)` - The decoded 2xx response body
    /// - `Err(SpotifyError::Auth)` - No valid token could be obtained
    /// - `Err(SpotifyError::Api)` - Non-success status, with the response body
    /// - `Err(SpotifyError::Transport)` - Network failure, timeout or bad JSON
    pub async fn call<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T, SpotifyError> {
        let token = self.tokens.get_valid_token().await?;
        let url = format!("{}{}", self.api_url, endpoint);

        let mut request = self.http.request(method, &url).bearer_auth(&token.value);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpotifyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }
}
