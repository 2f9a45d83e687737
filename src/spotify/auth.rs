use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, Url, header::AUTHORIZATION};
use thiserror::Error;
use tokio::{net::TcpListener, sync::Mutex};

use crate::{
    config::AuthSettings,
    management::TokenManager,
    server::start_api_server,
    spotify::{SpotifyClient, SpotifyError},
    types::{AuthorizationCodeResponse, AuthorizationState, Credentials, CurrentUserResponse},
    utils, warning,
};

/// How long the flow waits for the browser redirect.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum AuthFlowError {
    #[error("invalid authorization URL: {0}")]
    InvalidUrl(String),
    #[error("callback server failed: {0}")]
    Server(#[from] std::io::Error),
    #[error("authorization was not completed within {} seconds", .0.as_secs())]
    Timeout(Duration),
    #[error("authorization code exchange failed: {0}")]
    Exchange(String),
    #[error(transparent)]
    Spotify(#[from] SpotifyError),
}

/// Result of a completed authorization.
#[derive(Debug, Clone)]
pub struct AuthorizedUser {
    pub refresh_token: String,
    pub user_id: String,
}

/// Runs the authorization-code flow once to obtain a refresh token.
///
/// 1. Binds the local callback listener on the configured address.
/// 2. Opens the authorization page in the browser (or prints the URL).
/// 3. Waits up to [`CALLBACK_TIMEOUT`] for the redirect carrying the code.
/// 4. Exchanges the code for a refresh token.
/// 5. Looks up the user id with a token obtained from that refresh token.
pub async fn authorize(settings: &AuthSettings) -> Result<AuthorizedUser, AuthFlowError> {
    let state_value = utils::generate_state();
    let auth_url = authorize_url(settings, &state_value)?;

    let shared_state = Arc::new(Mutex::new(Some(AuthorizationState {
        state: state_value,
        code: None,
    })));

    let listener = TcpListener::bind(settings.server_address).await?;
    let server_state = Arc::clone(&shared_state);
    let server = tokio::spawn(async move { start_api_server(listener, server_state).await });

    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        );
    }

    let code = wait_for_code(shared_state, CALLBACK_TIMEOUT).await;
    server.abort();
    let code = code.ok_or(AuthFlowError::Timeout(CALLBACK_TIMEOUT))?;

    let http = Client::builder()
        .timeout(settings.http_timeout)
        .build()
        .map_err(SpotifyError::from)?;

    let grant = exchange_code(&http, settings, &code).await?;
    let user_id = fetch_user_id(&http, settings, &grant.refresh_token).await?;

    Ok(AuthorizedUser {
        refresh_token: grant.refresh_token,
        user_id,
    })
}

/// Authorization page URL for the configured app, redirect and scope.
pub fn authorize_url(settings: &AuthSettings, state: &str) -> Result<Url, AuthFlowError> {
    Url::parse_with_params(
        &settings.endpoints.authorize_url,
        &[
            ("client_id", settings.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", settings.redirect_uri.as_str()),
            ("scope", settings.scope.as_str()),
            ("state", state),
        ],
    )
    .map_err(|e| AuthFlowError::InvalidUrl(e.to_string()))
}

async fn wait_for_code(
    shared_state: Arc<Mutex<Option<AuthorizationState>>>,
    max_wait: Duration,
) -> Option<String> {
    use std::time::Instant;

    let pb = ProgressBar::new_spinner();
    pb.set_message("Waiting for authorization...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let start = Instant::now();
    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(code) = lock.as_ref().and_then(|s| s.code.clone()) {
            pb.finish_and_clear();
            return Some(code);
        }
        drop(lock);
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    pb.finish_and_clear();
    None
}

/// Trades an authorization code for tokens at the token endpoint.
pub async fn exchange_code(
    http: &Client,
    settings: &AuthSettings,
    code: &str,
) -> Result<AuthorizationCodeResponse, AuthFlowError> {
    let res = http
        .post(&settings.endpoints.token_url)
        .header(
            AUTHORIZATION,
            utils::basic_auth_header(&settings.client_id, &settings.client_secret),
        )
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", settings.redirect_uri.as_str()),
        ])
        .send()
        .await
        .map_err(|e| AuthFlowError::Exchange(e.to_string()))?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(AuthFlowError::Exchange(format!("{} {}", status, body)));
    }

    res.json::<AuthorizationCodeResponse>()
        .await
        .map_err(|e| AuthFlowError::Exchange(e.to_string()))
}

/// Spotify user id of the account behind `refresh_token`.
pub async fn fetch_user_id(
    http: &Client,
    settings: &AuthSettings,
    refresh_token: &str,
) -> Result<String, AuthFlowError> {
    let tokens = TokenManager::new(
        http.clone(),
        settings.endpoints.token_url.clone(),
        Credentials {
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            refresh_token: refresh_token.to_string(),
        },
    );
    let client = SpotifyClient::new(http.clone(), settings.endpoints.api_url.clone(), Arc::new(tokens));

    let me: CurrentUserResponse = client.get("/me", &[]).await?;
    Ok(me.id)
}
