// In-process stand-in for the Spotify accounts service and Web API.
#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use playlistr::{
    management::TokenManager,
    spotify::{PlaylistPublisher, SpotifyClient},
    types::Credentials,
};
use reqwest::Client;
use serde_json::{Value, json};

pub const EXPECTED_BASIC_AUTH: &str = "Basic Y2xpZW50LWlkOmNsaWVudC1zZWNyZXQ=";
pub const USER_ID: &str = "user-1";
pub const PLAYLIST_ID: &str = "playlist-1";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Token {
        authorization: Option<String>,
        form: HashMap<String, String>,
    },
    Search {
        q: String,
        kind: String,
        limit: String,
    },
    Contains {
        ids: Vec<String>,
    },
    Me,
    CreatePlaylist {
        user: String,
        name: String,
    },
    AddTracks {
        playlist: String,
        uris: Vec<String>,
    },
}

#[derive(Default)]
pub struct FakeSpotify {
    /// Search query (`"<track> artist:<artist>"`) to ranked track ids.
    pub search_results: HashMap<String, Vec<String>>,
    pub saved: HashSet<String>,
    /// `None` leaves `expires_in` out of token responses.
    pub expires_in: Option<i64>,
    pub reject_token: bool,
    /// 1-based index of the add-tracks call that answers 500.
    pub fail_add_on_batch: Option<usize>,
    pub failing_searches: HashSet<String>,
    pub malformed_searches: HashSet<String>,
    pub calls: Mutex<Vec<Call>>,
    pub api_authorizations: Mutex<Vec<String>>,
    pub tokens_issued: Mutex<usize>,
}

impl FakeSpotify {
    pub fn new() -> Self {
        FakeSpotify {
            expires_in: Some(3600),
            ..Default::default()
        }
    }

    pub fn with_track(mut self, track: &str, artist: &str, ids: &[&str]) -> Self {
        self.search_results.insert(
            format!("{} artist:{}", track, artist),
            ids.iter().map(|id| id.to_string()).collect(),
        );
        self
    }

    pub fn with_saved(mut self, id: &str) -> Self {
        self.saved.insert(id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn token_requests(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Token { .. }))
            .collect()
    }

    /// Calls other than token requests, in order.
    pub fn api_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Token { .. }))
            .collect()
    }

    pub fn added_batches(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::AddTracks { uris, .. } => Some(uris),
                _ => None,
            })
            .collect()
    }

    pub fn created_playlists(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::CreatePlaylist { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn record_authorization(&self, headers: &HeaderMap) {
        let value = authorization(headers).unwrap_or_default();
        self.api_authorizations.lock().unwrap().push(value);
    }
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

type Shared = State<Arc<FakeSpotify>>;

async fn token(
    State(fake): Shared,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    fake.record(Call::Token {
        authorization: authorization(&headers),
        form: form.clone(),
    });

    if fake.reject_token {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant" })),
        )
            .into_response();
    }

    let issued = {
        let mut n = fake.tokens_issued.lock().unwrap();
        *n += 1;
        *n
    };

    let mut body = json!({
        "access_token": format!("access-{}", issued),
        "token_type": "Bearer",
    });
    if let Some(expires_in) = fake.expires_in {
        body["expires_in"] = json!(expires_in);
    }
    if form.get("grant_type").map(String::as_str) == Some("authorization_code") {
        body["refresh_token"] = json!("refresh-from-code");
        body["scope"] = json!("user-library-read");
    }

    Json(body).into_response()
}

async fn search(
    State(fake): Shared,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    fake.record_authorization(&headers);
    let q = params.get("q").cloned().unwrap_or_default();
    fake.record(Call::Search {
        q: q.clone(),
        kind: params.get("type").cloned().unwrap_or_default(),
        limit: params.get("limit").cloned().unwrap_or_default(),
    });

    if fake.failing_searches.contains(&q) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": { "status": 500, "message": "search exploded" } })),
        )
            .into_response();
    }
    if fake.malformed_searches.contains(&q) {
        return "definitely not json".into_response();
    }

    let items: Vec<Value> = fake
        .search_results
        .get(&q)
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|id| json!({ "id": id, "name": format!("track {}", id) }))
        .collect();

    let total = items.len();
    Json(json!({ "tracks": { "items": items, "total": total } })).into_response()
}

async fn contains(
    State(fake): Shared,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    fake.record_authorization(&headers);
    let ids: Vec<String> = params
        .get("ids")
        .map(|raw| raw.split(',').map(str::to_string).collect())
        .unwrap_or_default();
    fake.record(Call::Contains { ids: ids.clone() });

    let flags: Vec<bool> = ids.iter().map(|id| fake.saved.contains(id)).collect();
    Json(flags).into_response()
}

async fn me(State(fake): Shared, headers: HeaderMap) -> Response {
    fake.record_authorization(&headers);
    fake.record(Call::Me);
    Json(json!({ "id": "fake-user", "display_name": "Fake User" })).into_response()
}

async fn create_playlist(
    State(fake): Shared,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    fake.record_authorization(&headers);
    fake.record(Call::CreatePlaylist {
        user: user_id,
        name: body["name"].as_str().unwrap_or_default().to_string(),
    });

    (
        StatusCode::CREATED,
        Json(json!({ "id": PLAYLIST_ID, "name": body["name"] })),
    )
        .into_response()
}

async fn add_tracks(
    State(fake): Shared,
    Path(playlist_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    fake.record_authorization(&headers);
    let uris: Vec<String> = body["uris"]
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|u| u.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    fake.record(Call::AddTracks {
        playlist: playlist_id,
        uris,
    });

    let batch = fake.added_batches().len();
    if fake.fail_add_on_batch == Some(batch) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": { "status": 500, "message": "insert failed" } })),
        )
            .into_response();
    }

    (StatusCode::CREATED, Json(json!({ "snapshot_id": "snapshot" }))).into_response()
}

/// Serves `fake` on an ephemeral port and returns it with its base URL.
pub async fn start(fake: FakeSpotify) -> (Arc<FakeSpotify>, String) {
    let fake = Arc::new(fake);
    let app = Router::new()
        .route("/api/token", post(token))
        .route("/v1/search", get(search))
        .route("/v1/me", get(me))
        .route("/v1/me/tracks/contains", get(contains))
        .route("/v1/users/{user_id}/playlists", post(create_playlist))
        .route("/v1/playlists/{playlist_id}/tracks", post(add_tracks))
        .with_state(Arc::clone(&fake));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (fake, format!("http://{}", addr))
}

pub fn credentials() -> Credentials {
    Credentials {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        refresh_token: "refresh-123".to_string(),
    }
}

pub fn token_manager(base_url: &str) -> TokenManager {
    TokenManager::new(Client::new(), format!("{}/api/token", base_url), credentials())
}

pub fn client(base_url: &str) -> SpotifyClient {
    SpotifyClient::new(
        Client::new(),
        format!("{}/v1", base_url),
        Arc::new(token_manager(base_url)),
    )
}

pub fn publisher(base_url: &str) -> PlaylistPublisher {
    PlaylistPublisher::new(client(base_url), USER_ID)
}
