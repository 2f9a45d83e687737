//! Configuration management for playlistr.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory. Variables already present in the process
//! environment take priority over the file.
//!
//! Parsing is done through `from_lookup` constructors that take a key lookup
//! function, so the same code serves the real environment and tests.

use std::{
    env,
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;

use crate::{
    management::DataOrder,
    spotify::LookupFailurePolicy,
    types::Credentials,
    utils,
};

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8888/callback";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_SCOPE: &str = "playlist-modify-public playlist-modify-private user-library-read";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

pub const KEY_REFRESH_TOKEN: &str = "SPOTIFY_API_REFRESH_TOKEN";
pub const KEY_USER_ID: &str = "SPOTIFY_USER_ID";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing values for key(s) {}", utils::quote_each(.0))]
    Missing(Vec<String>),
    #[error("Key 'PLAYLIST_DATA_ORDER' must equal one of 'track artist', 'artist track' (got '{0}')")]
    InvalidDataOrder(String),
    #[error("Invalid value '{value}' for key '{key}'")]
    Invalid { key: String, value: String },
    #[error("Cannot load {}: {reason}", .path.display())]
    EnvFile { path: PathBuf, reason: String },
}

/// Base URLs of the services the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api_url: String,
    pub token_url: String,
    pub authorize_url: String,
}

/// Where playlist files live and how their lines are laid out.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub directory: PathBuf,
    pub data_order: DataOrder,
    pub delimiter: String,
}

/// Everything `playlistr convert` needs.
#[derive(Debug, Clone)]
pub struct Settings {
    pub source: SourceSettings,
    pub user_id: String,
    pub credentials: Credentials,
    pub endpoints: Endpoints,
    pub http_timeout: Duration,
    pub lookup_failures: LookupFailurePolicy,
}

/// Everything `playlistr auth` needs.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub endpoints: Endpoints,
    pub redirect_uri: String,
    pub scope: String,
    pub server_address: SocketAddr,
    pub http_timeout: Duration,
}

struct Reader<F> {
    lookup: F,
    missing: Vec<String>,
}

impl<F: Fn(&str) -> Option<String>> Reader<F> {
    fn new(lookup: F) -> Self {
        Reader {
            lookup,
            missing: Vec::new(),
        }
    }

    fn required(&mut self, key: &str) -> String {
        match (self.lookup)(key).filter(|v| !v.trim().is_empty()) {
            Some(value) => value,
            None => {
                self.missing.push(key.to_string());
                String::new()
            }
        }
    }

    fn optional(&self, key: &str, default: &str) -> String {
        (self.lookup)(key)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    fn finish(&self) -> Result<(), ConfigError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Missing(self.missing.clone()))
        }
    }

    fn endpoints(&self) -> Endpoints {
        Endpoints {
            api_url: self.optional("SPOTIFY_API_URL", DEFAULT_API_URL),
            token_url: self.optional("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
            authorize_url: self.optional("SPOTIFY_API_AUTH_URL", DEFAULT_AUTHORIZE_URL),
        }
    }

    fn http_timeout(&self) -> Result<Duration, ConfigError> {
        let key = "PLAYLISTR_HTTP_TIMEOUT_SECS";
        let raw = self.optional(key, &DEFAULT_HTTP_TIMEOUT_SECS.to_string());
        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(invalid(key, &raw)),
        }
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    }
}

struct RawSource {
    directory: String,
    data_order: String,
    delimiter: String,
}

impl RawSource {
    fn read<F: Fn(&str) -> Option<String>>(reader: &mut Reader<F>) -> Self {
        RawSource {
            directory: reader.required("PLAYLIST_DIRECTORY"),
            data_order: reader.required("PLAYLIST_DATA_ORDER"),
            delimiter: reader.required("PLAYLIST_DATA_DELIMITER"),
        }
    }

    fn parse(self) -> Result<SourceSettings, ConfigError> {
        let data_order = self
            .data_order
            .trim()
            .parse::<DataOrder>()
            .map_err(ConfigError::InvalidDataOrder)?;

        Ok(SourceSettings {
            directory: PathBuf::from(self.directory.trim()),
            data_order,
            delimiter: self.delimiter,
        })
    }
}

impl SourceSettings {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut reader = Reader::new(lookup);
        let raw = RawSource::read(&mut reader);
        reader.finish()?;
        raw.parse()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }
}

impl Settings {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut reader = Reader::new(lookup);
        let raw_source = RawSource::read(&mut reader);
        let user_id = reader.required(KEY_USER_ID);
        let client_id = reader.required("SPOTIFY_API_AUTH_CLIENT_ID");
        let client_secret = reader.required("SPOTIFY_API_AUTH_CLIENT_SECRET");
        let refresh_token = reader.required(KEY_REFRESH_TOKEN);
        reader.finish()?;

        let skip_key = "PLAYLISTR_SKIP_FAILED_LOOKUPS";
        let skip_raw = reader.optional(skip_key, "false");
        let lookup_failures = match skip_raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => LookupFailurePolicy::Skip,
            "false" | "0" | "no" => LookupFailurePolicy::Abort,
            _ => return Err(invalid(skip_key, &skip_raw)),
        };

        Ok(Settings {
            source: raw_source.parse()?,
            user_id: user_id.trim().to_string(),
            credentials: Credentials {
                client_id: client_id.trim().to_string(),
                client_secret: client_secret.trim().to_string(),
                refresh_token: refresh_token.trim().to_string(),
            },
            endpoints: reader.endpoints(),
            http_timeout: reader.http_timeout()?,
            lookup_failures,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }
}

impl AuthSettings {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut reader = Reader::new(lookup);
        let client_id = reader.required("SPOTIFY_API_AUTH_CLIENT_ID");
        let client_secret = reader.required("SPOTIFY_API_AUTH_CLIENT_SECRET");
        reader.finish()?;

        let address_key = "SERVER_ADDRESS";
        let address_raw = reader.optional(address_key, DEFAULT_SERVER_ADDRESS);
        let server_address = address_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| invalid(address_key, &address_raw))?;

        Ok(AuthSettings {
            client_id: client_id.trim().to_string(),
            client_secret: client_secret.trim().to_string(),
            endpoints: reader.endpoints(),
            redirect_uri: reader.optional("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI),
            scope: reader.optional("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE),
            server_address,
            http_timeout: reader.http_timeout()?,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }
}

/// Location of the `.env` file:
/// - Linux: `~/.local/share/playlistr/.env`
/// - macOS: `~/Library/Application Support/playlistr/.env`
/// - Windows: `%LOCALAPPDATA%/playlistr/.env`
pub fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("playlistr/.env");
    path
}

/// Loads environment variables from the `.env` file in the local data
/// directory, creating the directory if needed.
///
/// A missing file is not an error; configuration may come entirely from the
/// process environment.
pub async fn load_env() -> Result<(), ConfigError> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| env_file_error(&path, e))?;
    }

    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| env_file_error(&path, e))?;
    Ok(())
}

/// Writes `updates` into the `.env` file at `path`, replacing existing
/// assignments of the same keys and keeping every other line.
pub async fn update_env_file(path: &Path, updates: &[(&str, &str)]) -> Result<(), ConfigError> {
    let existing = if path.is_file() {
        async_fs::read_to_string(path)
            .await
            .map_err(|e| env_file_error(path, e))?
    } else {
        String::new()
    };

    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| env_file_error(path, e))?;
    }

    async_fs::write(path, merge_env(&existing, updates))
        .await
        .map_err(|e| env_file_error(path, e))
}

/// Applies `KEY=value` updates to the text of an env file.
pub fn merge_env(existing: &str, updates: &[(&str, &str)]) -> String {
    let mut pending: Vec<&(&str, &str)> = updates.iter().collect();
    let mut lines: Vec<String> = Vec::new();

    for line in existing.lines() {
        let assigned_key = line
            .trim_start()
            .split_once('=')
            .map(|(key, _)| key.trim());

        match assigned_key.and_then(|key| pending.iter().position(|(k, _)| *k == key)) {
            Some(idx) => {
                let (key, value) = pending.remove(idx);
                lines.push(format!("{}={}", key, value));
            }
            None => lines.push(line.to_string()),
        }
    }

    for (key, value) in pending {
        lines.push(format!("{}={}", key, value));
    }

    let mut merged = lines.join("\n");
    merged.push('\n');
    merged
}

fn env_file_error(path: &Path, err: impl ToString) -> ConfigError {
    ConfigError::EnvFile {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}
