use base64::{Engine, engine::general_purpose::STANDARD};
use rand::{Rng, distr::Alphanumeric};

/// Random value for the OAuth `state` parameter.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// `Authorization` header value for HTTP Basic auth with the app credentials.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let encoded = STANDARD.encode(format!("{}:{}", client_id, client_secret));
    format!("Basic {}", encoded)
}

/// `'a', 'b', 'c'`
pub fn quote_each<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .map(|w| format!("'{}'", w.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}
