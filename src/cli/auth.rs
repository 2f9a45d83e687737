use crate::{
    config::{self, AuthSettings, KEY_REFRESH_TOKEN, KEY_USER_ID},
    error, info, spotify, success,
};

pub async fn auth() {
    let settings = match AuthSettings::from_env() {
        Ok(s) => s,
        Err(e) => error!("Something went wrong reading your config...\n{}", e),
    };

    info!("Opening browser for Spotify authorization...");
    let user = match spotify::auth::authorize(&settings).await {
        Ok(user) => user,
        Err(e) => error!("Authorization failed: {}", e),
    };

    let path = config::env_path();
    let updates = [
        (KEY_REFRESH_TOKEN, user.refresh_token.as_str()),
        (KEY_USER_ID, user.user_id.as_str()),
    ];
    if let Err(e) = config::update_env_file(&path, &updates).await {
        error!("Failed to save credentials: {}", e);
    }

    success!(
        "Authorized as {}. Credentials saved to {}",
        user.user_id,
        path.display()
    );
}
