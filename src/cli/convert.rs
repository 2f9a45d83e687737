use std::{path::PathBuf, sync::Arc};

use reqwest::Client;
use tabled::Table;

use crate::{
    config::Settings,
    error, info,
    management::{TokenManager, playlist_file},
    spotify::{PlaylistPublisher, SpotifyClient, SpotifyError},
    success,
    types::PublishTableRow,
};

pub async fn convert(directory: Option<PathBuf>) {
    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => error!("Something went wrong reading your config...\n{}", e),
    };
    let directory = directory.unwrap_or_else(|| settings.source.directory.clone());

    let files = match playlist_file::load_directory(&directory).await {
        Ok(files) => files,
        Err(e) => error!("Something went wrong reading the directory path...\n{}", e),
    };

    let publisher = match build_publisher(&settings) {
        Ok(p) => p,
        Err(e) => error!("Cannot set up the Spotify client: {}", e),
    };

    let mut rows: Vec<PublishTableRow> = Vec::with_capacity(files.len());
    for file in &files {
        let spec = file.to_spec(&settings.source.delimiter, settings.source.data_order);
        info!("Converting {} ({} tracks)", spec.name, spec.tracks.len());

        let report = match publisher.publish(&spec.name, &spec.tracks).await {
            Ok(report) => report,
            Err(e) => error!("Failed to convert {}: {}", file.filename, e),
        };

        if report.playlist.is_some() {
            success!("Playlist {} created with {} tracks", report.name, report.added);
        }

        rows.push(PublishTableRow {
            playlist: report.name,
            added: report.added,
            unresolved: report.unresolved.len(),
        });
    }

    println!("{}", Table::new(rows));
}

fn build_publisher(settings: &Settings) -> Result<PlaylistPublisher, SpotifyError> {
    let http = Client::builder().timeout(settings.http_timeout).build()?;
    let tokens = TokenManager::new(
        http.clone(),
        settings.endpoints.token_url.clone(),
        settings.credentials.clone(),
    );
    let client = SpotifyClient::new(http, settings.endpoints.api_url.clone(), Arc::new(tokens));

    Ok(PlaylistPublisher::new(client, settings.user_id.clone())
        .with_lookup_failures(settings.lookup_failures))
}
