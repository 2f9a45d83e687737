use std::path::PathBuf;

use tabled::Table;

use crate::{
    config::SourceSettings,
    error,
    management::playlist_file,
    types::PlaylistTableRow,
};

pub async fn preview(directory: Option<PathBuf>) {
    let settings = match SourceSettings::from_env() {
        Ok(s) => s,
        Err(e) => error!("Something went wrong reading your config...\n{}", e),
    };
    let directory = directory.unwrap_or(settings.directory);

    let files = match playlist_file::load_directory(&directory).await {
        Ok(files) => files,
        Err(e) => error!("Something went wrong reading the directory path...\n{}", e),
    };

    let rows: Vec<PlaylistTableRow> = files
        .iter()
        .map(|file| {
            let spec = file.to_spec(&settings.delimiter, settings.data_order);
            PlaylistTableRow {
                file: file.filename.clone(),
                name: spec.name,
                tracks: spec.tracks.len(),
            }
        })
        .collect();

    println!("{}", Table::new(rows));
}
