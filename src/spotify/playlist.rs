use crate::{
    info,
    spotify::{MAX_TRACKS_PER_REQUEST, SpotifyClient, SpotifyError, TrackResolver},
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
        CreatePlaylistResponse, PlaylistHandle, TrackId, TrackQuery,
    },
    warning,
};

/// What happens when a single lookup fails at the HTTP level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupFailurePolicy {
    /// Abort the whole conversion.
    #[default]
    Abort,
    /// Report the pair as unresolved and carry on. Token failures still abort.
    Skip,
}

/// Outcome of one successful [`PlaylistPublisher::publish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub name: String,
    /// `None` when nothing resolved and no playlist was created.
    pub playlist: Option<PlaylistHandle>,
    pub added: usize,
    pub batches: usize,
    pub unresolved: Vec<TrackQuery>,
}

/// Creates a playlist for a list of track queries and fills it.
pub struct PlaylistPublisher {
    client: SpotifyClient,
    resolver: TrackResolver,
    user_id: String,
    lookup_failures: LookupFailurePolicy,
}

impl PlaylistPublisher {
    pub fn new(client: SpotifyClient, user_id: impl Into<String>) -> Self {
        PlaylistPublisher {
            resolver: TrackResolver::new(client.clone()),
            client,
            user_id: user_id.into(),
            lookup_failures: LookupFailurePolicy::default(),
        }
    }

    pub fn with_lookup_failures(mut self, policy: LookupFailurePolicy) -> Self {
        self.lookup_failures = policy;
        self
    }

    /// Resolves every query in order, then creates the playlist and adds the
    /// resolved tracks batch by batch.
    ///
    /// Unresolved queries are reported once each and left out. When nothing
    /// resolves, no playlist is created.
    ///
    /// # Arguments
    ///
    /// * `name` - Display name of the playlist to create
    /// * `tracks` - Queries in playlist order
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(PublishReport)` - Created playlist (if any), counts and unresolved queries
    /// - `Err(SpotifyError)` - The first fatal failure; see [`LookupFailurePolicy`]
    ///   for failures during lookup
    ///
    /// # Partial Failure
    ///
    /// A failing batch stops the publish. Batches already sent stay in the
    /// playlist and nothing is retried.
    ///
    /// # Example
    ///
    /// ```
    /// let publisher = PlaylistPublisher::new(client, "user-1");
    /// let report = publisher
    ///     .publish("My Mix", &[TrackQuery::new("Song A", "Artist X")])
    ///     .await?;
    /// println!("{} added, {} unresolved", report.added, report.unresolved.len());
    /// ```
    pub async fn publish(
        &self,
        name: &str,
        tracks: &[TrackQuery],
    ) -> Result<PublishReport, SpotifyError> {
        let mut track_ids: Vec<TrackId> = Vec::with_capacity(tracks.len());
        let mut unresolved: Vec<TrackQuery> = Vec::new();

        for query in tracks {
            match self.resolve(query).await? {
                Some(id) => track_ids.push(id),
                None => {
                    warning!("Could not find track: {} by {}", query.track, query.artist);
                    unresolved.push(query.clone());
                }
            }
        }

        if track_ids.is_empty() {
            info!("No valid tracks found to add to playlist {}", name);
            return Ok(PublishReport {
                name: name.to_string(),
                playlist: None,
                added: 0,
                batches: 0,
                unresolved,
            });
        }

        let playlist = self.create(name).await?;
        let batches = self.add_tracks(&playlist, &track_ids).await?;

        Ok(PublishReport {
            name: name.to_string(),
            playlist: Some(playlist),
            added: track_ids.len(),
            batches,
            unresolved,
        })
    }

    async fn resolve(&self, query: &TrackQuery) -> Result<Option<TrackId>, SpotifyError> {
        match self.resolver.resolve(&query.track, &query.artist).await {
            Err(e) if e.is_call_failure() && self.lookup_failures == LookupFailurePolicy::Skip => {
                warning!("Lookup failed for {}: {}", query, e);
                Ok(None)
            }
            other => other,
        }
    }

    pub async fn create(&self, name: &str) -> Result<PlaylistHandle, SpotifyError> {
        let endpoint = format!("/users/{}/playlists", self.user_id);
        let body = CreatePlaylistRequest {
            name: name.to_string(),
        };
        let res: CreatePlaylistResponse = self.client.post(&endpoint, &body).await?;
        Ok(PlaylistHandle { id: res.id })
    }

    /// Sends the tracks in order, one request per batch, and returns the number
    /// of batches sent.
    pub async fn add_tracks(
        &self,
        playlist: &PlaylistHandle,
        track_ids: &[TrackId],
    ) -> Result<usize, SpotifyError> {
        let endpoint = format!("/playlists/{}/tracks", playlist.id);
        let mut sent = 0;

        for uris in batches(track_ids) {
            let body = AddTrackToPlaylistRequest { uris };
            let _: AddTrackToPlaylistResponse = self.client.post(&endpoint, &body).await?;
            sent += 1;
        }

        Ok(sent)
    }
}

/// Splits track ids into consecutive URI batches of at most
/// [`MAX_TRACKS_PER_REQUEST`], keeping their order.
pub fn batches(track_ids: &[TrackId]) -> Vec<Vec<String>> {
    track_ids
        .chunks(MAX_TRACKS_PER_REQUEST)
        .map(|chunk| chunk.iter().map(TrackId::uri).collect())
        .collect()
}
