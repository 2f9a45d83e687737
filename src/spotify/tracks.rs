use crate::{
    spotify::{SEARCH_LIMIT, SpotifyClient, SpotifyError},
    types::{SearchResponse, TrackId},
};

/// Resolves `(track, artist)` pairs to a single Spotify track.
///
/// A search returns up to [`SEARCH_LIMIT`] ranked candidates. The candidates
/// are then checked against the user's saved tracks, and the first saved one
/// wins; without any saved candidate the top search hit is used.
#[derive(Clone)]
pub struct TrackResolver {
    client: SpotifyClient,
}

impl TrackResolver {
    pub fn new(client: SpotifyClient) -> Self {
        TrackResolver { client }
    }

    /// Resolves one `(track, artist)` pair to a single Spotify track id.
    ///
    /// Runs a search and, when it has results, one saved-track check over the
    /// candidates. The saved check is skipped entirely for an empty search.
    ///
    /// # Arguments
    ///
    /// * `track` - Free-text track name, passed to the search untouched
    /// * `artist` - Artist name used for the `artist:` filter, also untouched
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(Some(TrackId))` - The first saved candidate, else the top hit
    /// - `Ok(None)` - The search returned no results
    /// - `Err(SpotifyError)` - Token, status or transport failure of either call
    ///
    /// # Example
    ///
    /// ```
    /// let resolver = TrackResolver::new(client);
    /// if let Some(id) = resolver.resolve("Song A", "Artist X").await? {
    ///     println!("{}", id.uri());
    /// }
    /// ```
    pub async fn resolve(&self, track: &str, artist: &str) -> Result<Option<TrackId>, SpotifyError> {
        let candidates = self.search(track, artist).await?;
        if candidates.is_empty() {
            return Ok(None);
        }

        let saved = self.saved_flags(&candidates).await?;
        Ok(pick_preferred(&candidates, &saved).cloned())
    }

    /// Ranked candidate ids for a free-text track name filtered by artist.
    pub async fn search(&self, track: &str, artist: &str) -> Result<Vec<TrackId>, SpotifyError> {
        let query = [
            ("q", search_query(track, artist)),
            ("type", "track".to_string()),
            ("limit", SEARCH_LIMIT.to_string()),
        ];
        let res: SearchResponse = self.client.get("/search", &query).await?;

        Ok(res
            .tracks
            .items
            .into_iter()
            .flatten()
            .take(SEARCH_LIMIT)
            .map(|t| TrackId::new(t.id))
            .collect())
    }

    /// One flag per candidate, in candidate order, telling whether the track is
    /// in the user's library.
    pub async fn saved_flags(&self, candidates: &[TrackId]) -> Result<Vec<bool>, SpotifyError> {
        let ids = candidates
            .iter()
            .map(TrackId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        self.client.get("/me/tracks/contains", &[("ids", ids)]).await
    }
}

/// Search expression combining the free-text track name and an artist filter.
/// Both strings are passed through untouched.
pub fn search_query(track: &str, artist: &str) -> String {
    format!("{} artist:{}", track, artist)
}

/// First candidate flagged as saved, else the first candidate.
///
/// Flags are matched to candidates by position; missing flags count as not
/// saved.
pub fn pick_preferred<'a>(candidates: &'a [TrackId], saved: &[bool]) -> Option<&'a TrackId> {
    candidates
        .iter()
        .zip(saved.iter())
        .find(|(_, is_saved)| **is_saved)
        .map(|(id, _)| id)
        .or_else(|| candidates.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<TrackId> {
        raw.iter().map(|id| TrackId::new(*id)).collect()
    }

    #[test]
    fn test_prefers_first_saved_candidate() {
        let candidates = ids(&["A", "B", "C"]);
        let picked = pick_preferred(&candidates, &[false, true, false]);
        assert_eq!(picked, Some(&TrackId::new("B")));
    }

    #[test]
    fn test_earliest_saved_candidate_wins() {
        let candidates = ids(&["A", "B", "C"]);
        let picked = pick_preferred(&candidates, &[false, true, true]);
        assert_eq!(picked, Some(&TrackId::new("B")));
    }

    #[test]
    fn test_falls_back_to_top_hit() {
        let candidates = ids(&["A", "B", "C"]);
        let picked = pick_preferred(&candidates, &[false, false, false]);
        assert_eq!(picked, Some(&TrackId::new("A")));
    }

    #[test]
    fn test_short_flag_list_counts_as_unsaved() {
        let candidates = ids(&["A", "B", "C"]);
        assert_eq!(pick_preferred(&candidates, &[]), Some(&TrackId::new("A")));
        assert_eq!(
            pick_preferred(&candidates, &[false, false]),
            Some(&TrackId::new("A"))
        );
    }

    #[test]
    fn test_no_candidates() {
        assert_eq!(pick_preferred(&[], &[true]), None);
    }

    #[test]
    fn test_search_query_keeps_text_verbatim() {
        assert_eq!(search_query("Song A", "Artist X"), "Song A artist:Artist X");
        assert_eq!(search_query("", ""), " artist:");
    }
}
