//! MusicBrainz recording search.
//!
//! Rate limited to 1 request per second per MusicBrainz API policy. Transient
//! failures (timeouts, 429/503, 5xx) are retried with exponential backoff.

use super::{Candidate, CatalogClient, CatalogError, RetryPolicy};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

pub const MUSICBRAINZ_API_BASE: &str = "https://musicbrainz.org/ws/2";

/// MusicBrainz refuses larger pages for search endpoints we care about.
const MAX_SEARCH_LIMIT: usize = 25;

#[derive(Debug, Clone)]
pub struct MusicBrainzSettings {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub rate_limit_interval: Duration,
    pub retry: RetryPolicy,
}

impl Default for MusicBrainzSettings {
    fn default() -> Self {
        Self {
            base_url: MUSICBRAINZ_API_BASE.to_string(),
            user_agent: concat!("pezzottify-recommender/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(10),
            rate_limit_interval: Duration::from_millis(1100), // slightly over 1s for safety
            retry: RetryPolicy::default(),
        }
    }
}

pub struct MusicBrainzClient {
    client: reqwest::Client,
    base_url: String,
    rate_limit_interval: Duration,
    retry: RetryPolicy,
    last_request: Mutex<Option<Instant>>,
}

#[derive(Deserialize)]
struct RecordingSearchResponse {
    #[serde(default)]
    recordings: Vec<MbRecording>,
}

#[derive(Deserialize)]
struct MbRecording {
    id: Option<String>,
    title: Option<String>,
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<MbArtistCredit>,
    #[serde(default)]
    tags: Vec<MbTag>,
}

#[derive(Deserialize)]
struct MbArtistCredit {
    artist: Option<MbArtist>,
}

#[derive(Deserialize)]
struct MbArtist {
    id: Option<String>,
    name: Option<String>,
}

#[derive(Deserialize)]
struct MbTag {
    name: String,
}

impl MbRecording {
    fn into_candidate(self) -> Option<Candidate> {
        let artist = self
            .artist_credit
            .into_iter()
            .next()
            .and_then(|credit| credit.artist)?;

        let candidate = Candidate {
            track_id: self.id?,
            track_title: self.title?,
            artist_id: artist.id.unwrap_or_default(),
            artist_name: artist.name?,
            tags: self.tags.into_iter().map(|t| t.name.to_lowercase()).collect(),
        };
        candidate.is_well_formed().then_some(candidate)
    }
}

/// Parse a MusicBrainz `recording` search body.
///
/// Recordings missing an id, a title or an artist credit are skipped.
pub fn parse_recordings(body: &str) -> Result<Vec<Candidate>, CatalogError> {
    let response: RecordingSearchResponse =
        serde_json::from_str(body).map_err(|e| CatalogError::Decode(e.to_string()))?;

    let total = response.recordings.len();
    let candidates: Vec<Candidate> = response
        .recordings
        .into_iter()
        .filter_map(MbRecording::into_candidate)
        .collect();

    if candidates.len() < total {
        debug!(
            "Skipped {} malformed recordings out of {}",
            total - candidates.len(),
            total
        );
    }
    Ok(candidates)
}

impl MusicBrainzClient {
    pub fn new(settings: MusicBrainzSettings) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            rate_limit_interval: settings.rate_limit_interval,
            retry: settings.retry,
            last_request: Mutex::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Wait until the pacing interval since the previous request has elapsed.
    async fn rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.rate_limit_interval {
                tokio::time::sleep(self.rate_limit_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    fn search_url(&self, query: &str, limit: usize) -> String {
        format!(
            "{}/recording?query={}&fmt=json&limit={}",
            self.base_url,
            urlencoding::encode(query),
            limit.clamp(1, MAX_SEARCH_LIMIT)
        )
    }

    async fn search_once(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, CatalogError> {
        self.rate_limit().await;

        let response = self
            .client
            .get(self.search_url(query, limit))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                429 | 503 => CatalogError::RateLimited,
                code => CatalogError::Http { status: code },
            });
        }

        let body = response.text().await.map_err(map_transport_error)?;
        let mut candidates = parse_recordings(&body)?;
        candidates.truncate(limit);
        Ok(candidates)
    }
}

fn map_transport_error(err: reqwest::Error) -> CatalogError {
    if err.is_timeout() {
        CatalogError::Timeout
    } else {
        CatalogError::Transport(err.to_string())
    }
}

#[async_trait]
impl CatalogClient for MusicBrainzClient {
    async fn search_tracks(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Candidate>, CatalogError> {
        let mut retry_count = 0;
        loop {
            match self.search_once(query, limit).await {
                Ok(candidates) => {
                    debug!(
                        "MusicBrainz search '{}' returned {} candidates",
                        query,
                        candidates.len()
                    );
                    return Ok(candidates);
                }
                Err(err) if self.retry.should_retry(&err, retry_count) => {
                    let backoff = self.retry.backoff(retry_count);
                    warn!(
                        "MusicBrainz search '{}' failed ({}), retrying in {:?}",
                        query, err, backoff
                    );
                    tokio::time::sleep(backoff).await;
                    retry_count += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
