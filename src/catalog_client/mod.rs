//! Catalog client contract.
//!
//! The recommendation engine only talks to the outside catalog through
//! [`CatalogClient`]. Rate limiting and retries are the client's business;
//! the engine treats any [`CatalogError`] as "no candidates from this search".

mod musicbrainz;
mod retry_policy;

pub use musicbrainz::{
    parse_recordings, MusicBrainzClient, MusicBrainzSettings, MUSICBRAINZ_API_BASE,
};
pub use retry_policy::RetryPolicy;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// A raw track record returned by a catalog search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub track_id: String,
    pub track_title: String,
    pub artist_id: String,
    pub artist_name: String,
    pub tags: Vec<String>,
}

impl Candidate {
    /// A candidate is usable only if it can be identified and displayed.
    pub fn is_well_formed(&self) -> bool {
        !self.track_id.trim().is_empty()
            && !self.track_title.trim().is_empty()
            && !self.artist_name.trim().is_empty()
    }
}

/// Errors a catalog search can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog request timed out")]
    Timeout,

    #[error("catalog rate limited the request")]
    RateLimited,

    #[error("catalog returned status {status}")]
    Http { status: u16 },

    #[error("catalog transport error: {0}")]
    Transport(String),

    #[error("failed to decode catalog response: {0}")]
    Decode(String),
}

impl CatalogError {
    /// Whether repeating the same request later could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            CatalogError::Timeout | CatalogError::RateLimited | CatalogError::Transport(_) => true,
            CatalogError::Http { status } => *status >= 500,
            CatalogError::Decode(_) => false,
        }
    }
}

#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Run one free-text search and return at most `limit` candidates.
    async fn search_tracks(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Candidate>, CatalogError>;
}
