//! Scripted catalog for engine unit tests.

use crate::catalog_client::{Candidate, CatalogClient, CatalogError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Clone)]
pub struct Reply {
    pub delay: Duration,
    pub result: Result<Vec<Candidate>, CatalogError>,
}

impl Reply {
    pub fn ok(candidates: Vec<Candidate>) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(candidates),
        }
    }

    pub fn err(error: CatalogError) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(error),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Answers each query from a script, falling back to a default reply, and
/// records every query it receives.
pub struct MockCatalog {
    replies: HashMap<String, Reply>,
    default: Reply,
    calls: Mutex<Vec<String>>,
}

impl MockCatalog {
    pub fn new(default: Reply) -> Self {
        Self {
            replies: HashMap::new(),
            default,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reply(mut self, query: &str, reply: Reply) -> Self {
        self.replies.insert(query.to_string(), reply);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogClient for MockCatalog {
    async fn search_tracks(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Candidate>, CatalogError> {
        self.calls.lock().unwrap().push(query.to_string());
        let reply = self.replies.get(query).unwrap_or(&self.default).clone();
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result.map(|mut candidates| {
            candidates.truncate(limit);
            candidates
        })
    }
}

pub fn candidate(id: &str, title: &str, artist: &str, tags: &[&str]) -> Candidate {
    Candidate {
        track_id: id.to_string(),
        track_title: title.to_string(),
        artist_id: format!("{}-id", artist.to_lowercase().replace(' ', "-")),
        artist_name: artist.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

/// 20 hip-hop tracks spread over 8 artists.
pub fn hip_hop_catalog() -> Vec<Candidate> {
    let artists = [
        "Nas",
        "Rakim",
        "KRS-One",
        "Big Daddy Kane",
        "Slick Rick",
        "LL Cool J",
        "Run-DMC",
        "Public Enemy",
    ];
    (0..20)
        .map(|i| {
            candidate(
                &format!("hh-{}", i),
                &format!("Classic Cut {}", i),
                artists[i % artists.len()],
                &["hip-hop", "east coast"],
            )
        })
        .collect()
}
