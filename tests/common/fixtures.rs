//! Scripted catalogs for end-to-end tests

use super::constants::*;
use async_trait::async_trait;
use pezzottify_recommender::catalog_client::{Candidate, CatalogClient, CatalogError};
use std::sync::Mutex;
use std::time::Duration;

enum Behavior {
    Tracks(Vec<Candidate>),
    Hang,
    Fail(CatalogError),
}

/// Answers every query the same way and records the queries it receives.
pub struct ScriptedCatalog {
    behavior: Behavior,
    calls: Mutex<Vec<String>>,
}

impl ScriptedCatalog {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns `tracks` (capped at the requested limit) for every query.
    pub fn returning(tracks: Vec<Candidate>) -> Self {
        Self::with_behavior(Behavior::Tracks(tracks))
    }

    /// Never answers within any sane deadline.
    pub fn hanging() -> Self {
        Self::with_behavior(Behavior::Hang)
    }

    pub fn failing(error: CatalogError) -> Self {
        Self::with_behavior(Behavior::Fail(error))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogClient for ScriptedCatalog {
    async fn search_tracks(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Candidate>, CatalogError> {
        self.calls.lock().unwrap().push(query.to_string());
        match &self.behavior {
            Behavior::Tracks(tracks) => Ok(tracks.iter().take(limit).cloned().collect()),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(vec![])
            }
            Behavior::Fail(error) => Err(error.clone()),
        }
    }
}

fn track(id: String, title: String, artist: &str, tags: &[&str]) -> Candidate {
    Candidate {
        track_id: id,
        track_title: title,
        artist_id: format!("{}-id", artist.to_lowercase().replace(' ', "-")),
        artist_name: artist.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

/// 20 tracks over 8 artists, all tagged hip-hop.
pub fn hip_hop_tracks() -> Vec<Candidate> {
    (0..HIP_HOP_TRACK_COUNT)
        .map(|i| {
            track(
                format!("hh-{}", i),
                format!("Classic Cut {}", i),
                HIP_HOP_ARTISTS[i % HIP_HOP_ARTISTS.len()],
                &["hip-hop", "east coast"],
            )
        })
        .collect()
}

pub fn jazz_tracks() -> Vec<Candidate> {
    (0..12)
        .map(|i| {
            track(
                format!("jz-{}", i),
                format!("Blue Session {}", i),
                JAZZ_ARTISTS[i % JAZZ_ARTISTS.len()],
                &["jazz"],
            )
        })
        .collect()
}
