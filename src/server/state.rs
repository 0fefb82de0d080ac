use axum::extract::FromRef;

use crate::profile_store::ProfileStore;
use crate::recommender::RecommendationEngine;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedEngine = Arc<RecommendationEngine>;
pub type GuardedProfileStore = Arc<dyn ProfileStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub engine: GuardedEngine,
    pub profile_store: GuardedProfileStore,
    pub hash: String,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        engine: GuardedEngine,
        profile_store: GuardedProfileStore,
        hash: String,
    ) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            engine,
            profile_store,
            hash,
        }
    }
}

impl FromRef<ServerState> for GuardedProfileStore {
    fn from_ref(input: &ServerState) -> Self {
        input.profile_store.clone()
    }
}
