//! Recommendation API routes

use crate::profile_store::{ProfileStore, UserProfile};
use crate::recommender::{
    QueryAnalysis, RecommendationResponse, ScoredRecommendation, SearchIntent, ALGORITHM_VERSION,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;
use tracing::{error, warn};

use super::state::ServerState;

const EMPTY_QUERY_DETAIL: &str = "Query parameter is required";
const EMPTY_ARTIST_DETAIL: &str = "Artist name is required";
const PROFILE_NOT_FOUND: &str = "Profile not found. Please create a profile first.";
const PROFILE_WITHOUT_PREFERENCES: &str = "Please add favorite genres or artists to your profile.";
const PROFILE_UNAVAILABLE: &str = "Profile could not be loaded. Please try again later.";
const RECOMMENDATIONS_UNAVAILABLE: &str = "Recommendations are temporarily unavailable.";

#[derive(Deserialize, Debug, Default)]
struct RecommendationParams {
    pub query: Option<String>,

    /// Kept as text so that a malformed limit falls back to the default
    /// instead of rejecting the request.
    pub limit: Option<String>,

    pub username: Option<String>,
}

impl RecommendationParams {
    fn limit(&self) -> Option<usize> {
        self.limit.as_deref().and_then(|s| s.trim().parse().ok())
    }
}

/// Body returned by the profile route when there is nothing to run.
#[derive(Serialize, Debug)]
struct ProfileMessage {
    recommendations: Vec<ScoredRecommendation>,
    message: &'static str,
}

impl ProfileMessage {
    fn new(message: &'static str) -> Json<Self> {
        Json(Self {
            recommendations: vec![],
            message,
        })
    }
}

fn bad_request(detail: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
}

fn degraded_response(
    intent: &SearchIntent,
    started: Instant,
    error: String,
) -> RecommendationResponse {
    RecommendationResponse {
        recommendations: vec![],
        query_analyzed: QueryAnalysis::failed(intent, started.elapsed().as_millis() as u64, error),
        algorithm_version: ALGORITHM_VERSION,
    }
}

/// A failing store must not fail the request: it proceeds without a profile.
fn load_profile(store: &dyn ProfileStore, username: &str) -> Option<UserProfile> {
    match store.get_profile(username) {
        Ok(profile) => profile,
        Err(err) => {
            warn!(
                "Could not load profile of {}, continuing without it: {:#}",
                username, err
            );
            None
        }
    }
}

async fn get_query_recommendations(
    State(state): State<ServerState>,
    Query(params): Query<RecommendationParams>,
) -> Response {
    let query = params.query.as_deref().unwrap_or_default().trim().to_string();
    if query.is_empty() {
        return bad_request(EMPTY_QUERY_DETAIL);
    }

    let limit = state.engine.resolve_limit(params.limit());
    let profile = params
        .username
        .as_deref()
        .map(str::trim)
        .filter(|username| !username.is_empty())
        .and_then(|username| load_profile(state.profile_store.as_ref(), username));

    let started = Instant::now();
    let engine = state.engine.clone();
    let task_query = query.clone();
    let task = tokio::spawn(async move {
        engine
            .recommend_for_query(&task_query, limit, profile.as_ref())
            .await
    });

    match task.await {
        Ok(response) => Json(response).into_response(),
        Err(err) => {
            error!("Recommendation task for '{}' failed: {}", query, err);
            let intent = state.engine.analyze(&query);
            Json(degraded_response(&intent, started, err.to_string())).into_response()
        }
    }
}

async fn get_similar_recommendations(
    State(state): State<ServerState>,
    Path(artist_name): Path<String>,
    Query(params): Query<RecommendationParams>,
) -> Response {
    let artist_name = artist_name.trim().to_string();
    if artist_name.is_empty() {
        return bad_request(EMPTY_ARTIST_DETAIL);
    }

    let limit = state.engine.resolve_limit(params.limit());
    let started = Instant::now();
    let engine = state.engine.clone();
    let task_artist = artist_name.clone();
    let task =
        tokio::spawn(async move { engine.recommend_similar(&task_artist, limit).await });

    match task.await {
        Ok(response) => Json(response).into_response(),
        Err(err) => {
            error!("Similar-artist task for '{}' failed: {}", artist_name, err);
            let intent = SearchIntent::for_artist(&artist_name);
            Json(degraded_response(&intent, started, err.to_string())).into_response()
        }
    }
}

async fn get_profile_recommendations(
    State(state): State<ServerState>,
    Path(username): Path<String>,
    Query(params): Query<RecommendationParams>,
) -> Response {
    let profile = match state.profile_store.get_profile(&username) {
        Ok(Some(profile)) => profile,
        Ok(None) => return ProfileMessage::new(PROFILE_NOT_FOUND).into_response(),
        Err(err) => {
            error!("Failed to load profile of {}: {:#}", username, err);
            return ProfileMessage::new(PROFILE_UNAVAILABLE).into_response();
        }
    };
    if !profile.has_preferences() {
        return ProfileMessage::new(PROFILE_WITHOUT_PREFERENCES).into_response();
    }

    let limit = state.engine.resolve_limit(params.limit());
    let engine = state.engine.clone();
    let task = tokio::spawn(async move { engine.recommend_for_profile(&profile, limit).await });

    match task.await {
        Ok(response) => Json(response).into_response(),
        Err(err) => {
            error!("Profile recommendation task for {} failed: {}", username, err);
            ProfileMessage::new(RECOMMENDATIONS_UNAVAILABLE).into_response()
        }
    }
}

pub fn make_recommendation_routes(state: ServerState) -> Router {
    Router::new()
        .route("/query", get(get_query_recommendations))
        .route("/similar/{artist_name}", get(get_similar_recommendations))
        .route("/profile/{username}", get(get_profile_recommendations))
        .with_state(state)
}
