//! Profile management routes

use crate::profile_store::{InteractionType, ListeningEvent, UserProfile};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use super::state::{GuardedProfileStore, ServerState};

#[derive(Deserialize, Debug)]
struct ProfileBody {
    #[serde(default)]
    pub favorite_genres: Vec<String>,
    #[serde(default)]
    pub favorite_artists: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct ListeningEventParams {
    pub track_id: Option<String>,
    pub artist_id: Option<String>,
    pub interaction_type: Option<String>,
}

#[derive(Serialize, Debug)]
struct ListeningEventResponse {
    message: &'static str,
    username: String,
    event: ListeningEvent,
    /// Events stored for this track and interaction, the new one included.
    verification_count: usize,
}

fn bad_request(detail: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
}

/// Trimmed, non-empty, first occurrence wins.
fn clean_list(values: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim();
        if !value.is_empty() && !cleaned.iter().any(|v| v == value) {
            cleaned.push(value.to_string());
        }
    }
    cleaned
}

fn required_param(value: Option<String>, name: &str) -> Result<String, Response> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(bad_request(format!("{} is required", name))),
    }
}

async fn post_profile(
    State(profile_store): State<GuardedProfileStore>,
    Path(username): Path<String>,
    Json(body): Json<ProfileBody>,
) -> Response {
    let genres = clean_list(body.favorite_genres);
    let artists = clean_list(body.favorite_artists);

    match profile_store.save_profile(&username, &genres, &artists) {
        Ok(profile) => {
            info!(
                "Saved profile of {} ({} genres, {} artists)",
                username,
                profile.favorite_genres.len(),
                profile.favorite_artist_ids.len()
            );
            Json(profile).into_response()
        }
        Err(err) => {
            error!("Failed to save profile of {}: {:#}", username, err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn get_profile(
    State(profile_store): State<GuardedProfileStore>,
    Path(username): Path<String>,
) -> Response {
    match profile_store.get_profile(&username) {
        Ok(Some(profile)) => Json(profile).into_response(),
        Ok(None) => Json(UserProfile::empty(&username)).into_response(),
        Err(err) => {
            error!("Failed to load profile of {}: {:#}", username, err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn post_listening_event(
    State(profile_store): State<GuardedProfileStore>,
    Path(username): Path<String>,
    Query(params): Query<ListeningEventParams>,
) -> Response {
    let track_id = match required_param(params.track_id, "track_id") {
        Ok(v) => v,
        Err(response) => return response,
    };
    let artist_id = match required_param(params.artist_id, "artist_id") {
        Ok(v) => v,
        Err(response) => return response,
    };
    let interaction = match params.interaction_type.as_deref() {
        None => InteractionType::default(),
        Some(raw) => match InteractionType::parse(raw) {
            Some(interaction) => interaction,
            None => return bad_request(format!("Unknown interaction_type: {}", raw)),
        },
    };

    let event =
        match profile_store.add_listening_event(&username, &track_id, &artist_id, interaction) {
            Ok(event) => event,
            Err(err) => {
                error!("Failed to record listening event for {}: {:#}", username, err);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

    let verification_count =
        match profile_store.count_listening_events(&username, &track_id, interaction) {
            Ok(count) => count,
            Err(err) => {
                error!("Failed to count listening events for {}: {:#}", username, err);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

    Json(ListeningEventResponse {
        message: "Listening event recorded",
        username,
        event,
        verification_count,
    })
    .into_response()
}

pub fn make_profile_routes(state: ServerState) -> Router {
    Router::new()
        .route("/{username}/profile", post(post_profile))
        .route("/{username}/profile", get(get_profile))
        .route("/{username}/listening-history", post(post_listening_event))
        .with_state(state)
}
