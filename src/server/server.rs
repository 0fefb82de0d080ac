use anyhow::{Context, Result};
use std::time::Duration;

use axum::{
    extract::State,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::info;

use super::profiles::make_profile_routes;
use super::recommendations::make_recommendation_routes;
use super::{log_requests, state::*, ServerConfig};

const SERVICE_NAME: &str = "pezzottify-recommender";

const FEATURES: [&str; 5] = [
    "query_recommendations",
    "similar_artists",
    "profile_recommendations",
    "listening_history",
    "artist_diversity",
];

#[derive(Serialize)]
struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub hash: String,
    pub uptime: String,
    pub features: &'static [&'static str],
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn health(State(state): State<ServerState>) -> impl IntoResponse {
    Json(HealthStatus {
        status: "healthy",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        hash: state.hash.clone(),
        uptime: format_uptime(state.start_time.elapsed()),
        features: &FEATURES,
    })
}

pub fn make_app(
    config: ServerConfig,
    engine: GuardedEngine,
    profile_store: GuardedProfileStore,
    hash: String,
) -> Router {
    let state = ServerState::new(config, engine, profile_store, hash);

    let home_router: Router = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .with_state(state.clone());

    home_router
        .nest("/recommendations", make_recommendation_routes(state.clone()))
        .nest("/users", make_profile_routes(state.clone()))
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(
    config: ServerConfig,
    engine: GuardedEngine,
    profile_store: GuardedProfileStore,
    hash: String,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, engine, profile_store, hash);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Recommendation server listening on port {}", port);

    axum::serve(listener, app)
        .await
        .context("Recommendation server stopped unexpectedly")
}
