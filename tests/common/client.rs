//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per recommendation-server endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    pub async fn health(&self) -> Response {
        self.client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .expect("Health request failed")
    }

    // ========================================================================
    // Recommendation Endpoints
    // ========================================================================

    /// GET /recommendations/query
    pub async fn recommend(&self, query: &str, limit: Option<usize>) -> Response {
        let mut params = vec![("query", query.to_string())];
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }
        self.client
            .get(format!("{}/recommendations/query", self.base_url))
            .query(&params)
            .send()
            .await
            .expect("Query recommendation request failed")
    }

    /// GET /recommendations/query with a username
    pub async fn recommend_for_user(&self, query: &str, username: &str) -> Response {
        self.client
            .get(format!("{}/recommendations/query", self.base_url))
            .query(&[("query", query), ("username", username)])
            .send()
            .await
            .expect("Query recommendation request failed")
    }

    /// GET /recommendations/similar/{artist_name}
    pub async fn similar(&self, artist_name: &str, limit: Option<usize>) -> Response {
        let mut request = self.client.get(format!(
            "{}/recommendations/similar/{}",
            self.base_url,
            urlencoding::encode(artist_name)
        ));
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        request
            .send()
            .await
            .expect("Similar recommendation request failed")
    }

    /// GET /recommendations/profile/{username}
    pub async fn profile_recommendations(&self, username: &str, limit: Option<usize>) -> Response {
        let mut request = self
            .client
            .get(format!("{}/recommendations/profile/{}", self.base_url, username));
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        request
            .send()
            .await
            .expect("Profile recommendation request failed")
    }

    // ========================================================================
    // Profile Endpoints
    // ========================================================================

    /// POST /users/{username}/profile
    pub async fn save_profile(
        &self,
        username: &str,
        genres: &[&str],
        artists: &[&str],
    ) -> Response {
        self.client
            .post(format!("{}/users/{}/profile", self.base_url, username))
            .json(&json!({
                "favorite_genres": genres,
                "favorite_artists": artists,
            }))
            .send()
            .await
            .expect("Save profile request failed")
    }

    /// GET /users/{username}/profile
    pub async fn get_profile(&self, username: &str) -> Response {
        self.client
            .get(format!("{}/users/{}/profile", self.base_url, username))
            .send()
            .await
            .expect("Get profile request failed")
    }

    /// POST /users/{username}/listening-history
    pub async fn record_listening(
        &self,
        username: &str,
        track_id: &str,
        artist_id: &str,
        interaction_type: Option<&str>,
    ) -> Response {
        let mut params = vec![("track_id", track_id), ("artist_id", artist_id)];
        if let Some(interaction_type) = interaction_type {
            params.push(("interaction_type", interaction_type));
        }
        self.client
            .post(format!(
                "{}/users/{}/listening-history",
                self.base_url, username
            ))
            .query(&params)
            .send()
            .await
            .expect("Listening history request failed")
    }
}
