//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{hip_hop_tracks, ScriptedCatalog, TestClient, TestServer};
//! use reqwest::StatusCode;
//! use std::sync::Arc;
//!
//! #[tokio::test]
//! async fn test_recommend() {
//!     let catalog = Arc::new(ScriptedCatalog::returning(hip_hop_tracks()));
//!     let server = TestServer::spawn_with(catalog).await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.recommend("old school rap", None).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod client;
mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
pub use client::TestClient;
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{hip_hop_tracks, jazz_tracks, ScriptedCatalog};
pub use server::TestServer;
