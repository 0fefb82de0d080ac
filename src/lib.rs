//! Pezzottify Recommendation Server Library
//!
//! Exposes the recommendation engine, its catalog and profile seams and the
//! HTTP server for the binary and for end-to-end tests.

pub mod catalog_client;
pub mod config;
pub mod profile_store;
pub mod recommender;
pub mod server;

// Re-export commonly used types for convenience
pub use catalog_client::{Candidate, CatalogClient, CatalogError, MusicBrainzClient};
pub use profile_store::{ProfileStore, SqliteProfileStore, UserProfile};
pub use recommender::{EngineSettings, RecommendationEngine};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
