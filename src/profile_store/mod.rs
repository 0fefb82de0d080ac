//! User taste profiles.
//!
//! The recommendation engine only reads profiles; writes come from the
//! profile management routes.

mod models;
mod schema;
mod sqlite_profile_store;

pub use models::*;
pub use schema::PROFILE_VERSIONED_SCHEMAS;
pub use sqlite_profile_store::SqliteProfileStore;

use anyhow::Result;

pub trait ProfileStore: Send + Sync {
    fn get_profile(&self, username: &str) -> Result<Option<UserProfile>>;

    /// Create or replace the favorites of `username`.
    fn save_profile(
        &self,
        username: &str,
        favorite_genres: &[String],
        favorite_artist_ids: &[String],
    ) -> Result<UserProfile>;

    /// Append a listening event, creating an empty profile if needed.
    fn add_listening_event(
        &self,
        username: &str,
        track_id: &str,
        artist_id: &str,
        interaction: InteractionType,
    ) -> Result<ListeningEvent>;

    fn count_listening_events(
        &self,
        username: &str,
        track_id: &str,
        interaction: InteractionType,
    ) -> Result<usize>;
}
