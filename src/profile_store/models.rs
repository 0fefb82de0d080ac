use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub username: String,
    pub favorite_genres: Vec<String>,
    #[serde(rename = "favorite_artists")]
    pub favorite_artist_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// A profile that exists only in memory, e.g. for a user who never saved one.
    pub fn empty(username: &str) -> Self {
        Self {
            username: username.to_string(),
            favorite_genres: vec![],
            favorite_artist_ids: vec![],
            created_at: None,
            updated_at: None,
        }
    }

    pub fn has_preferences(&self) -> bool {
        !self.favorite_genres.is_empty() || !self.favorite_artist_ids.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    #[default]
    Played,
    Liked,
    Saved,
    Skipped,
}

impl InteractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::Played => "played",
            InteractionType::Liked => "liked",
            InteractionType::Saved => "saved",
            InteractionType::Skipped => "skipped",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "played" => Some(InteractionType::Played),
            "liked" => Some(InteractionType::Liked),
            "saved" => Some(InteractionType::Saved),
            "skipped" => Some(InteractionType::Skipped),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListeningEvent {
    pub id: i64,
    pub username: String,
    pub track_id: String,
    pub artist_id: String,
    pub interaction_type: InteractionType,
    pub played_at: DateTime<Utc>,
}
