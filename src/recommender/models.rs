use serde::{Deserialize, Serialize};

/// Version tag reported with every recommendation response.
pub const ALGORITHM_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "_diverse");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    #[serde(rename = "hip-hop")]
    HipHop,
    #[serde(rename = "rock")]
    Rock,
    #[serde(rename = "jazz")]
    Jazz,
    #[serde(rename = "pop")]
    Pop,
    #[serde(rename = "electronic")]
    Electronic,
    #[serde(rename = "country")]
    Country,
    #[serde(rename = "reggae")]
    Reggae,
    #[serde(rename = "blues")]
    Blues,
    #[serde(rename = "r&b")]
    RnB,
    #[serde(rename = "metal")]
    Metal,
}

impl Genre {
    /// All genres in detection priority order.
    pub const ALL: [Genre; 10] = [
        Genre::HipHop,
        Genre::Rock,
        Genre::Jazz,
        Genre::Pop,
        Genre::Electronic,
        Genre::Country,
        Genre::Reggae,
        Genre::Blues,
        Genre::RnB,
        Genre::Metal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::HipHop => "hip-hop",
            Genre::Rock => "rock",
            Genre::Jazz => "jazz",
            Genre::Pop => "pop",
            Genre::Electronic => "electronic",
            Genre::Country => "country",
            Genre::Reggae => "reggae",
            Genre::Blues => "blues",
            Genre::RnB => "r&b",
            Genre::Metal => "metal",
        }
    }

    /// Parse a canonical genre name, as stored in user profiles.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|g| g.as_str() == name)
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Upbeat,
    Relaxing,
    Sad,
    Aggressive,
    Romantic,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Upbeat => "upbeat",
            Mood::Relaxing => "relaxing",
            Mood::Sad => "sad",
            Mood::Aggressive => "aggressive",
            Mood::Romantic => "romantic",
        }
    }
}

/// Structured interpretation of a free-text query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchIntent {
    pub raw_query: String,
    pub keywords: Vec<String>,
    pub detected_genre: Option<Genre>,
    pub detected_moods: Vec<Mood>,
    pub candidate_artist_names: Vec<String>,
}

impl SearchIntent {
    /// Intent for "more like this artist": the name is both the query and the
    /// only candidate artist.
    pub fn for_artist(artist_name: &str) -> Self {
        let name = artist_name.trim().to_lowercase();
        Self {
            raw_query: artist_name.trim().to_string(),
            keywords: name.split_whitespace().map(str::to_string).collect(),
            detected_genre: None,
            detected_moods: vec![],
            candidate_artist_names: if name.is_empty() { vec![] } else { vec![name] },
        }
    }

    /// Intent for one favorite genre of a profile. There is no raw query, so no
    /// fallback search is planned from it.
    pub fn for_genre(genre: Genre) -> Self {
        Self {
            raw_query: String::new(),
            keywords: vec![genre.as_str().to_string()],
            detected_genre: Some(genre),
            detected_moods: vec![],
            candidate_artist_names: vec![],
        }
    }

    /// Intent with no query content at all, used for artist-only profile runs.
    pub fn empty() -> Self {
        Self {
            raw_query: String::new(),
            keywords: vec![],
            detected_genre: None,
            detected_moods: vec![],
            candidate_artist_names: vec![],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    GenreArtist,
    GenreTag,
    MoodSearch,
    ArtistMatch,
    DirectFallback,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::GenreArtist => "genre_artist",
            StrategyKind::GenreTag => "genre_tag",
            StrategyKind::MoodSearch => "mood_search",
            StrategyKind::ArtistMatch => "artist_match",
            StrategyKind::DirectFallback => "direct_fallback",
        }
    }
}

/// One independent catalog search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchStrategy {
    pub query: String,
    pub kind: StrategyKind,
    /// In (0, 1]; multiplies the relevance score of every candidate it yields.
    pub weight: f64,
    /// Label reported as `recommendation_type` on results from this search.
    pub recommendation_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredRecommendation {
    pub track_id: String,
    pub track_title: String,
    pub artist_id: String,
    pub artist_name: String,
    pub score: u8,
    pub recommendation_type: String,
    pub strategy: StrategyKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryAnalysis {
    pub detected_genre: Option<Genre>,
    pub detected_moods: Vec<Mood>,
    pub candidate_artists: Vec<String>,
    pub unique_artists: usize,
    pub total_tracks: usize,
    pub diversity_ratio: f64,
    pub elapsed_ms: u64,
    /// Strategy family that contributed the most results, or "none".
    pub strategy_used: String,
    pub strategies_executed: Vec<String>,
    /// Set when the deadline cut the fan-out short.
    pub partial: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryAnalysis {
    /// Analysis for a request that produced nothing because of `error`.
    pub fn failed(intent: &SearchIntent, elapsed_ms: u64, error: String) -> Self {
        Self {
            detected_genre: intent.detected_genre,
            detected_moods: intent.detected_moods.clone(),
            candidate_artists: intent.candidate_artist_names.clone(),
            unique_artists: 0,
            total_tracks: 0,
            diversity_ratio: 0.0,
            elapsed_ms,
            strategy_used: "none".to_string(),
            strategies_executed: vec![],
            partial: false,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<ScoredRecommendation>,
    pub query_analyzed: QueryAnalysis,
    pub algorithm_version: &'static str,
}
