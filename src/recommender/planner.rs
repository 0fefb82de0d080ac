//! Strategy planning.
//!
//! Turns an intent (and optionally a stored profile) into the ordered list of
//! catalog searches to run. The only source of nondeterminism is the sampling
//! of curated genre artists, which goes through an injectable RNG.

use super::models::{Genre, SearchIntent, SearchStrategy, StrategyKind};
use super::taxonomy::Taxonomy;
use crate::profile_store::UserProfile;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::debug;

pub const FALLBACK_WEIGHT: f64 = 1.0;
pub const FAVORITE_ARTIST_WEIGHT: f64 = 0.95;
pub const PROFILE_GENRE_WEIGHT: f64 = 0.9;
pub const GENRE_ARTIST_WEIGHT: f64 = 0.85;
pub const ARTIST_MATCH_WEIGHT: f64 = 0.8;
pub const GENRE_TAG_WEIGHT: f64 = 0.75;
pub const MOOD_WEIGHT: f64 = 0.7;

pub const PROFILE_RECOMMENDATION_TYPE: &str = "profile_based";

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerSettings {
    /// Upper bound on strategies per plan, fallback included.
    pub max_strategies: usize,
    /// How many curated artists to sample for a detected genre.
    pub genre_artist_samples: usize,
    /// How many favorite genres of a profile are searched.
    pub max_profile_genres: usize,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            max_strategies: 6,
            genre_artist_samples: 3,
            max_profile_genres: 3,
        }
    }
}

pub struct StrategyPlanner {
    taxonomy: Arc<Taxonomy>,
    settings: PlannerSettings,
    rng: Mutex<StdRng>,
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', ""))
}

fn artist_query(name: &str) -> String {
    format!("artist:{}", quoted(name))
}

fn tag_query(tag: &str) -> String {
    format!("tag:{}", quoted(tag))
}

fn strategy(
    query: String,
    kind: StrategyKind,
    weight: f64,
    recommendation_type: String,
) -> SearchStrategy {
    SearchStrategy {
        query,
        kind,
        weight,
        recommendation_type,
    }
}

impl StrategyPlanner {
    pub fn new(taxonomy: Arc<Taxonomy>, settings: PlannerSettings) -> Self {
        Self::with_rng(taxonomy, settings, StdRng::from_os_rng())
    }

    /// A planner whose artist sampling is reproducible.
    pub fn with_seed(taxonomy: Arc<Taxonomy>, settings: PlannerSettings, seed: u64) -> Self {
        Self::with_rng(taxonomy, settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(taxonomy: Arc<Taxonomy>, settings: PlannerSettings, rng: StdRng) -> Self {
        Self {
            taxonomy,
            settings,
            rng: Mutex::new(rng),
        }
    }

    /// Plan the searches for a free-text (or artist) request.
    ///
    /// The result is weight-descending with unique queries, at most
    /// `max_strategies` long, and ends with the direct fallback on the raw
    /// query when there is one.
    pub fn plan(
        &self,
        intent: &SearchIntent,
        profile: Option<&UserProfile>,
    ) -> Vec<SearchStrategy> {
        let mut strategies = Vec::new();

        if let Some(profile) = profile {
            strategies.extend(self.profile_genre_strategies(profile));
            strategies.extend(self.favorite_artist_strategies(profile));
        }

        if let Some(genre) = intent.detected_genre {
            let label = genre.as_str();
            for artist in self.sample_genre_artists(genre) {
                strategies.push(strategy(
                    artist_query(&artist),
                    StrategyKind::GenreArtist,
                    GENRE_ARTIST_WEIGHT,
                    format!("diverse_genre_{}", label),
                ));
            }
            strategies.push(strategy(
                tag_query(label),
                StrategyKind::GenreTag,
                GENRE_TAG_WEIGHT,
                format!("diverse_tag_{}", label),
            ));
        }

        for mood in &intent.detected_moods {
            strategies.push(strategy(
                tag_query(mood.as_str()),
                StrategyKind::MoodSearch,
                MOOD_WEIGHT,
                format!("mood_{}", mood.as_str()),
            ));
        }

        for name in &intent.candidate_artist_names {
            strategies.push(strategy(
                artist_query(name),
                StrategyKind::ArtistMatch,
                ARTIST_MATCH_WEIGHT,
                "artist_match".to_string(),
            ));
        }

        let fallback = (!intent.raw_query.is_empty()).then(|| {
            strategy(
                intent.raw_query.clone(),
                StrategyKind::DirectFallback,
                FALLBACK_WEIGHT,
                "diverse_fallback".to_string(),
            )
        });

        let plan = self.finalize(strategies, fallback);
        debug!(
            "Planned {} strategies for '{}': {:?}",
            plan.len(),
            intent.raw_query,
            plan.iter().map(|s| s.query.as_str()).collect::<Vec<_>>()
        );
        plan
    }

    /// Plan one profile run: a single tag search for `genre`.
    pub fn plan_profile_genre(&self, genre: &str) -> Vec<SearchStrategy> {
        vec![strategy(
            tag_query(&genre.trim().to_lowercase()),
            StrategyKind::GenreTag,
            PROFILE_GENRE_WEIGHT,
            PROFILE_RECOMMENDATION_TYPE.to_string(),
        )]
    }

    /// Plan the profile run that fetches tracks of favorite artists.
    pub fn plan_profile_artists(&self, profile: &UserProfile) -> Vec<SearchStrategy> {
        self.finalize(self.favorite_artist_strategies(profile), None)
    }

    fn profile_genre_strategies(&self, profile: &UserProfile) -> Vec<SearchStrategy> {
        profile
            .favorite_genres
            .iter()
            .filter(|g| !g.trim().is_empty())
            .take(self.settings.max_profile_genres)
            .flat_map(|g| self.plan_profile_genre(g))
            .collect()
    }

    fn favorite_artist_strategies(&self, profile: &UserProfile) -> Vec<SearchStrategy> {
        profile
            .favorite_artist_ids
            .iter()
            .filter(|id| !id.trim().is_empty())
            .map(|id| {
                strategy(
                    format!("arid:{}", id.trim()),
                    StrategyKind::ArtistMatch,
                    FAVORITE_ARTIST_WEIGHT,
                    PROFILE_RECOMMENDATION_TYPE.to_string(),
                )
            })
            .collect()
    }

    fn sample_genre_artists(&self, genre: Genre) -> Vec<String> {
        let mut artists = self.taxonomy.genre_artists(genre).to_vec();
        {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            artists.shuffle(&mut *rng);
        }
        artists.truncate(self.settings.genre_artist_samples);
        artists
    }

    /// Sort by weight, drop repeated queries, cap, then append the fallback.
    fn finalize(
        &self,
        mut strategies: Vec<SearchStrategy>,
        fallback: Option<SearchStrategy>,
    ) -> Vec<SearchStrategy> {
        strategies.sort_by(|a, b| b.weight.total_cmp(&a.weight));

        let mut seen = HashSet::new();
        strategies.retain(|s| seen.insert(s.query.clone()));

        let max_strategies = self.settings.max_strategies.max(1);
        match fallback {
            Some(fallback) => {
                strategies.retain(|s| s.query != fallback.query);
                strategies.truncate(max_strategies - 1);
                strategies.push(fallback);
            }
            None => strategies.truncate(max_strategies),
        }
        strategies
    }
}
