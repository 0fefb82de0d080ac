use super::assembler::{assemble, dedupe, RunSummary};
use super::diversity::{diversify, unique_artist_count};
use super::intent::extract;
use super::models::{
    Genre, RecommendationResponse, ScoredRecommendation, SearchIntent, SearchStrategy,
    ALGORITHM_VERSION,
};
use super::orchestrator::{OrchestratorSettings, SearchOrchestrator, SearchOutcome};
use super::planner::{PlannerSettings, StrategyPlanner};
use super::scorer::RelevanceScorer;
use super::taxonomy::Taxonomy;
use crate::catalog_client::CatalogClient;
use crate::profile_store::UserProfile;
use futures::future::{join, join_all};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Catalogs refuse larger pages, and tiny pages starve the scorer.
const PER_STRATEGY_LIMIT_RANGE: (usize, usize) = (10, 25);

#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub request_deadline: Duration,
    pub strategy_timeout: Duration,
    pub per_strategy_limit: usize,
    pub max_strategies: usize,
    pub max_in_flight: usize,
    pub genre_artist_samples: usize,
    pub default_limit: usize,
    pub max_limit: usize,
    pub max_profile_genres: usize,
    /// Fixed seed for curated-artist sampling.
    pub seed: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            request_deadline: Duration::from_millis(8000),
            strategy_timeout: Duration::from_millis(5000),
            per_strategy_limit: 15,
            max_strategies: 6,
            max_in_flight: 3,
            genre_artist_samples: 3,
            default_limit: 10,
            max_limit: 20,
            max_profile_genres: 3,
            seed: None,
        }
    }
}

impl EngineSettings {
    fn orchestrator_settings(&self) -> OrchestratorSettings {
        let (min_limit, max_limit) = PER_STRATEGY_LIMIT_RANGE;
        OrchestratorSettings {
            deadline: self.request_deadline,
            strategy_timeout: self.strategy_timeout.min(self.request_deadline),
            per_strategy_limit: self.per_strategy_limit.clamp(min_limit, max_limit),
            max_in_flight: self.max_in_flight,
        }
    }

    fn planner_settings(&self) -> PlannerSettings {
        PlannerSettings {
            max_strategies: self.max_strategies,
            genre_artist_samples: self.genre_artist_samples,
            max_profile_genres: self.max_profile_genres,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileAnalysis {
    pub favorite_genres: Vec<String>,
    pub genres_used: Vec<String>,
    /// Recommendations produced across all runs, before merging.
    pub total_matches: usize,
    pub unique_results: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileRecommendations {
    pub recommendations: Vec<ScoredRecommendation>,
    pub profile_analysis: ProfileAnalysis,
    pub algorithm_version: &'static str,
}

/// The recommendation pipeline: plan, search, score, diversify, assemble.
///
/// Holds no per-request state; one instance serves all requests.
pub struct RecommendationEngine {
    taxonomy: Arc<Taxonomy>,
    planner: StrategyPlanner,
    orchestrator: SearchOrchestrator,
    scorer: RelevanceScorer,
    settings: EngineSettings,
}

impl RecommendationEngine {
    pub fn new(catalog: Arc<dyn CatalogClient>, settings: EngineSettings) -> Self {
        Self::with_taxonomy(catalog, Arc::new(Taxonomy::standard()), settings)
    }

    pub fn with_taxonomy(
        catalog: Arc<dyn CatalogClient>,
        taxonomy: Arc<Taxonomy>,
        settings: EngineSettings,
    ) -> Self {
        let planner = match settings.seed {
            Some(seed) => {
                StrategyPlanner::with_seed(taxonomy.clone(), settings.planner_settings(), seed)
            }
            None => StrategyPlanner::new(taxonomy.clone(), settings.planner_settings()),
        };
        Self {
            orchestrator: SearchOrchestrator::new(catalog, settings.orchestrator_settings()),
            scorer: RelevanceScorer::new(taxonomy.clone()),
            planner,
            taxonomy,
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Requested limits outside `1..=max_limit` fall back to the default.
    pub fn resolve_limit(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(limit) if (1..=self.settings.max_limit).contains(&limit) => limit,
            _ => self.settings.default_limit,
        }
    }

    pub fn analyze(&self, query: &str) -> SearchIntent {
        extract(&self.taxonomy, query)
    }

    pub async fn recommend_for_query(
        &self,
        query: &str,
        limit: usize,
        profile: Option<&UserProfile>,
    ) -> RecommendationResponse {
        let intent = self.analyze(query);
        debug!(
            "Query '{}': genre={:?} moods={:?} artists={:?} keywords={:?}",
            intent.raw_query,
            intent.detected_genre,
            intent.detected_moods,
            intent.candidate_artist_names,
            intent.keywords
        );
        let strategies = self.planner.plan(&intent, profile);
        self.run(&intent, &strategies, limit, profile).await
    }

    pub async fn recommend_similar(
        &self,
        artist_name: &str,
        limit: usize,
    ) -> RecommendationResponse {
        let intent = SearchIntent::for_artist(artist_name);
        let strategies = self.planner.plan(&intent, None);
        self.run(&intent, &strategies, limit, None).await
    }

    /// One run per favorite genre (bounded) plus one for favorite artists,
    /// merged into a single list. The runs share the request deadline.
    pub async fn recommend_for_profile(
        &self,
        profile: &UserProfile,
        limit: usize,
    ) -> ProfileRecommendations {
        let genres_used: Vec<String> = profile
            .favorite_genres
            .iter()
            .filter(|g| !g.trim().is_empty())
            .take(self.settings.max_profile_genres)
            .cloned()
            .collect();

        let genre_runs: Vec<(SearchIntent, Vec<SearchStrategy>)> = genres_used
            .iter()
            .map(|genre| {
                (
                    profile_genre_intent(genre),
                    self.planner.plan_profile_genre(genre),
                )
            })
            .collect();
        let per_genre_limit = limit / genres_used.len().max(1) + 2;
        let artist_strategies = self.planner.plan_profile_artists(profile);

        info!(
            "Profile run for {}: {} genre runs over {:?}, {} favorite artists",
            profile.username,
            genre_runs.len(),
            genres_used,
            artist_strategies.len()
        );

        let genre_responses = join_all(genre_runs.iter().map(|(intent, strategies)| {
            self.run(intent, strategies, per_genre_limit, Some(profile))
        }));
        let artist_response = async {
            if artist_strategies.is_empty() {
                None
            } else {
                Some(
                    self.run_favorite_artists(profile, &artist_strategies, limit)
                        .await,
                )
            }
        };
        let (genre_responses, artist_response) = join(genre_responses, artist_response).await;

        let all: Vec<ScoredRecommendation> = genre_responses
            .into_iter()
            .chain(artist_response)
            .flat_map(|r| r.recommendations)
            .collect();
        let total_matches = all.len();

        let mut recommendations = dedupe(all);
        recommendations.sort_by(|a, b| b.score.cmp(&a.score));
        recommendations.truncate(limit);

        info!(
            "Generated {} profile-based recommendations for {}",
            recommendations.len(),
            profile.username
        );

        ProfileRecommendations {
            profile_analysis: ProfileAnalysis {
                favorite_genres: profile.favorite_genres.clone(),
                genres_used,
                total_matches,
                unique_results: recommendations.len(),
            },
            recommendations,
            algorithm_version: ALGORITHM_VERSION,
        }
    }

    async fn run(
        &self,
        intent: &SearchIntent,
        strategies: &[SearchStrategy],
        limit: usize,
        profile: Option<&UserProfile>,
    ) -> RecommendationResponse {
        let started = Instant::now();
        let outcome = self
            .orchestrator
            .execute(strategies, limit.saturating_mul(2))
            .await;
        self.rank(intent, outcome, limit, profile, started)
    }

    /// Favorite artists are stored by id, so their names are only known once
    /// their tracks come back. Those names become the intent the run is scored
    /// against.
    async fn run_favorite_artists(
        &self,
        profile: &UserProfile,
        strategies: &[SearchStrategy],
        limit: usize,
    ) -> RecommendationResponse {
        let started = Instant::now();
        let outcome = self
            .orchestrator
            .execute(strategies, limit.saturating_mul(2))
            .await;
        let intent = favorite_artist_intent(profile, &outcome);
        debug!(
            "Resolved favorite artists of {}: {:?}",
            profile.username, intent.candidate_artist_names
        );
        self.rank(&intent, outcome, limit, Some(profile), started)
    }

    fn rank(
        &self,
        intent: &SearchIntent,
        outcome: SearchOutcome,
        limit: usize,
        profile: Option<&UserProfile>,
        started: Instant,
    ) -> RecommendationResponse {
        let mut scored = Vec::with_capacity(outcome.candidate_count());
        for result in &outcome.results {
            for candidate in &result.candidates {
                if !candidate.is_well_formed() {
                    debug!("Skipping malformed candidate {:?}", candidate.track_id);
                    continue;
                }
                scored.push(ScoredRecommendation {
                    track_id: candidate.track_id.clone(),
                    track_title: candidate.track_title.clone(),
                    artist_id: candidate.artist_id.clone(),
                    artist_name: candidate.artist_name.clone(),
                    score: self
                        .scorer
                        .score(candidate, intent, result.strategy.weight, profile),
                    recommendation_type: result.strategy.recommendation_type.clone(),
                    strategy: result.strategy.kind,
                });
            }
        }

        let unique = dedupe(scored);
        let unique_count = unique.len();
        let diverse = diversify(unique, limit);
        info!(
            "Diversity filter kept {} of {} tracks ({} artists)",
            diverse.len(),
            unique_count,
            unique_artist_count(&diverse)
        );

        let error = if diverse.is_empty() && (!outcome.failures.is_empty() || outcome.timed_out) {
            Some(format!(
                "No candidates found: {} of {} strategies failed{}",
                outcome.failures.len(),
                outcome.executed.len(),
                if outcome.timed_out {
                    ", search deadline exceeded"
                } else {
                    ""
                }
            ))
        } else {
            None
        };

        let response = assemble(
            diverse,
            limit,
            intent,
            RunSummary {
                elapsed: started.elapsed(),
                strategies_executed: outcome.executed,
                partial: outcome.timed_out,
                error,
            },
        );

        let analysis = &response.query_analyzed;
        info!(
            "Recommendations for '{}': {} tracks, {} unique artists, {} ms{}",
            intent.raw_query,
            analysis.total_tracks,
            analysis.unique_artists,
            analysis.elapsed_ms,
            if analysis.partial { " (partial)" } else { "" }
        );
        response
    }
}

fn favorite_artist_intent(profile: &UserProfile, outcome: &SearchOutcome) -> SearchIntent {
    let mut names: Vec<String> = Vec::new();
    for candidate in outcome.results.iter().flat_map(|r| &r.candidates) {
        if !profile.favorite_artist_ids.contains(&candidate.artist_id) {
            continue;
        }
        let name = candidate.artist_name.trim().to_lowercase();
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    SearchIntent {
        candidate_artist_names: names,
        ..SearchIntent::empty()
    }
}

fn profile_genre_intent(genre: &str) -> SearchIntent {
    match Genre::from_name(genre) {
        Some(genre) => SearchIntent::for_genre(genre),
        None => SearchIntent {
            keywords: vec![genre.trim().to_lowercase()],
            ..SearchIntent::empty()
        },
    }
}
