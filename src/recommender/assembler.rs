//! Final result assembly and query analysis.

use super::diversity::unique_artist_count;
use super::models::{
    QueryAnalysis, RecommendationResponse, ScoredRecommendation, SearchIntent, StrategyKind,
    ALGORITHM_VERSION,
};
use std::collections::HashMap;
use std::time::Duration;

/// Facts about the run that produced a result set.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub elapsed: Duration,
    pub strategies_executed: Vec<String>,
    pub partial: bool,
    pub error: Option<String>,
}

/// Keep one entry per track id, the highest scored one. Output order is the
/// order in which track ids were first seen.
pub fn dedupe(scored: Vec<ScoredRecommendation>) -> Vec<ScoredRecommendation> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<ScoredRecommendation> = Vec::with_capacity(scored.len());

    for rec in scored {
        match index.get(&rec.track_id) {
            Some(&i) => {
                if rec.score > unique[i].score {
                    unique[i] = rec;
                }
            }
            None => {
                index.insert(rec.track_id.clone(), unique.len());
                unique.push(rec);
            }
        }
    }
    unique
}

/// Dedupe, sort by score, truncate to `limit`, and attach the analysis.
pub fn assemble(
    recommendations: Vec<ScoredRecommendation>,
    limit: usize,
    intent: &SearchIntent,
    summary: RunSummary,
) -> RecommendationResponse {
    let mut recommendations = dedupe(recommendations);
    recommendations.sort_by(|a, b| b.score.cmp(&a.score));
    recommendations.truncate(limit);

    let unique_artists = unique_artist_count(&recommendations);
    let total_tracks = recommendations.len();
    let diversity_ratio = if total_tracks == 0 {
        0.0
    } else {
        unique_artists as f64 / total_tracks as f64
    };

    RecommendationResponse {
        query_analyzed: QueryAnalysis {
            detected_genre: intent.detected_genre,
            detected_moods: intent.detected_moods.clone(),
            candidate_artists: intent.candidate_artist_names.clone(),
            unique_artists,
            total_tracks,
            diversity_ratio,
            elapsed_ms: summary.elapsed.as_millis() as u64,
            strategy_used: dominant_strategy(&recommendations)
                .map(|k| k.as_str().to_string())
                .unwrap_or_else(|| "none".to_string()),
            strategies_executed: summary.strategies_executed,
            partial: summary.partial,
            error: summary.error,
        },
        recommendations,
        algorithm_version: ALGORITHM_VERSION,
    }
}

/// The strategy family behind most of `recs`; ties go to the family whose
/// first result ranks higher.
fn dominant_strategy(recs: &[ScoredRecommendation]) -> Option<StrategyKind> {
    let mut counts: Vec<(StrategyKind, usize)> = Vec::new();
    for rec in recs {
        match counts.iter_mut().find(|(kind, _)| *kind == rec.strategy) {
            Some((_, count)) => *count += 1,
            None => counts.push((rec.strategy, 1)),
        }
    }
    counts
        .into_iter()
        .rev()
        .max_by_key(|(_, count)| *count)
        .map(|(kind, _)| kind)
}
