//! Artist diversity filtering.

use super::models::ScoredRecommendation;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_MAX_PER_ARTIST: usize = 1;
pub const ESCALATED_MAX_PER_ARTIST: usize = 2;

/// Sort by score descending and keep at most `max_per_artist` tracks per
/// artist name (case-insensitive). Ties keep their input order.
pub fn filter(
    scored: Vec<ScoredRecommendation>,
    max_per_artist: usize,
) -> Vec<ScoredRecommendation> {
    let mut sorted = scored;
    sort_by_score(&mut sorted);

    let mut per_artist: HashMap<String, usize> = HashMap::new();
    sorted
        .into_iter()
        .filter(|rec| {
            let count = per_artist
                .entry(rec.artist_name.trim().to_lowercase())
                .or_insert(0);
            if *count < max_per_artist {
                *count += 1;
                true
            } else {
                false
            }
        })
        .collect()
}

/// One-per-artist filtering, redone once at two-per-artist when that leaves
/// fewer than `limit` tracks and more were available.
///
/// The escalated pass replaces the strict one and may exceed `limit`; the
/// assembler truncates by score. If even that stays under `limit`, fewer
/// tracks are returned.
pub fn diversify(scored: Vec<ScoredRecommendation>, limit: usize) -> Vec<ScoredRecommendation> {
    let available = scored.len();
    let strict = filter(scored.clone(), DEFAULT_MAX_PER_ARTIST);
    if strict.len() >= limit || available <= strict.len() {
        return strict;
    }
    filter(scored, ESCALATED_MAX_PER_ARTIST)
}

fn sort_by_score(recs: &mut [ScoredRecommendation]) {
    recs.sort_by(|a, b| b.score.cmp(&a.score));
}

pub fn unique_artist_count(recs: &[ScoredRecommendation]) -> usize {
    recs.iter()
        .map(|r| r.artist_name.trim().to_lowercase())
        .collect::<HashSet<_>>()
        .len()
}
