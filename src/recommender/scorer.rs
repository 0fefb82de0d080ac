//! Relevance scoring.
//!
//! The score of a candidate is a weighted sum of independently capped
//! sub-scores, scaled by the weight of the strategy that found it. It depends
//! only on its inputs, so the same candidate always scores the same for the
//! same request.

use super::models::{Genre, SearchIntent};
use super::taxonomy::Taxonomy;
use crate::catalog_client::Candidate;
use crate::profile_store::UserProfile;
use std::sync::Arc;

const TITLE_CAP: u32 = 25;
const TITLE_EXACT_POINTS: u32 = 15;
const TITLE_PARTIAL_POINTS: u32 = 10;

const ARTIST_CAP: u32 = 30;
const ARTIST_LONG_KEYWORD_POINTS: u32 = 20;
const ARTIST_SHORT_KEYWORD_POINTS: u32 = 10;
const ARTIST_NAME_MATCH_POINTS: u32 = 25;

const GENRE_CAP: u32 = 25;
const GENRE_TAG_POINTS: u32 = 20;
const GENRE_TEXT_POINTS: u32 = 15;

const MOOD_CAP: u32 = 10;
const MOOD_TEXT_POINTS: u32 = 8;
const MOOD_TAG_POINTS: u32 = 5;

const PROFILE_CAP: u32 = 10;
const PROFILE_GENRE_POINTS: u32 = 5;
const PROFILE_ARTIST_POINTS: u32 = 15;

const NO_MATCH_PENALTY: u32 = 20;

/// Capped sub-scores of one candidate, before strategy weighting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub title: u32,
    pub artist: u32,
    pub genre: u32,
    pub mood: u32,
    pub profile: u32,
    pub penalty: u32,
}

impl ScoreBreakdown {
    pub fn raw(&self) -> u32 {
        (self.title + self.artist + self.genre + self.mood + self.profile)
            .saturating_sub(self.penalty)
    }
}

pub struct RelevanceScorer {
    taxonomy: Arc<Taxonomy>,
}

impl RelevanceScorer {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self { taxonomy }
    }

    /// Final 0..=100 score of `candidate` found by a strategy of `weight`.
    pub fn score(
        &self,
        candidate: &Candidate,
        intent: &SearchIntent,
        weight: f64,
        profile: Option<&UserProfile>,
    ) -> u8 {
        let raw = self.breakdown(candidate, intent, profile).raw();
        (raw as f64 * weight).round().clamp(0.0, 100.0) as u8
    }

    pub fn breakdown(
        &self,
        candidate: &Candidate,
        intent: &SearchIntent,
        profile: Option<&UserProfile>,
    ) -> ScoreBreakdown {
        let title = candidate.track_title.to_lowercase();
        let artist = candidate.artist_name.to_lowercase();

        let mut breakdown = ScoreBreakdown {
            title: title_score(&title, &intent.keywords),
            artist: artist_score(&artist, intent),
            genre: intent
                .detected_genre
                .map(|g| self.genre_score(g, &title, &artist, &candidate.tags))
                .unwrap_or(0),
            mood: self.mood_score(intent, &title, &artist, &candidate.tags),
            profile: profile
                .map(|p| self.profile_score(p, candidate))
                .unwrap_or(0),
            penalty: 0,
        };

        if breakdown.title == 0 && breakdown.artist == 0 && breakdown.genre == 0 {
            breakdown.penalty = NO_MATCH_PENALTY;
        }
        breakdown
    }

    fn genre_score(&self, genre: Genre, title: &str, artist: &str, tags: &[String]) -> u32 {
        let keywords = self.taxonomy.genre_keywords(genre);
        let mut score = 0;
        if self.taxonomy.tags_match_genre(tags, genre) {
            score += GENRE_TAG_POINTS;
        }
        if keywords
            .iter()
            .any(|k| title.contains(k.as_str()) || artist.contains(k.as_str()))
        {
            score += GENRE_TEXT_POINTS;
        }
        score.min(GENRE_CAP)
    }

    fn mood_score(&self, intent: &SearchIntent, title: &str, artist: &str, tags: &[String]) -> u32 {
        let mut score = 0;
        for mood in &intent.detected_moods {
            for keyword in self.taxonomy.mood_keywords(*mood) {
                if title.contains(keyword.as_str()) || artist.contains(keyword.as_str()) {
                    score += MOOD_TEXT_POINTS;
                }
                if tags
                    .iter()
                    .any(|t| t.to_lowercase().contains(keyword.as_str()))
                {
                    score += MOOD_TAG_POINTS;
                }
            }
        }
        score.min(MOOD_CAP)
    }

    fn profile_score(&self, profile: &UserProfile, candidate: &Candidate) -> u32 {
        let mut score = 0;
        for favorite in &profile.favorite_genres {
            let matches = match Genre::from_name(favorite) {
                Some(genre) => self.taxonomy.tags_match_genre(&candidate.tags, genre),
                None => {
                    let favorite = favorite.trim().to_lowercase();
                    !favorite.is_empty()
                        && candidate
                            .tags
                            .iter()
                            .any(|t| t.to_lowercase().contains(&favorite))
                }
            };
            if matches {
                score += PROFILE_GENRE_POINTS;
            }
        }
        if !candidate.artist_id.is_empty()
            && profile.favorite_artist_ids.contains(&candidate.artist_id)
        {
            score += PROFILE_ARTIST_POINTS;
        }
        score.min(PROFILE_CAP)
    }
}

fn title_score(title: &str, keywords: &[String]) -> u32 {
    let score: u32 = keywords
        .iter()
        .filter(|k| title.contains(k.as_str()))
        .map(|k| {
            if k.as_str() == title {
                TITLE_EXACT_POINTS
            } else {
                TITLE_PARTIAL_POINTS
            }
        })
        .sum();
    score.min(TITLE_CAP)
}

fn artist_score(artist: &str, intent: &SearchIntent) -> u32 {
    let mut score: u32 = intent
        .keywords
        .iter()
        .filter(|k| artist.contains(k.as_str()))
        .map(|k| {
            if k.chars().count() > 3 {
                ARTIST_LONG_KEYWORD_POINTS
            } else {
                ARTIST_SHORT_KEYWORD_POINTS
            }
        })
        .sum();
    if intent
        .candidate_artist_names
        .iter()
        .any(|name| artist.contains(name.as_str()))
    {
        score += ARTIST_NAME_MATCH_POINTS;
    }
    score.min(ARTIST_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommender::intent::extract;

    fn scorer() -> RelevanceScorer {
        RelevanceScorer::new(Arc::new(Taxonomy::standard()))
    }

    fn candidate(title: &str, artist: &str, tags: &[&str]) -> Candidate {
        Candidate {
            track_id: format!("{}-{}", artist, title),
            track_title: title.to_string(),
            artist_id: format!("{}-id", artist.to_lowercase()),
            artist_name: artist.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn intent(query: &str) -> SearchIntent {
        extract(&Taxonomy::standard(), query)
    }

    #[test]
    fn test_genre_track_score() {
        let scorer = scorer();
        let intent = intent("old school rap");
        let track = candidate("Rap God", "Eminem", &["hip-hop"]);

        let breakdown = scorer.breakdown(&track, &intent, None);
        assert_eq!(
            breakdown,
            ScoreBreakdown {
                title: 10,
                artist: 0,
                genre: 25,
                mood: 0,
                profile: 0,
                penalty: 0,
            }
        );
        // 35 * 0.85 = 29.75
        assert_eq!(scorer.score(&track, &intent, 0.85, None), 30);
    }

    #[test]
    fn test_exact_title_match() {
        let scorer = scorer();
        let intent = intent("jazz");
        let track = candidate("Jazz", "Somebody", &[]);
        let breakdown = scorer.breakdown(&track, &intent, None);
        assert_eq!(breakdown.title, 15);
        assert_eq!(breakdown.genre, 15);
        assert_eq!(scorer.score(&track, &intent, 1.0, None), 30);
    }

    #[test]
    fn test_artist_score_is_capped() {
        let scorer = scorer();
        let intent = intent("songs by daft punk");
        let track = candidate("Around the World", "Daft Punk", &[]);
        let breakdown = scorer.breakdown(&track, &intent, None);
        // 20 + 20 + 25 capped
        assert_eq!(breakdown.artist, 30);
    }

    #[test]
    fn test_short_keyword_in_artist() {
        let scorer = scorer();
        let intent = intent("nas");
        let track = candidate("N.Y. State of Mind", "Nas", &[]);
        assert_eq!(scorer.breakdown(&track, &intent, None).artist, 10);
    }

    #[test]
    fn test_no_match_penalty() {
        let scorer = scorer();
        let intent = intent("happy polka");
        let mood_only = candidate("Something", "Nobody", &["happy"]);
        let breakdown = scorer.breakdown(&mood_only, &intent, None);
        assert_eq!(breakdown.mood, 5);
        assert_eq!(breakdown.penalty, 20);
        assert_eq!(scorer.score(&mood_only, &intent, 1.0, None), 0);

        let nothing = candidate("Other", "Nobody", &[]);
        assert_eq!(scorer.score(&nothing, &intent, 1.0, None), 0);
    }

    #[test]
    fn test_mood_score_is_capped() {
        let scorer = scorer();
        let intent = intent("happy party");
        let track = candidate("Happy Party", "Somebody", &["happy", "party"]);
        assert_eq!(scorer.breakdown(&track, &intent, None).mood, 10);
    }

    #[test]
    fn test_profile_affinity() {
        let scorer = scorer();
        let intent = intent("something");
        let track = candidate("Something", "Coltrane", &["jazz", "bebop"]);

        let mut profile = UserProfile::empty("alice");
        profile.favorite_genres = vec!["jazz".to_string()];
        assert_eq!(scorer.breakdown(&track, &intent, Some(&profile)).profile, 5);

        profile.favorite_artist_ids = vec!["coltrane-id".to_string()];
        assert_eq!(scorer.breakdown(&track, &intent, Some(&profile)).profile, 10);

        let mut unknown_genre = UserProfile::empty("bob");
        unknown_genre.favorite_genres = vec!["Bebop".to_string()];
        assert_eq!(
            scorer.breakdown(&track, &intent, Some(&unknown_genre)).profile,
            5
        );
    }

    #[test]
    fn test_score_is_deterministic_and_bounded() {
        let scorer = scorer();
        let intent = intent("rock love songs by queen");
        let track = candidate("Love of My Life", "Queen", &["rock", "love"]);
        let first = scorer.score(&track, &intent, 1.0, None);
        assert_eq!(first, scorer.score(&track, &intent, 1.0, None));
        assert!(first <= 100);
        assert!(scorer.score(&track, &intent, 0.7, None) <= first);
    }

    #[test]
    fn test_score_is_monotonic_in_matching_keywords() {
        let scorer = scorer();
        let intent = intent("sad jazz piano by evans");
        let titles = ["Waltz", "Waltz piano", "Sad waltz piano", "Sad jazz waltz piano"];
        let artists = ["Bill", "Bill Evans"];

        for artist in artists {
            let mut previous = 0;
            for title in titles {
                let score = scorer.score(&candidate(title, artist, &[]), &intent, 0.8, None);
                assert!(score >= previous, "{} by {} dropped", title, artist);
                previous = score;
            }
        }
        for title in titles {
            let without = scorer.score(&candidate(title, "Bill", &[]), &intent, 0.8, None);
            let with = scorer.score(&candidate(title, "Bill Evans", &[]), &intent, 0.8, None);
            assert!(with >= without);
        }
    }
}
