//! Free-text query interpretation.

use super::models::SearchIntent;
use super::taxonomy::Taxonomy;

/// Tokens that carry no search meaning on their own.
const STOPWORDS: &[&str] = &[
    "the", "a", "an", "of", "and", "music", "songs", "song", "tracks", "by", "from", "artist",
    "band", "like", "me", "for", "with", "i", "want", "play", "some",
];

/// Tokens after which the rest of the phrase is taken as an artist name.
const ARTIST_CONNECTORS: &[&str] = &["by", "from", "artist", "band"];

/// Turn a query into a [`SearchIntent`]. Never fails: empty or meaningless
/// input yields an intent with no genre and no keywords.
pub fn extract(taxonomy: &Taxonomy, query: &str) -> SearchIntent {
    let raw_query = query.trim().to_string();
    let normalized = taxonomy.normalize(&raw_query);

    let tokens: Vec<String> = normalized
        .split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| !c.is_alphanumeric() && c != '&' && c != '-')
                .to_string()
        })
        .filter(|t| !t.is_empty())
        .collect();

    let keywords = tokens
        .iter()
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .cloned()
        .collect();

    SearchIntent {
        detected_genre: taxonomy.detect_genre(&normalized),
        detected_moods: taxonomy.detect_moods(&normalized),
        candidate_artist_names: extract_artist_names(&tokens),
        keywords,
        raw_query,
    }
}

/// Collect the phrase following each connector word, up to the next
/// connector. "songs by daft punk" gives `["daft punk"]`.
fn extract_artist_names(tokens: &[String]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for token in tokens {
        if ARTIST_CONNECTORS.contains(&token.as_str()) {
            if let Some(words) = current.take() {
                push_name(&mut names, &words);
            }
            current = Some(Vec::new());
        } else if let Some(words) = current.as_mut() {
            words.push(token);
        }
    }
    if let Some(words) = current {
        push_name(&mut names, &words);
    }
    names
}

fn push_name(names: &mut Vec<String>, words: &[&str]) {
    if words.iter().all(|w| STOPWORDS.contains(w)) {
        return;
    }
    let name = words.join(" ");
    if !names.contains(&name) {
        names.push(name);
    }
}
