//! Genre and mood tables.
//!
//! A [`Taxonomy`] is built once at startup and shared read-only between
//! requests. Detection is plain keyword containment on lowercase text, after
//! a handful of spelling aliases have been folded into their canonical form.

use super::models::{Genre, Mood};

#[derive(Debug, Clone)]
pub struct GenreEntry {
    pub genre: Genre,
    /// Always contains the genre's own name.
    pub keywords: Vec<String>,
    /// Representative artists, used to seed curated-artist searches.
    pub artists: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MoodEntry {
    pub mood: Mood,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Taxonomy {
    genres: Vec<GenreEntry>,
    moods: Vec<MoodEntry>,
    aliases: Vec<(String, String)>,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl Taxonomy {
    /// Build a taxonomy from explicit tables. Genre entries are kept in the
    /// order given, which is also the detection priority.
    pub fn new(
        mut genres: Vec<GenreEntry>,
        moods: Vec<MoodEntry>,
        aliases: Vec<(String, String)>,
    ) -> Self {
        for entry in &mut genres {
            let name = entry.genre.as_str().to_string();
            if !entry.keywords.contains(&name) {
                entry.keywords.insert(0, name);
            }
        }
        Self {
            genres,
            moods,
            aliases,
        }
    }

    pub fn standard() -> Self {
        let genre = |genre: Genre, keywords: &[&str], artists: &[&str]| GenreEntry {
            genre,
            keywords: owned(keywords),
            artists: owned(artists),
        };
        let mood = |mood: Mood, keywords: &[&str]| MoodEntry {
            mood,
            keywords: owned(keywords),
        };

        let genres = vec![
            genre(
                Genre::HipHop,
                &["rap", "hip-hop", "hip hop", "hiphop", "old school", "trap", "boom bap"],
                &[
                    "eminem", "jay-z", "nas", "kendrick lamar", "j. cole", "drake",
                    "kanye west", "tupac", "biggie", "ice cube", "outkast", "wu-tang clan",
                ],
            ),
            genre(
                Genre::Rock,
                &["rock", "alternative", "indie", "grunge", "punk"],
                &[
                    "the beatles", "queen", "led zeppelin", "pink floyd", "the rolling stones",
                    "nirvana", "radiohead", "foo fighters", "red hot chili peppers", "pearl jam",
                ],
            ),
            genre(
                Genre::Jazz,
                &["jazz", "swing", "bebop", "smooth jazz", "fusion"],
                &[
                    "miles davis", "john coltrane", "bill evans", "charlie parker",
                    "herbie hancock", "duke ellington", "ella fitzgerald", "louis armstrong",
                    "diana krall", "keith jarrett",
                ],
            ),
            genre(
                Genre::Pop,
                &["pop", "mainstream", "chart", "dance pop"],
                &[
                    "taylor swift", "ed sheeran", "bruno mars", "adele", "billie eilish",
                    "ariana grande", "justin bieber", "the weeknd", "dua lipa", "harry styles",
                ],
            ),
            genre(
                Genre::Electronic,
                &["electronic", "edm", "techno", "house", "ambient", "dance"],
                &[
                    "daft punk", "calvin harris", "deadmau5", "avicii", "skrillex", "tiësto",
                    "david guetta", "diplo", "flume", "odesza",
                ],
            ),
            genre(
                Genre::Country,
                &["country", "folk", "bluegrass", "americana"],
                &[
                    "johnny cash", "dolly parton", "garth brooks", "carrie underwood",
                    "keith urban", "blake shelton", "willie nelson", "kacey musgraves",
                ],
            ),
            genre(
                Genre::Reggae,
                &["reggae", "ska", "dub"],
                &[
                    "bob marley", "jimmy cliff", "peter tosh", "burning spear", "ziggy marley",
                    "toots and the maytals",
                ],
            ),
            genre(
                Genre::Blues,
                &["blues", "delta blues", "chicago blues"],
                &[
                    "bb king", "muddy waters", "eric clapton", "stevie ray vaughan",
                    "john lee hooker", "buddy guy", "robert johnson",
                ],
            ),
            genre(
                Genre::RnB,
                &["r&b", "soul", "funk", "rhythm and blues"],
                &[
                    "beyoncé", "john legend", "alicia keys", "usher", "mary j. blige",
                    "stevie wonder", "aretha franklin", "the weeknd",
                ],
            ),
            genre(
                Genre::Metal,
                &["metal", "heavy metal", "death metal", "thrash"],
                &[
                    "metallica", "black sabbath", "iron maiden", "judas priest", "megadeth",
                    "tool", "system of a down", "pantera",
                ],
            ),
        ];

        let moods = vec![
            mood(Mood::Upbeat, &["upbeat", "energetic", "party", "happy", "fast"]),
            mood(
                Mood::Relaxing,
                &["relaxing", "chill", "calm", "mellow", "soothing", "peaceful"],
            ),
            mood(Mood::Sad, &["sad", "melancholy", "heartbreak", "emotional"]),
            mood(Mood::Aggressive, &["aggressive", "angry", "intense"]),
            mood(Mood::Romantic, &["romantic", "love", "sensual"]),
        ];

        // "rhythm and blues" would otherwise be claimed by the blues keywords.
        let aliases = vec![
            ("rhythm and blues".to_string(), "r&b".to_string()),
            ("r and b".to_string(), "r&b".to_string()),
            ("hip hop".to_string(), "hip-hop".to_string()),
        ];

        Self::new(genres, moods, aliases)
    }

    /// Lowercase `text` and fold aliases into canonical spellings. An alias
    /// only matches as whole words: "summer and beach" stays as it is.
    pub fn normalize(&self, text: &str) -> String {
        let mut normalized = text.to_lowercase();
        for (alias, canonical) in &self.aliases {
            if normalized.contains(alias.as_str()) {
                normalized = fold_phrase(&normalized, alias, canonical);
            }
        }
        normalized
    }

    /// First genre, in priority order, with a keyword contained in `text`.
    pub fn detect_genre(&self, text: &str) -> Option<Genre> {
        let normalized = self.normalize(text);
        self.genres
            .iter()
            .find(|entry| entry.keywords.iter().any(|k| normalized.contains(k.as_str())))
            .map(|entry| entry.genre)
    }

    /// Every mood with a keyword contained in `text`.
    pub fn detect_moods(&self, text: &str) -> Vec<Mood> {
        let normalized = self.normalize(text);
        self.moods
            .iter()
            .filter(|entry| entry.keywords.iter().any(|k| normalized.contains(k.as_str())))
            .map(|entry| entry.mood)
            .collect()
    }

    pub fn genre_keywords(&self, genre: Genre) -> &[String] {
        self.genre_entry(genre)
            .map(|e| e.keywords.as_slice())
            .unwrap_or(&[])
    }

    pub fn genre_artists(&self, genre: Genre) -> &[String] {
        self.genre_entry(genre)
            .map(|e| e.artists.as_slice())
            .unwrap_or(&[])
    }

    pub fn mood_keywords(&self, mood: Mood) -> &[String] {
        self.moods
            .iter()
            .find(|e| e.mood == mood)
            .map(|e| e.keywords.as_slice())
            .unwrap_or(&[])
    }

    /// Whether any of `tags` contains a keyword of `genre`.
    pub fn tags_match_genre(&self, tags: &[String], genre: Genre) -> bool {
        let keywords = self.genre_keywords(genre);
        tags.iter().any(|tag| {
            let tag = self.normalize(tag);
            keywords.iter().any(|k| tag.contains(k.as_str()))
        })
    }

    fn genre_entry(&self, genre: Genre) -> Option<&GenreEntry> {
        self.genres.iter().find(|e| e.genre == genre)
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Replace every occurrence of `phrase` in `text` that is not glued to an
/// alphanumeric character on either side.
fn fold_phrase(text: &str, phrase: &str, canonical: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    let mut copied = 0;
    for (start, _) in text.match_indices(phrase) {
        let end = start + phrase.len();
        let open = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let close = text[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if open && close {
            folded.push_str(&text[copied..start]);
            folded.push_str(canonical);
            copied = end;
        }
    }
    folded.push_str(&text[copied..]);
    folded
}
