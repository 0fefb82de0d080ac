use super::models::{InteractionType, ListeningEvent, UserProfile};
use super::schema::{BASE_DB_VERSION, PROFILE_VERSIONED_SCHEMAS};
use super::ProfileStore;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

pub struct SqliteProfileStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteProfileStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let is_new_db = !path.exists();

        let mut conn = Connection::open(path).context("Failed to open profile database")?;
        conn.execute("PRAGMA foreign_keys = ON;", [])?;

        if is_new_db {
            info!("Creating new profile database at {:?}", path);
            Self::latest_schema().create(&conn)?;
        } else {
            let raw_version: i64 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
            let db_version = raw_version - BASE_DB_VERSION as i64;

            if db_version < 1 {
                anyhow::bail!(
                    "Profile database version {} is invalid (expected >= 1)",
                    db_version
                );
            }

            let current_schema_version = Self::latest_schema().version as i64;
            if db_version > current_schema_version {
                anyhow::bail!(
                    "Profile database version {} is newer than supported version {}",
                    db_version,
                    current_schema_version
                );
            }
            if db_version < current_schema_version {
                info!(
                    "Migrating profile database from version {} to {}",
                    db_version, current_schema_version
                );
                Self::migrate_if_needed(&mut conn, db_version as usize)?;
            }
        }

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open a throwaway database, used by tests and `--db-dir`-less runs.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::latest_schema().create(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn latest_schema() -> &'static super::schema::VersionedSchema {
        // The schema list is a non-empty constant.
        &PROFILE_VERSIONED_SCHEMAS[PROFILE_VERSIONED_SCHEMAS.len() - 1]
    }

    fn migrate_if_needed(conn: &mut Connection, from_version: usize) -> Result<()> {
        let tx = conn.transaction()?;
        let mut latest_from = from_version;
        for schema in PROFILE_VERSIONED_SCHEMAS.iter() {
            if schema.version > from_version {
                info!(
                    "Running profile database migration from version {} to {}",
                    latest_from, schema.version
                );
                if let Some(migration_fn) = schema.migration {
                    migration_fn(&tx).with_context(|| {
                        format!("Failed to run migration to version {}", schema.version)
                    })?;
                }
                latest_from = schema.version;
            }
        }
        tx.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + latest_from),
            [],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("Profile database lock poisoned"))
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }

    fn parse_list(json: &str) -> Vec<String> {
        serde_json::from_str(json).unwrap_or_default()
    }

    fn row_to_profile(row: &rusqlite::Row) -> rusqlite::Result<UserProfile> {
        let genres: String = row.get("favorite_genres")?;
        let artists: String = row.get("favorite_artists")?;
        let created_at: String = row.get("created_at")?;
        let updated_at: String = row.get("updated_at")?;

        Ok(UserProfile {
            username: row.get("username")?,
            favorite_genres: Self::parse_list(&genres),
            favorite_artist_ids: Self::parse_list(&artists),
            created_at: Self::parse_datetime(&created_at),
            updated_at: Self::parse_datetime(&updated_at),
        })
    }

    /// Return the row id of `username`, inserting an empty profile if missing.
    fn ensure_profile_id(conn: &Connection, username: &str) -> Result<i64> {
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM user_profiles WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }

        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO user_profiles (username, favorite_genres, favorite_artists, created_at, updated_at)
             VALUES (?1, '[]', '[]', ?2, ?2)",
            params![username, now],
        )?;
        info!("Created empty profile for {}", username);
        Ok(conn.last_insert_rowid())
    }
}

impl ProfileStore for SqliteProfileStore {
    fn get_profile(&self, username: &str) -> Result<Option<UserProfile>> {
        let conn = self.lock()?;
        let profile = conn
            .query_row(
                "SELECT username, favorite_genres, favorite_artists, created_at, updated_at
                 FROM user_profiles WHERE username = ?1",
                params![username],
                Self::row_to_profile,
            )
            .optional()
            .with_context(|| format!("Failed to load profile for {}", username))?;
        Ok(profile)
    }

    fn save_profile(
        &self,
        username: &str,
        favorite_genres: &[String],
        favorite_artist_ids: &[String],
    ) -> Result<UserProfile> {
        let genres_json = serde_json::to_string(favorite_genres)?;
        let artists_json = serde_json::to_string(favorite_artist_ids)?;
        let now = Utc::now().to_rfc3339();

        {
            let conn = self.lock()?;
            conn.execute(
                "INSERT INTO user_profiles (username, favorite_genres, favorite_artists, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)
                 ON CONFLICT(username) DO UPDATE SET
                    favorite_genres = excluded.favorite_genres,
                    favorite_artists = excluded.favorite_artists,
                    updated_at = excluded.updated_at",
                params![username, genres_json, artists_json, now],
            )
            .with_context(|| format!("Failed to save profile for {}", username))?;
        }

        info!(
            "Saved profile for {}: {} genres, {} artists",
            username,
            favorite_genres.len(),
            favorite_artist_ids.len()
        );

        self.get_profile(username)?
            .ok_or_else(|| anyhow::anyhow!("Profile for {} vanished after save", username))
    }

    fn add_listening_event(
        &self,
        username: &str,
        track_id: &str,
        artist_id: &str,
        interaction: InteractionType,
    ) -> Result<ListeningEvent> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let user_id = Self::ensure_profile_id(&tx, username)?;
        let played_at = Utc::now();
        tx.execute(
            "INSERT INTO listening_history (user_id, track_id, artist_id, interaction_type, played_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_id,
                track_id,
                artist_id,
                interaction.as_str(),
                played_at.to_rfc3339()
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(ListeningEvent {
            id,
            username: username.to_string(),
            track_id: track_id.to_string(),
            artist_id: artist_id.to_string(),
            interaction_type: interaction,
            played_at,
        })
    }

    fn count_listening_events(
        &self,
        username: &str,
        track_id: &str,
        interaction: InteractionType,
    ) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM listening_history h
             JOIN user_profiles p ON p.id = h.user_id
             WHERE p.username = ?1 AND h.track_id = ?2 AND h.interaction_type = ?3",
            params![username, track_id, interaction.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
