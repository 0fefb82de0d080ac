//! SQLite schema definitions for the profile database.
//!
//! The database `user_version` is `BASE_DB_VERSION + schema version`, so a
//! file that was never created by this store is rejected instead of migrated.

use anyhow::Result;
use rusqlite::Connection;

pub const BASE_DB_VERSION: usize = 77000;

pub struct VersionedSchema {
    pub version: usize,
    pub statements: &'static [&'static str],
    pub migration: Option<fn(&Connection) -> Result<()>>,
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        conn.execute("PRAGMA foreign_keys = ON;", [])?;
        for statement in self.statements {
            conn.execute(statement, [])?;
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + self.version),
            [],
        )?;
        Ok(())
    }
}

// =============================================================================
// Version 1 - Profiles
// =============================================================================

const USER_PROFILES_TABLE_V1: &str = "CREATE TABLE user_profiles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    favorite_genres TEXT NOT NULL DEFAULT '[]',
    favorite_artists TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

// =============================================================================
// Version 2 - Listening history
// =============================================================================

const LISTENING_HISTORY_TABLE_V2: &str = "CREATE TABLE listening_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES user_profiles(id) ON DELETE CASCADE,
    track_id TEXT NOT NULL,
    artist_id TEXT NOT NULL,
    interaction_type TEXT NOT NULL,
    played_at TEXT NOT NULL
)";

const LISTENING_HISTORY_INDEX_V2: &str =
    "CREATE INDEX idx_listening_history_user_track ON listening_history(user_id, track_id)";

/// Migration from version 1 to version 2: add listening_history table
fn migrate_v1_to_v2(conn: &Connection) -> Result<()> {
    conn.execute(LISTENING_HISTORY_TABLE_V2, [])?;
    conn.execute(LISTENING_HISTORY_INDEX_V2, [])?;
    Ok(())
}

pub const PROFILE_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 1,
        statements: &[USER_PROFILES_TABLE_V1],
        migration: None,
    },
    VersionedSchema {
        version: 2,
        statements: &[
            USER_PROFILES_TABLE_V1,
            LISTENING_HISTORY_TABLE_V2,
            LISTENING_HISTORY_INDEX_V2,
        ],
        migration: Some(migrate_v1_to_v2),
    },
];
