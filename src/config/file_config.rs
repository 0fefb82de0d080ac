use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_dir: Option<String>,
    pub port: Option<u16>,
    pub logging_level: Option<String>,

    // Feature configs
    pub catalog: Option<CatalogConfig>,
    pub engine: Option<EngineConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_sec: Option<u64>,
    /// Minimum spacing between two catalog requests.
    pub rate_limit_ms: Option<u64>,
    pub max_retries: Option<u32>,
    pub initial_backoff_ms: Option<u64>,
    pub max_backoff_ms: Option<u64>,
    pub backoff_multiplier: Option<f64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub request_deadline_ms: Option<u64>,
    pub strategy_timeout_ms: Option<u64>,
    pub per_strategy_limit: Option<usize>,
    pub max_strategies: Option<usize>,
    pub max_in_flight: Option<usize>,
    pub genre_artist_samples: Option<usize>,
    pub default_limit: Option<usize>,
    pub max_limit: Option<usize>,
    pub max_profile_genres: Option<usize>,
    /// Fixed RNG seed, for reproducible curated-artist sampling.
    pub seed: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
