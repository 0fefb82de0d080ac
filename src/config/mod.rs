mod file_config;

pub use file_config::{CatalogConfig, EngineConfig, FileConfig};

use crate::catalog_client::{MusicBrainzSettings, RetryPolicy, MUSICBRAINZ_API_BASE};
use crate::recommender::EngineSettings;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub catalog_url: String,
    pub catalog_timeout_sec: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_dir: None,
            port: 8003,
            logging_level: RequestsLoggingLevel::Path,
            catalog_url: MUSICBRAINZ_API_BASE.to_string(),
            catalog_timeout_sec: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Where the profile database lives; profiles are kept in memory if unset.
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,

    // Feature configs (with defaults)
    pub catalog: MusicBrainzSettings,
    pub engine: EngineSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        // TOML overrides CLI for each field
        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone());

        if let Some(dir) = &db_dir {
            if !dir.exists() {
                bail!("Database directory does not exist: {:?}", dir);
            }
            if !dir.is_dir() {
                bail!("db_dir is not a directory: {:?}", dir);
            }
        }

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        // Catalog settings - merge file config with CLI and defaults
        let catalog_file = file.catalog.unwrap_or_default();
        let catalog_defaults = MusicBrainzSettings::default();
        let retry_defaults = RetryPolicy::default();
        let catalog = MusicBrainzSettings {
            base_url: catalog_file
                .base_url
                .unwrap_or_else(|| cli.catalog_url.clone()),
            user_agent: catalog_file
                .user_agent
                .unwrap_or(catalog_defaults.user_agent),
            timeout: Duration::from_secs(
                catalog_file.timeout_sec.unwrap_or(cli.catalog_timeout_sec),
            ),
            rate_limit_interval: catalog_file
                .rate_limit_ms
                .map(Duration::from_millis)
                .unwrap_or(catalog_defaults.rate_limit_interval),
            retry: RetryPolicy {
                max_retries: catalog_file
                    .max_retries
                    .unwrap_or(retry_defaults.max_retries),
                initial_backoff: catalog_file
                    .initial_backoff_ms
                    .map(Duration::from_millis)
                    .unwrap_or(retry_defaults.initial_backoff),
                max_backoff: catalog_file
                    .max_backoff_ms
                    .map(Duration::from_millis)
                    .unwrap_or(retry_defaults.max_backoff),
                backoff_multiplier: catalog_file
                    .backoff_multiplier
                    .unwrap_or(retry_defaults.backoff_multiplier),
            },
        };

        if catalog.base_url.trim().is_empty() {
            bail!("Catalog base URL must not be empty");
        }

        // Engine settings - merge file config with defaults
        let engine_file = file.engine.unwrap_or_default();
        let defaults = EngineSettings::default();
        let engine = EngineSettings {
            request_deadline: engine_file
                .request_deadline_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_deadline),
            strategy_timeout: engine_file
                .strategy_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.strategy_timeout),
            per_strategy_limit: engine_file
                .per_strategy_limit
                .unwrap_or(defaults.per_strategy_limit),
            max_strategies: engine_file.max_strategies.unwrap_or(defaults.max_strategies),
            max_in_flight: engine_file.max_in_flight.unwrap_or(defaults.max_in_flight),
            genre_artist_samples: engine_file
                .genre_artist_samples
                .unwrap_or(defaults.genre_artist_samples),
            default_limit: engine_file.default_limit.unwrap_or(defaults.default_limit),
            max_limit: engine_file.max_limit.unwrap_or(defaults.max_limit),
            max_profile_genres: engine_file
                .max_profile_genres
                .unwrap_or(defaults.max_profile_genres),
            seed: engine_file.seed,
        };
        validate_engine(&engine)?;

        Ok(Self {
            db_dir,
            port,
            logging_level,
            catalog,
            engine,
        })
    }

    pub fn profile_db_path(&self) -> Option<PathBuf> {
        self.db_dir.as_ref().map(|dir| dir.join("profiles.db"))
    }
}

fn validate_engine(engine: &EngineSettings) -> Result<()> {
    if engine.request_deadline.is_zero() || engine.strategy_timeout.is_zero() {
        bail!("Engine deadlines must be greater than zero");
    }
    for (name, value) in [
        ("max_strategies", engine.max_strategies),
        ("max_in_flight", engine.max_in_flight),
        ("default_limit", engine.default_limit),
        ("max_limit", engine.max_limit),
    ] {
        if value == 0 {
            bail!("engine.{} must be greater than zero", name);
        }
    }
    if engine.default_limit > engine.max_limit {
        bail!(
            "engine.default_limit ({}) exceeds engine.max_limit ({})",
            engine.default_limit,
            engine.max_limit
        );
    }
    Ok(())
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_logging_level() {
        assert!(matches!(
            parse_logging_level("none"),
            Some(RequestsLoggingLevel::None)
        ));
        assert!(matches!(
            parse_logging_level("body"),
            Some(RequestsLoggingLevel::Body)
        ));
        // Case insensitive
        assert!(matches!(
            parse_logging_level("PATH"),
            Some(RequestsLoggingLevel::Path)
        ));
        assert!(parse_logging_level("invalid").is_none());
    }

    #[test]
    fn test_resolve_cli_only() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            db_dir: Some(temp_dir.path().to_path_buf()),
            port: 8100,
            logging_level: RequestsLoggingLevel::Headers,
            catalog_url: "http://localhost:5000/ws/2".to_string(),
            catalog_timeout_sec: 3,
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.db_dir.as_deref(), Some(temp_dir.path()));
        assert_eq!(config.port, 8100);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Headers);
        assert_eq!(config.catalog.base_url, "http://localhost:5000/ws/2");
        assert_eq!(config.catalog.timeout, Duration::from_secs(3));
        assert_eq!(config.catalog.rate_limit_interval, Duration::from_millis(1100));
        assert_eq!(config.catalog.retry, RetryPolicy::default());
        assert_eq!(config.engine, EngineSettings::default());
        assert_eq!(
            config.profile_db_path(),
            Some(temp_dir.path().join("profiles.db"))
        );
    }

    #[test]
    fn test_resolve_without_db_dir() {
        let config = AppConfig::resolve(&CliConfig::default(), None).unwrap();
        assert!(config.db_dir.is_none());
        assert!(config.profile_db_path().is_none());
        assert_eq!(config.port, 8003);
        assert_eq!(config.catalog.base_url, MUSICBRAINZ_API_BASE);
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            db_dir: Some(PathBuf::from("/should/be/overridden")),
            port: 8100,
            ..Default::default()
        };

        let file_config = FileConfig {
            db_dir: Some(temp_dir.path().to_string_lossy().to_string()),
            port: Some(9000),
            logging_level: Some("body".to_string()),
            catalog: Some(CatalogConfig {
                base_url: Some("http://mirror/ws/2".to_string()),
                rate_limit_ms: Some(0),
                max_retries: Some(5),
                ..Default::default()
            }),
            engine: Some(EngineConfig {
                request_deadline_ms: Some(3000),
                max_limit: Some(50),
                seed: Some(7),
                ..Default::default()
            }),
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        // TOML values should override CLI
        assert_eq!(config.db_dir.as_deref(), Some(temp_dir.path()));
        assert_eq!(config.port, 9000);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Body);
        assert_eq!(config.catalog.base_url, "http://mirror/ws/2");
        assert_eq!(config.catalog.rate_limit_interval, Duration::ZERO);
        assert_eq!(config.catalog.retry.max_retries, 5);
        // CLI value used when TOML doesn't specify
        assert_eq!(config.catalog.timeout, Duration::from_secs(10));

        assert_eq!(config.engine.request_deadline, Duration::from_millis(3000));
        assert_eq!(config.engine.max_limit, 50);
        assert_eq!(config.engine.seed, Some(7));
        assert_eq!(config.engine.default_limit, 10);
    }

    #[test]
    fn test_resolve_nonexistent_db_dir_error() {
        let cli = CliConfig {
            db_dir: Some(PathBuf::from("/nonexistent/path/that/should/not/exist")),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_resolve_db_dir_not_directory_error() {
        let temp_file = tempfile::NamedTempFile::new().unwrap();
        let cli = CliConfig {
            db_dir: Some(temp_file.path().to_path_buf()),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.unwrap_err().to_string().contains("not a directory"));
    }

    #[test]
    fn test_resolve_rejects_zero_limits() {
        let file_config = FileConfig {
            engine: Some(EngineConfig {
                max_in_flight: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = AppConfig::resolve(&CliConfig::default(), Some(file_config)).unwrap_err();
        assert!(err.to_string().contains("max_in_flight"));
    }

    #[test]
    fn test_resolve_rejects_default_above_max_limit() {
        let file_config = FileConfig {
            engine: Some(EngineConfig {
                default_limit: Some(30),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = AppConfig::resolve(&CliConfig::default(), Some(file_config)).unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }
}
