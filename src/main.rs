use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pezzottify_recommender::catalog_client::{MusicBrainzClient, MUSICBRAINZ_API_BASE};
use pezzottify_recommender::config::{AppConfig, CliConfig, FileConfig};
use pezzottify_recommender::profile_store::{ProfileStore, SqliteProfileStore};
use pezzottify_recommender::recommender::RecommendationEngine;
use pezzottify_recommender::server::{run_server, RequestsLoggingLevel, ServerConfig};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Its values override the CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding the profile database. Profiles are kept in memory if unset.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 8003)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Base URL of the MusicBrainz web service.
    #[clap(long, default_value = MUSICBRAINZ_API_BASE)]
    pub catalog_url: String,

    /// Timeout in seconds for a single catalog request.
    #[clap(long, default_value_t = 10)]
    pub catalog_timeout_sec: u64,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_dir: self.db_dir.clone(),
            port: self.port,
            logging_level: self.logging_level.clone(),
            catalog_url: self.catalog_url.clone(),
            catalog_timeout_sec: self.catalog_timeout_sec,
        }
    }
}

fn open_profile_store(config: &AppConfig) -> Result<Arc<dyn ProfileStore>> {
    match config.profile_db_path() {
        Some(path) => {
            info!("Opening profile database at {:?}", path);
            let store = SqliteProfileStore::new(&path)
                .with_context(|| format!("Failed to open profile database at {:?}", path))?;
            Ok(Arc::new(store))
        }
        None => {
            info!("No db dir configured, profiles are kept in memory");
            Ok(Arc::new(SqliteProfileStore::in_memory()?))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    let profile_store = open_profile_store(&config)?;

    info!(
        "Using catalog at {} (timeout {:?}, {} retries)",
        config.catalog.base_url, config.catalog.timeout, config.catalog.retry.max_retries
    );
    let catalog = MusicBrainzClient::new(config.catalog.clone())
        .context("Failed to create catalog client")?;
    let engine = RecommendationEngine::new(Arc::new(catalog), config.engine.clone());

    let server_config = ServerConfig {
        requests_logging_level: config.logging_level.clone(),
        port: config.port,
    };

    info!("Ready to serve at port {}!", config.port);
    run_server(
        server_config,
        Arc::new(engine),
        profile_store,
        env!("GIT_HASH").to_string(),
    )
    .await
}
