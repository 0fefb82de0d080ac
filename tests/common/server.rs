//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own catalog and profile database.

use super::constants::*;
use pezzottify_recommender::catalog_client::CatalogClient;
use pezzottify_recommender::profile_store::{ProfileStore, SqliteProfileStore};
use pezzottify_recommender::recommender::{EngineSettings, RecommendationEngine};
use pezzottify_recommender::server::{make_app, RequestsLoggingLevel, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with isolated catalog and database
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// Profile store for direct database access in tests
    pub profile_store: Arc<dyn ProfileStore>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server backed by `catalog` with default engine settings.
    pub async fn spawn_with(catalog: Arc<dyn CatalogClient>) -> Self {
        Self::spawn_with_settings(catalog, EngineSettings::default()).await
    }

    /// Spawns a server whose engine gives up after [`SHORT_DEADLINE_MS`].
    pub async fn spawn_with_short_deadline(catalog: Arc<dyn CatalogClient>) -> Self {
        let settings = EngineSettings {
            request_deadline: Duration::from_millis(SHORT_DEADLINE_MS),
            strategy_timeout: Duration::from_millis(SHORT_DEADLINE_MS / 2),
            ..Default::default()
        };
        Self::spawn_with_settings(catalog, settings).await
    }

    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be created, the port cannot be bound or
    /// the server doesn't become ready within timeout.
    pub async fn spawn_with_settings(
        catalog: Arc<dyn CatalogClient>,
        settings: EngineSettings,
    ) -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let profile_store: Arc<dyn ProfileStore> = Arc::new(
            SqliteProfileStore::new(temp_db_dir.path().join("profiles.db"))
                .expect("Failed to open profile store"),
        );

        let engine = Arc::new(RecommendationEngine::new(
            catalog,
            EngineSettings {
                seed: Some(42),
                ..settings
            },
        ));

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
        };
        let app = make_app(config, engine, profile_store.clone(), "test".to_string());

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            profile_store,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the health endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/health", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
