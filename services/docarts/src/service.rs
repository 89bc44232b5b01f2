//! Service wiring
//!
//! Builds the shared `AppState` from configuration and runs the single
//! invalidation listener. The listener is the only place that reacts to a
//! dropped session outside a request: it counts the cause and clears the
//! art wall so the next visit starts over.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::{Duration, Instant};

use dam_auth::{FileSlot, MemorySlot, TokenSlot, TokenStore};
use dam_client::{DamApi, DamClient};
use gallery::ArtWall;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::metrics;

/// How long in-flight requests may run after a shutdown signal
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Runtime counters reported by `/health`
#[derive(Debug, Clone)]
pub struct ServiceMetrics {
    pub requests_total: Arc<AtomicU64>,
    pub errors_total: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            requests_total: Arc::new(AtomicU64::new(0)),
            errors_total: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }
}

/// Route-facing settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub home_url: String,
    pub featured_root_folder: String,
    pub carousel_page_size: usize,
}

/// Shared application state accessible from all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: TokenStore,
    pub api: DamApi,
    pub wall: Arc<ArtWall>,
    pub settings: Arc<Settings>,
    pub metrics: ServiceMetrics,
    pub prometheus: PrometheusHandle,
}

impl AppState {
    pub fn from_config(config: &Config, prometheus: PrometheusHandle) -> Result<Self> {
        let auth = config
            .auth_config()
            .map_err(|e| Error::Internal(e.to_string()))?;
        let api_config = config.api_config();

        let token_http = reqwest::Client::builder()
            .timeout(api_config.timeout)
            .build()
            .map_err(|e| Error::Internal(format!("building token client: {e}")))?;
        let slot = token_slot(config.storage.token_path.as_deref());
        let store = TokenStore::new(auth, slot, token_http);

        let api = DamApi::new(
            DamClient::json(api_config.clone(), store.clone())?,
            DamClient::binary(api_config, store.clone())?,
        );
        let wall = ArtWall::new(api.clone(), config.gallery.images_per_load)?;

        Ok(Self {
            store,
            api,
            wall: Arc::new(wall),
            settings: Arc::new(Settings {
                home_url: config.server.home_url.clone(),
                featured_root_folder: config.gallery.featured_root_folder.clone(),
                carousel_page_size: config.gallery.carousel_page_size,
            }),
            metrics: ServiceMetrics::new(),
            prometheus,
        })
    }
}

/// File-backed slot when a path is configured, in-memory otherwise.
pub fn token_slot(path: Option<&Path>) -> Arc<dyn TokenSlot> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "persisting access token to file");
            Arc::new(FileSlot::new(path.to_path_buf()))
        }
        None => {
            info!("access token kept in memory");
            Arc::new(MemorySlot::new())
        }
    }
}

/// React to every dropped session. Runs until aborted at shutdown.
pub fn spawn_invalidation_listener(store: &TokenStore, wall: Arc<ArtWall>) -> JoinHandle<()> {
    let mut events = store.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let cause = event.cause.label();
                    metrics::record_invalidation(cause);
                    info!(cause, at_ms = event.at_ms, "session ended, next visit restarts sign-in");
                    wall.reset().await;
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "invalidation listener lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
