//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! The state owns nothing but the [`TricycleRegistry`]; every rule about
//! availability, danger zones and ratings lives below it. Configuration is
//! read once from the environment at start-up.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;
use thiserror::Error;
use tryshare_registry::{
    load_fleet_file, InMemoryStore, RegistryConfig, StoreError, TricycleRegistry, TricycleStore,
};
use tryshare_state::RatingPolicy;

/// Log output format for the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Configuration could not be assembled from the environment.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to load fleet from {path}: {source}")]
    Fleet {
        path: PathBuf,
        #[source]
        source: StoreError,
    },
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Upper bound on waiting for a tricycle's exclusive scope.
    pub lock_timeout: Duration,
    /// Weight given to each new rating input.
    pub rating_weight: f64,
    /// Optional JSON seed for the in-memory fleet.
    pub fleet_file: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            lock_timeout: RegistryConfig::DEFAULT_LOCK_TIMEOUT,
            rating_weight: RatingPolicy::DEFAULT_WEIGHT,
            fleet_file: None,
            log_format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    pub const PORT: &'static str = "PORT";
    pub const LOCK_TIMEOUT_MS: &'static str = "TRYSHARE_LOCK_TIMEOUT_MS";
    pub const RATING_WEIGHT: &'static str = "TRYSHARE_RATING_WEIGHT";
    pub const FLEET_FILE: &'static str = "TRYSHARE_FLEET_FILE";
    pub const LOG_FORMAT: &'static str = "TRYSHARE_LOG_FORMAT";

    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unset keys fall back to defaults. Set but unparseable keys are errors,
    /// so a typo in deployment config fails start-up instead of silently
    /// running with defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup(Self::PORT) {
            Some(raw) => parse_with(Self::PORT, &raw, |s| s.parse::<u16>())?,
            None => defaults.port,
        };

        let lock_timeout = match lookup(Self::LOCK_TIMEOUT_MS) {
            Some(raw) => {
                let ms = parse_with(Self::LOCK_TIMEOUT_MS, &raw, |s| s.parse::<u64>())?;
                if ms == 0 {
                    return Err(invalid(Self::LOCK_TIMEOUT_MS, &raw, "must be positive"));
                }
                Duration::from_millis(ms)
            }
            None => defaults.lock_timeout,
        };

        let rating_weight = match lookup(Self::RATING_WEIGHT) {
            Some(raw) => {
                let weight = parse_with(Self::RATING_WEIGHT, &raw, |s| s.parse::<f64>())?;
                RatingPolicy::exponential(weight)
                    .map_err(|e| invalid(Self::RATING_WEIGHT, &raw, e))?;
                weight
            }
            None => defaults.rating_weight,
        };

        let fleet_file = lookup(Self::FLEET_FILE)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let log_format = match lookup(Self::LOG_FORMAT) {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "text" | "" => LogFormat::Text,
                _ => return Err(invalid(Self::LOG_FORMAT, &raw, "expected json or text")),
            },
            None => defaults.log_format,
        };

        Ok(Self {
            port,
            lock_timeout,
            rating_weight,
            fleet_file,
            log_format,
        })
    }

    /// Registry settings derived from this configuration.
    pub fn registry_config(&self) -> Result<RegistryConfig, ConfigError> {
        let rating_policy = RatingPolicy::exponential(self.rating_weight).map_err(|e| {
            invalid(Self::RATING_WEIGHT, &self.rating_weight.to_string(), e)
        })?;
        Ok(RegistryConfig {
            lock_timeout: self.lock_timeout,
            rating_policy,
        })
    }
}

fn parse_with<T, E: std::fmt::Display>(
    key: &'static str,
    raw: &str,
    parse: impl FnOnce(&str) -> Result<T, E>,
) -> Result<T, ConfigError> {
    parse(raw.trim()).map_err(|e| invalid(key, raw, e))
}

fn invalid(key: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub registry: TricycleRegistry,
    /// Prometheus render handle; `None` when no recorder was installed.
    pub metrics: Option<PrometheusHandle>,
    pub config: AppConfig,
}

impl AppState {
    /// State around an already-built registry.
    pub fn with_registry(registry: TricycleRegistry, config: AppConfig) -> Self {
        Self {
            registry,
            metrics: None,
            config,
        }
    }

    /// Build the registry described by `config`, seeding the in-memory
    /// store from the fleet file when one is configured.
    pub fn from_config(config: AppConfig) -> Result<Self, ConfigError> {
        let store = match &config.fleet_file {
            Some(path) => {
                let fleet = load_fleet_file(path).map_err(|source| ConfigError::Fleet {
                    path: path.clone(),
                    source,
                })?;
                let count = fleet.len();
                let store =
                    InMemoryStore::with_fleet(fleet).map_err(|source| ConfigError::Fleet {
                        path: path.clone(),
                        source,
                    })?;
                tracing::info!(path = %path.display(), count, "fleet loaded");
                store
            }
            None => {
                tracing::warn!("no fleet file configured, starting with an empty fleet");
                InMemoryStore::new()
            }
        };

        let store: Arc<dyn TricycleStore> = Arc::new(store);
        let registry = TricycleRegistry::new(store, config.registry_config()?);
        Ok(Self::with_registry(registry, config))
    }

    /// Attach the Prometheus handle used by `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
