use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub appwrite: Option<AppwriteSettings>,
    #[serde(default)]
    pub collection: CollectionSettings,
    #[serde(default)]
    pub database: Option<DatabaseSettings>,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Where profiles and matches live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Appwrite profiles, PostgreSQL matches
    Appwrite,
    /// Everything in process memory, lost on restart
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    /// JSON array of profile documents loaded into the memory backend
    pub seed_path: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            seed_path: None,
        }
    }
}

fn default_backend() -> StorageBackend { StorageBackend::Appwrite }

#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    #[serde(default = "default_profiles_collection")]
    pub user_profiles: String,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self { user_profiles: default_profiles_collection() }
    }
}

fn default_profiles_collection() -> String { "users".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_max_top_n")]
    pub max_top_n: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            top_n: default_top_n(),
            max_top_n: default_max_top_n(),
        }
    }
}

fn default_threshold() -> f64 { crate::core::DEFAULT_THRESHOLD }
fn default_top_n() -> usize { crate::core::DEFAULT_TOP_N }
fn default_max_top_n() -> usize { 100 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_interest_weight")]
    pub interest: f64,
    #[serde(default = "default_personality_weight")]
    pub personality: f64,
    #[serde(default = "default_motivation_weight")]
    pub motivation: f64,
    #[serde(default = "default_location_weight")]
    pub location: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            interest: default_interest_weight(),
            personality: default_personality_weight(),
            motivation: default_motivation_weight(),
            location: default_location_weight(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        ScoringWeights {
            interest: config.interest,
            personality: config.personality,
            motivation: config.motivation,
            location: config.location,
        }
    }
}

fn default_interest_weight() -> f64 { 0.4 }
fn default_personality_weight() -> f64 { 0.3 }
fn default_motivation_weight() -> f64 { 0.2 }
fn default_location_weight() -> f64 { 0.1 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with MENTOR_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., MENTOR__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("MENTOR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        // The conventional DATABASE_URL wins over anything in files
        if let Ok(database_url) = std::env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", database_url)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("MENTOR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Scoring weights, rejected when they do not form a proper weighting
    pub fn scoring_weights(&self) -> Result<ScoringWeights, crate::models::WeightsError> {
        let weights = ScoringWeights::from(&self.scoring.weights);
        weights.validate()?;
        Ok(weights)
    }
}
