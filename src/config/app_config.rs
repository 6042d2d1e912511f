use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::DEFAULT_THRESHOLD;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub data: DataConfig,
    pub decision: DecisionConfig,
    pub client: ClientConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Server-side artifacts: image tree and id-to-category mapping
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub image_dir: PathBuf,
    pub category_map: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Number of parsed similarity matrices kept in memory
    pub matrix_cache_capacity: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    pub cache_dir: PathBuf,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub default_threshold: i32,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Call the decision service in-process
    #[default]
    Local,
    /// Call a running server over HTTP
    Http,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub num_clients: usize,
    pub category_counts: Vec<usize>,
    pub image_counts: Vec<usize>,
    pub threshold: i32,
    pub concurrency: usize,
    pub seed: Option<u64>,
    pub log_file: PathBuf,
    pub transport: TransportKind,
    /// Per-client on-disk caches; in-memory caches when unset
    pub cache_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("images"),
            category_map: PathBuf::from("id_to_category.json"),
        }
    }
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            matrix_cache_capacity: 256,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            cache_dir: PathBuf::from("cache"),
            timeout_ms: 5_000,
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 2_000,
            default_threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_clients: 100,
            category_counts: vec![1, 2, 3, 4, 5],
            image_counts: vec![10, 20, 30, 40],
            threshold: DEFAULT_THRESHOLD,
            concurrency: 8,
            seed: None,
            log_file: PathBuf::from("simulation.csv"),
            transport: TransportKind::default(),
            cache_dir: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_reference_harness() {
        let config = AppConfig::default();
        assert_eq!(config.simulation.num_clients, 100);
        assert_eq!(config.simulation.category_counts, vec![1, 2, 3, 4, 5]);
        assert_eq!(config.simulation.image_counts, vec![10, 20, 30, 40]);
        assert_eq!(config.simulation.threshold, 1);
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = config::Config::builder()
            .set_override("server.port", 9000)
            .unwrap()
            .set_override("simulation.transport", "http")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.simulation.transport, TransportKind::Http);
        assert_eq!(config.client.max_retries, 3);
    }
}
