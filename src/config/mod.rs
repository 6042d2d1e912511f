mod app_config;

pub use app_config::{
    AppConfig, ClientConfig, DataConfig, DecisionConfig, LogFormat, LoggingConfig, ServerConfig,
    SimulationConfig, TransportKind,
};
