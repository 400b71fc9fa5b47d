use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub assignment: AssignmentConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Deadline for a single service call; 0 disables it
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Reviewer assignment configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentConfig {
    /// Fixed seed for reproducible reviewer selection
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later sources override earlier ones):
    /// 1. Default values
    /// 2. config.toml file (if present)
    /// 3. Environment variables (prefixed with REVIEWROSTER_)
    ///
    /// Environment variables use double underscore for nesting:
    /// - REVIEWROSTER_SERVER__PORT=9000
    /// - REVIEWROSTER_DATABASE__URL=postgres://localhost/reviewroster
    /// - REVIEWROSTER_ASSIGNMENT__RNG_SEED=42
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.request_timeout_secs", 10)?
            .set_default("database.url", "sqlite://reviewroster.db?mode=rwc")?
            .set_default("database.max_connections", 10)?;

        let builder = if Path::new("config.toml").exists() {
            builder.add_source(File::with_name("config"))
        } else {
            builder
        };

        let builder = builder.add_source(
            Environment::with_prefix("REVIEWROSTER")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: AppConfig = builder.build()?.try_deserialize()?;
        if config.database.max_connections == 0 {
            config.database.max_connections = 1;
        }
        Ok(config)
    }
}
