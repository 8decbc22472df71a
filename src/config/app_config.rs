use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub embedding: EmbeddingSettings,
    pub retrieval: RetrievalConfig,
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

/// Storage backend selection and addressing.
///
/// `environment` decides the backend once per deployment: `local` keeps
/// everything in redb files under `data_dir`; any other value uses the
/// document database at `mongo_uri`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub environment: String,
    pub data_dir: PathBuf,
    pub mongo_uri: String,
    pub db_name: String,
}

impl StorageConfig {
    pub fn is_local(&self) -> bool {
        self.environment == "local"
    }
}

/// Embedding provider selection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// "hashing" (offline, deterministic) or "openai" (HTTP)
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

/// Retrieval defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Stemmer language for the lexical index
    pub language: String,
    /// top_k applied when a query does not specify one
    pub default_top_k: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
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

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            environment: "local".to_string(),
            data_dir: PathBuf::from("data"),
            mongo_uri: "mongodb://localhost:27017".to_string(),
            db_name: "ragbase".to_string(),
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "hashing".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 256,
            api_key: None,
            base_url: None,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            language: "english".to_string(),
            default_top_k: 5,
        }
    }
}

impl AppConfig {
    /// Layered load: optional config files, then `APP__`-prefixed
    /// environment variables. The bare `ENVIRONMENT` and `MONGO_URI`
    /// variables override the storage section afterwards.
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

        let mut config: Self = config.try_deserialize()?;

        if let Ok(environment) = std::env::var("ENVIRONMENT") {
            config.storage.environment = environment;
        }
        if let Ok(mongo_uri) = std::env::var("MONGO_URI") {
            config.storage.mongo_uri = mongo_uri;
        }

        Ok(config)
    }
}
