use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the docflow server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Credential for the hosted summarization backend. Absence disables
    /// summarization; the server binary refuses to start without it.
    pub openai_api_key: Option<String>,
    /// Optional base URL override for the summarization API (proxies, tests).
    pub openai_base_url: Option<String>,
    /// Chat model used for summaries.
    pub openai_model: String,
    /// Base URL of the OCR extraction service.
    pub ocr_service_url: String,
    /// Directory that receives persisted similarity-index files.
    pub index_dir: String,
    /// Words per chunk when splitting page text for indexing.
    pub chunk_size: usize,
    /// Words carried over between adjacent chunks.
    pub chunk_overlap: usize,
    /// Dimensionality of the produced embedding vectors.
    pub embedding_dimension: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_INDEX_DIR: &str = "embeddings";
const DEFAULT_CHUNK_SIZE: usize = 250;
const DEFAULT_CHUNK_OVERLAP: usize = 50;
const DEFAULT_EMBEDDING_DIMENSION: usize = 384;

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            openai_api_key: load_env_optional("OPENAI_API_KEY"),
            openai_base_url: load_env_optional("OPENAI_BASE_URL"),
            openai_model: load_env_optional("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            ocr_service_url: load_env("OCR_SERVICE_URL")?,
            index_dir: load_env_optional("INDEX_DIR")
                .unwrap_or_else(|| DEFAULT_INDEX_DIR.to_string()),
            chunk_size: load_env_usize("CHUNK_SIZE")?.unwrap_or(DEFAULT_CHUNK_SIZE),
            chunk_overlap: load_env_usize("CHUNK_OVERLAP")?.unwrap_or(DEFAULT_CHUNK_OVERLAP),
            embedding_dimension: load_env_usize("EMBEDDING_DIMENSION")?
                .unwrap_or(DEFAULT_EMBEDDING_DIMENSION),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn load_env_usize(key: &str) -> Result<Option<usize>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        ocr_service_url = %config.ocr_service_url,
        index_dir = %config.index_dir,
        chunk_size = config.chunk_size,
        chunk_overlap = config.chunk_overlap,
        server_port = ?config.server_port,
        summarization_enabled = config.openai_api_key.is_some(),
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
