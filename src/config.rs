use crate::processing::{ChunkParams, ChunkingError, validate::DEFAULT_MAX_UPLOAD_BYTES};
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
    /// Chunk size and overlap do not form a usable pair.
    #[error("Invalid chunking configuration: {0}")]
    InvalidChunking(#[from] ChunkingError),
}

/// Runtime configuration for the ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Chunk size and overlap (`CHUNK_SIZE`, `CHUNK_OVERLAP`).
    pub chunk_params: ChunkParams,
    /// Upload size limit in bytes (`MAX_UPLOAD_BYTES`).
    pub max_upload_bytes: usize,
    /// Optional log file path (`INGEST_LOG_FILE`).
    pub log_file: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let chunk_size =
            parse_optional(&lookup, "CHUNK_SIZE")?.unwrap_or(ChunkParams::DEFAULT_MAX_SIZE);
        let chunk_overlap =
            parse_optional(&lookup, "CHUNK_OVERLAP")?.unwrap_or(ChunkParams::DEFAULT_OVERLAP);

        Ok(Self {
            chunk_params: ChunkParams::new(chunk_size, chunk_overlap)?,
            max_upload_bytes: parse_optional(&lookup, "MAX_UPLOAD_BYTES")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            log_file: load_optional(&lookup, "INGEST_LOG_FILE"),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_params: ChunkParams::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_file: None,
        }
    }
}

fn load_optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn parse_optional<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    load_optional(lookup, key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load configuration from `.env` and the environment and install it in the global cache.
///
/// Later calls return the already installed configuration.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    Ok(CONFIG.get_or_init(|| config))
}
