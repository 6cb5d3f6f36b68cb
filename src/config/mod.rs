//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `BIZMATCH_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_EMBEDDING_CACHE_CAPACITY, DEFAULT_EMBEDDING_DIM, DEFAULT_PROPAGATION_MAX_ATTEMPTS,
    DEFAULT_PROPAGATION_WORKERS, DEFAULT_SNAPSHOT_FILENAME,
};

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `BIZMATCH_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Directory holding the company snapshot. Default: `./.data`.
    pub storage_path: PathBuf,

    /// Sentence-transformers model directory (`config.json`, `model.safetensors`,
    /// `tokenizer.json`) for the local embedder.
    pub model_path: Option<PathBuf>,

    /// Base URL of an OpenAI-compatible embeddings API (e.g. `http://host:8081/v1`).
    pub embedding_url: Option<String>,

    /// Model name sent to the embeddings API. Default: `all-MiniLM-L6-v2`.
    pub embedding_model: String,

    /// Bearer token for the embeddings API.
    pub embedding_api_key: Option<String>,

    /// Expected embedding dimension. Default: `384`.
    pub embedding_dim: usize,

    /// Max memoised embeddings for records stored without a vector. Default: `10_000`.
    pub embedding_cache_capacity: u64,

    /// Background propagation workers. Default: `2`.
    pub propagation_workers: usize,

    /// Attempts per propagation job before it is dropped. Default: `3`.
    pub propagation_max_attempts: u32,
}

/// Default embeddings model name.
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            storage_path: PathBuf::from("./.data"),
            model_path: None,
            embedding_url: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_api_key: None,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            embedding_cache_capacity: DEFAULT_EMBEDDING_CACHE_CAPACITY,
            propagation_workers: DEFAULT_PROPAGATION_WORKERS,
            propagation_max_attempts: DEFAULT_PROPAGATION_MAX_ATTEMPTS,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "BIZMATCH_PORT";
    const ENV_BIND_ADDR: &'static str = "BIZMATCH_BIND_ADDR";
    const ENV_STORAGE_PATH: &'static str = "BIZMATCH_STORAGE_PATH";
    const ENV_MODEL_PATH: &'static str = "BIZMATCH_MODEL_PATH";
    const ENV_EMBEDDING_URL: &'static str = "BIZMATCH_EMBEDDING_URL";
    const ENV_EMBEDDING_MODEL: &'static str = "BIZMATCH_EMBEDDING_MODEL";
    const ENV_EMBEDDING_API_KEY: &'static str = "BIZMATCH_EMBEDDING_API_KEY";
    const ENV_EMBEDDING_DIM: &'static str = "BIZMATCH_EMBEDDING_DIM";
    const ENV_EMBEDDING_CACHE_CAPACITY: &'static str = "BIZMATCH_EMBEDDING_CACHE_CAPACITY";
    const ENV_PROPAGATION_WORKERS: &'static str = "BIZMATCH_PROPAGATION_WORKERS";
    const ENV_PROPAGATION_MAX_ATTEMPTS: &'static str = "BIZMATCH_PROPAGATION_MAX_ATTEMPTS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let storage_path = Self::parse_path_from_env(Self::ENV_STORAGE_PATH, defaults.storage_path);
        let model_path = Self::parse_optional_path_from_env(Self::ENV_MODEL_PATH);
        let embedding_url = Self::parse_optional_string_from_env(Self::ENV_EMBEDDING_URL);
        let embedding_model =
            Self::parse_string_from_env(Self::ENV_EMBEDDING_MODEL, defaults.embedding_model);
        let embedding_api_key = Self::parse_optional_string_from_env(Self::ENV_EMBEDDING_API_KEY);
        let embedding_dim =
            Self::parse_u64_from_env(Self::ENV_EMBEDDING_DIM, defaults.embedding_dim as u64)
                as usize;
        let embedding_cache_capacity = Self::parse_u64_from_env(
            Self::ENV_EMBEDDING_CACHE_CAPACITY,
            defaults.embedding_cache_capacity,
        );
        let propagation_workers = Self::parse_u64_from_env(
            Self::ENV_PROPAGATION_WORKERS,
            defaults.propagation_workers as u64,
        ) as usize;
        let propagation_max_attempts = Self::parse_u64_from_env(
            Self::ENV_PROPAGATION_MAX_ATTEMPTS,
            defaults.propagation_max_attempts as u64,
        ) as u32;

        Ok(Self {
            port,
            bind_addr,
            storage_path,
            model_path,
            embedding_url,
            embedding_model,
            embedding_api_key,
            embedding_dim,
            embedding_cache_capacity,
            propagation_workers,
            propagation_max_attempts,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_path.exists() && !self.storage_path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.storage_path.clone(),
            });
        }

        if let Some(ref path) = self.model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        if let Some(ref url) = self.embedding_url {
            if self.model_path.is_some() {
                return Err(ConfigError::ConflictingEmbedders);
            }
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl { value: url.clone() });
            }
        }

        if self.embedding_dim == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_EMBEDDING_DIM,
                value: self.embedding_dim.to_string(),
            });
        }

        if self.propagation_workers == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_PROPAGATION_WORKERS,
                value: self.propagation_workers.to_string(),
            });
        }

        if self.propagation_max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_PROPAGATION_MAX_ATTEMPTS,
                value: self.propagation_max_attempts.to_string(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Location of the JSON snapshot inside [`Config::storage_path`].
    pub fn snapshot_path(&self) -> PathBuf {
        self.storage_path.join(DEFAULT_SNAPSHOT_FILENAME)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        Self::parse_optional_string_from_env(var_name).map(PathBuf::from)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}
