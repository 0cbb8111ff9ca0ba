use std::collections::HashMap;
use thiserror::Error;

/// Default chunk size for bulk id resolution.
const DEFAULT_RESOLVE_BATCH_SIZE: usize = 50_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub resolve_batch_size: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let resolve_batch_size = match env_map.get("RESOLVE_BATCH_SIZE") {
            Some(value) => value.parse::<usize>().map_err(|_| {
                ConfigError::InvalidValue(
                    "RESOLVE_BATCH_SIZE".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?,
            None => DEFAULT_RESOLVE_BATCH_SIZE,
        };
        if resolve_batch_size == 0 {
            return Err(ConfigError::InvalidValue(
                "RESOLVE_BATCH_SIZE".to_string(),
                "must be a positive integer".to_string(),
            ));
        }

        Ok(Config {
            database_path,
            resolve_batch_size,
        })
    }
}
