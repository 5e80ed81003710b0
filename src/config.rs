//! Run configuration.
//!
//! Loaded from a JSON file; every field is optional and falls back to
//! its default.
//!
//! ```json
//! { "chunk_size": 500, "date_format": "%d/%m/%Y", "has_headers": true }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CHUNK_SIZE: usize = 100;
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Errors arising from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("chunk_size must be at least 1")]
    ZeroChunkSize,
    #[error("date_format must not be empty")]
    EmptyDateFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Rows read per batch.
    pub chunk_size: usize,
    /// `chrono` format string for instruction and settlement dates.
    pub date_format: String,
    /// Whether the first CSV row is a header.
    pub has_headers: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            has_headers: false,
        }
    }
}

impl ReportConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ReportConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.date_format.trim().is_empty() {
            return Err(ConfigError::EmptyDateFormat);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReportConfig::default();
        assert_eq!(config.chunk_size, 100);
        assert_eq!(config.date_format, "%d/%m/%Y");
        assert!(!config.has_headers);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ReportConfig::from_json_str(r#"{ "chunk_size": 5 }"#).unwrap();
        assert_eq!(config.chunk_size, 5);
        assert_eq!(config.date_format, DEFAULT_DATE_FORMAT);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let err = ReportConfig::from_json_str(r#"{ "chunk_size": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroChunkSize));
    }

    #[test]
    fn test_bad_json_rejected() {
        assert!(matches!(
            ReportConfig::from_json_str("{ chunk_size"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ReportConfig::load("/definitely/not/here.json"),
            Err(ConfigError::Io { .. })
        ));
    }
}
