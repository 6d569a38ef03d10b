//! Configuration management for the face gateway
//!
//! Loads configuration from environment variables with sensible defaults.
//! The detection API credentials have no defaults and must be set.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server host
    pub gateway_host: String,

    /// API server port
    pub gateway_port: u16,

    /// Face detection API endpoint
    pub face_api_url: String,

    /// Face detection API key
    pub face_api_key: String,

    /// Face detection API secret
    pub face_api_secret: String,

    /// Client-level timeout for detection calls
    pub detect_timeout: Duration,

    /// Redis URL for the metadata store
    pub metadata_redis_url: String,

    /// Redis URL for the blob store
    pub blob_redis_url: String,

    /// Maximum accepted upload size in bytes
    pub max_image_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let config = Config {
            gateway_host: env::var("GATEWAY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),

            gateway_port: env::var("GATEWAY_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid GATEWAY_PORT")?,

            face_api_url: env::var("FACE_API").context("FACE_API must be set")?,

            face_api_key: env::var("FACE_KEY").context("FACE_KEY must be set")?,

            face_api_secret: env::var("FACE_SECRET").context("FACE_SECRET must be set")?,

            detect_timeout: Duration::from_secs(
                env::var("DETECT_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "600".to_string())
                    .parse()
                    .context("Invalid DETECT_TIMEOUT_SECS")?,
            ),

            metadata_redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379/0".to_string()),

            blob_redis_url: env::var("BLOB_REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379/1".to_string()),

            max_image_bytes: env::var("MAX_IMAGE_BYTES")
                .unwrap_or_else(|_| "10485760".to_string())
                .parse()
                .context("Invalid MAX_IMAGE_BYTES")?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.gateway_port == 0 {
            anyhow::bail!("GATEWAY_PORT must be greater than 0");
        }

        if self.face_api_url.is_empty() {
            anyhow::bail!("FACE_API must not be empty");
        }

        if self.face_api_key.is_empty() || self.face_api_secret.is_empty() {
            anyhow::bail!("FACE_KEY and FACE_SECRET must not be empty");
        }

        if self.max_image_bytes == 0 {
            anyhow::bail!("MAX_IMAGE_BYTES must be greater than 0");
        }

        Ok(())
    }

    /// Get the API server address
    pub fn gateway_address(&self) -> String {
        format!("{}:{}", self.gateway_host, self.gateway_port)
    }
}
