//! Data models and structures
//!
//! Defines the wire types for the `/api/generate` endpoint and the client
//! configuration loaded from the environment.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const GENERATE_PATH: &str = "/api/generate";
pub const DEFAULT_HEIGHT: u32 = 1024;
pub const DEFAULT_WIDTH: u32 = 1024;
pub const DEFAULT_STEPS: u32 = 8;
pub const DEFAULT_STRENGTH: f32 = 0.8;
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub height: u32,
    pub width: u32,
    pub steps: u32,
    /// Reference image as a data URL; serialized as `null` when absent.
    pub image: Option<String>,
    pub strength: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub guidance_scale: Option<f32>,
}

impl GenerationRequest {
    /// Build a request with the fixed dimensions and step count.
    ///
    /// Returns `None` when the prompt is empty after trimming; such a request
    /// must never be sent.
    pub fn new(prompt: &str, image: Option<String>, strength: f32) -> Option<Self> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return None;
        }

        Some(Self {
            prompt: prompt.to_string(),
            height: DEFAULT_HEIGHT,
            width: DEFAULT_WIDTH,
            steps: DEFAULT_STEPS,
            image,
            strength: Some(strength),
            seed: None,
            guidance_scale: None,
        })
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_guidance_scale(mut self, guidance_scale: Option<f32>) -> Self {
        self.guidance_scale = guidance_scale;
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    pub image: String,
}

/// Error body returned with any non-2xx status.
///
/// `detail` is usually a string but validation failures carry a structured
/// value, so it is kept as raw JSON.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub detail: serde_json::Value,
}

impl ErrorResponse {
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Validate a strength value coming from a slider or the command line.
pub fn validate_strength(strength: f32) -> Result<f32> {
    if !(0.0..=1.0).contains(&strength) {
        return Err(Error::InvalidInput(format!(
            "strength must be between 0.0 and 1.0, got {}",
            strength
        )));
    }
    Ok(strength)
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub request_timeout: Option<Duration>,
    pub max_upload_bytes: u64,
    pub default_strength: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            default_strength: DEFAULT_STRENGTH,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let request_timeout = lookup("ZIMAGE_TIMEOUT_SECS")
            .map(|raw| {
                raw.parse::<u64>().map(Duration::from_secs).map_err(|_| {
                    Error::Config(format!("ZIMAGE_TIMEOUT_SECS is not a number: {}", raw))
                })
            })
            .transpose()?;

        let max_upload_bytes = match lookup("ZIMAGE_MAX_UPLOAD_BYTES") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                Error::Config(format!("ZIMAGE_MAX_UPLOAD_BYTES is not a number: {}", raw))
            })?,
            None => defaults.max_upload_bytes,
        };

        let default_strength = match lookup("ZIMAGE_DEFAULT_STRENGTH") {
            Some(raw) => {
                let value = raw.parse::<f32>().map_err(|_| {
                    Error::Config(format!("ZIMAGE_DEFAULT_STRENGTH is not a number: {}", raw))
                })?;
                validate_strength(value).map_err(|e| Error::Config(e.to_string()))?
            }
            None => defaults.default_strength,
        };

        Ok(Self {
            base_url: lookup("ZIMAGE_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            request_timeout,
            max_upload_bytes,
            default_strength,
        })
    }
}
