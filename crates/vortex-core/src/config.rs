//! Configuration management for the Vortex pipeline
//!
//! Settings only - API keys and tokens never live in this file, they are
//! supplied at runtime by the [`crate::secrets::SecretProvider`].

use crate::error::{Result, VortexError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure, loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VortexConfig {
    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub shopify: ShopifyConfig,

    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_openai_model")]
    pub model: String,

    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_openai_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopifyConfig {
    #[serde(default = "default_shopify_api_version")]
    pub api_version: String,

    #[serde(default = "default_shopify_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seconds between product-collection snapshots taken by the watchers
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Seconds between publish sweeps over queued social posts
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

// Default functions
fn default_openai_model() -> String {
    "gpt-4-turbo-preview".to_string()
}

fn default_openai_timeout() -> u64 {
    60
}

fn default_shopify_api_version() -> String {
    "2024-04".to_string()
}

fn default_shopify_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    5
}

fn default_sweep_interval() -> u64 {
    60
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: default_openai_model(),
            base_url: None,
            timeout_secs: default_openai_timeout(),
        }
    }
}

impl Default for ShopifyConfig {
    fn default() -> Self {
        Self {
            api_version: default_shopify_api_version(),
            timeout_secs: default_shopify_timeout(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl Default for VortexConfig {
    fn default() -> Self {
        Self {
            openai: OpenAiConfig::default(),
            shopify: ShopifyConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl VortexConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| VortexError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_json_str(&content)
    }

    /// Load configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: VortexConfig = serde_json::from_str(json)
            .map_err(|e| VortexError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.openai.model.is_empty() {
            return Err(VortexError::Config("OpenAI model is required".to_string()));
        }

        if self.openai.timeout_secs == 0 || self.shopify.timeout_secs == 0 {
            return Err(VortexError::Config(
                "Client timeouts must be non-zero".to_string(),
            ));
        }

        if self.engine.poll_interval_secs == 0 || self.engine.sweep_interval_secs == 0 {
            return Err(VortexError::Config(
                "Engine intervals must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}
