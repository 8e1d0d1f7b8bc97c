//! Secret/credential provider capability
//!
//! Supplies API keys and tokens on demand. A missing secret is a distinct
//! error that callers surface as a disabled capability, never as a per-item
//! failure.

use crate::error::{Result, VortexError};
use async_trait::async_trait;

/// Secret name for the AI content service API key
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Secret name for the Shopify admin access token
pub const SHOPIFY_ADMIN_ACCESS_TOKEN: &str = "SHOPIFY_ADMIN_ACCESS_TOKEN";
/// Secret name for the Shopify store base URL
pub const SHOPIFY_STORE_URL: &str = "SHOPIFY_STORE_URL";

/// Capability for fetching the latest value of a named secret
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Returns the latest value of the named secret, or
    /// [`VortexError::SecretNotConfigured`] when it does not exist.
    async fn get(&self, name: &str) -> Result<String>;
}

/// Secret provider backed by process environment variables
pub struct EnvSecretProvider;

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn get(&self, name: &str) -> Result<String> {
        match std::env::var(name) {
            Ok(value) if !value.is_empty() => Ok(value),
            _ => Err(VortexError::SecretNotConfigured(name.to_string())),
        }
    }
}

/// In-memory provider for tests
pub struct MapSecretProvider {
    secrets: std::collections::HashMap<String, String>,
}

impl MapSecretProvider {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        Self {
            secrets: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self::new(&[])
    }
}

#[async_trait]
impl SecretProvider for MapSecretProvider {
    async fn get(&self, name: &str) -> Result<String> {
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| VortexError::SecretNotConfigured(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_secret_is_a_distinct_error() {
        let provider = MapSecretProvider::empty();
        let err = provider.get(SHOPIFY_ADMIN_ACCESS_TOKEN).await.unwrap_err();
        assert!(err.is_capability_unavailable());
        assert!(err.to_string().contains("SHOPIFY_ADMIN_ACCESS_TOKEN"));
    }

    #[tokio::test]
    async fn test_present_secret_resolves() {
        let provider = MapSecretProvider::new(&[(OPENAI_API_KEY, "sk-test")]);
        assert_eq!(provider.get(OPENAI_API_KEY).await.unwrap(), "sk-test");
    }

    #[tokio::test]
    async fn test_env_provider_empty_value_counts_as_missing() {
        std::env::set_var("VORTEX_TEST_EMPTY_SECRET", "");
        let provider = EnvSecretProvider;
        let err = provider.get("VORTEX_TEST_EMPTY_SECRET").await.unwrap_err();
        assert!(matches!(err, VortexError::SecretNotConfigured(_)));
    }
}
