//! Shopify publication adapter
//!
//! Creates draft listings via the admin REST API. Success is a 2xx with a
//! product id in the body; anything else is a failure carrying the response
//! text as diagnostic.

use crate::config::ShopifyConfig;
use crate::engine::traits::{ListingPayload, PublicationAdapter, PublishCredentials};
use crate::error::{Result, VortexError};
use async_trait::async_trait;
use log::info;
use reqwest::Client as HttpClient;
use serde_json::{json, Value};

pub struct ShopifyClient {
    config: ShopifyConfig,
    http_client: HttpClient,
}

impl ShopifyClient {
    pub fn new(config: ShopifyConfig) -> Self {
        let http_client = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    fn request_body(payload: &ListingPayload) -> Value {
        json!({
            "product": {
                "title": payload.title,
                "body_html": payload.body_html,
                "vendor": payload.vendor,
                "status": "draft",
                "images": payload.images.iter().map(|src| json!({ "src": src })).collect::<Vec<_>>(),
            }
        })
    }

    /// Pluck the created product id from the response body; Shopify returns
    /// it as a number.
    fn extract_listing_id(body: &Value) -> Result<String> {
        let id = &body["product"]["id"];
        if let Some(id) = id.as_i64() {
            return Ok(id.to_string());
        }
        if let Some(id) = id.as_str() {
            return Ok(id.to_string());
        }
        Err(VortexError::ServiceUnavailable(
            "Shopify response carried no product id".to_string(),
        ))
    }
}

#[async_trait]
impl PublicationAdapter for ShopifyClient {
    async fn create_draft_listing(
        &self,
        credentials: &PublishCredentials,
        payload: &ListingPayload,
    ) -> Result<String> {
        let url = format!(
            "{}/admin/api/{}/products.json",
            credentials.store_url.trim_end_matches('/'),
            self.config.api_version
        );

        let response = self
            .http_client
            .post(&url)
            .header("X-Shopify-Access-Token", &credentials.access_token)
            .header("Content-Type", "application/json")
            .json(&Self::request_body(payload))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(VortexError::ServiceUnavailable(format!(
                "Shopify returned {}: {}",
                status, error_text
            )));
        }

        let body: Value = response.json().await?;
        let listing_id = Self::extract_listing_id(&body)?;
        info!("Created Shopify draft listing {}", listing_id);
        Ok(listing_id)
    }
}
