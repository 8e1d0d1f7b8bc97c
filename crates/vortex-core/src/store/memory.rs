//! In-process document store
//!
//! Backs the server binary and the test suite. Both collections and the
//! config singleton live behind a single `RwLock` each; `apply` and
//! `mark_posted` take one write-lock section, which is what makes them
//! atomic with respect to readers.

use super::{ConfigStore, ProductStore, SocialPostStore};
use crate::error::{Result, VortexError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use vortex_types::{
    AutomationConfig, PostStatus, Product, ProductId, ProductUpdate, SocialPost, SocialPostId,
};

#[derive(Default)]
pub struct MemoryStore {
    products: RwLock<HashMap<ProductId, Product>>,
    posts: RwLock<Vec<SocialPost>>,
    config: RwLock<Option<AutomationConfig>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn get(&self, id: &ProductId) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>> {
        Ok(self.products.read().await.values().cloned().collect())
    }

    async fn insert(&self, product: Product) -> Result<()> {
        let mut products = self.products.write().await;
        if products.contains_key(&product.id) {
            return Err(VortexError::Store(format!(
                "product {} already exists",
                product.id
            )));
        }
        products.insert(product.id.clone(), product);
        Ok(())
    }

    async fn apply(&self, id: &ProductId, update: ProductUpdate) -> Result<()> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(id)
            .ok_or_else(|| VortexError::NotFound(format!("product {}", id)))?;

        if let Some(status) = update.listing_status {
            product.listing_status = status;
        }
        if let Some(status) = update.halal_status {
            product.halal_status = status;
        }
        if let Some(reasoning) = update.halal_reasoning {
            product.halal_reasoning = Some(reasoning);
        }
        if let Some(fields) = update.enriched {
            product.enriched = Some(fields);
        }
        if let Some(external_id) = update.external_listing_id {
            product.external_listing_id = Some(external_id);
        }
        if let Some(reason) = update.rejection_reason {
            product.rejection_reason = reason;
        }
        if let Some(message) = update.error_message {
            product.error_message = message;
        }
        if let Some(at) = update.enriched_at {
            product.enriched_at = Some(at);
        }
        if let Some(at) = update.published_at {
            product.published_at = Some(at);
        }
        product.updated_at = Utc::now();

        Ok(())
    }
}

#[async_trait]
impl SocialPostStore for MemoryStore {
    async fn insert_posts(&self, new_posts: Vec<SocialPost>) -> Result<()> {
        // Single write-lock section keeps the batch all-or-nothing
        self.posts.write().await.extend(new_posts);
        Ok(())
    }

    async fn queued_posts(&self) -> Result<Vec<SocialPost>> {
        Ok(self
            .posts
            .read()
            .await
            .iter()
            .filter(|p| p.status == PostStatus::Queued)
            .cloned()
            .collect())
    }

    async fn mark_posted(&self, ids: &[SocialPostId]) -> Result<()> {
        let mut posts = self.posts.write().await;

        // Validate the whole batch before flipping anything
        for id in ids {
            if !posts.iter().any(|p| &p.id == id) {
                return Err(VortexError::NotFound(format!("social post {}", id)));
            }
        }

        for post in posts.iter_mut() {
            if ids.contains(&post.id) {
                post.status = PostStatus::Posted;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn automation_config(&self) -> Result<AutomationConfig> {
        Ok(self.config.read().await.clone().unwrap_or_default())
    }

    async fn set_automation_config(&self, config: AutomationConfig) -> Result<()> {
        *self.config.write().await = Some(config);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vortex_types::{AutomationIntensity, EnrichedFields, HalalStatus, ListingStatus};

    fn draft(title: &str) -> Product {
        Product::new_draft(
            title.to_string(),
            "Some description".to_string(),
            "general".to_string(),
            9.99,
            "USD".to_string(),
            vec!["gs://bucket/img.jpg".to_string()],
            "https://example.com/item".to_string(),
            "example.com".to_string(),
        )
    }

    #[tokio::test]
    async fn test_apply_merges_only_populated_fields() {
        let store = MemoryStore::new();
        let product = draft("Mug");
        let id = product.id.clone();
        let original_title = product.title.clone();
        store.insert(product).await.unwrap();

        let fields = EnrichedFields {
            seo_title: "Great Mug".to_string(),
            seo_description: "A very good mug.".to_string(),
            social_caption: "Mug!".to_string(),
            keywords: vec![],
        };
        store
            .apply(
                &id,
                ProductUpdate::enriched(fields, HalalStatus::Compliant, "Fine.".to_string()),
            )
            .await
            .unwrap();

        let stored = store.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.listing_status, ListingStatus::Enriched);
        assert_eq!(stored.halal_status, HalalStatus::Compliant);
        // Source fields untouched by the merge
        assert_eq!(stored.title, original_title);
        assert!(stored.enriched_at.is_some());
    }

    #[tokio::test]
    async fn test_apply_clears_error_via_nested_option() {
        let store = MemoryStore::new();
        let product = draft("Mug");
        let id = product.id.clone();
        store.insert(product).await.unwrap();

        store
            .apply(&id, ProductUpdate::failed_enrichment("boom".to_string()))
            .await
            .unwrap();
        assert_eq!(
            store.get(&id).await.unwrap().unwrap().error_message,
            Some("boom".to_string())
        );

        // Operator retry: clear the error and reset to draft in one write
        let reset = ProductUpdate {
            listing_status: Some(ListingStatus::Draft),
            error_message: Some(None),
            ..ProductUpdate::default()
        };
        store.apply(&id, reset).await.unwrap();

        let stored = store.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.listing_status, ListingStatus::Draft);
        assert!(stored.error_message.is_none());
    }

    #[tokio::test]
    async fn test_apply_unknown_id_errors() {
        let store = MemoryStore::new();
        let err = store
            .apply(&ProductId::new(), ProductUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, VortexError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = MemoryStore::new();
        let product = draft("Mug");
        store.insert(product.clone()).await.unwrap();
        assert!(store.insert(product).await.is_err());
    }

    #[tokio::test]
    async fn test_mark_posted_rejects_unknown_id_without_partial_flip() {
        let store = MemoryStore::new();
        let product = draft("Mug");
        let post = SocialPost::queued(
            product.id.clone(),
            product.title.clone(),
            vortex_types::SocialPlatform::X,
            "post body".to_string(),
            Utc::now(),
        );
        let known = post.id.clone();
        store.insert_posts(vec![post]).await.unwrap();

        let err = store
            .mark_posted(&[known.clone(), SocialPostId::new()])
            .await
            .unwrap_err();
        assert!(matches!(err, VortexError::NotFound(_)));

        // The known id must not have flipped as part of the failed batch
        let queued = store.queued_posts().await.unwrap();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].id, known);
    }

    #[tokio::test]
    async fn test_automation_config_defaults_when_absent() {
        let store = MemoryStore::new();
        let config = store.automation_config().await.unwrap();
        assert_eq!(config.automation_intensity, AutomationIntensity::Manual);

        store
            .set_automation_config(AutomationConfig {
                automation_intensity: AutomationIntensity::FullAuto,
                haram_filter_enabled: false,
                data_sources: vec![],
            })
            .await
            .unwrap();
        let config = store.automation_config().await.unwrap();
        assert_eq!(config.automation_intensity, AutomationIntensity::FullAuto);
    }
}
