//! Product lifecycle engine
//!
//! Drives the two status transitions the pipeline owns: draft products get
//! one combined compliance-and-copywriting pass, and newly approved products
//! get published to the commerce platform exactly once. Failures are caught
//! at the operation boundary and converted into a document write - one
//! item's failure never stops the engine.

use crate::engine::traits::{
    AiContentService, EnrichmentRequest, ListingPayload, PublicationAdapter, PublishCredentials,
};
use crate::error::Result;
use crate::secrets::{SecretProvider, SHOPIFY_ADMIN_ACCESS_TOKEN, SHOPIFY_STORE_URL};
use crate::store::{ConfigStore, ProductStore};
use log::{debug, error, info, warn};
use std::sync::Arc;
use vortex_types::{HalalStatus, ListingStatus, Product, ProductUpdate};

const STORAGE_SCHEME: &str = "gs://";
const PUBLIC_STORAGE_HOST: &str = "https://storage.googleapis.com/";

pub struct LifecycleEngine<A, P, R, S> {
    /// Absent when the AI key is not configured; enrichment is then a
    /// logged no-op, recoverable by re-trigger after restart.
    ai: Option<Arc<A>>,
    publisher: Arc<P>,
    secrets: Arc<R>,
    store: Arc<S>,
}

impl<A, P, R, S> LifecycleEngine<A, P, R, S>
where
    A: AiContentService,
    P: PublicationAdapter,
    R: SecretProvider,
    S: ProductStore + ConfigStore,
{
    pub fn new(ai: Option<Arc<A>>, publisher: Arc<P>, secrets: Arc<R>, store: Arc<S>) -> Self {
        Self {
            ai,
            publisher,
            secrets,
            store,
        }
    }

    pub fn enrichment_enabled(&self) -> bool {
        self.ai.is_some()
    }

    /// Handle a newly created product document.
    ///
    /// Exactly one document update comes out of this: either the full
    /// enrichment payload and the new status together, or only the failure
    /// fields. `Err` is returned only when even the failure write failed.
    pub async fn handle_created(&self, product: &Product) -> Result<()> {
        let Some(ai) = self.ai.as_ref() else {
            info!(
                "AI content service not available, skipping enrichment for product {}",
                product.id
            );
            return Ok(());
        };

        // Re-validate against the store: duplicate or stale change events
        // must not re-enrich a product that already moved on.
        match self.store.get(&product.id).await {
            Ok(Some(current)) if current.listing_status == ListingStatus::Draft => {}
            Ok(_) => {
                debug!(
                    "Product {} is no longer a draft, skipping enrichment",
                    product.id
                );
                return Ok(());
            }
            Err(e) => {
                warn!(
                    "Could not read product {} before enrichment: {}",
                    product.id, e
                );
                return Ok(());
            }
        }

        info!("Starting enrichment for product {}", product.id);

        match self.run_enrichment(ai.as_ref(), product).await {
            Ok(update) => {
                let status = update.listing_status;
                if let Err(e) = self.store.apply(&product.id, update).await {
                    error!("Enrichment write failed for product {}: {}", product.id, e);
                    return self
                        .store
                        .apply(
                            &product.id,
                            ProductUpdate::failed_enrichment(format!("store write failed: {}", e)),
                        )
                        .await;
                }
                info!(
                    "Enrichment finished for product {} with status {:?}",
                    product.id, status
                );
                Ok(())
            }
            Err(e) => {
                error!("Enrichment failed for product {}: {}", product.id, e);
                self.store
                    .apply(&product.id, ProductUpdate::failed_enrichment(e.to_string()))
                    .await
            }
        }
    }

    async fn run_enrichment(&self, ai: &A, product: &Product) -> Result<ProductUpdate> {
        let config = self.store.automation_config().await?;

        let request = EnrichmentRequest {
            title: product.title.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            check_compliance: config.haram_filter_enabled,
        };
        let outcome = ai.enrich(&request).await?;

        // Only a compliant verdict advances; everything else - including an
        // unrecognized verdict folded to indeterminate - is a rejection.
        Ok(match outcome.halal_status {
            HalalStatus::Compliant => ProductUpdate::enriched(
                outcome.fields,
                HalalStatus::Compliant,
                outcome.halal_reasoning,
            ),
            status => ProductUpdate::rejected(status, outcome.halal_reasoning),
        })
    }

    /// Handle a product update event, publishing on the edge into `Approved`.
    ///
    /// Edge-triggered: re-saving an already-approved document does not
    /// re-fire. Duplicate delivery is absorbed by the external-id guard and
    /// a fresh read of the document before acting.
    pub async fn handle_approved(&self, before: &Product, after: &Product) -> Result<()> {
        if after.listing_status != ListingStatus::Approved
            || before.listing_status == ListingStatus::Approved
        {
            return Ok(());
        }

        self.publish_pending(after).await
    }

    /// Publish a product found already approved with no external listing,
    /// e.g. approved while the process was down. Same guards as the edge
    /// handler: the external-id check and the fresh read absorb duplicates.
    pub async fn handle_pending_approval(&self, product: &Product) -> Result<()> {
        self.publish_pending(product).await
    }

    async fn publish_pending(&self, after: &Product) -> Result<()> {
        if after.external_listing_id.is_some() {
            info!(
                "Product {} already has an external listing id, skipping publish",
                after.id
            );
            return Ok(());
        }

        // Read-modify-decide-write: trust current store state, not the
        // event payload, in case events arrived duplicated or out of order.
        let current = match self.store.get(&after.id).await {
            Ok(Some(p)) => p,
            Ok(None) => {
                warn!("Product {} vanished before publish", after.id);
                return Ok(());
            }
            Err(e) => {
                warn!("Could not read product {} before publish: {}", after.id, e);
                return Ok(());
            }
        };
        if current.listing_status != ListingStatus::Approved
            || current.external_listing_id.is_some()
        {
            debug!("Product {} is no longer pending publish, skipping", after.id);
            return Ok(());
        }

        // Credentials come fresh per attempt. A not-configured secret
        // disables the publication class entirely - the product stays
        // approved and re-driveable, no per-item error state.
        let credentials = match self.publish_credentials().await {
            Ok(c) => c,
            Err(e) if e.is_capability_unavailable() => {
                warn!("Publication disabled: {}", e);
                return Ok(());
            }
            Err(e) => {
                error!("Credential fetch failed for product {}: {}", after.id, e);
                return self
                    .store
                    .apply(&after.id, ProductUpdate::failed_publish(e.to_string()))
                    .await;
            }
        };

        info!("Starting publish for product {}", current.id);

        let payload = match build_listing_payload(&current) {
            Ok(p) => p,
            Err(reason) => {
                error!("Publish precondition failed for product {}: {}", current.id, reason);
                return self
                    .store
                    .apply(&current.id, ProductUpdate::failed_publish(reason))
                    .await;
            }
        };

        match self
            .publisher
            .create_draft_listing(&credentials, &payload)
            .await
        {
            Ok(listing_id) => {
                info!(
                    "Published product {} as external listing {}",
                    current.id, listing_id
                );
                self.store
                    .apply(&current.id, ProductUpdate::published(listing_id))
                    .await
            }
            Err(e) => {
                error!("Publish failed for product {}: {}", current.id, e);
                self.store
                    .apply(&current.id, ProductUpdate::failed_publish(e.to_string()))
                    .await
            }
        }
    }

    async fn publish_credentials(&self) -> Result<PublishCredentials> {
        let access_token = self.secrets.get(SHOPIFY_ADMIN_ACCESS_TOKEN).await?;
        let store_url = self.secrets.get(SHOPIFY_STORE_URL).await?;
        Ok(PublishCredentials {
            access_token,
            store_url,
        })
    }
}

/// Build the draft listing payload: enriched copy preferred, source fields
/// as fallback, storage-scheme image refs rewritten to public HTTPS URLs.
fn build_listing_payload(product: &Product) -> std::result::Result<ListingPayload, String> {
    if product.images.is_empty() {
        return Err(format!(
            "product {} has no images to publish",
            product.id
        ));
    }

    let (title, body_html) = match &product.enriched {
        Some(fields) => (fields.seo_title.clone(), fields.seo_description.clone()),
        None => (product.title.clone(), product.description.clone()),
    };

    Ok(ListingPayload {
        title,
        body_html,
        vendor: product.source_domain.clone(),
        images: product.images.iter().map(|src| public_image_url(src)).collect(),
    })
}

fn public_image_url(src: &str) -> String {
    match src.strip_prefix(STORAGE_SCHEME) {
        Some(rest) => format!("{}{}", PUBLIC_STORAGE_HOST, rest),
        None => src.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::traits::{EnrichmentOutcome, PlannedPost, PostPlanRequest};
    use crate::error::VortexError;
    use crate::secrets::MapSecretProvider;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use tokio::sync::Mutex;
    use vortex_types::{AutomationConfig, AutomationIntensity, EnrichedFields};

    enum AiScript {
        Outcome(EnrichmentOutcome),
        Fail(String),
    }

    struct MockAi {
        script: AiScript,
        requests: Mutex<Vec<EnrichmentRequest>>,
    }

    impl MockAi {
        fn returning(outcome: EnrichmentOutcome) -> Self {
            Self {
                script: AiScript::Outcome(outcome),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                script: AiScript::Fail(message.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AiContentService for MockAi {
        async fn enrich(&self, request: &EnrichmentRequest) -> Result<EnrichmentOutcome> {
            self.requests.lock().await.push(request.clone());
            match &self.script {
                AiScript::Outcome(outcome) => Ok(outcome.clone()),
                AiScript::Fail(message) => {
                    Err(VortexError::ServiceUnavailable(message.clone()))
                }
            }
        }

        async fn plan_posts(&self, _request: &PostPlanRequest) -> Result<Vec<PlannedPost>> {
            Err(VortexError::Validation("not under test".to_string()))
        }
    }

    struct MockPublisher {
        fail_with: Option<String>,
        calls: Mutex<Vec<ListingPayload>>,
    }

    impl MockPublisher {
        fn succeeding() -> Self {
            Self {
                fail_with: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                fail_with: Some(message.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        async fn call_count(&self) -> usize {
            self.calls.lock().await.len()
        }
    }

    #[async_trait]
    impl PublicationAdapter for MockPublisher {
        async fn create_draft_listing(
            &self,
            _credentials: &PublishCredentials,
            payload: &ListingPayload,
        ) -> Result<String> {
            self.calls.lock().await.push(payload.clone());
            match &self.fail_with {
                Some(message) => Err(VortexError::ServiceUnavailable(message.clone())),
                None => Ok("8842".to_string()),
            }
        }
    }

    fn compliant_outcome() -> EnrichmentOutcome {
        EnrichmentOutcome {
            halal_status: HalalStatus::Compliant,
            halal_reasoning: "No prohibited content.".to_string(),
            fields: EnrichedFields {
                seo_title: "Handmade Ceramic Mug Under 60".to_string(),
                seo_description: "A beautiful handmade ceramic mug.".to_string(),
                social_caption: "New mug! [AFFILIATE_LINK]".to_string(),
                keywords: vec!["mug".to_string()],
            },
        }
    }

    fn rejected_outcome() -> EnrichmentOutcome {
        EnrichmentOutcome {
            halal_status: HalalStatus::NonCompliant,
            halal_reasoning: "Product contains wine.".to_string(),
            fields: compliant_outcome().fields,
        }
    }

    fn draft_product() -> Product {
        Product::new_draft(
            "Ceramic Mug".to_string(),
            "A handmade ceramic mug.".to_string(),
            "homeware".to_string(),
            19.99,
            "USD".to_string(),
            vec!["gs://bucket/mug.jpg".to_string()],
            "https://example.com/mug".to_string(),
            "example.com".to_string(),
        )
    }

    fn shopify_secrets() -> Arc<MapSecretProvider> {
        Arc::new(MapSecretProvider::new(&[
            (SHOPIFY_ADMIN_ACCESS_TOKEN, "shpat-test"),
            (SHOPIFY_STORE_URL, "https://test.myshopify.com"),
        ]))
    }

    fn engine(
        ai: Option<Arc<MockAi>>,
        publisher: Arc<MockPublisher>,
        secrets: Arc<MapSecretProvider>,
        store: Arc<MemoryStore>,
    ) -> LifecycleEngine<MockAi, MockPublisher, MapSecretProvider, MemoryStore> {
        LifecycleEngine::new(ai, publisher, secrets, store)
    }

    async fn seeded(store: &MemoryStore, product: &Product) {
        store.insert(product.clone()).await.unwrap();
    }

    #[tokio::test]
    async fn test_compliant_verdict_enriches() {
        let store = Arc::new(MemoryStore::new());
        let product = draft_product();
        seeded(&store, &product).await;

        let engine = engine(
            Some(Arc::new(MockAi::returning(compliant_outcome()))),
            Arc::new(MockPublisher::succeeding()),
            shopify_secrets(),
            store.clone(),
        );
        engine.handle_created(&product).await.unwrap();

        let stored = ProductStore::get(store.as_ref(), &product.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.listing_status, ListingStatus::Enriched);
        assert_eq!(stored.halal_status, HalalStatus::Compliant);
        let enriched = stored.enriched.unwrap();
        assert!(enriched.seo_title.chars().count() <= 60);
        assert!(enriched.seo_description.chars().count() <= 160);
        assert!(stored.error_message.is_none());
        assert!(stored.enriched_at.is_some());
    }

    #[tokio::test]
    async fn test_non_compliant_verdict_rejects_without_enrichment() {
        let store = Arc::new(MemoryStore::new());
        let product = draft_product();
        seeded(&store, &product).await;

        let engine = engine(
            Some(Arc::new(MockAi::returning(rejected_outcome()))),
            Arc::new(MockPublisher::succeeding()),
            shopify_secrets(),
            store.clone(),
        );
        engine.handle_created(&product).await.unwrap();

        let stored = ProductStore::get(store.as_ref(), &product.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.listing_status, ListingStatus::Rejected);
        assert!(stored.enriched.is_none());
        assert_eq!(
            stored.rejection_reason,
            Some("Product contains wine.".to_string())
        );
    }

    #[tokio::test]
    async fn test_indeterminate_verdict_also_rejects() {
        let store = Arc::new(MemoryStore::new());
        let product = draft_product();
        seeded(&store, &product).await;

        let outcome = EnrichmentOutcome {
            halal_status: HalalStatus::Indeterminate,
            halal_reasoning: "Ingredients unclear.".to_string(),
            fields: compliant_outcome().fields,
        };
        let engine = engine(
            Some(Arc::new(MockAi::returning(outcome))),
            Arc::new(MockPublisher::succeeding()),
            shopify_secrets(),
            store.clone(),
        );
        engine.handle_created(&product).await.unwrap();

        let stored = ProductStore::get(store.as_ref(), &product.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.listing_status, ListingStatus::Rejected);
        assert_eq!(stored.halal_status, HalalStatus::Indeterminate);
        assert!(stored.enriched.is_none());
    }

    #[tokio::test]
    async fn test_ai_failure_marks_failed_enrichment_and_keeps_source_fields() {
        let store = Arc::new(MemoryStore::new());
        let product = draft_product();
        seeded(&store, &product).await;

        let engine = engine(
            Some(Arc::new(MockAi::failing("connection reset"))),
            Arc::new(MockPublisher::succeeding()),
            shopify_secrets(),
            store.clone(),
        );
        engine.handle_created(&product).await.unwrap();

        let stored = ProductStore::get(store.as_ref(), &product.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.listing_status, ListingStatus::FailedEnrichment);
        let message = stored.error_message.unwrap();
        assert!(!message.is_empty());
        // Prior fields untouched by the failure write
        assert_eq!(stored.title, product.title);
        assert_eq!(stored.description, product.description);
    }

    #[tokio::test]
    async fn test_missing_ai_capability_is_a_noop() {
        let store = Arc::new(MemoryStore::new());
        let product = draft_product();
        seeded(&store, &product).await;

        let engine = engine(
            None,
            Arc::new(MockPublisher::succeeding()),
            shopify_secrets(),
            store.clone(),
        );
        engine.handle_created(&product).await.unwrap();

        let stored = ProductStore::get(store.as_ref(), &product.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.listing_status, ListingStatus::Draft);
        assert!(stored.error_message.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_created_event_does_not_reenrich() {
        let store = Arc::new(MemoryStore::new());
        let product = draft_product();
        seeded(&store, &product).await;

        let ai = Arc::new(MockAi::returning(compliant_outcome()));
        let engine = engine(
            Some(ai.clone()),
            Arc::new(MockPublisher::succeeding()),
            shopify_secrets(),
            store.clone(),
        );
        engine.handle_created(&product).await.unwrap();
        // Same event delivered again; the product is no longer a draft
        engine.handle_created(&product).await.unwrap();

        assert_eq!(ai.requests.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_compliance_skipped_when_filter_disabled() {
        let store = Arc::new(MemoryStore::new());
        store
            .set_automation_config(AutomationConfig {
                automation_intensity: AutomationIntensity::Manual,
                haram_filter_enabled: false,
                data_sources: vec![],
            })
            .await
            .unwrap();
        let product = draft_product();
        seeded(&store, &product).await;

        let ai = Arc::new(MockAi::returning(compliant_outcome()));
        let engine = engine(
            Some(ai.clone()),
            Arc::new(MockPublisher::succeeding()),
            shopify_secrets(),
            store.clone(),
        );
        engine.handle_created(&product).await.unwrap();

        let requests = ai.requests.lock().await;
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].check_compliance);
    }

    async fn approved_product(store: &MemoryStore, with_enrichment: bool) -> (Product, Product) {
        let mut product = draft_product();
        product.listing_status = ListingStatus::Enriched;
        product.halal_status = HalalStatus::Compliant;
        if with_enrichment {
            product.enriched = Some(compliant_outcome().fields);
        }
        store.insert(product.clone()).await.unwrap();

        let before = product.clone();
        let mut after = product.clone();
        after.listing_status = ListingStatus::Approved;
        store
            .apply(
                &product.id,
                ProductUpdate {
                    listing_status: Some(ListingStatus::Approved),
                    ..ProductUpdate::default()
                },
            )
            .await
            .unwrap();
        product.listing_status = ListingStatus::Approved;
        (before, after)
    }

    #[tokio::test]
    async fn test_approval_publishes_and_links_external_id() {
        let store = Arc::new(MemoryStore::new());
        let (before, after) = approved_product(&store, true).await;

        let publisher = Arc::new(MockPublisher::succeeding());
        let engine = engine(None, publisher.clone(), shopify_secrets(), store.clone());
        engine.handle_approved(&before, &after).await.unwrap();

        let stored = ProductStore::get(store.as_ref(), &after.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.listing_status, ListingStatus::Published);
        assert_eq!(stored.external_listing_id, Some("8842".to_string()));
        assert!(stored.published_at.is_some());

        // Enriched copy preferred and the image ref rewritten to HTTPS
        let calls = publisher.calls.lock().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].title, "Handmade Ceramic Mug Under 60");
        assert_eq!(
            calls[0].images[0],
            "https://storage.googleapis.com/bucket/mug.jpg"
        );
    }

    #[tokio::test]
    async fn test_duplicate_approval_event_publishes_once() {
        let store = Arc::new(MemoryStore::new());
        let (before, after) = approved_product(&store, true).await;

        let publisher = Arc::new(MockPublisher::succeeding());
        let engine = engine(None, publisher.clone(), shopify_secrets(), store.clone());
        engine.handle_approved(&before, &after).await.unwrap();
        // At-least-once delivery hands us the same event again
        engine.handle_approved(&before, &after).await.unwrap();

        assert_eq!(publisher.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_event_with_external_id_already_set_is_a_noop() {
        let store = Arc::new(MemoryStore::new());
        let (before, mut after) = approved_product(&store, true).await;
        after.external_listing_id = Some("8842".to_string());

        let publisher = Arc::new(MockPublisher::succeeding());
        let engine = engine(None, publisher.clone(), shopify_secrets(), store.clone());
        engine.handle_approved(&before, &after).await.unwrap();
        engine.handle_approved(&before, &after).await.unwrap();

        assert_eq!(publisher.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_resave_of_approved_document_does_not_refire() {
        let store = Arc::new(MemoryStore::new());
        let (_, after) = approved_product(&store, true).await;

        let publisher = Arc::new(MockPublisher::succeeding());
        let engine = engine(None, publisher.clone(), shopify_secrets(), store.clone());
        // Level, not edge: before is already approved
        engine.handle_approved(&after, &after).await.unwrap();

        assert_eq!(publisher.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_images_fails_publish_without_external_id() {
        let store = Arc::new(MemoryStore::new());
        let mut product = draft_product();
        product.images.clear();
        product.listing_status = ListingStatus::Enriched;
        store.insert(product.clone()).await.unwrap();

        let before = product.clone();
        let mut after = product.clone();
        after.listing_status = ListingStatus::Approved;
        store
            .apply(
                &product.id,
                ProductUpdate {
                    listing_status: Some(ListingStatus::Approved),
                    ..ProductUpdate::default()
                },
            )
            .await
            .unwrap();

        let publisher = Arc::new(MockPublisher::succeeding());
        let engine = engine(None, publisher.clone(), shopify_secrets(), store.clone());
        engine.handle_approved(&before, &after).await.unwrap();

        let stored = ProductStore::get(store.as_ref(), &after.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.listing_status, ListingStatus::FailedPublish);
        assert!(stored.error_message.unwrap().contains("no images"));
        assert!(stored.external_listing_id.is_none());
        assert_eq!(publisher.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_adapter_failure_marks_failed_publish() {
        let store = Arc::new(MemoryStore::new());
        let (before, after) = approved_product(&store, true).await;

        let engine = engine(
            None,
            Arc::new(MockPublisher::failing("Shopify returned 422: invalid")),
            shopify_secrets(),
            store.clone(),
        );
        engine.handle_approved(&before, &after).await.unwrap();

        let stored = ProductStore::get(store.as_ref(), &after.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.listing_status, ListingStatus::FailedPublish);
        assert!(stored.error_message.unwrap().contains("422"));
        assert!(stored.external_listing_id.is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_secrets_disable_publish_without_item_failure() {
        let store = Arc::new(MemoryStore::new());
        let (before, after) = approved_product(&store, true).await;

        let publisher = Arc::new(MockPublisher::succeeding());
        let engine = engine(
            None,
            publisher.clone(),
            Arc::new(MapSecretProvider::empty()),
            store.clone(),
        );
        engine.handle_approved(&before, &after).await.unwrap();

        // Product stays approved and re-driveable; no error recorded
        let stored = ProductStore::get(store.as_ref(), &after.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.listing_status, ListingStatus::Approved);
        assert!(stored.error_message.is_none());
        assert_eq!(publisher.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_fallback_to_source_fields_without_enrichment() {
        let store = Arc::new(MemoryStore::new());
        let (before, after) = approved_product(&store, false).await;

        let publisher = Arc::new(MockPublisher::succeeding());
        let engine = engine(None, publisher.clone(), shopify_secrets(), store.clone());
        engine.handle_approved(&before, &after).await.unwrap();

        let calls = publisher.calls.lock().await;
        assert_eq!(calls[0].title, "Ceramic Mug");
        assert_eq!(calls[0].body_html, "A handmade ceramic mug.");
        assert_eq!(calls[0].vendor, "example.com");
    }

    #[test]
    fn test_public_image_url_rewrite() {
        assert_eq!(
            public_image_url("gs://bucket/a.jpg"),
            "https://storage.googleapis.com/bucket/a.jpg"
        );
        assert_eq!(
            public_image_url("https://cdn.example.com/a.jpg"),
            "https://cdn.example.com/a.jpg"
        );
    }
}
