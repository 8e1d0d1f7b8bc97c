//! Fully autonomous pipeline driver
//!
//! Active only when the automation config asks for full-auto. Sweeps up
//! drafts that never got enriched (missed events, restarts) and queues
//! social posts for products as they become approved. Tracking sets keep
//! an id once a dispatch succeeds so the same product is not driven twice
//! in one process lifetime; on failure the id is dropped again so the next
//! cycle retries. The store stays the durable source of truth - losing the
//! sets on restart is safe because every handler re-validates status.

use crate::engine::lifecycle::LifecycleEngine;
use crate::engine::scheduler::SchedulingEngine;
use crate::engine::traits::{AiContentService, PublicationAdapter};
use crate::secrets::SecretProvider;
use crate::store::{ConfigStore, ProductStore, SocialPostStore};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};
use vortex_types::{
    AutomationIntensity, HalalStatus, ListingStatus, Product, ProductId, SocialPlatform,
};

const DEFAULT_PLATFORMS: [SocialPlatform; 3] = [
    SocialPlatform::X,
    SocialPlatform::Instagram,
    SocialPlatform::TikTok,
];

pub struct Autopilot<A, P, R, S> {
    lifecycle: Arc<LifecycleEngine<A, P, R, S>>,
    scheduler: Arc<SchedulingEngine<A, S>>,
    store: Arc<S>,
    poll_interval: Duration,
    enrichment_tracked: Mutex<HashSet<ProductId>>,
    scheduling_tracked: Mutex<HashSet<ProductId>>,
}

impl<A, P, R, S> Autopilot<A, P, R, S>
where
    A: AiContentService + 'static,
    P: PublicationAdapter + 'static,
    R: SecretProvider + 'static,
    S: ProductStore + SocialPostStore + ConfigStore + 'static,
{
    pub fn new(
        lifecycle: Arc<LifecycleEngine<A, P, R, S>>,
        scheduler: Arc<SchedulingEngine<A, S>>,
        store: Arc<S>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            lifecycle,
            scheduler,
            store,
            poll_interval,
            enrichment_tracked: Mutex::new(HashSet::new()),
            scheduling_tracked: Mutex::new(HashSet::new()),
        }
    }

    /// Start the autonomous driver
    pub async fn start(self: Arc<Self>) {
        info!(
            "Starting autopilot, polling every {:?}",
            self.poll_interval
        );

        loop {
            self.run_cycle().await;
            sleep(self.poll_interval).await;
        }
    }

    /// One cycle: re-read the config, then drive both phases.
    pub async fn run_cycle(&self) {
        let config = match self.store.automation_config().await {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to read automation config: {}", e);
                return;
            }
        };
        if config.automation_intensity != AutomationIntensity::FullAuto {
            debug!("Automation intensity is not full-auto, autopilot idle");
            return;
        }

        let products = match ProductStore::list(self.store.as_ref()).await {
            Ok(products) => products,
            Err(e) => {
                warn!("Failed to list products: {}", e);
                return;
            }
        };

        for product in &products {
            if self.needs_enrichment(product).await {
                self.drive_enrichment(product).await;
            }
            if self.needs_scheduling(product).await {
                self.drive_scheduling(product).await;
            }
        }
    }

    async fn needs_enrichment(&self, product: &Product) -> bool {
        product.listing_status == ListingStatus::Draft
            && product.halal_status == HalalStatus::Unknown
            && !self.enrichment_tracked.lock().await.contains(&product.id)
    }

    async fn needs_scheduling(&self, product: &Product) -> bool {
        matches!(
            product.listing_status,
            ListingStatus::Approved | ListingStatus::Published
        ) && !self.scheduling_tracked.lock().await.contains(&product.id)
    }

    async fn drive_enrichment(&self, product: &Product) {
        self.enrichment_tracked
            .lock()
            .await
            .insert(product.id.clone());

        info!("Autopilot driving enrichment for product {}", product.id);
        if let Err(e) = self.lifecycle.handle_created(product).await {
            error!(
                "Autopilot enrichment failed for product {}: {}",
                product.id, e
            );
            // Drop the id so the next cycle retries
            self.enrichment_tracked.lock().await.remove(&product.id);
        }
    }

    async fn drive_scheduling(&self, product: &Product) {
        self.scheduling_tracked
            .lock()
            .await
            .insert(product.id.clone());

        info!("Autopilot scheduling posts for product {}", product.id);
        match self
            .scheduler
            .schedule_posts(product, &DEFAULT_PLATFORMS, None)
            .await
        {
            Ok(posts) => {
                info!(
                    "Autopilot queued {} posts for product {}",
                    posts.len(),
                    product.id
                );
            }
            Err(e) => {
                error!(
                    "Autopilot scheduling failed for product {}: {}",
                    product.id, e
                );
                self.scheduling_tracked.lock().await.remove(&product.id);
            }
        }
    }
}
