//! Collection watcher for driving the product lifecycle
//!
//! Polls the product collection and diffs consecutive snapshots, turning
//! the store into a change feed: a new id or a reset back to draft fires
//! the enrichment handler, an edge into approved fires the publish handler.
//! Handlers run on their own tasks so one slow product never blocks the
//! rest, with in-flight sets keeping a second poll from re-dispatching a
//! product that is still being worked on.

use crate::engine::lifecycle::LifecycleEngine;
use crate::engine::traits::{AiContentService, PublicationAdapter};
use crate::secrets::SecretProvider;
use crate::store::{ConfigStore, ProductStore};
use log::{error, info, warn};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};
use vortex_types::{ListingStatus, Product, ProductId};

pub struct LifecycleWatcher<A, P, R, S> {
    engine: Arc<LifecycleEngine<A, P, R, S>>,
    store: Arc<S>,
    poll_interval: Duration,
    previous: Mutex<Option<HashMap<ProductId, Product>>>,
    enriching: Arc<Mutex<HashSet<ProductId>>>,
    publishing: Arc<Mutex<HashSet<ProductId>>>,
}

impl<A, P, R, S> LifecycleWatcher<A, P, R, S>
where
    A: AiContentService + 'static,
    P: PublicationAdapter + 'static,
    R: SecretProvider + 'static,
    S: ProductStore + ConfigStore + 'static,
{
    pub fn new(
        engine: Arc<LifecycleEngine<A, P, R, S>>,
        store: Arc<S>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            engine,
            store,
            poll_interval,
            previous: Mutex::new(None),
            enriching: Arc::new(Mutex::new(HashSet::new())),
            publishing: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Start watching the product collection
    pub async fn start(self: Arc<Self>) {
        info!(
            "Starting lifecycle watcher, polling every {:?}",
            self.poll_interval
        );

        loop {
            self.poll_once().await;
            sleep(self.poll_interval).await;
        }
    }

    /// One poll: snapshot, diff against the previous snapshot, dispatch.
    ///
    /// On the very first poll there is nothing to diff against; drafts that
    /// were already sitting in the store get picked up as created so work
    /// interrupted by a restart resumes.
    pub async fn poll_once(&self) {
        let products = match self.store.list().await {
            Ok(products) => products,
            Err(e) => {
                warn!("Failed to list products: {}", e);
                return;
            }
        };

        let snapshot: HashMap<ProductId, Product> = products
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        let mut previous = self.previous.lock().await;
        for (id, product) in &snapshot {
            let before = previous.as_ref().and_then(|m| m.get(id));

            if self.is_created_edge(product, before) {
                self.dispatch_created(product.clone()).await;
            }
            match before {
                Some(before) => {
                    if product.listing_status == ListingStatus::Approved
                        && before.listing_status != ListingStatus::Approved
                    {
                        self.dispatch_approved(before.clone(), product.clone()).await;
                    }
                }
                // No prior snapshot entry: a product approved while the
                // process was down still needs its publish, recovered from
                // document state alone.
                None => {
                    if product.listing_status == ListingStatus::Approved
                        && product.external_listing_id.is_none()
                    {
                        self.dispatch_pending_approval(product.clone()).await;
                    }
                }
            }
        }
        *previous = Some(snapshot);
    }

    /// A created edge is a brand-new draft, or a product reset back to
    /// draft from a failure state.
    fn is_created_edge(&self, product: &Product, before: Option<&Product>) -> bool {
        if product.listing_status != ListingStatus::Draft {
            return false;
        }
        match before {
            None => true,
            Some(before) => before.listing_status != ListingStatus::Draft,
        }
    }

    async fn dispatch_created(&self, product: Product) {
        let id = product.id.clone();
        {
            let mut enriching = self.enriching.lock().await;
            if !enriching.insert(id.clone()) {
                return;
            }
        }

        let engine = self.engine.clone();
        let enriching = self.enriching.clone();
        tokio::spawn(async move {
            if let Err(e) = engine.handle_created(&product).await {
                error!("Enrichment handler failed for product {}: {}", id, e);
            }
            enriching.lock().await.remove(&id);
        });
    }

    async fn dispatch_approved(&self, before: Product, after: Product) {
        let id = after.id.clone();
        {
            let mut publishing = self.publishing.lock().await;
            if !publishing.insert(id.clone()) {
                return;
            }
        }

        let engine = self.engine.clone();
        let publishing = self.publishing.clone();
        tokio::spawn(async move {
            if let Err(e) = engine.handle_approved(&before, &after).await {
                error!("Publish handler failed for product {}: {}", id, e);
            }
            publishing.lock().await.remove(&id);
        });
    }

    async fn dispatch_pending_approval(&self, product: Product) {
        let id = product.id.clone();
        {
            let mut publishing = self.publishing.lock().await;
            if !publishing.insert(id.clone()) {
                return;
            }
        }

        let engine = self.engine.clone();
        let publishing = self.publishing.clone();
        tokio::spawn(async move {
            if let Err(e) = engine.handle_pending_approval(&product).await {
                error!("Publish recovery failed for product {}: {}", id, e);
            }
            publishing.lock().await.remove(&id);
        });
    }
}
