//! Document store capability traits
//!
//! The product document is the single source of truth; all mutation goes
//! through [`ProductStore::apply`], a field-level merge, so a concurrent
//! unrelated write is never clobbered. The engines only see these traits -
//! a managed document store plugs in by implementing them.

mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use async_trait::async_trait;
use vortex_types::{
    AutomationConfig, Product, ProductId, ProductUpdate, SocialPost, SocialPostId,
};

/// Product collection access
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Point read by id.
    async fn get(&self, id: &ProductId) -> Result<Option<Product>>;

    /// Snapshot of the whole collection, used by the polling watchers.
    async fn list(&self) -> Result<Vec<Product>>;

    /// Ingest a new document.
    async fn insert(&self, product: Product) -> Result<()>;

    /// Atomic field-level merge. Fields the update does not carry stay
    /// untouched; `updated_at` is always bumped. Errors if the id is unknown.
    async fn apply(&self, id: &ProductId, update: ProductUpdate) -> Result<()>;
}

/// Social post collection access
#[async_trait]
pub trait SocialPostStore: Send + Sync {
    /// All-or-nothing batch insert of freshly scheduled posts.
    async fn insert_posts(&self, posts: Vec<SocialPost>) -> Result<()>;

    /// Every post still in `Queued`, due or not.
    async fn queued_posts(&self) -> Result<Vec<SocialPost>>;

    /// Atomic batch flip to `Posted`. Either every id transitions or none
    /// do; unknown ids fail the whole batch.
    async fn mark_posted(&self, ids: &[SocialPostId]) -> Result<()>;
}

/// Singleton automation configuration document
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Current automation config; defaults when the document is absent.
    async fn automation_config(&self) -> Result<AutomationConfig>;

    async fn set_automation_config(&self, config: AutomationConfig) -> Result<()>;
}
