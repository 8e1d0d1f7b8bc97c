//! Vortex Core Library
//!
//! Business logic for the Vortex product pipeline: AI enrichment and
//! compliance screening, the approval-to-publication flow, and social post
//! scheduling. Contains the service clients, store seam, and engines.

pub mod clients;
pub mod config;
pub mod engine;
pub mod error;
pub mod secrets;
pub mod store;

// Re-export main types for easy access
pub use config::VortexConfig;
pub use error::{Result, VortexError};

// Re-export client types
pub use clients::{OpenAiClient, ShopifyClient};

// Re-export engine types
pub use engine::{
    AiContentService, Autopilot, EnrichmentOutcome, EnrichmentRequest, LifecycleEngine,
    LifecycleWatcher, ListingPayload, PlannedPost, PostPlanRequest, PublicationAdapter,
    PublishCredentials, SchedulingEngine, SweepOutcome,
};

// Re-export store seam
pub use secrets::{EnvSecretProvider, SecretProvider};
pub use store::{ConfigStore, MemoryStore, ProductStore, SocialPostStore};
