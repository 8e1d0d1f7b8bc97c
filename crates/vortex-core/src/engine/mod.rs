//! Pipeline engines
//!
//! The lifecycle engine owns the two AI-facing transitions, the watcher
//! turns store polling into change events, the autopilot drives the
//! pipeline end to end under full automation, and the scheduler handles
//! social posts. All of them are generic over the capability traits.

pub mod autopilot;
pub mod lifecycle;
pub mod scheduler;
pub mod traits;
pub mod watcher;

pub use autopilot::Autopilot;
pub use lifecycle::LifecycleEngine;
pub use scheduler::{SchedulingEngine, SweepOutcome};
pub use traits::{
    AiContentService, EnrichmentOutcome, EnrichmentRequest, ListingPayload, PlannedPost,
    PostPlanRequest, PublicationAdapter, PublishCredentials,
};
pub use watcher::LifecycleWatcher;
