//! Capability traits the engines are generic over
//!
//! Each external collaborator has one trait with explicit, required
//! parameters - no optional context objects. This enables compile-time
//! safety and easy mocking for tests.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use vortex_types::{EnrichedFields, HalalStatus, SocialPlatform};

/// Input for the combined compliance-and-copywriting call
#[derive(Debug, Clone)]
pub struct EnrichmentRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    /// When false the compliance sub-step is skipped entirely and the
    /// outcome carries a compliant verdict with a reasoning note saying so.
    pub check_compliance: bool,
}

/// One structured result: verdict plus the full marketing payload
#[derive(Debug, Clone)]
pub struct EnrichmentOutcome {
    pub halal_status: HalalStatus,
    pub halal_reasoning: String,
    pub fields: EnrichedFields,
}

/// Input for per-platform post planning
#[derive(Debug, Clone)]
pub struct PostPlanRequest {
    pub product_name: String,
    pub product_description: String,
    pub platforms: Vec<SocialPlatform>,
    /// Optional engagement-by-hour signal used to pick posting times
    pub engagement_signal: Option<String>,
}

/// One planned post as returned by the AI service
#[derive(Debug, Clone)]
pub struct PlannedPost {
    pub platform: SocialPlatform,
    pub body: String,
    pub scheduled_at: DateTime<Utc>,
}

/// AI content service capability: classification plus copy generation
#[async_trait]
pub trait AiContentService: Send + Sync {
    /// One call producing the compliance verdict and the listing copy.
    async fn enrich(&self, request: &EnrichmentRequest) -> Result<EnrichmentOutcome>;

    /// One call producing exactly one post per requested platform.
    async fn plan_posts(&self, request: &PostPlanRequest) -> Result<Vec<PlannedPost>>;
}

/// Credentials for the commerce platform, fetched per publish attempt
#[derive(Debug, Clone)]
pub struct PublishCredentials {
    pub access_token: String,
    pub store_url: String,
}

/// Draft listing payload sent to the commerce platform
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPayload {
    pub title: String,
    pub body_html: String,
    pub vendor: String,
    pub images: Vec<String>,
}

/// Commerce platform capability, used at most once per product
#[async_trait]
pub trait PublicationAdapter: Send + Sync {
    /// Creates a draft listing and returns the platform-assigned id.
    async fn create_draft_listing(
        &self,
        credentials: &PublishCredentials,
        payload: &ListingPayload,
    ) -> Result<String>;
}
