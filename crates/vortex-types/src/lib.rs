//! Shared domain types for the Vortex product pipeline
//!
//! Everything that crosses a crate boundary lives here: the product and
//! social-post documents, their status enums, strongly typed ids, the
//! singleton automation config, and the field-merge update shape used for
//! all product writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strongly typed product document id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(String);

impl ProductId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn from_string(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly typed social post id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SocialPostId(String);

impl SocialPostId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn from_string(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SocialPostId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SocialPostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Listing lifecycle status - no string-based state management
///
/// `Draft` products await enrichment. `Enriched` products await an external
/// approval decision. `FailedEnrichment` and `FailedPublish` are retryable by
/// resetting the status to `Draft` / `Approved` respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Draft,
    Enriched,
    Rejected,
    Approved,
    Published,
    FailedEnrichment,
    FailedPublish,
}

impl ListingStatus {
    /// Terminal states are never auto-advanced by the engine.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Published | Self::Rejected | Self::FailedEnrichment | Self::FailedPublish
        )
    }
}

/// AI-derived compliance classification
///
/// `Unknown` stands in for the unevaluated state; every path that moves a
/// product out of `Draft` writes a concrete value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HalalStatus {
    Unknown,
    Compliant,
    NonCompliant,
    Indeterminate,
}

impl HalalStatus {
    /// Lenient parse of the wire value. An unrecognized verdict maps to
    /// `Indeterminate`, which the decision rule treats as a rejection.
    pub fn parse_verdict(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "compliant" => Self::Compliant,
            "non-compliant" | "non_compliant" => Self::NonCompliant,
            _ => Self::Indeterminate,
        }
    }
}

/// Marketing copy attached to a product after a successful enrichment.
/// Only present once enrichment has succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedFields {
    pub seo_title: String,
    pub seo_description: String,
    pub social_caption: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// One discovered item moving through the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,

    // Source attributes, immutable once ingested
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub currency: String,
    pub images: Vec<String>,
    pub source_url: String,
    pub source_domain: String,

    // Compliance
    pub halal_status: HalalStatus,
    pub halal_reasoning: Option<String>,

    // Enrichment payload, only present after a successful enrichment
    pub enriched: Option<EnrichedFields>,

    // Lifecycle
    pub listing_status: ListingStatus,
    pub external_listing_id: Option<String>,
    pub rejection_reason: Option<String>,
    pub error_message: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub enriched_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Create a freshly ingested draft from source attributes.
    #[allow(clippy::too_many_arguments)]
    pub fn new_draft(
        title: String,
        description: String,
        category: String,
        price: f64,
        currency: String,
        images: Vec<String>,
        source_url: String,
        source_domain: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::new(),
            title,
            description,
            category,
            price,
            currency,
            images,
            source_url,
            source_domain,
            halal_status: HalalStatus::Unknown,
            halal_reasoning: None,
            enriched: None,
            listing_status: ListingStatus::Draft,
            external_listing_id: None,
            rejection_reason: None,
            error_message: None,
            created_at: now,
            updated_at: now,
            enriched_at: None,
            published_at: None,
        }
    }
}

/// Target social platform for a scheduled post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocialPlatform {
    X,
    Instagram,
    TikTok,
}

impl fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::X => "X",
            Self::Instagram => "Instagram",
            Self::TikTok => "TikTok",
        };
        write!(f, "{name}")
    }
}

/// Social post lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Queued,
    Posted,
    Failed,
}

/// One scheduled post for one (product, platform) pair
///
/// Holds a non-owning back-reference to its product; deletion policy for
/// orphaned posts is an external concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialPost {
    pub id: SocialPostId,
    pub product_id: ProductId,
    pub product_name: String,
    pub platform: SocialPlatform,
    pub body: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
}

impl SocialPost {
    pub fn queued(
        product_id: ProductId,
        product_name: String,
        platform: SocialPlatform,
        body: String,
        scheduled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SocialPostId::new(),
            product_id,
            product_name,
            platform,
            body,
            scheduled_at,
            status: PostStatus::Queued,
            created_at: Utc::now(),
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == PostStatus::Queued && self.scheduled_at <= now
    }
}

/// How aggressively the pipeline self-drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutomationIntensity {
    #[serde(rename = "manual")]
    Manual,
    #[serde(rename = "semi-auto")]
    SemiAuto,
    #[serde(rename = "full-auto")]
    FullAuto,
}

/// Singleton automation configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationConfig {
    pub automation_intensity: AutomationIntensity,
    pub haram_filter_enabled: bool,
    #[serde(default)]
    pub data_sources: Vec<String>,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            automation_intensity: AutomationIntensity::Manual,
            haram_filter_enabled: true,
            data_sources: Vec::new(),
        }
    }
}

/// Field-merge write shape for product documents
///
/// `None` leaves the stored field untouched. The clearable text fields use a
/// nested option: `Some(None)` clears, `Some(Some(v))` overwrites. Status and
/// payload always travel in one update so a reader never observes a partial
/// transition.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub listing_status: Option<ListingStatus>,
    pub halal_status: Option<HalalStatus>,
    pub halal_reasoning: Option<String>,
    pub enriched: Option<EnrichedFields>,
    pub external_listing_id: Option<String>,
    pub rejection_reason: Option<Option<String>>,
    pub error_message: Option<Option<String>>,
    pub enriched_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
}

impl ProductUpdate {
    /// Successful enrichment: full payload, status, and cleared errors move together.
    pub fn enriched(fields: EnrichedFields, status: HalalStatus, reasoning: String) -> Self {
        Self {
            listing_status: Some(ListingStatus::Enriched),
            halal_status: Some(status),
            halal_reasoning: Some(reasoning),
            enriched: Some(fields),
            rejection_reason: Some(None),
            error_message: Some(None),
            enriched_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    /// Non-compliant or indeterminate verdict. A successful outcome, not an error.
    pub fn rejected(status: HalalStatus, reasoning: String) -> Self {
        Self {
            listing_status: Some(ListingStatus::Rejected),
            halal_status: Some(status),
            halal_reasoning: Some(reasoning.clone()),
            rejection_reason: Some(Some(reasoning)),
            ..Self::default()
        }
    }

    /// Enrichment threw: record the failure, leave everything else untouched.
    pub fn failed_enrichment(message: String) -> Self {
        Self {
            listing_status: Some(ListingStatus::FailedEnrichment),
            error_message: Some(Some(message)),
            ..Self::default()
        }
    }

    /// Publication confirmed by the external platform.
    pub fn published(external_listing_id: String) -> Self {
        Self {
            listing_status: Some(ListingStatus::Published),
            external_listing_id: Some(external_listing_id),
            error_message: Some(None),
            published_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    /// Publication failed; the external id is never set on this path.
    pub fn failed_publish(message: String) -> Self {
        Self {
            listing_status: Some(ListingStatus::FailedPublish),
            error_message: Some(Some(message)),
            ..Self::default()
        }
    }
}
