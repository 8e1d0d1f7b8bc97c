//! Social post scheduling engine
//!
//! Two halves: planning (one AI call per product turning a platform list
//! into queued posts) and the periodic sweep that flips due posts to
//! posted. Actual network delivery to the platforms is out of scope; the
//! sweep logs each post it releases.

use crate::engine::traits::{AiContentService, PlannedPost, PostPlanRequest};
use crate::error::{Result, VortexError};
use crate::store::SocialPostStore;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;
use vortex_types::{Product, SocialPlatform, SocialPost};

/// Result of one sweep pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Every post that was still queued when the sweep ran
    pub checked: usize,
    /// The subset that was due and got flipped to posted
    pub published: usize,
}

pub struct SchedulingEngine<A, S> {
    /// Absent when the AI key is not configured; planning is then
    /// unavailable, but the sweep over already-queued posts still runs.
    ai: Option<Arc<A>>,
    store: Arc<S>,
}

impl<A, S> SchedulingEngine<A, S>
where
    A: AiContentService,
    S: SocialPostStore,
{
    pub fn new(ai: Option<Arc<A>>, store: Arc<S>) -> Self {
        Self { ai, store }
    }

    /// Plan and queue posts for a product, one per requested platform.
    ///
    /// The whole plan is validated before anything is written: a missing or
    /// duplicated platform, or a timestamp not in the future, rejects the
    /// plan and queues nothing.
    pub async fn schedule_posts(
        &self,
        product: &Product,
        platforms: &[SocialPlatform],
        engagement_signal: Option<String>,
    ) -> Result<Vec<SocialPost>> {
        let Some(ai) = self.ai.as_ref() else {
            return Err(VortexError::ServiceUnavailable(
                "AI content service not available for post planning".to_string(),
            ));
        };
        if platforms.is_empty() {
            return Err(VortexError::Validation(
                "no platforms requested for scheduling".to_string(),
            ));
        }

        let request = PostPlanRequest {
            product_name: product.title.clone(),
            product_description: product.description.clone(),
            platforms: platforms.to_vec(),
            engagement_signal,
        };
        let planned = ai.plan_posts(&request).await?;
        validate_plan(&planned, platforms)?;

        let posts: Vec<SocialPost> = planned
            .into_iter()
            .map(|p| {
                SocialPost::queued(
                    product.id.clone(),
                    product.title.clone(),
                    p.platform,
                    p.body,
                    p.scheduled_at,
                )
            })
            .collect();

        self.store.insert_posts(posts.clone()).await?;
        info!(
            "Queued {} posts for product {}",
            posts.len(),
            product.id
        );
        Ok(posts)
    }

    /// One sweep pass: flip every due queued post to posted.
    ///
    /// `checked` counts all queued posts, due or not, so an operator can
    /// see backlog size even on a sweep that releases nothing.
    pub async fn publish_due_posts(&self) -> Result<SweepOutcome> {
        let queued = self.store.queued_posts().await?;
        let checked = queued.len();

        let now = Utc::now();
        let due: Vec<&SocialPost> = queued.iter().filter(|p| p.is_due(now)).collect();
        if due.is_empty() {
            return Ok(SweepOutcome {
                checked,
                published: 0,
            });
        }

        for post in &due {
            info!(
                "Posting to {} for product {}: {}",
                post.platform, post.product_id, post.body
            );
        }

        let ids: Vec<_> = due.iter().map(|p| p.id.clone()).collect();
        self.store.mark_posted(&ids).await?;

        let published = ids.len();
        info!("Sweep released {} of {} queued posts", published, checked);
        Ok(SweepOutcome { checked, published })
    }
}

fn validate_plan(planned: &[PlannedPost], requested: &[SocialPlatform]) -> Result<()> {
    let now = Utc::now();
    for platform in requested {
        let matching = planned.iter().filter(|p| p.platform == *platform).count();
        if matching != 1 {
            return Err(VortexError::AiContract(format!(
                "plan carried {} posts for {}, expected exactly 1",
                matching, platform
            )));
        }
    }
    if planned.len() != requested.len() {
        warn!(
            "Plan carried {} posts for {} requested platforms",
            planned.len(),
            requested.len()
        );
        return Err(VortexError::AiContract(
            "plan carried posts for unrequested platforms".to_string(),
        ));
    }
    for post in planned {
        if post.scheduled_at <= now {
            return Err(VortexError::AiContract(format!(
                "plan scheduled a {} post in the past",
                post.platform
            )));
        }
    }
    Ok(())
}
