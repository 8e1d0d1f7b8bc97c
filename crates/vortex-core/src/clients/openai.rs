//! OpenAI-backed AI content service
//!
//! One chat-completions call per operation, always in JSON mode. Response
//! parsing is strict: a missing or malformed key is a processing failure,
//! never silently defaulted.

use crate::config::OpenAiConfig;
use crate::engine::traits::{
    AiContentService, EnrichmentOutcome, EnrichmentRequest, PlannedPost, PostPlanRequest,
};
use crate::error::{Result, VortexError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::Client as HttpClient;
use serde_json::{json, Value};
use vortex_types::{EnrichedFields, HalalStatus, SocialPlatform};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiClient {
    config: OpenAiConfig,
    api_key: String,
    http_client: HttpClient,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig, api_key: String) -> Self {
        let http_client = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            api_key,
            http_client,
        }
    }

    /// One round trip in JSON mode; returns the assistant message content.
    async fn complete_json(&self, prompt: String) -> Result<String> {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        let url = format!("{}/chat/completions", base_url);

        let body = json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "response_format": { "type": "json_object" },
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(VortexError::ServiceUnavailable(format!(
                "OpenAI returned {}: {}",
                status, error_text
            )));
        }

        let data: Value = response.json().await?;
        data["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                VortexError::AiContract("completion response carried no message content".to_string())
            })
    }

    fn enrichment_prompt(request: &EnrichmentRequest) -> String {
        let compliance_task = if request.check_compliance {
            "1. **Halal Classification**: Determine if the product is 'compliant', \
             'non-compliant' (e.g., alcohol, pork, gambling, inappropriate imagery), \
             or 'indeterminate'. Provide a brief reasoning.\n"
        } else {
            ""
        };
        let compliance_keys = if request.check_compliance {
            "\"halal_status\", \"halal_reasoning\", "
        } else {
            ""
        };

        format!(
            "You are an expert e-commerce copywriter and a specialist in Islamic compliance.\n\
             Analyze the following product data:\n\
             Title: {title}\n\
             Description: {description}\n\
             Category: {category}\n\n\
             Tasks:\n\
             {compliance_task}\
             2. **SEO Title**: Write a new, catchy, and SEO-friendly title (max 60 chars).\n\
             3. **SEO Description**: Write a compelling meta description (max 160 chars).\n\
             4. **Social Caption**: Write an engaging caption for X/Twitter. Include relevant \
             hashtags and the affiliate link placeholder [AFFILIATE_LINK].\n\
             5. **Keywords**: List up to five ranked search keywords.\n\n\
             Return a single, minified JSON object with the keys: {compliance_keys}\
             \"seo_title\", \"seo_description\", \"social_caption\", \"keywords\".",
            title = request.title,
            description = request.description,
            category = request.category,
        )
    }

    fn post_plan_prompt(request: &PostPlanRequest) -> String {
        let platforms = request
            .platforms
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let engagement = request
            .engagement_signal
            .as_deref()
            .unwrap_or("none available");

        format!(
            "You are a social media marketing expert. Given the following product, generate \
             one compelling, concise, and engaging post per platform.\n\n\
             Each post should include a strong hook, the product name, a clear call-to-action, \
             2-3 relevant hashtags, and the affiliate link placeholder [AFFILIATE_LINK].\n\n\
             Product Name: {name}\n\
             Product Description: {description}\n\
             Platforms: {platforms}\n\n\
             Pick posting times in the near future, tuned for maximum impact using the \
             engagement-by-hour data below. Every scheduled_time must be a valid ISO 8601 \
             datetime strictly later than now.\n\
             Engagement Analytics: {engagement}\n\n\
             Return a single, minified JSON object with the key \"posts\": an array with \
             exactly one entry per platform, each entry having the keys \"platform\", \
             \"post_content\", \"scheduled_time\".",
            name = request.product_name,
            description = request.product_description,
        )
    }

    /// Strict parse of the enrichment response content.
    fn parse_enrichment(content: &str, check_compliance: bool) -> Result<EnrichmentOutcome> {
        let value: Value = serde_json::from_str(content).map_err(|e| {
            VortexError::AiContract(format!("enrichment response is not valid JSON: {}", e))
        })?;

        let fields = EnrichedFields {
            seo_title: require_str(&value, "seo_title")?,
            seo_description: require_str(&value, "seo_description")?,
            social_caption: require_str(&value, "social_caption")?,
            keywords: value["keywords"]
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|k| k.as_str().map(|s| s.to_string()))
                        .collect()
                })
                .unwrap_or_default(),
        };

        let (halal_status, halal_reasoning) = if check_compliance {
            let verdict = require_str(&value, "halal_status")?;
            (
                HalalStatus::parse_verdict(&verdict),
                require_str(&value, "halal_reasoning")?,
            )
        } else {
            (
                HalalStatus::Compliant,
                "Compliance check skipped by configuration.".to_string(),
            )
        };

        Ok(EnrichmentOutcome {
            halal_status,
            halal_reasoning,
            fields,
        })
    }

    /// Strict parse of the post-plan response content.
    fn parse_post_plan(content: &str) -> Result<Vec<PlannedPost>> {
        let value: Value = serde_json::from_str(content).map_err(|e| {
            VortexError::AiContract(format!("post plan response is not valid JSON: {}", e))
        })?;

        let entries = value["posts"].as_array().ok_or_else(|| {
            VortexError::AiContract("post plan response is missing the 'posts' array".to_string())
        })?;

        let mut posts = Vec::with_capacity(entries.len());
        for entry in entries {
            let platform = match require_str(entry, "platform")?.as_str() {
                "X" => SocialPlatform::X,
                "Instagram" => SocialPlatform::Instagram,
                "TikTok" => SocialPlatform::TikTok,
                other => {
                    return Err(VortexError::AiContract(format!(
                        "unknown platform '{}' in post plan",
                        other
                    )))
                }
            };
            let scheduled_raw = require_str(entry, "scheduled_time")?;
            let scheduled_at = DateTime::parse_from_rfc3339(&scheduled_raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    VortexError::AiContract(format!(
                        "scheduled_time '{}' is not a valid timestamp: {}",
                        scheduled_raw, e
                    ))
                })?;

            posts.push(PlannedPost {
                platform,
                body: require_str(entry, "post_content")?,
                scheduled_at,
            });
        }

        Ok(posts)
    }
}

fn require_str(value: &Value, key: &str) -> Result<String> {
    value[key]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            VortexError::AiContract(format!("response is missing required key '{}'", key))
        })
}

#[async_trait]
impl AiContentService for OpenAiClient {
    async fn enrich(&self, request: &EnrichmentRequest) -> Result<EnrichmentOutcome> {
        debug!("Requesting enrichment for '{}'", request.title);
        let content = self.complete_json(Self::enrichment_prompt(request)).await?;
        Self::parse_enrichment(&content, request.check_compliance)
    }

    async fn plan_posts(&self, request: &PostPlanRequest) -> Result<Vec<PlannedPost>> {
        debug!(
            "Requesting post plan for '{}' across {} platforms",
            request.product_name,
            request.platforms.len()
        );
        let content = self.complete_json(Self::post_plan_prompt(request)).await?;
        Self::parse_post_plan(&content)
    }
}
