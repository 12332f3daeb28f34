//! Profile scraping collaborator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ScrapeError;
use crate::profile::{render_text, Profile};

pub const DEFAULT_APIFY_URL: &str = "https://api.apify.com";
pub const DEFAULT_SCRAPER_ACTOR: &str = "dev_fusion~linkedin-profile-scraper";

/// Fetches one profile. A single attempt; callers validate the URL first.
#[async_trait]
pub trait ProfileScraper: Send + Sync {
    async fn scrape_profile(&self, url: &str) -> Result<Profile, ScrapeError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActorInput<'a> {
    profile_urls: Vec<&'a str>,
}

/// Runs an Apify actor synchronously and adapts its first dataset item.
#[derive(Clone)]
pub struct ApifyScraper {
    client: Client,
    base_url: String,
    actor: String,
    token: Option<String>,
}

impl ApifyScraper {
    pub fn new(base_url: &str, actor: &str, token: Option<String>) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(180))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            actor: actor.to_string(),
            token,
        })
    }
}

#[async_trait]
impl ProfileScraper for ApifyScraper {
    async fn scrape_profile(&self, url: &str) -> Result<Profile, ScrapeError> {
        let token = self.token.as_deref().ok_or(ScrapeError::MissingToken)?;
        let endpoint = format!(
            "{}/v2/acts/{}/run-sync-get-dataset-items",
            self.base_url, self.actor
        );
        info!(actor = %self.actor, %url, "running scraper actor");

        let response = self
            .client
            .post(&endpoint)
            .query(&[("token", token)])
            .json(&ActorInput {
                profile_urls: vec![url],
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ScrapeError::UnexpectedStatus {
                status: status.as_u16(),
                body: provider_error(&body).unwrap_or(body),
            });
        }

        let payload: Value = serde_json::from_str(&body)?;
        let record = first_record(payload, url)?;
        debug!(
            keys = record.as_object().map(|m| m.len()).unwrap_or(0),
            "received profile record"
        );
        Ok(Profile::from_record(&record))
    }
}

/// Extracts the profile from a dataset response: an array of items, a single
/// object, or an object wrapping the record under `data`.
fn first_record(payload: Value, url: &str) -> Result<Value, ScrapeError> {
    let record = match payload {
        Value::Array(items) => items.into_iter().next(),
        Value::Object(mut map) => {
            if let Some(error) = map.get("error") {
                return Err(ScrapeError::Provider(error_message(error)));
            }
            match map.remove("data") {
                Some(Value::Array(items)) => items.into_iter().next(),
                Some(data @ Value::Object(_)) => Some(data),
                _ => Some(Value::Object(map)),
            }
        }
        _ => None,
    };

    match record {
        Some(Value::Object(map)) if !map.is_empty() => {
            if let Some(error) = map.get("error") {
                return Err(ScrapeError::Provider(error_message(error)));
            }
            Ok(Value::Object(map))
        }
        _ => Err(ScrapeError::EmptyDataset {
            url: url.to_string(),
        }),
    }
}

fn error_message(error: &Value) -> String {
    match error {
        Value::Object(map) => map
            .get("message")
            .map(render_text)
            .unwrap_or_else(|| error.to_string()),
        other => {
            let text = render_text(other);
            if text.is_empty() {
                other.to_string()
            } else {
                text
            }
        }
    }
}

fn provider_error(body: &str) -> Option<String> {
    let payload: Value = serde_json::from_str(body).ok()?;
    payload.get("error").map(error_message)
}
