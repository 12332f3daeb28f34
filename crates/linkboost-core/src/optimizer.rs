//! AI rewriting collaborator: full-profile optimization, single-section
//! regeneration, and freeform post generation.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info};

use crate::ai::LlmClient;
use crate::error::OptimizeError;
use crate::profile::{coerce_to_list, render_text, Profile};
use crate::state::{ChatMessage, ChatRole, OptimizedContent, Section};

/// Transcript entries included in a post generation prompt.
const MAX_TRANSCRIPT: usize = 20;

static JSON_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*\})\s*```").expect("valid json fence regex")
});
static TEXT_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```(?:[A-Za-z]+\n)?\s*(.*?)\s*```$").expect("valid text fence regex")
});

#[async_trait]
pub trait ContentOptimizer: Send + Sync {
    async fn optimize_full(&self, profile: &Profile) -> Result<OptimizedContent, OptimizeError>;

    async fn regenerate_section(
        &self,
        section: Section,
        feedback: &str,
        profile: &Profile,
    ) -> Result<String, OptimizeError>;

    async fn generate_freeform(
        &self,
        message: &str,
        transcript: &[ChatMessage],
    ) -> Result<String, OptimizeError>;
}

/// [`ContentOptimizer`] backed by a chat model.
#[derive(Clone)]
pub struct LlmOptimizer {
    client: LlmClient,
    model: String,
}

impl LlmOptimizer {
    pub fn new(client: LlmClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ContentOptimizer for LlmOptimizer {
    async fn optimize_full(&self, profile: &Profile) -> Result<OptimizedContent, OptimizeError> {
        info!(provider = self.client.provider().as_str(), model = %self.model, "requesting full optimization");
        let prompt = build_optimize_prompt(profile);
        let raw = self.client.query(&self.model, &prompt, true).await?;
        parse_optimized(&raw)
    }

    async fn regenerate_section(
        &self,
        section: Section,
        feedback: &str,
        profile: &Profile,
    ) -> Result<String, OptimizeError> {
        info!(%section, model = %self.model, "requesting section rewrite");
        let prompt = build_regenerate_prompt(section, feedback, profile);
        let raw = self.client.query(&self.model, &prompt, false).await?;
        let text = clean_text(&raw);
        if text.is_empty() {
            return Err(OptimizeError::EmptySection { section });
        }
        Ok(text)
    }

    async fn generate_freeform(
        &self,
        message: &str,
        transcript: &[ChatMessage],
    ) -> Result<String, OptimizeError> {
        debug!(history = transcript.len(), "requesting post draft");
        let prompt = build_post_prompt(message, transcript);
        let raw = self.client.query(&self.model, &prompt, false).await?;
        Ok(raw.trim().to_string())
    }
}

pub fn build_optimize_prompt(profile: &Profile) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are an expert LinkedIn profile strategist and copywriter. ");
    prompt.push_str("Rewrite the profile below so it reads like a high-converting landing page: ");
    prompt.push_str("specific, outcome-focused, and keyword-rich for recruiters.\n\n");
    prompt.push_str("Profile:\n");
    prompt.push_str(&profile.summary());
    prompt.push_str("\nReturn a JSON object with exactly these keys:\n");
    prompt.push_str("  \"headline\": a headline under 220 characters,\n");
    prompt.push_str("  \"about\": a first-person About section of 3-5 short paragraphs,\n");
    prompt.push_str("  \"experienceBullets\": an array of 3-6 achievement bullets starting with action verbs.\n");
    prompt
}

pub fn build_regenerate_prompt(section: Section, feedback: &str, profile: &Profile) -> String {
    let target = match section {
        Section::Headline => "LinkedIn headline (under 220 characters)",
        Section::About => "LinkedIn About section",
        Section::ExperienceBullets => "single experience achievement bullet",
    };

    let mut prompt = String::new();
    prompt.push_str(&format!("Rewrite the {} for this profile.\n", target));
    prompt.push_str(&format!("Feedback from the user: {}\n\n", feedback));
    prompt.push_str("Profile:\n");
    prompt.push_str(&profile.summary());
    prompt.push_str("\nReply with the rewritten text only, no preamble, no quotes, no markdown.");
    prompt
}

pub fn build_post_prompt(message: &str, transcript: &[ChatMessage]) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are a LinkedIn ghostwriter. Draft engaging, authentic posts ");
    prompt.push_str("with a strong hook, short paragraphs, and a closing question or call to action.\n\n");

    let start = transcript.len().saturating_sub(MAX_TRANSCRIPT);
    if start < transcript.len() {
        prompt.push_str("Conversation so far:\n");
        for entry in &transcript[start..] {
            let speaker = match entry.role {
                ChatRole::User => "User",
                ChatRole::Assistant => "Assistant",
            };
            prompt.push_str(&format!("{}: {}\n", speaker, entry.content));
        }
        prompt.push('\n');
    }

    prompt.push_str("User: ");
    prompt.push_str(message);
    prompt.push_str("\nAssistant:");
    prompt
}

/// Pulls the JSON object out of a model reply, tolerating code fences and
/// surrounding chatter.
fn extract_json(raw: &str) -> Option<&str> {
    if let Some(captures) = JSON_FENCE_RE.captures(raw) {
        return captures.get(1).map(|m| m.as_str());
    }
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Parses an optimization reply through the normalizer, so string-valued
/// bullets or `{text}` objects are still accepted.
pub fn parse_optimized(raw: &str) -> Result<OptimizedContent, OptimizeError> {
    let json = extract_json(raw).ok_or_else(|| OptimizeError::MalformedResponse {
        reason: "no JSON object in reply".to_string(),
    })?;
    let value: Value = serde_json::from_str(json).map_err(|e| OptimizeError::MalformedResponse {
        reason: e.to_string(),
    })?;

    let bullets_value = match &value["experienceBullets"] {
        Value::Null => &value["experience_bullets"],
        other => other,
    };

    let content = OptimizedContent {
        headline: render_text(&value["headline"]).trim().to_string(),
        about: render_text(&value["about"]).trim().to_string(),
        experience_bullets: coerce_to_list(bullets_value)
            .iter()
            .map(|b| render_text(b).trim().to_string())
            .filter(|b| !b.is_empty())
            .collect(),
    };

    let mut missing = Vec::new();
    if content.headline.is_empty() {
        missing.push("headline");
    }
    if content.about.is_empty() {
        missing.push("about");
    }
    if content.experience_bullets.is_empty() {
        missing.push("experienceBullets");
    }
    if !missing.is_empty() {
        return Err(OptimizeError::MalformedResponse {
            reason: format!("missing {}", missing.join(", ")),
        });
    }
    Ok(content)
}

/// Strips wrapping quotes and code fences from a single-section reply.
fn clean_text(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = TEXT_FENCE_RE
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map_or(trimmed, |m| m.as_str());
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}
