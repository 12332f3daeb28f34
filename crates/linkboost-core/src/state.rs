//! UI-agnostic application state types
//!
//! This module contains the data structures owned by the state machine and
//! read by every view. They don't depend on any specific UI framework.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::profile::Profile;

/// A chat message in the post generator conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    #[serde(rename = "text")]
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "ai")]
    Assistant,
}

/// AI-rewritten profile content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedContent {
    pub headline: String,
    pub about: String,
    pub experience_bullets: Vec<String>,
}

impl OptimizedContent {
    /// Replaces exactly one field. Bullets are replaced wholesale by a
    /// single-element list, never merged.
    pub fn apply(&mut self, section: Section, text: String) {
        match section {
            Section::Headline => self.headline = text,
            Section::About => self.about = text,
            Section::ExperienceBullets => self.experience_bullets = vec![text],
        }
    }
}

/// A single regenerable field of [`OptimizedContent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    Headline,
    About,
    ExperienceBullets,
}

impl Section {
    pub fn all() -> [Section; 3] {
        [Section::Headline, Section::About, Section::ExperienceBullets]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Headline => "headline",
            Section::About => "about",
            Section::ExperienceBullets => "experienceBullets",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::Headline => "Headline",
            Section::About => "About Summary",
            Section::ExperienceBullets => "Experience Highlights",
        }
    }

    /// Feedback used when the user asks for a rewrite without typing any.
    pub fn default_feedback(&self) -> &'static str {
        match self {
            Section::Headline => "make it more punchy",
            Section::About => "more professional",
            Section::ExperienceBullets => "stronger action verbs",
        }
    }

    fn index(self) -> usize {
        match self {
            Section::Headline => 0,
            Section::About => 1,
            Section::ExperienceBullets => 2,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Scraping,
    Analyzing,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Onboarding,
    ProfileView,
    AiOptimizer,
    PostGenerator,
    Settings,
}

impl View {
    /// Views listed in the navigation overlay, in display order.
    pub fn navigable() -> [View; 4] {
        [
            View::ProfileView,
            View::AiOptimizer,
            View::PostGenerator,
            View::Settings,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Onboarding => "Get Started",
            View::ProfileView => "Profile Overview",
            View::AiOptimizer => "AI Enhancer",
            View::PostGenerator => "Post Generator",
            View::Settings => "Settings",
        }
    }
}

/// Generation counters for in-flight requests. A completion is applied only
/// when it carries the latest token issued for its operation.
#[derive(Debug, Clone, Default)]
pub(crate) struct RequestTokens {
    scrape: u64,
    optimize: u64,
    regenerate: [u64; 3],
}

impl RequestTokens {
    pub(crate) fn issue_scrape(&mut self) -> u64 {
        self.scrape += 1;
        self.scrape
    }

    pub(crate) fn issue_optimize(&mut self) -> u64 {
        self.optimize += 1;
        self.optimize
    }

    pub(crate) fn issue_regenerate(&mut self, section: Section) -> u64 {
        let slot = &mut self.regenerate[section.index()];
        *slot += 1;
        *slot
    }

    pub(crate) fn is_current_scrape(&self, token: u64) -> bool {
        self.scrape == token
    }

    pub(crate) fn is_current_optimize(&self, token: u64) -> bool {
        self.optimize == token
    }

    pub(crate) fn is_current_regenerate(&self, section: Section, token: u64) -> bool {
        self.regenerate[section.index()] == token
    }
}

/// The single source of truth shared across views.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub status: Status,
    pub message: String,
    pub view: View,
    pub data: Option<Profile>,
    pub optimized: Option<OptimizedContent>,

    // Post generator
    pub chat_history: Vec<ChatMessage>,
    pub chat_input: String,

    // Overlay and side-channel feedback
    pub nav_open: bool,
    pub notice: Option<String>,

    // Pending side requests, for spinners
    pub regenerating: Vec<Section>,
    pub chat_pending: usize,

    pub(crate) tokens: RequestTokens,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a scrape or full optimization is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self.status, Status::Scraping | Status::Analyzing)
    }

    pub fn is_regenerating(&self, section: Section) -> bool {
        self.regenerating.contains(&section)
    }

    /// Display name used by the navigation overlay.
    pub fn display_name(&self) -> &str {
        self.data
            .as_ref()
            .map(|p| p.full_name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("User")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_replaces_bullets_with_single_entry() {
        let mut content = OptimizedContent {
            headline: "h".into(),
            about: "a".into(),
            experience_bullets: vec!["one".into(), "two".into(), "three".into()],
        };
        content.apply(Section::ExperienceBullets, "Led X".into());
        assert_eq!(content.experience_bullets, vec!["Led X".to_string()]);
        assert_eq!(content.headline, "h");
        assert_eq!(content.about, "a");
    }

    #[test]
    fn optimized_content_uses_camel_case_on_the_wire() {
        let json = serde_json::to_value(OptimizedContent {
            headline: "h".into(),
            about: "a".into(),
            experience_bullets: vec!["b".into()],
        })
        .unwrap();
        assert_eq!(json["experienceBullets"][0], "b");
    }

    #[test]
    fn chat_roles_serialize_as_user_and_ai() {
        let json = serde_json::to_value(ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json["role"], "ai");
        assert_eq!(json["text"], "hi");
    }

    #[test]
    fn tokens_are_tracked_per_section() {
        let mut tokens = RequestTokens::default();
        let headline = tokens.issue_regenerate(Section::Headline);
        let about = tokens.issue_regenerate(Section::About);
        assert!(tokens.is_current_regenerate(Section::Headline, headline));
        assert!(tokens.is_current_regenerate(Section::About, about));

        let newer = tokens.issue_regenerate(Section::Headline);
        assert!(!tokens.is_current_regenerate(Section::Headline, headline));
        assert!(tokens.is_current_regenerate(Section::Headline, newer));
    }

    #[test]
    fn display_name_falls_back_to_user() {
        let state = AppState::new();
        assert_eq!(state.display_name(), "User");
    }
}
