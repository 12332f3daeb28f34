//! Application state machine.
//!
//! All mutation of [`AppState`] goes through [`reduce`]. User actions that
//! need a collaborator return an [`Effect`]; the effect's result comes back
//! later as [`Action::Completed`]. Scrape, optimize and regenerate requests
//! carry a generation token, and only the latest token for an operation is
//! allowed to land.

use tracing::{debug, info, warn};

use crate::profile::Profile;
use crate::state::{AppState, ChatMessage, OptimizedContent, Section, Status, View};

pub const LINKEDIN_PROFILE_MARKER: &str = "linkedin.com/in/";
pub const INVALID_URL_MESSAGE: &str = "Invalid LinkedIn URL";
pub const SCRAPING_MESSAGE: &str = "Fetching complete profile data...";
pub const ANALYZING_MESSAGE: &str = "Optimizing strategy...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Submit(String),
    Enhance,
    Regenerate { section: Section, feedback: String },
    SetChatInput(String),
    SendChatMessage(String),
    Navigate(View),
    ToggleNavigation,
    ReturnToOnboarding,
    DismissNotice,
    Completed(Completion),
}

/// Collaborator results, carrying failures as their display message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Scraped {
        token: u64,
        result: Result<Profile, String>,
    },
    Optimized {
        token: u64,
        result: Result<OptimizedContent, String>,
    },
    Regenerated {
        section: Section,
        token: u64,
        result: Result<String, String>,
    },
    ChatReplied {
        result: Result<String, String>,
    },
}

/// A collaborator call requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Scrape {
        token: u64,
        url: String,
    },
    Optimize {
        token: u64,
        profile: Profile,
    },
    Regenerate {
        token: u64,
        section: Section,
        feedback: String,
        profile: Profile,
    },
    GenerateFreeform {
        message: String,
        transcript: Vec<ChatMessage>,
    },
}

pub fn is_linkedin_profile_url(url: &str) -> bool {
    url.contains(LINKEDIN_PROFILE_MARKER)
}

pub fn reduce(state: &mut AppState, action: Action) -> Vec<Effect> {
    match action {
        Action::Submit(url) => submit(state, url),
        Action::Enhance => enhance(state),
        Action::Regenerate { section, feedback } => regenerate(state, section, feedback),
        Action::SetChatInput(text) => {
            state.chat_input = text;
            Vec::new()
        }
        Action::SendChatMessage(text) => send_chat_message(state, text),
        Action::Navigate(view) => {
            debug!(?view, "navigate");
            state.view = view;
            state.nav_open = false;
            Vec::new()
        }
        Action::ToggleNavigation => {
            state.nav_open = !state.nav_open;
            Vec::new()
        }
        Action::ReturnToOnboarding => {
            info!("returning to onboarding");
            state.view = View::Onboarding;
            state.status = Status::Idle;
            state.nav_open = false;
            // Late scrape/optimize results must not pull the user back out.
            state.tokens.issue_scrape();
            state.tokens.issue_optimize();
            Vec::new()
        }
        Action::DismissNotice => {
            state.notice = None;
            Vec::new()
        }
        Action::Completed(completion) => {
            complete(state, completion);
            Vec::new()
        }
    }
}

fn submit(state: &mut AppState, url: String) -> Vec<Effect> {
    let url = url.trim().to_string();
    if !is_linkedin_profile_url(&url) {
        info!(%url, "rejected profile url");
        state.status = Status::Error;
        state.message = INVALID_URL_MESSAGE.to_string();
        return Vec::new();
    }

    let token = state.tokens.issue_scrape();
    info!(%url, token, "scraping profile");
    state.status = Status::Scraping;
    state.message = SCRAPING_MESSAGE.to_string();
    vec![Effect::Scrape { token, url }]
}

fn enhance(state: &mut AppState) -> Vec<Effect> {
    let Some(profile) = state.data.clone() else {
        debug!("enhance ignored: no profile loaded");
        return Vec::new();
    };

    let token = state.tokens.issue_optimize();
    info!(token, "optimizing profile");
    state.status = Status::Analyzing;
    state.message = ANALYZING_MESSAGE.to_string();
    vec![Effect::Optimize { token, profile }]
}

fn regenerate(state: &mut AppState, section: Section, feedback: String) -> Vec<Effect> {
    let (Some(_), Some(profile)) = (&state.optimized, &state.data) else {
        debug!(%section, "regenerate ignored: nothing to rewrite");
        return Vec::new();
    };
    let profile = profile.clone();

    let feedback = if feedback.trim().is_empty() {
        section.default_feedback().to_string()
    } else {
        feedback.trim().to_string()
    };

    let token = state.tokens.issue_regenerate(section);
    info!(%section, %feedback, token, "regenerating section");
    state.notice = None;
    if !state.regenerating.contains(&section) {
        state.regenerating.push(section);
    }
    vec![Effect::Regenerate {
        token,
        section,
        feedback,
        profile,
    }]
}

fn send_chat_message(state: &mut AppState, text: String) -> Vec<Effect> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let transcript = state.chat_history.clone();
    state.chat_history.push(ChatMessage::user(text.clone()));
    state.chat_input.clear();
    state.chat_pending += 1;
    state.notice = None;
    debug!(history = transcript.len(), "sending chat message");
    vec![Effect::GenerateFreeform {
        message: text,
        transcript,
    }]
}

fn complete(state: &mut AppState, completion: Completion) {
    match completion {
        Completion::Scraped { token, result } => {
            if !state.tokens.is_current_scrape(token) {
                warn!(token, "discarding stale scrape result");
                return;
            }
            match result {
                Ok(profile) => {
                    info!(name = %profile.full_name, "profile loaded");
                    state.status = Status::Success;
                    state.message.clear();
                    state.view = View::ProfileView;
                    state.data = Some(profile);
                    // Rewrites of the previous profile no longer apply.
                    state.optimized = None;
                    state.tokens.issue_optimize();
                    for section in Section::all() {
                        state.tokens.issue_regenerate(section);
                    }
                    state.regenerating.clear();
                }
                Err(message) => {
                    warn!(%message, "scrape failed");
                    state.status = Status::Error;
                    state.message = message;
                }
            }
        }
        Completion::Optimized { token, result } => {
            if !state.tokens.is_current_optimize(token) {
                warn!(token, "discarding stale optimization result");
                return;
            }
            match result {
                Ok(optimized) => {
                    info!(bullets = optimized.experience_bullets.len(), "profile optimized");
                    state.status = Status::Success;
                    state.message.clear();
                    state.view = View::AiOptimizer;
                    state.optimized = Some(optimized);
                }
                Err(message) => {
                    warn!(%message, "optimization failed");
                    state.status = Status::Error;
                    state.message = message;
                }
            }
        }
        Completion::Regenerated {
            section,
            token,
            result,
        } => {
            if !state.tokens.is_current_regenerate(section, token) {
                warn!(%section, token, "discarding stale regeneration result");
                return;
            }
            state.regenerating.retain(|s| *s != section);
            match (result, state.optimized.as_mut()) {
                (Ok(text), Some(optimized)) => {
                    info!(%section, "section regenerated");
                    optimized.apply(section, text);
                }
                (Ok(_), None) => {}
                (Err(message), _) => {
                    warn!(%section, %message, "section regeneration failed");
                    state.notice = Some(format!("Could not rewrite {}: {}", section.title(), message));
                }
            }
        }
        Completion::ChatReplied { result } => {
            state.chat_pending = state.chat_pending.saturating_sub(1);
            match result {
                Ok(reply) => state.chat_history.push(ChatMessage::assistant(reply)),
                Err(message) => {
                    warn!(%message, "post generation failed");
                    state.notice = Some(format!("Could not generate post: {}", message));
                }
            }
        }
    }
}
