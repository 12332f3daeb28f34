//! End-to-end transitions through [`Session`] with counting test doubles in
//! place of the scraping and AI collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use linkboost_core::{
    Action, AiError, ChatMessage, ContentOptimizer, OptimizeError, OptimizedContent, Profile,
    ProfileScraper, ScrapeError, Section, Session, Status, View,
};

const URL: &str = "https://www.linkedin.com/in/ada-lovelace";

#[derive(Default)]
struct FakeScraper {
    calls: AtomicUsize,
    fail_with: Option<String>,
}

#[async_trait]
impl ProfileScraper for FakeScraper {
    async fn scrape_profile(&self, _url: &str) -> Result<Profile, ScrapeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(message) => Err(ScrapeError::Provider(message.clone())),
            None => Ok(Profile::from_record(&json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "headline": "Analyst",
                "experiences": [{"title": "Engineer", "companyName": "Analytical Engines"}]
            }))),
        }
    }
}

#[derive(Default)]
struct FakeOptimizer {
    optimize_calls: AtomicUsize,
    regenerate_calls: AtomicUsize,
    chat_calls: AtomicUsize,
    fail_regenerate: bool,
    fail_chat: bool,
    last_transcript: Mutex<Vec<ChatMessage>>,
}

fn offline() -> OptimizeError {
    OptimizeError::Ai(AiError::EmptyResponse { provider: "Fake" })
}

#[async_trait]
impl ContentOptimizer for FakeOptimizer {
    async fn optimize_full(&self, profile: &Profile) -> Result<OptimizedContent, OptimizeError> {
        self.optimize_calls.fetch_add(1, Ordering::SeqCst);
        Ok(OptimizedContent {
            headline: format!("{} | Builder", profile.full_name),
            about: "I build engines.".into(),
            experience_bullets: vec!["Shipped A".into(), "Scaled B".into(), "Led C".into()],
        })
    }

    async fn regenerate_section(
        &self,
        _section: Section,
        _feedback: &str,
        _profile: &Profile,
    ) -> Result<String, OptimizeError> {
        self.regenerate_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_regenerate {
            return Err(offline());
        }
        Ok("Led X".into())
    }

    async fn generate_freeform(
        &self,
        message: &str,
        transcript: &[ChatMessage],
    ) -> Result<String, OptimizeError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_transcript.lock().unwrap() = transcript.to_vec();
        if self.fail_chat {
            return Err(offline());
        }
        Ok(format!("Post about: {message}"))
    }
}

fn session(scraper: Arc<FakeScraper>, optimizer: Arc<FakeOptimizer>) -> Session {
    Session::new(scraper, optimizer)
}

async fn loaded_session(optimizer: Arc<FakeOptimizer>) -> Session {
    let mut session = session(Arc::new(FakeScraper::default()), optimizer);
    session.dispatch(Action::Submit(URL.into()));
    session.settle().await;
    session
}

#[tokio::test]
async fn invalid_url_never_reaches_scraper() {
    let scraper = Arc::new(FakeScraper::default());
    let mut session = session(scraper.clone(), Arc::new(FakeOptimizer::default()));

    session.dispatch(Action::Submit("not-a-linkedin-url".into()));
    session.settle().await;

    assert_eq!(scraper.calls.load(Ordering::SeqCst), 0);
    assert_eq!(session.state().status, Status::Error);
    assert_eq!(session.state().message, "Invalid LinkedIn URL");
    assert!(session.state().data.is_none());
}

#[tokio::test]
async fn successful_scrape_shows_normalized_profile() {
    let scraper = Arc::new(FakeScraper::default());
    let mut session = session(scraper.clone(), Arc::new(FakeOptimizer::default()));

    session.dispatch(Action::Submit(URL.into()));
    assert_eq!(session.state().status, Status::Scraping);
    session.settle().await;

    assert_eq!(scraper.calls.load(Ordering::SeqCst), 1);
    let state = session.state();
    assert_eq!(state.status, Status::Success);
    assert_eq!(state.view, View::ProfileView);
    let profile = state.data.as_ref().unwrap();
    assert_eq!(profile.full_name, "Ada Lovelace");
    assert_eq!(profile.experience[0].company, "Analytical Engines");
}

#[tokio::test]
async fn scrape_failure_message_is_propagated() {
    let scraper = Arc::new(FakeScraper {
        fail_with: Some("Profile is private".into()),
        ..FakeScraper::default()
    });
    let mut session = session(scraper, Arc::new(FakeOptimizer::default()));

    session.dispatch(Action::Submit(URL.into()));
    session.settle().await;

    assert_eq!(session.state().status, Status::Error);
    assert_eq!(session.state().message, "scraper error: Profile is private");
    assert_eq!(session.state().view, View::Onboarding);
}

#[tokio::test]
async fn enhance_populates_optimized_content() {
    let optimizer = Arc::new(FakeOptimizer::default());
    let mut session = loaded_session(optimizer.clone()).await;
    assert_eq!(session.state().view, View::ProfileView);

    session.dispatch(Action::Enhance);
    assert_eq!(session.state().status, Status::Analyzing);
    session.settle().await;

    assert_eq!(optimizer.optimize_calls.load(Ordering::SeqCst), 1);
    let state = session.state();
    assert_eq!(state.view, View::AiOptimizer);
    let optimized = state.optimized.as_ref().unwrap();
    assert_eq!(optimized.headline, "Ada Lovelace | Builder");
    assert!(!optimized.about.is_empty());
    assert_eq!(optimized.experience_bullets.len(), 3);
}

#[tokio::test]
async fn regenerating_bullets_replaces_the_list() {
    let optimizer = Arc::new(FakeOptimizer::default());
    let mut session = loaded_session(optimizer.clone()).await;
    session.dispatch(Action::Enhance);
    session.settle().await;

    session.dispatch(Action::Regenerate {
        section: Section::ExperienceBullets,
        feedback: "shorter".into(),
    });
    session.settle().await;

    let optimized = session.state().optimized.as_ref().unwrap();
    assert_eq!(optimized.experience_bullets, vec!["Led X".to_string()]);
    assert_eq!(optimized.headline, "Ada Lovelace | Builder");
}

#[tokio::test]
async fn failed_regeneration_is_not_surfaced_as_status() {
    let optimizer = Arc::new(FakeOptimizer {
        fail_regenerate: true,
        ..FakeOptimizer::default()
    });
    let mut session = loaded_session(optimizer.clone()).await;
    session.dispatch(Action::Enhance);
    session.settle().await;
    let before = session.state().optimized.clone();

    session.dispatch(Action::Regenerate {
        section: Section::Headline,
        feedback: "punchier".into(),
    });
    session.settle().await;

    assert_eq!(optimizer.regenerate_calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.state().optimized, before);
    assert_eq!(session.state().status, Status::Success);
    assert!(session.state().notice.is_some());
}

#[tokio::test]
async fn blank_chat_message_makes_no_call() {
    let optimizer = Arc::new(FakeOptimizer::default());
    let mut session = session(Arc::new(FakeScraper::default()), optimizer.clone());

    session.dispatch(Action::SendChatMessage("   ".into()));
    session.settle().await;

    assert_eq!(optimizer.chat_calls.load(Ordering::SeqCst), 0);
    assert!(session.state().chat_history.is_empty());
}

#[tokio::test]
async fn chat_reply_is_appended_with_prior_transcript() {
    let optimizer = Arc::new(FakeOptimizer::default());
    let mut session = session(Arc::new(FakeScraper::default()), optimizer.clone());

    session.dispatch(Action::SendChatMessage("hiring news".into()));
    session.settle().await;
    session.dispatch(Action::SendChatMessage("make it shorter".into()));
    session.settle().await;

    let history = &session.state().chat_history;
    assert_eq!(history.len(), 4);
    assert_eq!(history[3].content, "Post about: make it shorter");
    assert_eq!(
        *optimizer.last_transcript.lock().unwrap(),
        vec![
            ChatMessage::user("hiring news"),
            ChatMessage::assistant("Post about: hiring news"),
        ]
    );
}

#[tokio::test]
async fn failed_chat_leaves_transcript_untouched() {
    let optimizer = Arc::new(FakeOptimizer {
        fail_chat: true,
        ..FakeOptimizer::default()
    });
    let mut session = session(Arc::new(FakeScraper::default()), optimizer);

    session.dispatch(Action::SendChatMessage("hello".into()));
    session.settle().await;

    assert_eq!(session.state().chat_history, vec![ChatMessage::user("hello")]);
    assert_eq!(session.state().chat_pending, 0);
}

struct SlowScraper;

#[async_trait]
impl ProfileScraper for SlowScraper {
    async fn scrape_profile(&self, url: &str) -> Result<Profile, ScrapeError> {
        if url.ends_with("slow") {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        Ok(Profile {
            full_name: url.rsplit('/').next().unwrap_or_default().to_string(),
            ..Profile::default()
        })
    }
}

#[tokio::test]
async fn latest_submit_wins_over_slow_earlier_one() {
    let mut session = Session::new(Arc::new(SlowScraper), Arc::new(FakeOptimizer::default()));

    session.dispatch(Action::Submit("https://linkedin.com/in/slow".into()));
    session.dispatch(Action::Submit("https://linkedin.com/in/fast".into()));
    session.settle().await;

    assert_eq!(session.state().data.as_ref().unwrap().full_name, "fast");
    assert_eq!(session.in_flight(), 0);
}

#[tokio::test]
async fn navigation_works_while_scrape_is_in_flight() {
    let mut session = Session::new(Arc::new(SlowScraper), Arc::new(FakeOptimizer::default()));

    session.dispatch(Action::Submit("https://linkedin.com/in/slow".into()));
    session.dispatch(Action::ToggleNavigation);
    assert!(session.state().nav_open);
    assert_eq!(session.state().status, Status::Scraping);

    session.dispatch(Action::Navigate(View::PostGenerator));
    session.settle().await;

    assert_eq!(session.state().view, View::ProfileView);
    assert!(!session.state().nav_open);
}
