//! Owns the application state and runs collaborator effects.
//!
//! Effects run on spawned tasks; their results come back over a channel and
//! are applied by whoever drives the session (the TUI event loop, or a test
//! calling [`Session::settle`]). Nothing is cancelled once started.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::machine::{reduce, Action, Completion, Effect};
use crate::optimizer::ContentOptimizer;
use crate::scraper::ProfileScraper;
use crate::state::AppState;

pub struct Session {
    state: AppState,
    scraper: Arc<dyn ProfileScraper>,
    optimizer: Arc<dyn ContentOptimizer>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl Session {
    pub fn new(scraper: Arc<dyn ProfileScraper>, optimizer: Arc<dyn ContentOptimizer>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::new(),
            scraper,
            optimizer,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Swaps the optimization backend, e.g. after a provider change.
    /// Requests already in flight finish on the old backend.
    pub fn set_optimizer(&mut self, optimizer: Arc<dyn ContentOptimizer>) {
        self.optimizer = optimizer;
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Applies a user action and starts any collaborator calls it requests.
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&mut self, action: Action) {
        for effect in reduce(&mut self.state, action) {
            self.spawn(effect);
        }
    }

    /// Applies one collaborator result.
    pub fn apply(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        reduce(&mut self.state, Action::Completed(completion));
    }

    /// Waits for the next collaborator result. Pending forever when idle,
    /// which makes it safe to use as a `select!` branch.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.rx.recv().await
    }

    /// Applies results until no request is in flight.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.rx.recv().await {
                Some(completion) => self.apply(completion),
                None => break,
            }
        }
    }

    fn spawn(&mut self, effect: Effect) {
        self.in_flight += 1;
        let tx = self.tx.clone();
        debug!(in_flight = self.in_flight, "spawning collaborator call");

        match effect {
            Effect::Scrape { token, url } => {
                let scraper = Arc::clone(&self.scraper);
                tokio::spawn(async move {
                    let result = scraper
                        .scrape_profile(&url)
                        .await
                        .map_err(|e| e.to_string());
                    let _ = tx.send(Completion::Scraped { token, result });
                });
            }
            Effect::Optimize { token, profile } => {
                let optimizer = Arc::clone(&self.optimizer);
                tokio::spawn(async move {
                    let result = optimizer
                        .optimize_full(&profile)
                        .await
                        .map_err(|e| e.to_string());
                    let _ = tx.send(Completion::Optimized { token, result });
                });
            }
            Effect::Regenerate {
                token,
                section,
                feedback,
                profile,
            } => {
                let optimizer = Arc::clone(&self.optimizer);
                tokio::spawn(async move {
                    let result = optimizer
                        .regenerate_section(section, &feedback, &profile)
                        .await
                        .map_err(|e| e.to_string());
                    let _ = tx.send(Completion::Regenerated {
                        section,
                        token,
                        result,
                    });
                });
            }
            Effect::GenerateFreeform {
                message,
                transcript,
            } => {
                let optimizer = Arc::clone(&self.optimizer);
                tokio::spawn(async move {
                    let result = optimizer
                        .generate_freeform(&message, &transcript)
                        .await
                        .map_err(|e| e.to_string());
                    let _ = tx.send(Completion::ChatReplied { result });
                });
            }
        }
    }
}
