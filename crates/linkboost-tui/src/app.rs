use std::path::PathBuf;
use std::sync::Arc;

use linkboost_core::{
    Action, AppState, Completion, Config, LlmClient, LlmOptimizer, Provider, Section, Session,
    View,
};
use ratatui::widgets::ListState;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Entries of the navigation overlay. `NewProfile` returns to onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    View(View),
    NewProfile,
}

impl NavItem {
    pub fn all() -> Vec<NavItem> {
        let mut items: Vec<NavItem> = View::navigable().into_iter().map(NavItem::View).collect();
        items.push(NavItem::NewProfile);
        items
    }

    pub fn label(&self) -> &'static str {
        match self {
            NavItem::View(view) => view.label(),
            NavItem::NewProfile => "Analyze Another Profile",
        }
    }
}

/// Terminal-side state layered over the core [`Session`]: text cursors,
/// scroll offsets, list selections and popups.
pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub session: Session,

    // Backend selection
    pub config: Config,
    pub config_path: PathBuf,
    pub provider: Provider,
    pub model: String,
    pub settings_error: Option<String>,

    // Onboarding
    pub url_input: String,
    pub url_cursor: usize,

    // Optimizer
    pub section_state: ListState,
    pub feedback_input: String,
    pub feedback_cursor: usize,

    // Post generator
    pub chat_cursor: usize,
    pub chat_scroll: u16,
    pub chat_follow: bool,

    pub profile_scroll: u16,
    pub nav_state: ListState,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Pickers
    pub show_provider_picker: bool,
    pub provider_picker_state: ListState,
    pub show_model_picker: bool,
    pub available_models: Vec<String>,
    pub model_picker_state: ListState,
}

impl App {
    pub fn new(
        session: Session,
        config: Config,
        config_path: PathBuf,
        provider: Provider,
        model: String,
    ) -> Self {
        let mut section_state = ListState::default();
        section_state.select(Some(0));

        Self {
            should_quit: false,
            // Onboarding opens with the cursor in the URL field
            input_mode: InputMode::Editing,
            session,
            config,
            config_path,
            provider,
            model,
            settings_error: None,
            url_input: String::new(),
            url_cursor: 0,
            section_state,
            feedback_input: String::new(),
            feedback_cursor: 0,
            chat_cursor: 0,
            chat_scroll: 0,
            chat_follow: true,
            profile_scroll: 0,
            nav_state: ListState::default(),
            animation_frame: 0,
            show_provider_picker: false,
            provider_picker_state: ListState::default(),
            show_model_picker: false,
            available_models: Vec::new(),
            model_picker_state: ListState::default(),
        }
    }

    pub fn state(&self) -> &AppState {
        self.session.state()
    }

    pub fn view(&self) -> View {
        self.session.state().view
    }

    pub fn dispatch(&mut self, action: Action) {
        let before = self.view();
        self.session.dispatch(action);
        self.on_view_change(before);
    }

    pub fn apply(&mut self, completion: Completion) {
        let before = self.view();
        self.session.apply(completion);
        self.on_view_change(before);
    }

    /// Resets view-local cursors and input modes after the core switches views.
    fn on_view_change(&mut self, before: View) {
        let after = self.view();
        if before == after {
            return;
        }
        self.input_mode = match after {
            View::Onboarding => InputMode::Editing,
            _ => InputMode::Normal,
        };
        self.feedback_input.clear();
        self.feedback_cursor = 0;
        self.profile_scroll = 0;
        self.chat_follow = true;
    }

    pub fn prefill_url(&mut self, url: &str) {
        self.url_input = url.to_string();
        self.url_cursor = self.url_input.chars().count();
    }

    pub fn submit_url(&mut self) {
        let url = self.url_input.clone();
        self.dispatch(Action::Submit(url));
    }

    /// True while anything worth animating is in flight.
    pub fn is_waiting(&self) -> bool {
        let state = self.state();
        state.is_busy() || !state.regenerating.is_empty() || state.chat_pending > 0
    }

    pub fn tick_animation(&mut self) {
        if self.is_waiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn ellipsis(&self) -> String {
        ".".repeat(self.animation_frame as usize + 1)
    }

    // Navigation overlay

    pub fn toggle_navigation(&mut self) {
        self.dispatch(Action::ToggleNavigation);
        if self.state().nav_open {
            let current = NavItem::View(self.view());
            let idx = NavItem::all().iter().position(|item| *item == current).unwrap_or(0);
            self.nav_state.select(Some(idx));
        }
    }

    pub fn nav_down(&mut self) {
        let len = NavItem::all().len();
        let i = self.nav_state.selected().unwrap_or(0);
        self.nav_state.select(Some((i + 1).min(len - 1)));
    }

    pub fn nav_up(&mut self) {
        let i = self.nav_state.selected().unwrap_or(0);
        self.nav_state.select(Some(i.saturating_sub(1)));
    }

    pub fn nav_enter(&mut self) {
        let items = NavItem::all();
        let Some(item) = self.nav_state.selected().and_then(|i| items.get(i)).copied() else {
            return;
        };
        match item {
            NavItem::View(view) => self.dispatch(Action::Navigate(view)),
            NavItem::NewProfile => self.return_to_onboarding(),
        }
    }

    pub fn return_to_onboarding(&mut self) {
        self.dispatch(Action::ReturnToOnboarding);
        self.input_mode = InputMode::Editing;
    }

    // Optimizer

    pub fn selected_section(&self) -> Section {
        let sections = Section::all();
        let i = self.section_state.selected().unwrap_or(0).min(sections.len() - 1);
        sections[i]
    }

    pub fn section_down(&mut self) {
        let i = self.section_state.selected().unwrap_or(0);
        self.section_state.select(Some((i + 1).min(Section::all().len() - 1)));
    }

    pub fn section_up(&mut self) {
        let i = self.section_state.selected().unwrap_or(0);
        self.section_state.select(Some(i.saturating_sub(1)));
    }

    /// Regenerates the selected section; blank feedback falls back to the
    /// section's default.
    pub fn regenerate_selected(&mut self, feedback: String) {
        let section = self.selected_section();
        self.dispatch(Action::Regenerate { section, feedback });
    }

    // Post generator

    pub fn send_chat(&mut self) {
        let text = self.state().chat_input.clone();
        if text.trim().is_empty() {
            return;
        }
        self.dispatch(Action::SendChatMessage(text));
        self.chat_cursor = 0;
        self.chat_follow = true;
    }

    pub fn scroll_chat_up(&mut self) {
        self.chat_follow = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_chat_down(&mut self) {
        // Rendering clamps this and re-enables follow at the bottom
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    // Settings: provider and model pickers

    pub fn open_provider_picker(&mut self) {
        let current_idx = Provider::all()
            .iter()
            .position(|p| *p == self.provider)
            .unwrap_or(0);
        self.provider_picker_state.select(Some(current_idx));
        self.show_provider_picker = true;
    }

    pub fn provider_picker_nav_down(&mut self) {
        let len = Provider::all().len();
        let i = self.provider_picker_state.selected().unwrap_or(0);
        self.provider_picker_state.select(Some((i + 1).min(len - 1)));
    }

    pub fn provider_picker_nav_up(&mut self) {
        let i = self.provider_picker_state.selected().unwrap_or(0);
        self.provider_picker_state.select(Some(i.saturating_sub(1)));
    }

    pub fn select_provider(&mut self) {
        self.show_provider_picker = false;
        let providers = Provider::all();
        let Some(&provider) = self
            .provider_picker_state
            .selected()
            .and_then(|i| providers.get(i))
        else {
            return;
        };

        let model = if provider == self.provider {
            self.model.clone()
        } else {
            provider.default_model().to_string()
        };
        self.switch_backend(provider, model);
    }

    pub async fn open_model_picker(&mut self) {
        let models = match self.config.llm_client(self.provider) {
            Ok(client) => client.list_models().await,
            Err(err) => Err(err),
        };

        match models {
            Ok(mut models) => {
                if !models.contains(&self.model) {
                    models.insert(0, self.model.clone());
                }
                let current_idx = models.iter().position(|m| *m == self.model).unwrap_or(0);
                self.available_models = models;
                self.model_picker_state.select(Some(current_idx));
                self.show_model_picker = true;
            }
            Err(err) => {
                warn!(provider = self.provider.as_str(), error = %err, "could not list models");
                self.settings_error = Some(err.to_string());
            }
        }
    }

    pub fn model_picker_nav_down(&mut self) {
        let len = self.available_models.len();
        if len > 0 {
            let i = self.model_picker_state.selected().unwrap_or(0);
            self.model_picker_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn model_picker_nav_up(&mut self) {
        let i = self.model_picker_state.selected().unwrap_or(0);
        self.model_picker_state.select(Some(i.saturating_sub(1)));
    }

    pub fn select_model(&mut self) {
        self.show_model_picker = false;
        let Some(model) = self
            .model_picker_state
            .selected()
            .and_then(|i| self.available_models.get(i))
            .cloned()
        else {
            return;
        };
        self.switch_backend(self.provider, model);
    }

    /// Rebuilds the optimization backend. Requests already in flight finish
    /// on the previous one.
    fn switch_backend(&mut self, provider: Provider, model: String) {
        let client = match self.config.llm_client(provider) {
            Ok(client) => client,
            Err(err) => {
                warn!(provider = provider.as_str(), error = %err, "provider unavailable");
                self.settings_error = Some(match provider.api_key_env() {
                    Some(var) => format!("{err}: set {var} and restart"),
                    None => err.to_string(),
                });
                return;
            }
        };
        self.install_backend(client, model);
    }

    fn install_backend(&mut self, client: LlmClient, model: String) {
        self.provider = client.provider();
        self.model = model;
        info!(provider = self.provider.as_str(), model = %self.model, "optimization backend changed");
        self.session
            .set_optimizer(Arc::new(LlmOptimizer::new(client, self.model.clone())));
        self.settings_error = None;

        self.config.provider = Some(self.provider.as_str().to_string());
        self.config.default_model = Some(self.model.clone());
        if let Err(err) = self.config.save_to(&self.config_path) {
            warn!(error = %err, path = %self.config_path.display(), "could not save config");
        }
    }
}
