pub mod ai;
pub mod config;
pub mod error;
pub mod machine;
pub mod optimizer;
pub mod profile;
pub mod provider;
pub mod scraper;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use ai::{ClaudeClient, GeminiClient, LlmClient, OllamaClient, OpenAIClient};
pub use config::{Config, KeySource};
pub use error::{AiError, OptimizeError, ScrapeError};
pub use machine::{reduce, Action, Completion, Effect};
pub use optimizer::{ContentOptimizer, LlmOptimizer};
pub use profile::{coerce_to_list, render_text, resolve_image, resolve_profile_image, Profile};
pub use provider::Provider;
pub use scraper::{ApifyScraper, ProfileScraper};
pub use session::Session;
pub use state::{AppState, ChatMessage, ChatRole, OptimizedContent, Section, Status, View};
