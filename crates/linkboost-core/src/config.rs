use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::ai::{ClaudeClient, GeminiClient, LlmClient, OllamaClient, OpenAIClient};
use crate::ai::ollama::DEFAULT_OLLAMA_URL;
use crate::error::AiError;
use crate::provider::Provider;
use crate::scraper::{DEFAULT_APIFY_URL, DEFAULT_SCRAPER_ACTOR};

pub const APIFY_TOKEN_ENV: &str = "APIFY_TOKEN";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub provider: Option<String>,
    pub default_model: Option<String>,
    pub ollama_url: Option<String>,
    pub claude_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub apify_token: Option<String>,
    pub scraper_actor: Option<String>,
    pub scraper_base_url: Option<String>,
}

/// Where a credential was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Env,
    Config,
    Local,
}

impl KeySource {
    pub fn label(&self) -> &'static str {
        match self {
            KeySource::Env => "env var",
            KeySource::Config => "configured",
            KeySource::Local => "local",
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            provider: Some(Provider::Ollama.as_str().to_string()),
            ..Self::default()
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("linkboost"))
    }

    /// `<config dir>/linkboost/config.json`.
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub fn provider(&self) -> Provider {
        self.provider
            .as_deref()
            .and_then(Provider::parse)
            .unwrap_or(Provider::Ollama)
    }

    /// Configured model, or the provider's default.
    pub fn model(&self) -> String {
        self.default_model
            .clone()
            .unwrap_or_else(|| self.provider().default_model().to_string())
    }

    pub fn ollama_url(&self) -> &str {
        self.ollama_url.as_deref().unwrap_or(DEFAULT_OLLAMA_URL)
    }

    pub fn scraper_actor(&self) -> &str {
        self.scraper_actor.as_deref().unwrap_or(DEFAULT_SCRAPER_ACTOR)
    }

    pub fn scraper_base_url(&self) -> &str {
        self.scraper_base_url.as_deref().unwrap_or(DEFAULT_APIFY_URL)
    }

    fn stored_key(&self, provider: Provider) -> Option<&String> {
        match provider {
            Provider::Ollama => None,
            Provider::Claude => self.claude_api_key.as_ref(),
            Provider::OpenAI => self.openai_api_key.as_ref(),
            Provider::Gemini => self.gemini_api_key.as_ref(),
        }
    }

    pub fn set_api_key(&mut self, provider: Provider, key: String) {
        match provider {
            Provider::Ollama => {}
            Provider::Claude => self.claude_api_key = Some(key),
            Provider::OpenAI => self.openai_api_key = Some(key),
            Provider::Gemini => self.gemini_api_key = Some(key),
        }
    }

    /// API key for a provider: environment first, then the config file.
    pub fn api_key(&self, provider: Provider) -> Option<(String, KeySource)> {
        if provider == Provider::Ollama {
            return Some((String::new(), KeySource::Local));
        }
        let from_env = provider
            .api_key_env()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.is_empty());
        match from_env {
            Some(key) => Some((key, KeySource::Env)),
            None => self
                .stored_key(provider)
                .filter(|key| !key.is_empty())
                .map(|key| (key.clone(), KeySource::Config)),
        }
    }

    pub fn apify_token(&self) -> Option<(String, KeySource)> {
        match std::env::var(APIFY_TOKEN_ENV).ok().filter(|t| !t.is_empty()) {
            Some(token) => Some((token, KeySource::Env)),
            None => self
                .apify_token
                .as_ref()
                .filter(|t| !t.is_empty())
                .map(|t| (t.clone(), KeySource::Config)),
        }
    }

    pub fn llm_client(&self, provider: Provider) -> Result<LlmClient, AiError> {
        let key = || {
            self.api_key(provider)
                .map(|(key, _)| key)
                .ok_or(AiError::MissingApiKey {
                    provider: provider.display_name(),
                })
        };
        Ok(match provider {
            Provider::Ollama => LlmClient::Ollama(OllamaClient::new(self.ollama_url())),
            Provider::Claude => LlmClient::Claude(ClaudeClient::new(&key()?)),
            Provider::OpenAI => LlmClient::OpenAI(OpenAIClient::new(&key()?)),
            Provider::Gemini => LlmClient::Gemini(GeminiClient::new(&key()?)),
        })
    }
}
