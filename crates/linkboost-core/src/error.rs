use thiserror::Error;

use crate::state::Section;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("scraper returned invalid JSON: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("scraper request failed with status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("scraper error: {0}")]
    Provider(String),

    #[error("no profile data returned for {url}")]
    EmptyDataset { url: String },

    #[error("scraper token not configured (set APIFY_TOKEN)")]
    MissingToken,
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API error {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} returned an empty response")]
    EmptyResponse { provider: &'static str },

    #[error("{provider} API key not configured")]
    MissingApiKey { provider: &'static str },
}

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error(transparent)]
    Ai(#[from] AiError),

    #[error("could not parse optimized profile: {reason}")]
    MalformedResponse { reason: String },

    #[error("model returned no text for {section}")]
    EmptySection { section: Section },
}
