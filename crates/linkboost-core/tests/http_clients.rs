//! HTTP-level behavior of the scraper and model clients against a mock server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use linkboost_core::{
    AiError, ApifyScraper, ClaudeClient, ContentOptimizer, GeminiClient, LlmClient, LlmOptimizer,
    OllamaClient, OpenAIClient, ProfileScraper, ScrapeError, Section,
};

const ACTOR: &str = "dev_fusion~linkedin-profile-scraper";
const PROFILE_URL: &str = "https://www.linkedin.com/in/ada";
const RUN_PATH: &str = "/v2/acts/dev_fusion~linkedin-profile-scraper/run-sync-get-dataset-items";

fn scraper(server: &MockServer, token: Option<&str>) -> ApifyScraper {
    ApifyScraper::new(&server.uri(), ACTOR, token.map(str::to_string)).unwrap()
}

#[tokio::test]
async fn apify_scrape_normalizes_first_item() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RUN_PATH))
        .and(query_param("token", "secret"))
        .and(body_json(json!({"profileUrls": [PROFILE_URL]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "fullName": "Ada Lovelace",
            "headline": "Mathematician",
            "profilePicture": {"url": "https://img/ada.png"},
            "connectionsCount": 500,
            "skills": [{"name": "Analysis"}, "Poetry"]
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let profile = scraper(&server, Some("secret"))
        .scrape_profile(PROFILE_URL)
        .await
        .unwrap();

    assert_eq!(profile.full_name, "Ada Lovelace");
    assert_eq!(profile.headline, "Mathematician");
    assert_eq!(profile.profile_image, "https://img/ada.png");
    assert_eq!(profile.connections_count, "500");
    assert_eq!(profile.skills, vec!["Analysis", "Poetry"]);
}

#[tokio::test]
async fn apify_empty_dataset_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RUN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = scraper(&server, Some("secret"))
        .scrape_profile(PROFILE_URL)
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::EmptyDataset { .. }));
}

#[tokio::test]
async fn apify_error_status_carries_provider_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RUN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"type": "token-not-valid", "message": "User was not found or authentication token is not valid"}
        })))
        .mount(&server)
        .await;

    let err = scraper(&server, Some("bad"))
        .scrape_profile(PROFILE_URL)
        .await
        .unwrap_err();

    match err {
        ScrapeError::UnexpectedStatus { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("authentication token is not valid"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn apify_without_token_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = scraper(&server, None)
        .scrape_profile(PROFILE_URL)
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::MissingToken));
}

#[tokio::test]
async fn ollama_query_requests_json_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_json(json!({
            "model": "llama3.2",
            "prompt": "hi",
            "stream": false,
            "format": "json"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "{}"})))
        .expect(1)
        .mount(&server)
        .await;

    let reply = OllamaClient::new(&server.uri())
        .query("llama3.2", "hi", true)
        .await
        .unwrap();
    assert_eq!(reply, "{}");
}

#[tokio::test]
async fn ollama_lists_installed_models() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{"name": "llama3.2"}, {"name": "mistral"}]
        })))
        .mount(&server)
        .await;

    let models = LlmClient::Ollama(OllamaClient::new(&server.uri()))
        .list_models()
        .await
        .unwrap();
    assert_eq!(models, vec!["llama3.2", "mistral"]);
}

#[tokio::test]
async fn ollama_model_listing_gives_up_on_a_silent_host() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"models": []}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server.uri()).with_list_timeout(Duration::from_millis(200));
    let err = LlmClient::Ollama(client).list_models().await.unwrap_err();
    assert!(matches!(err, AiError::Http(ref e) if e.is_timeout()), "{err:?}");
}

#[tokio::test]
async fn claude_sends_key_and_reads_text_block() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "Hello"}]
        })))
        .mount(&server)
        .await;

    let reply = ClaudeClient::with_base_url("sk-ant", &server.uri())
        .query("claude-sonnet-4-20250514", "hi", false)
        .await
        .unwrap();
    assert_eq!(reply, "Hello");
}

#[tokio::test]
async fn openai_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let err = OpenAIClient::with_base_url("sk-test", &server.uri())
        .query("gpt-4o", "hi", false)
        .await
        .unwrap_err();

    match err {
        AiError::Status {
            provider,
            status,
            body,
        } => {
            assert_eq!(provider, "OpenAI");
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn gemini_joins_candidate_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(header("x-goog-api-key", "g-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "Hel"}, {"text": "lo"}]}}]
        })))
        .mount(&server)
        .await;

    let reply = GeminiClient::with_base_url("g-key", &server.uri())
        .query("gemini-2.5-flash", "hi", false)
        .await
        .unwrap();
    assert_eq!(reply, "Hello");
}

#[tokio::test]
async fn gemini_empty_candidates_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let err = GeminiClient::with_base_url("g-key", &server.uri())
        .query("gemini-2.5-flash", "hi", false)
        .await
        .unwrap_err();
    assert!(matches!(err, AiError::EmptyResponse { provider: "Gemini" }));
}

#[tokio::test]
async fn optimizer_parses_fenced_model_reply() {
    let server = MockServer::start().await;
    let reply = "```json\n{\"headline\": \"Builder\", \"about\": \"I build.\", \"experienceBullets\": [\"Led X\", \"Shipped Y\"]}\n```";
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": reply})))
        .mount(&server)
        .await;

    let optimizer = LlmOptimizer::new(
        LlmClient::Ollama(OllamaClient::new(&server.uri())),
        "llama3.2",
    );
    let profile = linkboost_core::Profile {
        full_name: "Ada".into(),
        ..Default::default()
    };

    let content = optimizer.optimize_full(&profile).await.unwrap();
    assert_eq!(content.headline, "Builder");
    assert_eq!(content.experience_bullets, vec!["Led X", "Shipped Y"]);
}

#[tokio::test]
async fn optimizer_regeneration_strips_quotes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"response": "\"Punchy headline\"\n"})),
        )
        .mount(&server)
        .await;

    let optimizer = LlmOptimizer::new(
        LlmClient::Ollama(OllamaClient::new(&server.uri())),
        "llama3.2",
    );
    let text = optimizer
        .regenerate_section(Section::Headline, "make it more punchy", &Default::default())
        .await
        .unwrap();
    assert_eq!(text, "Punchy headline");
}
