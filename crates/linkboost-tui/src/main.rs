mod app;
mod handler;
mod tui;
mod ui;

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use linkboost_core::{ApifyScraper, Config, LlmOptimizer, Provider, Session};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser, Debug)]
#[command(name = "linkboost")]
#[command(version, about = "Turn a LinkedIn profile into a landing page with AI rewriting")]
struct Args {
    /// Profile URL to analyze right away
    #[arg(long, env = "LINKBOOST_URL")]
    url: Option<String>,

    /// AI provider: ollama, claude, openai or gemini
    #[arg(long, env = "LINKBOOST_PROVIDER")]
    provider: Option<String>,

    /// Model name for the chosen provider
    #[arg(long, env = "LINKBOOST_MODEL")]
    model: Option<String>,

    /// Log file (the terminal belongs to the UI)
    #[arg(long, env = "LINKBOOST_LOG")]
    log_file: Option<PathBuf>,

    /// Config file to read and update
    #[arg(long, env = "LINKBOOST_CONFIG")]
    config: Option<PathBuf>,
}

fn init_logging(path: Option<PathBuf>) -> Result<PathBuf> {
    let path = match path {
        Some(path) => path,
        None => Config::config_dir()?.join("linkboost.log"),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "linkboost=info".into()),
        )
        .init();
    Ok(path)
}

/// Builds the session from config and flags. A hosted provider without a
/// key falls back to local Ollama so the UI still starts.
fn build_app(args: &Args) -> Result<App> {
    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };
    let config = Config::load_from(&config_path)?;

    let mut provider = match args.provider.as_deref() {
        Some(name) => Provider::parse(name).ok_or_else(|| anyhow!("unknown provider: {name}"))?,
        None => config.provider(),
    };
    let mut model = match &args.model {
        Some(model) => model.clone(),
        None if provider == config.provider() => config.model(),
        None => provider.default_model().to_string(),
    };

    let mut startup_error = None;
    let client = match config.llm_client(provider) {
        Ok(client) => client,
        Err(err) => {
            warn!(provider = provider.as_str(), error = %err, "falling back to Ollama");
            startup_error = Some(format!("{err}; using Ollama instead"));
            provider = Provider::Ollama;
            model = provider.default_model().to_string();
            config.llm_client(provider)?
        }
    };

    let scraper = ApifyScraper::new(
        config.scraper_base_url(),
        config.scraper_actor(),
        config.apify_token().map(|(token, _)| token),
    )?;
    if config.apify_token().is_none() {
        warn!("APIFY_TOKEN not set; scraping will fail until it is configured");
    }

    info!(
        provider = provider.as_str(),
        %model,
        actor = config.scraper_actor(),
        "starting"
    );

    let optimizer = LlmOptimizer::new(client, model.clone());
    let session = Session::new(Arc::new(scraper), Arc::new(optimizer));

    let mut app = App::new(session, config, config_path, provider, model);
    app.settings_error = startup_error;
    Ok(app)
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        tokio::select! {
            event = events.next() => match event {
                Some(event) => handler::handle_event(app, event).await?,
                None => break,
            },
            Some(completion) = app.session.next_completion() => app.apply(completion),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_path = init_logging(args.log_file.clone())?;
    info!(log = %log_path.display(), "linkboost {}", env!("CARGO_PKG_VERSION"));

    let mut app = build_app(&args)?;
    if let Some(url) = &args.url {
        app.prefill_url(url);
        app.submit_url();
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    if let Err(err) = &result {
        warn!(error = %err, "exited with error");
    }
    info!("shutting down");
    result
}
