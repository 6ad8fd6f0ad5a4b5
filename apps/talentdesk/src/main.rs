use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use talentdesk::config::Config;
use talentdesk::models::{ResumeFile, Scope};
use talentdesk::resume::extract_fields;
use talentdesk::roster::RosterController;
use talentdesk::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        // Local extraction needs no backend, so no config either.
        Some("extract") => {
            init_tracing("info");
            let path = file_arg(&args, "extract")?;
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read '{path}'"))?;
            println!("{}", serde_json::to_string_pretty(&extract_fields(&text))?);
            Ok(())
        }
        Some("upload") => {
            let config = Config::from_env()?;
            init_tracing(&config.rust_log);
            let path = file_arg(&args, "upload")?;
            let state = AppState::build(config)?;
            let resume = ResumeFile::from_path(path).await?;
            let fields = state.intake.upload_and_extract(&resume).await?;
            println!("{}", serde_json::to_string_pretty(&fields)?);
            Ok(())
        }
        Some(other) => bail!("Unknown command '{other}'. Usage: talentdesk [extract|upload <file>]"),
        None => run_rosters().await,
    }
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), level))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn file_arg<'a>(args: &'a [String], command: &str) -> Result<&'a str> {
    match args.get(1) {
        Some(path) => Ok(path.as_str()),
        None => bail!("Usage: talentdesk {command} <file>"),
    }
}

async fn run_rosters() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.rust_log);

    info!("Starting TalentDesk v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Candidate API: {}{} (page size {}, debounce {}ms)",
        config.api_url, config.api_prefix, config.page_size, config.search_debounce_ms
    );

    let state = AppState::build(config)?;
    let all = state.hub.register("all", Scope::All);
    let offered = state.hub.register("offered", Scope::Offered);

    let (all_res, offered_res) = tokio::join!(all.open(), offered.open());
    report(&all, all_res.map(|_| ()));
    report(&offered, offered_res.map(|_| ()));

    state.hub.shutdown();
    if state.session.is_terminated() {
        bail!("Session was terminated by the backend; check TALENTDESK_API_TOKEN");
    }
    Ok(())
}

fn report(view: &RosterController, result: talentdesk::errors::Result<()>) {
    if let Err(e) = result {
        warn!("[{}] first page failed: {e}", view.name());
        return;
    }
    let Some(page) = view.snapshot().page else {
        return;
    };
    info!(
        "[{}] page {}/{}: {} candidate(s) in total",
        view.name(),
        page.current_page,
        page.total_pages,
        page.total_candidates
    );
    for c in &page.candidates {
        info!("  {} <{}> [{}]", c.name, c.email, c.status);
    }
}
