use clap::Parser;
use repo_insight::api::{self, AppState, ProjectService};
use repo_insight::Config;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Web server exposing stored repository analyses
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind, e.g. 127.0.0.1:5001
    #[arg(short, long)]
    bind: Option<String>,

    /// Directory holding project documents
    #[arg(short, long)]
    projects_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(dir) = args.projects_dir {
        config.projects_dir = dir;
    }
    let service = ProjectService::from_config(&config)?;
    service.store().ensure_root().await?;
    if !service.health().llm_configured {
        warn!("OPENAI_API_KEY not set; analyses will contain placeholder text");
    }

    info!("repo-insight server starting...");
    info!("Projects directory: {}", config.projects_dir.display());

    let app = api::router(AppState::new(service), &config.static_dir);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
