use anyhow::{bail, Context};
use clap::Parser;
use colored::*;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use repo_insight::orchestrator::{AnalysisBundle, API_KEY_MISSING};
use repo_insight::{logging, AnalysisKind, AnalysisOrchestrator, Config, GitHubFetcher, LlmClient, Project, ProjectStore};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Generate a full LLM report for a GitHub repository
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Repository URL (prompted for when omitted)
    #[arg(short, long)]
    url: Option<String>,

    /// Completion model
    #[arg(short, long, env = "OPENAI_MODEL")]
    model: Option<String>,

    /// Report file
    #[arg(short, long, default_value = "output.json")]
    output: PathBuf,

    /// Also store the project analyses under the projects directory
    #[arg(short, long)]
    save: bool,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Serialize)]
struct Report<'a> {
    repo_url: &'a str,
    outputs: &'a AnalysisBundle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level)?;

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let model = cli.model.unwrap_or_else(|| config.openai.default_model.clone());

    let repo_url = match cli.url {
        Some(url) => url,
        None => Input::<String>::new()
            .with_prompt("Enter the GitHub repository URL")
            .interact_text()?,
    };
    let repo_url = repo_url.trim().to_string();

    let llm = LlmClient::from_config(&config.openai);
    if !llm.is_configured() {
        println!("{}", "Warning: OpenAI API key not set. The report will be empty.".yellow());
    }

    let fetcher = GitHubFetcher::from_config(&config)?;
    let spinner = create_spinner(&format!("Fetching {}", repo_url));
    let metadata = match fetcher.fetch_metadata(&repo_url).await {
        Ok(metadata) => metadata,
        Err(e) => {
            spinner.finish_and_clear();
            bail!("Failed to fetch repository metadata: {}", e);
        }
    };
    spinner.finish_with_message(format!("Fetched {} file(s)", metadata.contents.len()));

    let orchestrator = AnalysisOrchestrator::new(llm);
    let progress = create_spinner("Starting analysis");
    let outputs = orchestrator
        .run_report(&metadata, &model, |kind| {
            progress.set_message(format!("Processing {} prompt...", kind.label()));
        })
        .await;
    progress.finish_with_message("All prompts processed");

    let report = Report {
        repo_url: &repo_url,
        outputs: &outputs,
    };
    tokio::fs::write(&cli.output, serde_json::to_vec_pretty(&report)?)
        .await
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    println!("{} {}", "Output saved to".green(), cli.output.display());

    if cli.save {
        let analyses = if orchestrator.llm().is_configured() {
            let mut analyses = AnalysisBundle::default();
            for kind in AnalysisKind::PROJECT {
                analyses.insert(kind, outputs.get(kind).unwrap_or_default().to_string());
            }
            analyses
        } else {
            AnalysisBundle::placeholder(&AnalysisKind::PROJECT, API_KEY_MISSING)
        };
        let project = Project::new(metadata, analyses)?;
        let store = ProjectStore::new(config.projects_dir.clone());
        store.save(&project).await?;
        println!("{} {}", "Project stored as".green(), project.id.bold());
    }

    Ok(())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.blue} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(message.to_string());
    pb
}
