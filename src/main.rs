use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;

use triage_rs::model::openai::OpenAIModel;
use triage_rs::triage::config::Settings;
use triage_rs::triage::tools::github::GitHubTracker;
use triage_rs::triage::trigger::IssueEvent;
use triage_rs::triage::{
    build_workflow, process_issue, DryRunTracker, IssueTracker, LlmClassifier,
};
use triage_rs::workflow::state::IssueState;

#[derive(Parser, Debug)]
#[command(author, version, about = "Classify GitHub issues and label them", long_about = None)]
struct Args {
    /// Optional YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log the label/comment actions instead of calling GitHub
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Triage a single issue given on the command line
    Issue {
        /// Issue number
        #[arg(short, long)]
        number: u64,

        /// Issue title
        #[arg(short, long)]
        title: String,

        /// Issue body
        #[arg(short, long, default_value = "")]
        body: String,
    },
    /// Triage the issue carried by a GitHub `issues` webhook payload
    Event {
        /// Path to the JSON payload
        #[arg(short, long)]
        payload: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref(), args.dry_run)?;

    let initial = match args.command {
        Commands::Issue {
            number,
            title,
            body,
        } => IssueState::new(number, title, body),
        Commands::Event { payload } => {
            let raw = std::fs::read_to_string(&payload)
                .with_context(|| format!("failed to read payload {}", payload.display()))?;
            match IssueEvent::from_json(&raw)?.into_initial_state() {
                Some(state) => state,
                None => {
                    println!("{}", serde_json::json!({ "msg": "ignored" }));
                    return Ok(());
                }
            }
        }
    };

    log::info!(
        "Using model {} with threshold {}",
        settings.model,
        settings.triage.threshold
    );

    let model = Arc::new(OpenAIModel::new(
        settings.openai_api_key.clone(),
        settings.model.clone(),
        settings.openai_base_url.clone(),
        settings.timeout,
    )?);
    let classifier = Arc::new(LlmClassifier::new(model, settings.triage.labels.clone()));

    let tracker: Arc<dyn IssueTracker> = match &settings.github {
        Some(gh) => Arc::new(GitHubTracker::from_token(
            gh.token.clone(),
            gh.owner.clone(),
            gh.repo.clone(),
            settings.timeout,
        )?),
        None => {
            log::warn!("Dry run: no labels or comments will be written");
            Arc::new(DryRunTracker)
        }
    };

    let workflow = build_workflow(classifier, tracker, &settings.triage)?;

    let result = process_issue(
        &workflow,
        initial.issue_id(),
        initial.title(),
        initial.body(),
    )
    .await;

    match result {
        Ok(state) => {
            println!("{}", serde_json::to_string_pretty(&state.to_json())?);
            Ok(())
        }
        Err(e) => {
            log::error!("Triage failed: {}", e);
            Err(e.into())
        }
    }
}
