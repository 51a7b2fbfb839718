use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use feedback_queue_core::{
    FeedbackFilter, FeedbackId, FeedbackPayload, FeedbackStatus, FeedbackType, NewFeedback,
    ReviewAction, RiskLevel, TargetId, TargetType,
};
use feedback_queue_service::{Config, ReviewService, SqliteRepository};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Operator tool for the rule feedback review queue
#[derive(Parser, Debug)]
#[command(name = "feedback-queue")]
#[command(about = "Submit, review and merge rule feedback", long_about = None)]
struct Cli {
    /// Directory holding the queue database
    #[arg(long, global = true, env = "FEEDBACK_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Database file name inside the state directory, or :memory:
    #[arg(long = "db", global = true, env = "FEEDBACK_DB_FILE")]
    db_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit a new feedback entry
    Submit(SubmitArgs),
    /// Record an LLM or human review decision
    Apply(ApplyArgs),
    /// Mark an approved entry as merged
    Merge(IdArgs),
    /// Show one entry
    Show(IdArgs),
    /// Fail unless the entry exists
    Exists(IdArgs),
    /// List entries matching a filter
    List(ListArgs),
    /// Entries waiting for LLM review
    Pending(QueueArgs),
    /// LLM-approved MEDIUM entries waiting for a human
    AwaitingHuman(QueueArgs),
    /// LLM-approved SAFE entries ready to merge
    AutoMergeable(PageArgs),
}

#[derive(Args, Debug)]
struct SubmitArgs {
    /// CODING_RULE, RULE_EXAMPLE, CLASS_TEMPLATE, CHECKLIST_ITEM or ARCH_UNIT_TEST
    #[arg(long)]
    target_type: TargetType,

    /// ID of the record being changed (required for MODIFY and DELETE)
    #[arg(long)]
    target_id: Option<u64>,

    /// ADD, MODIFY or DELETE
    #[arg(long)]
    feedback_type: FeedbackType,

    /// SAFE, MEDIUM or HIGH; defaults from the target type
    #[arg(long)]
    risk_level: Option<RiskLevel>,

    /// Serialized change description
    #[arg(long, conflicts_with = "payload_file", required_unless_present = "payload_file")]
    payload: Option<String>,

    /// Read the change description from a file
    #[arg(long)]
    payload_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ApplyArgs {
    id: FeedbackId,

    /// LLM_APPROVE, LLM_REJECT, HUMAN_APPROVE or HUMAN_REJECT
    action: ReviewAction,

    /// Reviewer notes (at most 1000 characters)
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Args, Debug)]
struct IdArgs {
    id: FeedbackId,
}

#[derive(Args, Debug)]
struct PageArgs {
    /// Only return entries with an ID below this one
    #[arg(long)]
    cursor: Option<u64>,

    /// Page size (1-100)
    #[arg(long)]
    size: Option<usize>,
}

#[derive(Args, Debug)]
struct QueueArgs {
    #[arg(long)]
    target_type: Option<TargetType>,

    #[command(flatten)]
    page: PageArgs,
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long = "status")]
    statuses: Vec<FeedbackStatus>,

    #[arg(long = "target-type")]
    target_types: Vec<TargetType>,

    #[arg(long = "feedback-type")]
    feedback_types: Vec<FeedbackType>,

    #[arg(long = "risk-level")]
    risk_levels: Vec<RiskLevel>,

    #[arg(long)]
    target_id: Option<u64>,

    #[command(flatten)]
    page: PageArgs,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn read_payload(args: &SubmitArgs) -> Result<FeedbackPayload> {
    let raw = match (&args.payload, &args.payload_file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload file {}", path.display()))?,
        (None, None) => bail!("one of --payload or --payload-file is required"),
    };
    Ok(FeedbackPayload::new(raw)?)
}

async fn run_submit(service: &ReviewService, args: SubmitArgs) -> Result<()> {
    let payload = read_payload(&args)?;
    let target_id = args.target_id.map(TargetId);
    let feedback = match args.risk_level {
        Some(risk_level) => NewFeedback::new(
            args.target_type,
            target_id,
            args.feedback_type,
            payload,
            risk_level,
        )?,
        None => NewFeedback::with_default_risk(
            args.target_type,
            target_id,
            args.feedback_type,
            payload,
        )?,
    };

    let id = service.submit(feedback).await?;
    print_json(&serde_json::json!({ "id": id }))
}

async fn run(config: &Config, command: Commands) -> Result<()> {
    let db_path = config.db_path();
    debug!(path = %db_path.display(), "Opening feedback database");
    let repository = SqliteRepository::new(&db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    let service = ReviewService::new(Arc::new(repository));

    match command {
        Commands::Submit(args) => run_submit(&service, args).await,
        Commands::Apply(args) => {
            let entry = service
                .apply_action(args.id, args.action, args.notes)
                .await?;
            print_json(&entry)
        }
        Commands::Merge(args) => print_json(&service.merge(args.id).await?),
        Commands::Show(args) => print_json(&service.get(args.id).await?),
        Commands::Exists(args) => {
            service.ensure_exists(args.id).await?;
            print_json(&serde_json::json!({ "id": args.id, "exists": true }))
        }
        Commands::List(args) => {
            let filter = FeedbackFilter {
                statuses: args.statuses,
                target_types: args.target_types,
                feedback_types: args.feedback_types,
                risk_levels: args.risk_levels,
                target_id: args.target_id.map(TargetId),
            };
            let page = config.page(args.page.cursor, args.page.size)?;
            print_json(&service.list(&filter, &page).await?)
        }
        Commands::Pending(args) => {
            let page = config.page(args.page.cursor, args.page.size)?;
            print_json(&service.pending(args.target_type, &page).await?)
        }
        Commands::AwaitingHuman(args) => {
            let page = config.page(args.page.cursor, args.page.size)?;
            print_json(&service.awaiting_human_review(args.target_type, &page).await?)
        }
        Commands::AutoMergeable(args) => {
            let page = config.page(args.cursor, args.size)?;
            print_json(&service.auto_mergeable(&page).await?)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only JSON results.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()
        .context("Failed to load configuration")?
        .with_overrides(cli.state_dir, cli.db_file);

    run(&config, cli.command).await
}
