//! Offline maintenance for the campus store.
//!
//! # Usage
//!
//! ```bash
//! # Enroll every paying user from a transactions export (preview first)
//! cargo run -p campus-reconcile -- enroll --input tx.json --course-id c1 --dry-run
//! cargo run -p campus-reconcile -- enroll --input tx.json --course-id c1
//!
//! # Push writes made during remote outages to the remote tables
//! cargo run -p campus-reconcile -- replay
//!
//! # Finish or abandon purchases interrupted mid-way
//! cargo run -p campus-reconcile -- repair
//! ```
//!
//! Reads the same environment as the store service (`.env` is honored).
//! Exits 1 when any row or write failed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};

use campus_core::tracing::init_cli_tracing;
use campus_store::config::StoreConfig;
use campus_store::infra::local::LocalStore;
use campus_store::state::AppState;
use campus_store::usecase::purchase::RepairPurchaseIntentsUseCase;
use campus_store::usecase::reconcile::ReconcileTransactionsUseCase;
use campus_store::usecase::sync::ReplayPendingWritesUseCase;

mod reporter;
mod transactions;

#[derive(Parser)]
#[command(about = "Reconcile and repair the campus store")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Enroll users listed in a payment provider's transactions export
    Enroll {
        /// JSON file with the transactions
        #[arg(long)]
        input: PathBuf,

        /// Course for rows that do not name one
        #[arg(long)]
        course_id: String,

        /// Report what would happen without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Push writes held by the local fallback store to the remote tables
    Replay,
    /// Finish or abandon interrupted purchases
    Repair,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_cli_tracing();
    let args = Args::parse();

    let config = StoreConfig::from_env()?;
    let endpoints = config.endpoints()?;
    endpoints.report_signature_health(Utc::now());
    let local = LocalStore::connect(&config.local_store_url)
        .await
        .context("failed to open local fallback store")?;
    let state = AppState::new(endpoints, local);

    let ok = match args.command {
        Command::Enroll {
            input,
            course_id,
            dry_run,
        } => enroll(&state, &input, &course_id, dry_run).await?,
        Command::Replay => replay(&state).await?,
        Command::Repair => repair(&state).await?,
    };

    if ok {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

async fn enroll(state: &AppState, input: &Path, course_id: &str, dry_run: bool) -> Result<bool> {
    let transactions = transactions::load(input)?;
    if transactions.is_empty() {
        eprintln!("No transactions in {}.", input.display());
        return Ok(true);
    }
    println!(
        "Reconciling {} transaction(s), default course {course_id}{}",
        transactions.len(),
        if dry_run { " (dry run)" } else { "" }
    );
    println!();

    let usecase = ReconcileTransactionsUseCase {
        users: state.user_repo(),
        payments: state.payment_repo(),
        enrollments: state.enrollment_repo(),
        intents: state.intent_repo(),
    };
    let report = usecase.execute(&transactions, course_id, dry_run).await?;
    reporter::print(&report, dry_run);
    Ok(report.failed() == 0)
}

async fn replay(state: &AppState) -> Result<bool> {
    let usecase = ReplayPendingWritesUseCase {
        local: state.local.clone(),
        remotes: state.remote_tables(),
    };
    let report = usecase.execute().await?;
    println!(
        "Replayed {} write(s), {} failed, {} skipped",
        report.replayed, report.failed, report.skipped
    );
    Ok(report.failed == 0)
}

async fn repair(state: &AppState) -> Result<bool> {
    let usecase = RepairPurchaseIntentsUseCase {
        payments: state.payment_repo(),
        enrollments: state.enrollment_repo(),
        intents: state.intent_repo(),
    };
    let report = usecase.execute().await?;
    println!(
        "Repaired purchases: {} enrolled, {} abandoned, {} failed",
        report.enrolled, report.abandoned, report.failed
    );
    Ok(report.failed == 0)
}
