use anyhow::Context as _;
use chrono::Utc;
use tracing::{info, warn};

use campus_core::tracing::init_tracing;
use campus_store::config::StoreConfig;
use campus_store::infra::local::LocalStore;
use campus_store::router::build_router;
use campus_store::state::AppState;
use campus_store::usecase::purchase::RepairPurchaseIntentsUseCase;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = StoreConfig::from_env()?;
    let endpoints = config.endpoints()?;
    endpoints.report_signature_health(Utc::now());

    let local = LocalStore::connect(&config.local_store_url)
        .await
        .context("failed to open local fallback store")?;
    let state = AppState::new(endpoints, local).with_admins(config.admin_emails.clone());

    // Finish purchases interrupted by the previous run.
    let repair = RepairPurchaseIntentsUseCase {
        payments: state.payment_repo(),
        enrollments: state.enrollment_repo(),
        intents: state.intent_repo(),
    };
    if let Err(e) = repair.execute().await {
        warn!(error = %e, "purchase intent repair failed");
    }

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.store_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("store service listening on {addr}");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
