mod config;
mod errors;
mod intake;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::intake::export::SummaryExporter;
use crate::intake::session::SessionRegistry;
use crate::intake::slots::SlotPlan;
use crate::intake::store::CandidateStore;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing API key)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TalentScout API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::from_config(&config)?;
    info!(
        "LLM client initialized (model: {}, timeout: {}s)",
        llm.model(),
        config.llm_timeout_secs
    );

    // Slot plan, fixed for the lifetime of the process
    let plan = match &config.intake_slots {
        Some(keys) => SlotPlan::from_keys(keys)?,
        None => SlotPlan::default(),
    };
    info!("Slot plan: {:?}", plan.keys());

    // Initialize storage
    let store = CandidateStore::new(&config.store_path);
    let exporter = SummaryExporter::new(&config.export_dir);
    info!(
        "Candidate store at {}, summaries under {}",
        store.path().display(),
        config.export_dir.display()
    );

    // Session registry + idle eviction
    let sessions = SessionRegistry::new();
    sessions.spawn_sweeper(
        chrono::Duration::seconds(config.session_ttl_secs),
        Duration::from_secs(config.session_sweep_secs.max(1)),
    );

    let state = AppState {
        llm: Arc::new(llm),
        sessions,
        store: Arc::new(store),
        exporter: Arc::new(exporter),
        plan: Arc::new(plan),
        intake: config.intake.clone(),
        default_language: config.default_language.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
