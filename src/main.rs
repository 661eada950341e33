use std::sync::Arc;

use anyhow::Context;
use clap::Parser; // for cli
use tracing::info;

use credit_gateway::config::Args;
use credit_gateway::startup::{build_router, init_tracing};
use credit_gateway::{AppState, CreditLedger, OllamaBackend};

// this is main async function with tokio
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();
    init_tracing();

    // parse cli arguments
    let args = Args::parse();
    let grants = args.grants()?;

    let ledger = Arc::new(CreditLedger::from_grants(grants));
    let backend = OllamaBackend::new(args.backend_url(), &args.model, args.timeout())
        .context("failed to build Ollama client")?;

    info!("Ollama backend: {} (model: {})", backend.base_url(), backend.model());
    info!("Ledger loaded with {} key(s)", ledger.len());
    info!("Backend timeout: {} seconds", args.request_timeout);

    // creating shared state
    let state = AppState::new(ledger, Arc::new(backend));
    let app = build_router(state);

    let addr = args.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Gateway running on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
