use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{info, warn};
use esg_hook::{config::Config, create_router, storage::spawn_sweeper, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing; the guard flushes the log file on exit
    let _log_guard = esg_hook::utils::init_logger(config.log_dir.as_deref());
    info!("Configuration loaded: {:?}", config.server);

    if config.auth.process_hook_token.is_none() {
        warn!("PROCESS_HOOK_TOKEN is not set, every webhook call will be rejected");
    }
    if !config.oracle_configured() {
        warn!("OPENAI_API_KEY is not set, jobs will use fallback content");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let retention = config.storage.retention();
    let sweep_every = Duration::from_secs(config.storage.sweep_interval_secs);

    // Create shared state
    let state = AppState::new(config)?;
    state.store.ensure_root().await?;
    info!(root = %state.store.root().display(), "Job storage ready");

    let _sweeper = spawn_sweeper(state.store.clone(), retention, sweep_every);

    // Create router
    let app = create_router(state);

    // Start server
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
