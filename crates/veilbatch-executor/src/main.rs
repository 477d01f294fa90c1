//! VeilBatch executor service.
//!
//! Loads configuration from the environment (and `.env`), builds the batch
//! pipeline and serves it over HTTP. A configuration that cannot produce a
//! working encoder or attester stops the process before it binds.

use anyhow::Context;
use tracing::info;
use veilbatch_executor::{AppState, load_config, router, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let config = load_config().context("loading configuration")?;
    info!(
        mode = %config.engine.mode,
        chain_id = config.engine.chain_id,
        hermes = %config.oracle.hermes_url,
        "starting veilbatch-executor v{}",
        veilbatch_types::constants::VERSION
    );

    let state = AppState::from_config(&config).context("building batch pipeline")?;
    let app = router(state);

    let bind = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(bind.as_str())
        .await
        .with_context(|| format!("binding {bind}"))?;
    info!("api listening on http://{bind}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
