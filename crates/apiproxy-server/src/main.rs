//! API proxy demo server.
//!
//! Loads `.env`, regenerates the proxy artifacts from the registered routes
//! and serves the API plus the public directory.
//!
//! # Usage
//!
//! ```bash
//! PORT=8893 USE_AUTH=true apiproxy-server
//! ```

use anyhow::{Context, Result};
use apiproxy_core::ProxyConfig;
use apiproxy_server::{ApiRegistry, AppState, GenerationOutcome, build_app, generate_proxy};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,apiproxy_server=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();

    let config = ProxyConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        env = %config.environment,
        use_auth = config.use_auth,
        "starting apiproxy-server"
    );

    let registry = ApiRegistry::demo();
    match generate_proxy(&config, &registry) {
        Ok(GenerationOutcome::Written { callables, files }) => {
            tracing::info!(callables, files = files.len(), "API proxy regenerated");
        }
        Ok(GenerationOutcome::Skipped(_)) => {}
        Err(e) => tracing::error!(error = %e, "API proxy generation failed, serving without it"),
    }

    let app = build_app(registry, AppState::from_config(&config), &config.public_dir);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
