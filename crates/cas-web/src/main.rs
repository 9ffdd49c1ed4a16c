//! cas-billing-web: Main Entry Point
//!
//! Serves the CAS billing report page. Configuration comes from the process
//! environment, `/etc/cas-billing/environment` or `.env`.

use anyhow::Context;
use cas_core::config::{get_config_int, load_environment};
use cas_core::ReportConfig;
use cas_web::{create_router, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "info";
const VERBOSE_FILTER: &str = "info,cas_report=debug,cas_jsonrpc=debug,cas_web=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file = load_environment();
    let config = ReportConfig::from_env().context("Invalid configuration")?;

    // RUST_LOG wins over VERBOSE_MODE
    let default_filter = if config.verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    tracing_subscriber::registry()
        .with(fmt::layer().compact())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    info!("cas-billing-web {}", env!("CARGO_PKG_VERSION"));
    match env_file {
        Some(path) => info!("Loaded environment from {}", path),
        None => debug!("No environment file found, using process environment"),
    }
    debug!("Configuration: {:?}", config);

    let state = Arc::new(AppState::from_config(&config)?);
    debug!("Report options: {:?}", state.builder.options());

    let app = create_router(state);

    let port = u16::try_from(get_config_int("PORT", 8080)).context("PORT out of range")?;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down...");
        },
    }
}
