mod app;
mod config;
mod export;
mod routes;
mod services;
mod spreadsheet;
mod state;

use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "territory map server failed");
    }
}

async fn run() -> std::io::Result<()> {
    let boundary_source = config::boundary_source();
    tracing::info!(%boundary_source, "loading department boundaries");
    let state = AppState::new(boundary_source);

    // The page stays usable without boundaries; the map is simply empty.
    if !services::map_renderer::redraw(&state).await {
        tracing::warn!("starting with an empty map");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config::server_port()));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "territory map server listening");

    axum::serve(listener, app::build_app(state))
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;

    tracing::info!("territory map server stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or on SIGTERM where the platform has it.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => log_interrupt(result),
                    _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
                }
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable, only Ctrl+C stops the server");
            }
        }
    }

    log_interrupt(tokio::signal::ctrl_c().await);
}

fn log_interrupt(result: std::io::Result<()>) {
    match result {
        Ok(()) => tracing::info!("received Ctrl+C, shutting down"),
        Err(e) => tracing::error!(error = %e, "failed to listen for Ctrl+C"),
    }
}
