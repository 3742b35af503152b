//! Parley REST API entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, validates configuration, initializes the database
//! and services, then serves the API until Ctrl+C or SIGTERM.

mod cli;
mod http;
mod state;

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use cli::{Cli, Commands, ServeArgs};
use parley_infra::config::{AppConfig, load_settings};
use parley_infra::sqlite::pool::migrate;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    parley_observe::tracing_setup::init_tracing(cli.log_format.into(), cli.default_filter())
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    match cli.command {
        Commands::Migrate { database_url } => {
            migrate(&database_url)
                .await
                .with_context(|| format!("failed to migrate {database_url}"))?;
            println!("  {} Migrations applied", console::style("✓").green());
        }
        Commands::Serve(args) => serve(args).await?,
    }

    Ok(())
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut settings = load_settings(args.config.as_deref()).await?;
    if let Some(host) = &args.host {
        settings.server.host = host.clone();
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }

    let config = AppConfig::assemble(args.sources(), settings)?;
    tracing::info!(environment = %config.environment, "configuration loaded");

    let addr = format!("{}:{}", config.settings.server.host, config.settings.server.port);
    let sweep_every = Duration::from_secs(config.settings.rate_limits.sweep_interval_secs.max(1));

    let state = AppState::init(config).await?;
    let db_pool = state.db_pool.clone();

    let cancel = CancellationToken::new();
    let sweeper = http::throttle::spawn_sweeper(state.rate_limiter.clone(), sweep_every, cancel.clone());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    println!(
        "  {} Parley API listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let router = http::router::build_router(state);

    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel.cancel();
    let _ = sweeper.await;
    db_pool.close().await;

    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
