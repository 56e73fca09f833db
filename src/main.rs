//! Entry point: parse CLI, seed the store, serve HTTP.

use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use puckstats::config::Cli;
use puckstats::nhl::{NhlClient, UpstreamApi};
use puckstats::refresh::refresh_teams;
use puckstats::server::{router, AppState};
use puckstats::storage::StatsDatabase;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let db = match &cli.database {
        Some(path) => StatsDatabase::open(path)?,
        None => StatsDatabase::new()?,
    };
    let api: Arc<dyn UpstreamApi> = Arc::new(NhlClient::new(cli.resolve_upstream_url()));
    let state = AppState::new(db, api, cli.refresh_config());

    // Seed teams, conferences, and divisions before serving. A failure is
    // survivable: the first request that needs them refetches.
    {
        let mut db = state.db.lock().await;
        match refresh_teams(&mut db, state.api.as_ref(), &state.refresh).await {
            Ok(teams) => info!(teams = teams.len(), "store seeded"),
            Err(e) => warn!(error = %e, "startup seed failed, serving anyway"),
        }
    }

    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    info!(addr = %cli.bind, "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
