use std::sync::Arc;

use axum::{extract::FromRef, Router};
use clap::Parser;
use common::{storage::store::AppStore, utils::config::get_config};
use html_router::{html_routes, html_state::HtmlState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Searchable web front end for the app catalog.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Port to listen on, overriding the PORT setting
    port: Option<u16>,
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();

    // Get config
    let mut config = get_config()?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    // The pool connects lazily, so make sure the database answers before serving
    let store = Arc::new(AppStore::from_config(&config));
    if let Err(e) = store.verify_reachable().await {
        error!("Cannot ping database: {e}");
        return Err(e.into());
    }
    info!(
        host = %config.sql_host,
        database = %config.sql_db,
        connection_limit = config.sql_connection_limit,
        "Database reachable"
    );

    let html_state = HtmlState::new_with_resources(store.clone(), config.clone(), None);
    let app = build_app(html_state);

    let serve_address = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&serve_address).await?;
    info!("Starting server listening on {serve_address}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.pool().close().await;
    info!("Database pool closed, bye");

    Ok(())
}

#[derive(Clone, FromRef)]
struct AppState {
    html_state: HtmlState,
}

fn build_app(html_state: HtmlState) -> Router {
    Router::new()
        .merge(html_routes(&html_state))
        .with_state(AppState { html_state })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
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
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
