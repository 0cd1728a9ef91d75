use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use movie_log_config::Config;
use movie_log_core::{FeedInfo, MovieService};
use movie_log_sources::OmdbClient;
use movie_log_store::{MovieLog, MySqlBackend};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::http::{build_router, AppState};

pub async fn run_serve(mut config: Config, port: Option<u16>) -> Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }
    // Refuse to start half-configured; a missing secret would lock every protected route
    config.validate().map_err(|e| eyre!("{}", e))?;

    let backend = MySqlBackend::connect(&config.database)
        .await
        .wrap_err_with(|| {
            format!(
                "Failed to connect to MySQL at {}:{}",
                config.database.host, config.database.port
            )
        })?;
    let metadata = OmdbClient::new(&config.omdb).wrap_err("Failed to build OMDb client")?;

    let log = MovieLog::new(Arc::new(backend));
    info!(operation = "serve", backend = log.backend_name(), "Movie log store ready");
    let service = MovieService::new(log, Arc::new(metadata));
    let feed = FeedInfo {
        title: config.rss.title.clone(),
        description: config.rss.description.clone(),
        site_url: config.rss.base_url.clone(),
    };
    let state = AppState::new(service, config.auth.api_key.clone()).with_feed(feed);
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.bind_addr, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind {}", addr))?;
    info!(operation = "serve", addr = %addr, "MovieThing listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Server error")?;

    info!(operation = "serve", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    // Without a signal handler, keep serving rather than shutting down at once
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
