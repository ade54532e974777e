// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Station Map API Server
//!
//! Serves environmental monitoring stations as map layers, with the map
//! view state carried in shareable URLs.

use anyhow::Context;
use station_map::{config::Config, services::SparqlClient, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().context("Invalid configuration")?;
    tracing::info!(port = config.port, "Starting Station Map API");

    // Fetch station rows once; without them the map still has borders
    let sparql = SparqlClient::new(config.sparql_endpoint.clone());
    let station_rows = match sparql.fetch_station_rows().await {
        Ok(rows) => {
            tracing::info!(count = rows.len(), "Station rows loaded");
            Some(rows)
        }
        Err(e) => {
            tracing::error!(error = %e, endpoint = %sparql.endpoint(), "Failed to fetch stations");
            None
        }
    };

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), station_rows));

    // Build router
    let app = station_map::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("station_map=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
