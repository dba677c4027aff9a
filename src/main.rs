// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;

use realm_gate::{api, config::Config, state::AppState};

#[tokio::main]
async fn main() {
    let config = Config::from_env();
    init_tracing(&config.log_format);

    tracing::info!(
        provider = %config.keycloak_url,
        realm = %config.keycloak_realm,
        client_id = %config.keycloak_client_id,
        rate_limit = config.rate_limit,
        rate_window_secs = config.rate_window_secs,
        "starting realm-gate"
    );

    let state = AppState::from_config(&config);

    // The sweep task is owned here: started with the server, cancelled on
    // shutdown before exit.
    let shutdown = CancellationToken::new();
    let sweeper = state.limiter.clone().spawn_sweeper(shutdown.clone());

    let app = api::router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");

    tracing::info!(%addr, "realm-gate listening (docs at /docs)");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("HTTP server failed");

    shutdown.cancel();
    let _ = sweeper.await;

    tracing::info!("realm-gate exited");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install ctrl-c handler");
    tracing::info!("shutdown signal received");
}

fn init_tracing(format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
