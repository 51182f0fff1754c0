// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use session_auth_server::{
    api::{router, users::ensure_admin},
    config::AppConfig,
    state::AppState,
    storage::{Database, DATABASE_FILE},
    sweeper::RefreshTokenSweeper,
    telemetry,
};

/// Time allowed for in-flight requests after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    telemetry::init(config.log_format);

    let db = match &config.data_dir {
        Some(dir) => {
            let path = dir.join(DATABASE_FILE);
            info!(path = %path.display(), "Opening database");
            Database::open(&path)
        }
        None => {
            warn!("DATA_DIR not set, users and refresh tokens will not survive a restart");
            Database::in_memory()
        }
    }
    .expect("Failed to open database");

    let state = AppState::new(Arc::new(db), &config.tokens).expect("Invalid token settings");

    if let Some(seed) = &config.seed_admin {
        if let Err(e) = ensure_admin(&state, &seed.username, &seed.password) {
            error!(error = %e.message, "Failed to seed admin user");
        }
    }

    let shutdown = CancellationToken::new();
    if let Some(interval) = config.sweep_interval {
        let sweeper = RefreshTokenSweeper::new(state.auth.refresh_tokens().clone()).with_interval(interval);
        tokio::spawn(sweeper.run(shutdown.clone()));
    }

    let addr = config.bind_address().expect("Failed to parse bind address");
    let app = router(state);

    let handle: Handle<SocketAddr> = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone(), shutdown.clone()));

    match &config.tls {
        Some(tls) => {
            let tls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
                .await
                .expect("Failed to load TLS certificate or key");
            info!(%addr, "Session auth server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .expect("HTTPS server failed");
        }
        None => {
            info!(%addr, "Session auth server listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .expect("HTTP server failed");
        }
    }

    shutdown.cancel();
    info!("Server stopped");
}

/// Wait for Ctrl-C or SIGTERM, then stop background tasks and drain.
async fn shutdown_signal(handle: Handle<SocketAddr>, shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
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
                error!(error = %e, "Failed to listen for SIGTERM");
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

    info!("Shutdown signal received");
    shutdown.cancel();
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
