// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Auth Rate Limiter Service
//!
//! Brute-force and flood protection for account endpoints. The site's login
//! and registration handlers consult this service around credential
//! processing:
//!
//! - `POST /login/check` before verifying credentials
//! - `POST /login/failure` / `POST /login/success` after the verdict
//! - `POST /register/check` before validating a registration form
//!
//! Policy defaults: 5 login failures in 10 minutes block the address for
//! 15 minutes; 5 registration attempts per address per hour.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `LOGIN_MAX_FAILURES`: Failures before blocking (default: 5)
//! - `LOGIN_WINDOW_SECS`: Failure counting window (default: 600)
//! - `LOGIN_BLOCK_SECS`: Block duration (default: 900)
//! - `REGISTER_MAX_ATTEMPTS`: Attempts per window (default: 5)
//! - `REGISTER_WINDOW_SECS`: Attempt counting window (default: 3600)

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use auth_rate_limiter::{
    clock::SystemClock,
    config::{Config, LoginPolicy, RegisterPolicy},
    guard::AbuseGuard,
    handlers::{self, AppState},
    metrics::Metrics,
    store::MemoryStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = load_config();
    info!(
        bind_addr = %config.bind_addr,
        login_max_failures = config.login.max_failures,
        login_window_secs = config.login.window_secs,
        login_block_secs = config.login.block_secs,
        register_max_attempts = config.register.max_attempts,
        register_window_secs = config.register.window_secs,
        "Starting auth rate limiter"
    );

    // Create application state
    let store = Arc::new(MemoryStore::new(Arc::new(SystemClock)));
    let guard = AbuseGuard::new(
        store.clone(),
        Arc::new(SystemClock),
        config.login.clone(),
        config.register.clone(),
    );
    let metrics = Metrics::new()?;

    let state = Arc::new(AppState {
        guard,
        metrics,
        config: config.clone(),
    });

    // Spawn purge task
    let purge_store = store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            purge_store.purge_expired();
        }
    });

    // Build router
    let mut app = Router::new()
        .route("/health", get(handlers::health))
        .route("/healthz", get(handlers::health))
        .route("/login/check", post(handlers::login_check))
        .route("/login/failure", post(handlers::login_failure))
        .route("/login/success", post(handlers::login_success))
        .route("/register/check", post(handlers::register_check));

    if config.metrics.enabled {
        app = app.route(config.metrics.path.as_str(), get(handlers::metrics));
    }

    let app = app.layer(TraceLayer::new_for_http()).with_state(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Load configuration from environment variables.
fn load_config() -> Config {
    Config {
        bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        login: LoginPolicy {
            max_failures: env_or("LOGIN_MAX_FAILURES", 5),
            window_secs: env_or("LOGIN_WINDOW_SECS", 600),
            block_secs: env_or("LOGIN_BLOCK_SECS", 900),
        },
        register: RegisterPolicy {
            max_attempts: env_or("REGISTER_MAX_ATTEMPTS", 5),
            window_secs: env_or("REGISTER_WINDOW_SECS", 3600),
        },
        ..Default::default()
    }
}

fn env_or(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
