// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the auth rate limiter service.
//!
//! The service runs as an external decision point: the site's login and
//! registration handlers call these endpoints around credential processing
//! and act on the returned verdict. Every endpoint answers 200 with a JSON
//! body; identity problems degrade to the fallback identity rather than
//! erroring, and a failed store read degrades to "allowed".

use crate::config::Config;
use crate::guard::{AbuseGuard, Purpose};
use crate::identity;
use crate::metrics::{outcome, Metrics};
use axum::{extract::State, http::header, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared application state.
pub struct AppState {
    pub guard: AbuseGuard,
    pub metrics: Metrics,
    pub config: Config,
}

/// Client addressing info forwarded by the consulting handler.
#[derive(Debug, Deserialize)]
pub struct ClientRequest {
    /// Direct peer address of the original request
    #[serde(default)]
    pub ip: Option<String>,
    /// Raw forwarded-for header value, if the original request carried one
    #[serde(default)]
    pub forwarded_for: Option<String>,
}

impl ClientRequest {
    /// Resolve the rate-limiting identity. Never fails; an unparseable peer
    /// address falls through to the fallback literal.
    fn identity(&self) -> String {
        let peer = self.ip.as_deref().and_then(|s| s.parse::<IpAddr>().ok());
        identity::resolve(self.forwarded_for.as_deref(), peer)
    }
}

/// Verdict for the pre-action checks.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u64>,
}

/// Result of reporting a failed login.
#[derive(Debug, Serialize)]
pub struct FailureResponse {
    pub attempts: u64,
    pub blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_until: Option<DateTime<Utc>>,
}

/// Result of reporting a successful login.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub cleared: bool,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "auth-rate-limiter",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Pre-credential login check.
///
/// Consulted before the password is even looked at; a blocked identity is
/// turned away without touching the counter.
pub async fn login_check(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClientRequest>,
) -> Json<CheckResponse> {
    let identity = req.identity();

    if state.guard.is_blocked(Purpose::Login, &identity) {
        info!(identity = %identity, "login denied, identity blocked");
        state.metrics.record_decision(Purpose::Login, outcome::BLOCKED);
        return Json(CheckResponse {
            allowed: false,
            reason: Some("too many failed login attempts"),
            retry_after_secs: Some(state.config.login.block_secs),
            attempts: None,
        });
    }

    debug!(identity = %identity, "login check passed");
    state.metrics.record_decision(Purpose::Login, outcome::ALLOWED);
    Json(CheckResponse {
        allowed: true,
        reason: None,
        retry_after_secs: None,
        attempts: None,
    })
}

/// Report a failed login attempt.
pub async fn login_failure(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClientRequest>,
) -> Json<FailureResponse> {
    let identity = req.identity();
    let result = state.guard.record_failure(Purpose::Login, &identity);

    state.metrics.record_decision(Purpose::Login, outcome::FAILURE);
    if result.degraded {
        state.metrics.record_degraded();
    }

    Json(FailureResponse {
        attempts: result.attempts,
        blocked: result.blocked,
        locked_until: result.locked_until,
    })
}

/// Report a successful login, clearing any attempt state.
pub async fn login_success(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClientRequest>,
) -> Json<SuccessResponse> {
    let identity = req.identity();
    state.guard.record_success(Purpose::Login, &identity);
    state.metrics.record_decision(Purpose::Login, outcome::CLEARED);

    Json(SuccessResponse { cleared: true })
}

/// Registration pre-check.
///
/// Counts the attempt and answers whether the submission may be processed;
/// the consulting handler calls this before validating the form.
pub async fn register_check(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClientRequest>,
) -> Json<CheckResponse> {
    let identity = req.identity();
    let result = state.guard.record_attempt(Purpose::Register, &identity);

    if result.degraded {
        state.metrics.record_degraded();
    }

    if result.allowed {
        debug!(identity = %identity, attempts = result.attempts, "registration attempt allowed");
        state.metrics.record_decision(Purpose::Register, outcome::ALLOWED);
        Json(CheckResponse {
            allowed: true,
            reason: None,
            retry_after_secs: None,
            attempts: Some(result.attempts),
        })
    } else {
        info!(identity = %identity, attempts = result.attempts, "registration attempt denied");
        state.metrics.record_decision(Purpose::Register, outcome::DENIED);
        Json(CheckResponse {
            allowed: false,
            reason: Some("too many registration attempts"),
            retry_after_secs: Some(state.config.register.window_secs),
            attempts: Some(result.attempts),
        })
    }
}

/// Prometheus exposition endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
