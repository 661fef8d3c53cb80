// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for guard decisions.

use crate::guard::Purpose;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::warn;

/// Decision outcome labels.
pub mod outcome {
    pub const ALLOWED: &str = "allowed";
    pub const BLOCKED: &str = "blocked";
    pub const DENIED: &str = "denied";
    pub const FAILURE: &str = "failure";
    pub const CLEARED: &str = "cleared";
}

/// Counter registry for the service.
pub struct Metrics {
    registry: Registry,
    decisions: IntCounterVec,
    degraded: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let decisions = IntCounterVec::new(
            Opts::new(
                "auth_guard_decisions_total",
                "Guard decisions by purpose and outcome",
            ),
            &["purpose", "outcome"],
        )?;
        registry.register(Box::new(decisions.clone()))?;

        let degraded = IntCounter::new(
            "auth_guard_degraded_total",
            "Operations that failed open because the store was unavailable",
        )?;
        registry.register(Box::new(degraded.clone()))?;

        Ok(Self {
            registry,
            decisions,
            degraded,
        })
    }

    /// Count a guard decision.
    pub fn record_decision(&self, purpose: Purpose, outcome: &str) {
        self.decisions
            .with_label_values(&[purpose.as_str(), outcome])
            .inc();
    }

    /// Count a failed-open (store unavailable) operation.
    pub fn record_degraded(&self) {
        self.degraded.inc();
    }

    /// Render the registry in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(err) = encoder.encode(&self.registry.gather(), &mut buf) {
            warn!(error = %err, "failed to encode metrics");
            return String::new();
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}
