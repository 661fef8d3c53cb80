// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the auth rate limiter.
//!
//! Default values match the site's account-endpoint policy: five login
//! failures in ten minutes lock an address out for fifteen minutes; five
//! registration attempts per hour cap signups.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the auth rate limiter service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Login brute-force policy
    #[serde(default)]
    pub login: LoginPolicy,

    /// Registration flood policy
    #[serde(default)]
    pub register: RegisterPolicy,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Policy for failed login attempts per client address.
///
/// The counting window and the block duration are independent: failures are
/// counted over a short window, but a tripped block outlasts it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginPolicy {
    /// Consecutive failures before the address is blocked (default: 5)
    #[serde(default = "default_login_max_failures")]
    pub max_failures: u64,

    /// Failure counting window in seconds (default: 600)
    #[serde(default = "default_login_window_secs")]
    pub window_secs: u64,

    /// Block duration in seconds once tripped (default: 900)
    #[serde(default = "default_login_block_secs")]
    pub block_secs: u64,
}

/// Policy for registration attempts per client address.
///
/// No separate block flag: the windowed cap itself gates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterPolicy {
    /// Attempts allowed within the window (default: 5)
    #[serde(default = "default_register_max_attempts")]
    pub max_attempts: u64,

    /// Attempt counting window in seconds (default: 3600)
    #[serde(default = "default_register_window_secs")]
    pub window_secs: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_login_max_failures() -> u64 {
    5
}

fn default_login_window_secs() -> u64 {
    600 // 10 minutes
}

fn default_login_block_secs() -> u64 {
    900 // 15 minutes
}

fn default_register_max_attempts() -> u64 {
    5
}

fn default_register_window_secs() -> u64 {
    3600 // 1 hour
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            login: LoginPolicy::default(),
            register: RegisterPolicy::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for LoginPolicy {
    fn default() -> Self {
        Self {
            max_failures: default_login_max_failures(),
            window_secs: default_login_window_secs(),
            block_secs: default_login_block_secs(),
        }
    }
}

impl Default for RegisterPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_register_max_attempts(),
            window_secs: default_register_window_secs(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl LoginPolicy {
    /// Get the failure counting window
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Get the block duration
    pub fn block(&self) -> Duration {
        Duration::from_secs(self.block_secs)
    }
}

impl RegisterPolicy {
    /// Get the attempt counting window
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}
