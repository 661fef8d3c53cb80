// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Abuse pattern configurations for security testing.

/// Which account endpoint the pattern hammers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackKind {
    /// Failed logins, checked against the block flag first
    LoginBruteForce,
    /// Registration submissions through the windowed cap
    RegistrationFlood,
}

/// Abuse pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Endpoint under attack
    pub kind: AttackKind,
    /// Total number of attempts to replay
    pub total_attempts: usize,
    /// Number of unique client addresses, cycled round-robin
    pub unique_ips: usize,
    /// Simulated seconds between consecutive attempts
    pub spacing_secs: u64,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            kind: AttackKind::LoginBruteForce,
            total_attempts: 100,
            unique_ips: 1,
            spacing_secs: 0,
        }
    }
}

/// Predefined abuse patterns.
impl AttackConfig {
    /// Credential stuffing - rapid failed logins from one address.
    pub fn credential_stuffing() -> Self {
        Self {
            total_attempts: 200,
            ..Default::default()
        }
    }

    /// Distributed guessing - many addresses, each probing repeatedly.
    pub fn distributed_guessing() -> Self {
        Self {
            total_attempts: 1000,
            unique_ips: 100,
            ..Default::default()
        }
    }

    /// Signup flood - fake-account churn from one address.
    pub fn signup_flood() -> Self {
        Self {
            kind: AttackKind::RegistrationFlood,
            total_attempts: 60,
            ..Default::default()
        }
    }

    /// Patient retrier - failures spaced past the counting window.
    pub fn window_dodging_drip() -> Self {
        Self {
            total_attempts: 12,
            spacing_secs: 700, // past the 600s login window
            ..Default::default()
        }
    }
}
