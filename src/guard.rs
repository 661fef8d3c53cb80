// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Abuse mitigation guard for login and registration.
//!
//! Tracks per-client attempt counts in a shared expiring store and decides
//! whether an action may proceed:
//!
//! - Login: failures are counted over a short window; at the threshold a
//!   separate block flag is set whose lifetime outlasts the counter. A
//!   successful login clears both entries.
//! - Registration: a single windowed cap; once the count reaches the
//!   threshold further attempts are denied until the window expires.
//!
//! Every operation is best-effort. If the store is unreachable the guard
//! fails open (treats the client as clear) and logs the degraded state;
//! availability of the site outranks the deterrent.

use crate::clock::Clock;
use crate::config::{LoginPolicy, RegisterPolicy};
use crate::store::{KeyValueStore, StoreError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Action category being rate limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    Login,
    Register,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
        }
    }

    fn attempts_key(&self, identity: &str) -> String {
        format!("{}_attempts:{}", self.as_str(), identity)
    }

    fn block_key(&self, identity: &str) -> String {
        format!("{}_blocked:{}", self.as_str(), identity)
    }
}

impl std::fmt::Display for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of recording a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureOutcome {
    /// Attempt count after this failure (0 when the store was unavailable)
    pub attempts: u64,
    /// Whether the identity is at or past the threshold
    pub blocked: bool,
    /// Absolute block expiry, present only when this failure tripped the block
    pub locked_until: Option<DateTime<Utc>>,
    /// True when the store was unreachable and the guard failed open
    pub degraded: bool,
}

/// Result of the pre-action attempt check used for registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptOutcome {
    /// Attempt count as recorded (the pre-existing count when denied)
    pub attempts: u64,
    /// Whether the action may proceed
    pub allowed: bool,
    /// True when the store was unreachable and the guard failed open
    pub degraded: bool,
}

/// Effective policy for one purpose.
struct PolicyView {
    threshold: u64,
    window: Duration,
    block: Option<Duration>,
}

/// Per-identity abuse guard over a shared expiring key/value store.
///
/// The store and clock are injected so tests can run against an in-memory
/// fake with a manual clock, and production can point at a fleet-wide
/// backend.
#[derive(Clone)]
pub struct AbuseGuard {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    login: LoginPolicy,
    register: RegisterPolicy,
}

impl AbuseGuard {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        login: LoginPolicy,
        register: RegisterPolicy,
    ) -> Self {
        Self {
            store,
            clock,
            login,
            register,
        }
    }

    /// Whether the identity is currently blocked for the purpose.
    ///
    /// Reads the block flag only; no side effects. A present flag denies the
    /// action regardless of the counter's state.
    pub fn is_blocked(&self, purpose: Purpose, identity: &str) -> bool {
        match self.store.get(&purpose.block_key(identity)) {
            Ok(flag) => flag.is_some(),
            Err(err) => {
                self.fail_open(purpose, identity, &err);
                false
            }
        }
    }

    /// Record a failed attempt and return the new count.
    ///
    /// The counter is created with the purpose's window TTL; an existing
    /// counter keeps its remaining lifetime. Crossing the threshold sets the
    /// block flag once; an already-present flag is never refreshed, so the
    /// block expiry is fixed at first trip.
    pub fn record_failure(&self, purpose: Purpose, identity: &str) -> FailureOutcome {
        let policy = self.policy(purpose);

        let attempts = match self.store.incr(&purpose.attempts_key(identity), policy.window) {
            Ok(n) => n,
            Err(err) => {
                self.fail_open(purpose, identity, &err);
                return FailureOutcome {
                    attempts: 0,
                    blocked: false,
                    locked_until: None,
                    degraded: true,
                };
            }
        };

        debug!(purpose = %purpose, identity = %identity, attempts, "recorded failure");

        if attempts < policy.threshold {
            return FailureOutcome {
                attempts,
                blocked: false,
                locked_until: None,
                degraded: false,
            };
        }

        let locked_until = policy
            .block
            .and_then(|block| self.trip_block(purpose, identity, block));

        FailureOutcome {
            attempts,
            blocked: policy.block.is_some(),
            locked_until,
            degraded: false,
        }
    }

    /// Clear the counter and block flag for the identity.
    ///
    /// Called on successful login; registration has no success reset since
    /// each success is a distinct new account.
    pub fn record_success(&self, purpose: Purpose, identity: &str) {
        for key in [
            purpose.attempts_key(identity),
            purpose.block_key(identity),
        ] {
            if let Err(err) = self.store.delete(&key) {
                self.fail_open(purpose, identity, &err);
            }
        }
        debug!(purpose = %purpose, identity = %identity, "cleared attempt state");
    }

    /// Count an attempt before the action is processed.
    ///
    /// Used for registration, where there is no failure/success report-back:
    /// a count already at the threshold denies without incrementing;
    /// otherwise the attempt is counted and allowed, and reaching the
    /// threshold only affects future attempts.
    pub fn record_attempt(&self, purpose: Purpose, identity: &str) -> AttemptOutcome {
        let policy = self.policy(purpose);
        let key = purpose.attempts_key(identity);

        let current = match self.store.get(&key) {
            Ok(n) => n.unwrap_or(0),
            Err(err) => {
                self.fail_open(purpose, identity, &err);
                return AttemptOutcome {
                    attempts: 0,
                    allowed: true,
                    degraded: true,
                };
            }
        };

        if current >= policy.threshold {
            debug!(purpose = %purpose, identity = %identity, attempts = current, "attempt denied");
            return AttemptOutcome {
                attempts: current,
                allowed: false,
                degraded: false,
            };
        }

        match self.store.incr(&key, policy.window) {
            Ok(attempts) => AttemptOutcome {
                attempts,
                allowed: true,
                degraded: false,
            },
            Err(err) => {
                self.fail_open(purpose, identity, &err);
                AttemptOutcome {
                    attempts: 0,
                    allowed: true,
                    degraded: true,
                }
            }
        }
    }

    /// Set the block flag unless one is already present. Returns the block
    /// expiry when this call tripped it.
    fn trip_block(
        &self,
        purpose: Purpose,
        identity: &str,
        block: Duration,
    ) -> Option<DateTime<Utc>> {
        let key = purpose.block_key(identity);
        match self.store.get(&key) {
            Ok(Some(_)) => None,
            Ok(None) => {
                if let Err(err) = self.store.set(&key, 1, block) {
                    self.fail_open(purpose, identity, &err);
                    return None;
                }
                let expiry_secs = self.clock.now_unix_secs() + block.as_secs();
                let locked_until = DateTime::<Utc>::from_timestamp(expiry_secs as i64, 0);
                warn!(
                    purpose = %purpose,
                    identity = %identity,
                    block_secs = block.as_secs(),
                    "threshold reached, identity blocked"
                );
                locked_until
            }
            Err(err) => {
                self.fail_open(purpose, identity, &err);
                None
            }
        }
    }

    fn policy(&self, purpose: Purpose) -> PolicyView {
        match purpose {
            Purpose::Login => PolicyView {
                threshold: self.login.max_failures,
                window: self.login.window(),
                block: Some(self.login.block()),
            },
            Purpose::Register => PolicyView {
                threshold: self.register.max_attempts,
                window: self.register.window(),
                block: None,
            },
        }
    }

    fn fail_open(&self, purpose: Purpose, identity: &str, err: &StoreError) {
        warn!(
            purpose = %purpose,
            identity = %identity,
            error = %err,
            "store unavailable, failing open"
        );
    }
}
