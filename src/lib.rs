// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Auth Rate Limiter
//!
//! This crate provides brute-force and flood protection for a site's account
//! endpoints, tracking per-client-IP attempt counts in a shared expiring
//! key/value store:
//!
//! - Login: 5 failed attempts within 10 minutes block the address for
//!   15 minutes (the block outlasts the counting window)
//! - Registration: 5 attempts per hour per address, window-gated
//! - Identity from the first forwarded-for hop, falling back to the peer
//!   address
//! - Fail-open when the store is unavailable
//!
//! The decision core ([`guard::AbuseGuard`]) is a plain library type over an
//! injected store and clock, so it can be embedded directly or consulted via
//! the bundled HTTP service.

pub mod clock;
pub mod config;
pub mod guard;
pub mod handlers;
pub mod identity;
pub mod metrics;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use guard::{AbuseGuard, AttemptOutcome, FailureOutcome, Purpose};
pub use store::{KeyValueStore, MemoryStore, StoreError};
