// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Client identity resolution.
//!
//! Counters are keyed by a best-effort client address: the first hop of a
//! forwarded-for header when one is present, otherwise the direct peer
//! address. Resolution never fails; an unusable input falls back to a fixed
//! literal so the caller always gets a key.

use std::net::IpAddr;

/// Identity used when neither a forwarded-for header nor a peer address is
/// usable.
pub const FALLBACK_IDENTITY: &str = "0.0.0.0";

/// Resolve the rate-limiting identity for a request.
///
/// `forwarded_for` is the raw header value; only the first comma-separated
/// token (the original client hop) counts.
pub fn resolve(forwarded_for: Option<&str>, peer: Option<IpAddr>) -> String {
    if let Some(header) = forwarded_for {
        let first_hop = header.split(',').next().unwrap_or("").trim();
        if !first_hop.is_empty() {
            return first_hop.to_string();
        }
    }

    match peer {
        Some(addr) => addr.to_string(),
        None => FALLBACK_IDENTITY.to_string(),
    }
}
