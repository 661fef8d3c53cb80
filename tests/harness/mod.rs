// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for auth rate limiter abuse simulation.
//!
//! This module provides utilities for replaying abuse patterns against the
//! guard on a simulated clock to validate the lockout policy.

pub mod attacks;
pub mod metrics;
