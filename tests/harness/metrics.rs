// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Metrics collection for abuse simulation results.

use std::collections::HashMap;
use std::time::Duration;

/// Possible outcomes for a replayed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Attempt reached credential/form processing
    Allowed,
    /// Turned away by the login block flag
    Blocked,
    /// Turned away by the registration window cap
    Denied,
}

/// Collects per-attempt outcomes during an abuse simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    outcomes: HashMap<Outcome, usize>,
    allowed_per_identity: HashMap<String, usize>,
    identities: HashMap<String, usize>,
    latencies: Vec<u64>,
}

impl AttackMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one replayed attempt.
    pub fn record(&mut self, outcome: Outcome, identity: &str, latency: Duration) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        *self.identities.entry(identity.to_string()).or_insert(0) += 1;
        if outcome == Outcome::Allowed {
            *self
                .allowed_per_identity
                .entry(identity.to_string())
                .or_insert(0) += 1;
        }
        self.latencies.push(latency.as_micros() as u64);
    }

    pub fn total_attempts(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Ratio of attempts turned away, 0.0-1.0.
    pub fn block_rate(&self) -> f64 {
        let total = self.total_attempts();
        if total == 0 {
            return 0.0;
        }
        let allowed = self.count(Outcome::Allowed);
        (total - allowed) as f64 / total as f64
    }

    pub fn unique_identities(&self) -> usize {
        self.identities.len()
    }

    /// The worst-case number of attempts any single identity got through.
    pub fn max_allowed_per_identity(&self) -> usize {
        self.allowed_per_identity.values().copied().max().unwrap_or(0)
    }

    pub fn median_latency_us(&self) -> u64 {
        if self.latencies.is_empty() {
            return 0;
        }
        let mut sorted = self.latencies.clone();
        sorted.sort_unstable();
        sorted[sorted.len() / 2]
    }

    /// Generate a summary report.
    pub fn report(&self) -> SimulationReport {
        SimulationReport {
            total_attempts: self.total_attempts(),
            allowed: self.count(Outcome::Allowed),
            blocked: self.count(Outcome::Blocked),
            denied: self.count(Outcome::Denied),
            block_rate: self.block_rate(),
            unique_identities: self.unique_identities(),
            max_allowed_per_identity: self.max_allowed_per_identity(),
            median_latency_us: self.median_latency_us(),
        }
    }
}

/// Summary of one abuse simulation.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub total_attempts: usize,
    pub allowed: usize,
    pub blocked: usize,
    pub denied: usize,
    pub block_rate: f64,
    pub unique_identities: usize,
    pub max_allowed_per_identity: usize,
    pub median_latency_us: u64,
}

impl std::fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Abuse Simulation Report ===")?;
        writeln!(f, "Total Attempts:    {}", self.total_attempts)?;
        writeln!(f, "Allowed:           {}", self.allowed)?;
        writeln!(f, "Blocked (login):   {}", self.blocked)?;
        writeln!(f, "Denied (register): {}", self.denied)?;
        writeln!(f, "Block Rate:        {:.1}%", self.block_rate * 100.0)?;
        writeln!(f, "Unique Identities: {}", self.unique_identities)?;
        writeln!(f, "Worst Per-Identity:{}", self.max_allowed_per_identity)?;
        writeln!(f, "Median Latency:    {} us", self.median_latency_us)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collection() {
        let mut metrics = AttackMetrics::new();
        metrics.record(Outcome::Allowed, "10.0.0.1", Duration::from_micros(100));
        metrics.record(Outcome::Allowed, "10.0.0.2", Duration::from_micros(150));
        metrics.record(Outcome::Blocked, "10.0.0.1", Duration::from_micros(50));

        assert_eq!(metrics.total_attempts(), 3);
        assert_eq!(metrics.count(Outcome::Allowed), 2);
        assert_eq!(metrics.count(Outcome::Blocked), 1);
        assert_eq!(metrics.unique_identities(), 2);
        assert_eq!(metrics.max_allowed_per_identity(), 1);
    }

    #[test]
    fn test_block_rate() {
        let mut metrics = AttackMetrics::new();
        for _ in 0..3 {
            metrics.record(Outcome::Allowed, "10.0.0.1", Duration::ZERO);
        }
        for _ in 0..7 {
            metrics.record(Outcome::Blocked, "10.0.0.1", Duration::ZERO);
        }

        assert!((metrics.block_rate() - 0.7).abs() < 0.01);
    }
}
