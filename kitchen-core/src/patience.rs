//! Customer patience and the mistake handicap.
//!
//! Budgets front-load generosity: fixed warm-up values for the first few
//! customers, then `base * (W + K) / (N + K) + handicap`, where `W` is the
//! number of warm-up entries. The handicap is a rubber band: every timeout
//! adds a flat penalty (extra seconds for later customers), every successful
//! service halves it. It never returns to exactly zero once raised.

use serde::{Deserialize, Serialize};

use crate::config::PatienceConfig;

/// Session-wide mistake penalty, in seconds of extra patience.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Handicap(f64);

impl Handicap {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// A customer timed out.
    pub fn penalize(&mut self, amount: f64) {
        self.0 += amount;
    }

    /// A customer was served (any tier).
    pub fn relieve(&mut self, factor: f64) {
        self.0 *= factor;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatienceModel {
    config: PatienceConfig,
}

impl Default for PatienceModel {
    fn default() -> Self {
        Self::new(PatienceConfig::default())
    }
}

impl PatienceModel {
    pub fn new(config: PatienceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PatienceConfig {
        &self.config
    }

    /// Patience budget in seconds for the `n`th customer (1-indexed).
    ///
    /// Indices below 1 are warm-up entries and get `None` (unlimited).
    pub fn budget(&self, n: i64, handicap: &Handicap) -> Option<f64> {
        if n < 1 {
            return None;
        }
        let warmup = &self.config.warmup;
        if let Some(&fixed) = warmup.get((n - 1) as usize) {
            return Some(fixed);
        }
        let w = warmup.len() as f64;
        let k = self.config.scale;
        Some(self.config.base * (w + k) / (n as f64 + k) + handicap.value())
    }

    pub fn on_timeout(&self, handicap: &mut Handicap) {
        handicap.penalize(self.config.timeout_penalty);
    }

    pub fn on_served(&self, handicap: &mut Handicap) {
        handicap.relieve(self.config.serve_decay);
    }
}
