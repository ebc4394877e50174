use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::config::ScoringConfig;
use crate::types::Tier;

/// Running totals over every resolved customer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct ScoreAccumulator {
    pub num_served: u32,
    /// Sum of rating weights (1 / 3 / 5).
    pub total_rating: u32,
    /// Sum of each customer's `time_left` at resolution. Timeouts add a small
    /// negative term.
    pub total_time_save: f64,
}

/// Score breakdown derived from the totals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct ScoreBreakdown {
    pub customers_served: u32,
    pub raw_score: i64,
    /// Average rating rounded to one decimal.
    pub rating_multiplier: f64,
    pub quick_bonus: i64,
    pub final_score: i64,
}

impl ScoreAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, tier: Tier, time_left: f64) {
        self.num_served += 1;
        self.total_rating += tier.rating();
        self.total_time_save += time_left;
    }

    /// Final score. A session that served nobody scores zero across the board.
    pub fn breakdown(&self, config: &ScoringConfig) -> ScoreBreakdown {
        if self.num_served == 0 {
            return ScoreBreakdown::default();
        }
        let served = self.num_served as f64;

        let quick = self.total_time_save / served * config.quick_bonus_scale;
        let quick_bonus = ((quick / config.quick_bonus_step).floor() * config.quick_bonus_step) as i64;

        let rating_multiplier = (self.total_rating as f64 / served * 10.0).round_ties_even() / 10.0;
        let raw = served * config.points_per_customer;
        let final_score = (raw * rating_multiplier + quick_bonus as f64) as i64;

        ScoreBreakdown {
            customers_served: self.num_served,
            raw_score: raw as i64,
            rating_multiplier,
            quick_bonus,
            final_score,
        }
    }
}
