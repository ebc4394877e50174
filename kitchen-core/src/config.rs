//! Tunable game parameters.
//!
//! Defaults reproduce the reference game. Every field can be overridden from
//! JSON; missing fields keep their default.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::flavor::DEFAULT_RADIUS;
use crate::types::Point2;

/// Play-area width the queue layout is expressed in.
pub const PLAY_WIDTH: f64 = 1280.0;
/// Play-area height the queue layout is expressed in.
pub const PLAY_HEIGHT: f64 = 720.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Pending (unserved) customers kept in line.
    pub target_len: usize,
    /// Tolerance is drawn uniformly from `[min_tolerance, max_tolerance)`.
    pub min_tolerance: f64,
    pub max_tolerance: f64,
    /// Where the front of the line stands.
    pub front_position: Point2,
    /// Horizontal gap between consecutive customers in line.
    pub spacing: f64,
    /// Where new customers appear.
    pub spawn_position: Point2,
    /// Exponential smoothing rate toward the target position, per second.
    pub approach_rate: f64,
    /// A customer closer than this to its target has arrived.
    pub arrival_radius: f64,
    /// Initial walk-off velocity of a served customer.
    pub exit_velocity: Point2,
    /// Walk-off acceleration of a served customer.
    pub exit_acceleration: Point2,
    /// Served customers beyond `[-exit_margin, PLAY_WIDTH + exit_margin]` are dropped.
    pub exit_margin: f64,
    /// Seconds of speech before SPEAKING becomes WAITING. `None` keeps
    /// customers speaking until resolved.
    pub speech_timer: Option<f64>,
    /// `time_left` must fall below `-timeout_epsilon` to time out.
    pub timeout_epsilon: f64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            target_len: 3,
            min_tolerance: 0.3,
            max_tolerance: 0.8,
            front_position: Point2::new(PLAY_WIDTH * 0.8, PLAY_HEIGHT / 2.0),
            spacing: 100.0,
            spawn_position: Point2::new(PLAY_WIDTH + 100.0, PLAY_HEIGHT / 2.0),
            approach_rate: 5.0,
            arrival_radius: 5.0,
            exit_velocity: Point2::new(-200.0, 0.0),
            exit_acceleration: Point2::new(5000.0, 0.0),
            exit_margin: 500.0,
            speech_timer: None,
            timeout_epsilon: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatienceConfig {
    /// Index given to the first spawned customer. Indices below 1 are warm-up
    /// entries with unlimited patience.
    pub first_index: i64,
    /// Fixed budgets (seconds) for customers 1, 2, 3, ...
    pub warmup: Vec<f64>,
    /// Base seconds of the ramp after the warm-up.
    pub base: f64,
    /// Ramp scaling constant K in `base * (W + K) / (N + K)`.
    pub scale: f64,
    /// Added to the handicap on every timeout.
    pub timeout_penalty: f64,
    /// Handicap multiplier on every successful service.
    pub serve_decay: f64,
}

impl Default for PatienceConfig {
    fn default() -> Self {
        Self {
            first_index: -1,
            warmup: vec![120.0, 60.0, 30.0],
            base: 20.0,
            scale: 8.0,
            timeout_penalty: 10.0,
            serve_decay: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Raw points per customer served.
    pub points_per_customer: f64,
    /// Average saved patience fraction is multiplied by this.
    pub quick_bonus_scale: f64,
    /// Quick bonus is floored to a multiple of this.
    pub quick_bonus_step: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            points_per_customer: 100.0,
            quick_bonus_scale: 2000.0,
            quick_bonus_step: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispenserConfig {
    /// Where the robot stands when popped up, and its angle (radians).
    pub up_position: Point2,
    pub up_angle: f64,
    /// Where the robot hides when popped down.
    pub down_position: Point2,
    pub down_angle: f64,
    /// Smoothing rate toward the target pose, per second.
    pub approach_rate: f64,
    /// Distance at which popping up completes (and the ingredient drops).
    pub up_radius: f64,
    /// Distance at which popping down completes.
    pub down_radius: f64,
    /// Seconds spent up before popping back down.
    pub hold_time: f64,
    /// Copies of "I HAVE PROVIDED YOU <KEY>" added to the dialog pool.
    pub provided_line_weight: usize,
}

impl Default for DispenserConfig {
    fn default() -> Self {
        Self {
            up_position: Point2::new(PLAY_WIDTH * 0.1, PLAY_HEIGHT * 0.32),
            up_angle: 0.0,
            down_position: Point2::new(PLAY_WIDTH * -0.2, PLAY_HEIGHT * 0.3),
            down_angle: std::f64::consts::FRAC_PI_2,
            approach_rate: 8.0,
            up_radius: 15.0,
            down_radius: 5.0,
            hold_time: 0.5,
            provided_line_weight: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Lives at the start; the session ends once they drop below zero.
    pub lives: i32,
    /// Radius of the pot's flavor triangle, for rendering coordinates.
    pub flavor_radius: f64,
    /// Copies of each ingredient on the rack. `None` means unlimited.
    pub rack_stock: Option<u32>,
    pub queue: QueueConfig,
    pub patience: PatienceConfig,
    pub scoring: ScoringConfig,
    pub dispenser: DispenserConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            lives: 3,
            flavor_radius: DEFAULT_RADIUS,
            rack_stock: None,
            queue: QueueConfig::default(),
            patience: PatienceConfig::default(),
            scoring: ScoringConfig::default(),
            dispenser: DispenserConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "lives": 5, "queue": { "target_len": 4 } }"#)
            .unwrap();
        assert_eq!(config.lives, 5);
        assert_eq!(config.queue.target_len, 4);
        assert_eq!(config.queue.timeout_epsilon, 0.05);
        assert_eq!(config.patience, PatienceConfig::default());
    }

    #[test]
    fn defaults_match_reference_layout() {
        let config = GameConfig::default();
        assert_eq!(config.queue.front_position, Point2::new(1024.0, 360.0));
        assert_eq!(config.queue.spawn_position, Point2::new(1380.0, 360.0));
        assert_eq!(config.queue.speech_timer, None);
        assert_eq!(config.patience.warmup, vec![120.0, 60.0, 30.0]);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(GameConfig::from_json(r#"{ "lives": "many" }"#).is_err());
    }
}
