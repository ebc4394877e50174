// A single order: what the customer wants, how picky they are, how long
// they will wait, and where they stand.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::config::{PLAY_WIDTH, QueueConfig};
use crate::types::{BLEND_TOTAL, CustomerState, Flavor, FlavorVector, Point2, Tier};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Position in the overall arrival order (drives the patience ramp).
    pub index: i64,
    /// Outer tolerance radius in normalized flavor-space units.
    pub tolerance: f64,
    pub desired_flavor: FlavorVector,
    /// Seconds of patience; `None` never runs out.
    pub patience_budget: Option<f64>,
    /// Fraction of patience remaining. Dips slightly below zero before timeout.
    pub time_left: f64,
    pub state: CustomerState,
    /// Set once resolved.
    pub happiness: Option<Tier>,
    pub timed_out: bool,
    pub position: Point2,
    pub target_position: Point2,
    pub velocity: Point2,
    /// Seconds since the customer started speaking.
    pub since_spoken: f64,
}

impl Customer {
    pub fn new(
        index: i64,
        position: Point2,
        tolerance: f64,
        desired_flavor: FlavorVector,
        patience_budget: Option<f64>,
        exit_velocity: Point2,
    ) -> Self {
        Self {
            index,
            tolerance,
            desired_flavor: desired_flavor.normalized(),
            patience_budget,
            time_left: 1.0,
            state: CustomerState::Queued,
            happiness: None,
            timed_out: false,
            position,
            target_position: position,
            velocity: exit_velocity,
            since_spoken: 0.0,
        }
    }

    /// Random order: three shares drawn so they sum to 100, then dealt to the
    /// flavors in shuffled order.
    pub fn random_flavor<R: Rng>(rng: &mut R) -> FlavorVector {
        let most = rng.random::<f64>() * BLEND_TOTAL;
        let middle = rng.random::<f64>() * (BLEND_TOTAL - most);
        let least = BLEND_TOTAL - most - middle;

        let mut slots = Flavor::GAMEPLAY;
        slots.shuffle(rng);

        let mut flavor = FlavorVector::new(0.0, 0.0, 0.0);
        flavor[slots[0]] = most;
        flavor[slots[1]] = middle;
        flavor[slots[2]] = least;
        flavor
    }

    pub fn at_target(&self, radius: f64) -> bool {
        self.position.distance(self.target_position) < radius
    }

    pub fn is_attending(&self) -> bool {
        self.state.is_attending()
    }

    /// QUEUED -> SPEAKING. Patience restarts from full.
    pub fn speak(&mut self) {
        self.state = CustomerState::Speaking;
        self.since_spoken = 0.0;
        self.time_left = 1.0;
    }

    pub fn stop_speaking(&mut self) {
        self.state = CustomerState::Waiting;
    }

    /// Burn patience for `dt` seconds. Only attending customers wait.
    pub fn drain_patience(&mut self, dt: f64) {
        if !self.is_attending() {
            return;
        }
        if let Some(budget) = self.patience_budget {
            self.time_left -= dt / budget;
        }
    }

    pub fn has_timed_out(&self, epsilon: f64) -> bool {
        self.is_attending() && self.time_left < -epsilon
    }

    pub fn resolve(&mut self, tier: Tier, timed_out: bool) {
        self.state = CustomerState::Served;
        self.happiness = Some(tier);
        self.timed_out = timed_out;
    }

    /// Advance speech timer, walk-off and smoothing toward the target.
    pub fn update(&mut self, dt: f64, config: &QueueConfig) {
        self.since_spoken += dt;
        if let Some(speech) = config.speech_timer
            && self.state == CustomerState::Speaking
            && self.since_spoken > speech
        {
            self.stop_speaking();
        }

        if self.state == CustomerState::Served {
            self.target_position += self.velocity * dt;
            self.velocity += config.exit_acceleration * dt;
        }

        let d = self.target_position - self.position;
        self.position += d * (dt * config.approach_rate);
    }

    /// Outside the play area (only meaningful once served).
    pub fn has_left(&self, config: &QueueConfig) -> bool {
        self.position.x > PLAY_WIDTH + config.exit_margin || self.position.x < -config.exit_margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn customer(budget: Option<f64>) -> Customer {
        Customer::new(
            4,
            Point2::new(0.0, 0.0),
            0.5,
            FlavorVector::uniform(),
            budget,
            Point2::new(-200.0, 0.0),
        )
    }

    #[test]
    fn random_flavor_sums_to_total() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let f = Customer::random_flavor(&mut rng);
            assert!((f.total() - BLEND_TOTAL).abs() < 1e-9, "f = {:?}", f);
            for flavor in Flavor::gameplay() {
                assert!(f[flavor] >= 0.0);
            }
            assert_eq!(f.sour, 0.0);
        }
    }

    #[test]
    fn random_flavor_visits_every_slot() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut dominant = [0u32; 3];
        for _ in 0..300 {
            let f = Customer::random_flavor(&mut rng);
            if let Some(flavor) = f.dominant(0.0) {
                dominant[flavor as usize] += 1;
            }
        }
        assert!(dominant.iter().all(|&n| n > 0), "dominant = {:?}", dominant);
    }

    #[test]
    fn queued_customer_does_not_lose_patience() {
        let mut c = customer(Some(10.0));
        c.drain_patience(5.0);
        assert_eq!(c.time_left, 1.0);
    }

    #[test]
    fn speaking_customer_drains_by_budget() {
        let mut c = customer(Some(10.0));
        c.speak();
        c.drain_patience(2.5);
        assert!((c.time_left - 0.75).abs() < 1e-12);
    }

    #[test]
    fn unlimited_budget_never_drains() {
        let mut c = customer(None);
        c.speak();
        c.drain_patience(1_000.0);
        assert_eq!(c.time_left, 1.0);
        assert!(!c.has_timed_out(0.05));
    }

    #[test]
    fn timeout_threshold_is_exclusive_epsilon() {
        let mut c = customer(Some(10.0));
        c.speak();
        c.time_left = -0.04;
        assert!(!c.has_timed_out(0.05));
        c.time_left = -0.06;
        assert!(c.has_timed_out(0.05));
    }

    #[test]
    fn moves_toward_target_with_smoothing() {
        let config = QueueConfig::default();
        let mut c = customer(None);
        c.target_position = Point2::new(100.0, 0.0);
        c.update(0.1, &config);
        // 100 * 0.1 * 5
        assert!((c.position.x - 50.0).abs() < 1e-9);
        assert!(!c.at_target(config.arrival_radius));
    }

    #[test]
    fn speech_timer_only_when_enabled() {
        let mut config = QueueConfig::default();
        let mut c = customer(None);
        c.speak();
        c.update(4.0, &config);
        assert_eq!(c.state, CustomerState::Speaking);

        config.speech_timer = Some(3.0);
        c.update(0.1, &config);
        assert_eq!(c.state, CustomerState::Waiting);
        assert!(c.is_attending());
    }

    #[test]
    fn speech_timer_waits_for_its_duration() {
        let config = QueueConfig {
            speech_timer: Some(3.0),
            ..QueueConfig::default()
        };
        let mut c = customer(None);
        c.update(5.0, &config);
        assert_eq!(c.state, CustomerState::Queued);

        c.speak();
        c.update(2.0, &config);
        assert_eq!(c.state, CustomerState::Speaking);
        c.update(1.5, &config);
        assert_eq!(c.state, CustomerState::Waiting);
    }

    #[test]
    fn served_customer_walks_off() {
        let config = QueueConfig::default();
        let mut c = customer(None);
        c.position = Point2::new(1024.0, 360.0);
        c.target_position = c.position;
        c.resolve(Tier::Okay, false);
        for _ in 0..600 {
            c.update(1.0 / 60.0, &config);
            if c.has_left(&config) {
                break;
            }
        }
        assert!(c.has_left(&config), "position = {:?}", c.position);
        assert!(c.position.x > PLAY_WIDTH);
    }
}
