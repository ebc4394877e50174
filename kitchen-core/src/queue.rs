//! The line of customers and its state machine.
//!
//! Per customer: QUEUED -> SPEAKING (-> WAITING) -> SERVED. Only the front of
//! the line can speak, be served or time out, so at most one customer is
//! ever awaiting judgment.
//!
//! The queue owns customer state and motion. Consequences of a resolution
//! (pot, lives, score, handicap) belong to the session, which reacts to the
//! [`QueueEvent`]s returned here and then calls [`CustomerQueue::replenish`]
//! so new arrivals see the updated handicap.

use std::collections::VecDeque;

use rand::Rng;
use slotmap::SlotMap;

use crate::config::QueueConfig;
use crate::customer::Customer;
use crate::patience::{Handicap, PatienceModel};
use crate::types::{CustomerId, CustomerState, FlavorVector, Point2, Tier};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueueEvent {
    Spawned(CustomerId),
    /// Front customer arrived and placed its order.
    Speaking(CustomerId),
    /// Front customer ran out of patience and left unserved.
    TimedOut(CustomerId),
}

#[derive(Debug, Clone)]
pub struct CustomerQueue {
    config: QueueConfig,
    customers: SlotMap<CustomerId, Customer>,
    /// Pending customers, front first.
    line: VecDeque<CustomerId>,
    /// Resolved customers still walking off screen.
    departing: Vec<CustomerId>,
    next_index: i64,
}

impl CustomerQueue {
    pub fn new(config: QueueConfig, first_index: i64) -> Self {
        Self {
            config,
            customers: SlotMap::with_key(),
            line: VecDeque::new(),
            departing: Vec::new(),
            next_index: first_index,
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Number of pending customers.
    pub fn len(&self) -> usize {
        self.line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    pub fn get(&self, id: CustomerId) -> Option<&Customer> {
        self.customers.get(id)
    }

    pub fn front_id(&self) -> Option<CustomerId> {
        self.line.front().copied()
    }

    pub fn front(&self) -> Option<&Customer> {
        self.front_id().and_then(|id| self.customers.get(id))
    }

    pub fn front_mut(&mut self) -> Option<&mut Customer> {
        let id = self.front_id()?;
        self.customers.get_mut(id)
    }

    /// Pending customers, front first.
    pub fn line(&self) -> impl Iterator<Item = (CustomerId, &Customer)> {
        self.line
            .iter()
            .filter_map(|&id| self.customers.get(id).map(|c| (id, c)))
    }

    /// Resolved customers still on screen.
    pub fn departing(&self) -> impl Iterator<Item = (CustomerId, &Customer)> {
        self.departing
            .iter()
            .filter_map(|&id| self.customers.get(id).map(|c| (id, c)))
    }

    /// Whether the front customer can be served right now.
    pub fn front_is_attending(&self) -> bool {
        self.front().is_some_and(Customer::is_attending)
    }

    /// Append a customer. A `None` order is randomized.
    pub fn push_customer<R: Rng>(
        &mut self,
        rng: &mut R,
        tolerance: f64,
        desired: Option<FlavorVector>,
        patience: &PatienceModel,
        handicap: &Handicap,
    ) -> CustomerId {
        let index = self.next_index;
        self.next_index += 1;

        let desired = desired.unwrap_or_else(|| Customer::random_flavor(rng));
        let customer = Customer::new(
            index,
            self.config.spawn_position,
            tolerance,
            desired,
            patience.budget(index, handicap),
            self.config.exit_velocity,
        );
        let id = self.customers.insert(customer);
        self.line.push_back(id);
        self.layout();
        id
    }

    /// Top the line back up to its target length with random customers.
    pub fn replenish<R: Rng>(
        &mut self,
        rng: &mut R,
        patience: &PatienceModel,
        handicap: &Handicap,
    ) -> Vec<CustomerId> {
        let mut spawned = Vec::new();
        while self.line.len() < self.config.target_len {
            let span = self.config.max_tolerance - self.config.min_tolerance;
            let tolerance = self.config.min_tolerance + rng.random::<f64>() * span;
            spawned.push(self.push_customer(rng, tolerance, None, patience, handicap));
        }
        spawned
    }

    /// Assign each pending customer its place in line.
    fn layout(&mut self) {
        let front = self.config.front_position;
        for (i, id) in self.line.iter().enumerate() {
            if let Some(customer) = self.customers.get_mut(*id) {
                customer.target_position =
                    Point2::new(front.x + self.config.spacing * i as f64, front.y);
            }
        }
    }

    /// One frame of queue dynamics.
    ///
    /// Order: front patience, motion, drop departed, replenish, speaking
    /// trigger, timeout check. A timed-out customer is already out of the
    /// line when this returns; the caller replenishes after applying the
    /// penalty.
    pub fn update<R: Rng>(
        &mut self,
        dt: f64,
        rng: &mut R,
        patience: &PatienceModel,
        handicap: &Handicap,
    ) -> Vec<QueueEvent> {
        let mut events = Vec::new();

        if let Some(front) = self.front_mut() {
            front.drain_patience(dt);
        }

        for customer in self.customers.values_mut() {
            customer.update(dt, &self.config);
        }

        let config = &self.config;
        let customers = &mut self.customers;
        self.departing.retain(|&id| {
            let gone = customers.get(id).is_none_or(|c| c.has_left(config));
            if gone {
                customers.remove(id);
            }
            !gone
        });

        events.extend(
            self.replenish(rng, patience, handicap)
                .into_iter()
                .map(QueueEvent::Spawned),
        );

        let arrival_radius = self.config.arrival_radius;
        if let Some(id) = self.front_id()
            && let Some(front) = self.customers.get_mut(id)
            && front.state == CustomerState::Queued
            && front.at_target(arrival_radius)
        {
            front.speak();
            events.push(QueueEvent::Speaking(id));
        }

        let epsilon = self.config.timeout_epsilon;
        if self.front().is_some_and(|c| c.has_timed_out(epsilon))
            && let Some(id) = self.resolve_front(Tier::Bad, true)
        {
            events.push(QueueEvent::TimedOut(id));
        }

        events
    }

    /// Serve the front customer with the given tier.
    ///
    /// Returns `None` (and changes nothing) unless the front customer is
    /// speaking or waiting.
    pub fn serve_front(&mut self, tier: Tier) -> Option<CustomerId> {
        if !self.front_is_attending() {
            return None;
        }
        self.resolve_front(tier, false)
    }

    fn resolve_front(&mut self, tier: Tier, timed_out: bool) -> Option<CustomerId> {
        let id = self.line.pop_front()?;
        if let Some(customer) = self.customers.get_mut(id) {
            customer.resolve(tier, timed_out);
        }
        self.departing.push(id);
        self.layout();
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const DT: f64 = 1.0 / 60.0;

    fn setup() -> (CustomerQueue, StdRng, PatienceModel, Handicap) {
        let queue = CustomerQueue::new(QueueConfig::default(), 1);
        (
            queue,
            StdRng::seed_from_u64(3),
            PatienceModel::default(),
            Handicap::default(),
        )
    }

    fn run_until_speaking(
        queue: &mut CustomerQueue,
        rng: &mut StdRng,
        patience: &PatienceModel,
        handicap: &Handicap,
    ) -> CustomerId {
        for _ in 0..600 {
            for event in queue.update(DT, rng, patience, handicap) {
                if let QueueEvent::Speaking(id) = event {
                    return id;
                }
            }
        }
        panic!("front customer never started speaking");
    }

    #[test]
    fn replenish_fills_to_target() {
        let (mut queue, mut rng, patience, handicap) = setup();
        let spawned = queue.replenish(&mut rng, &patience, &handicap);
        assert_eq!(spawned.len(), 3);
        assert_eq!(queue.len(), 3);
        for (_, c) in queue.line() {
            assert!(c.tolerance >= 0.3 && c.tolerance < 0.8, "tol = {}", c.tolerance);
            assert_eq!(c.state, CustomerState::Queued);
        }
        assert!(queue.replenish(&mut rng, &patience, &handicap).is_empty());
    }

    #[test]
    fn layout_spaces_customers() {
        let (mut queue, mut rng, patience, handicap) = setup();
        queue.replenish(&mut rng, &patience, &handicap);
        let xs: Vec<f64> = queue.line().map(|(_, c)| c.target_position.x).collect();
        assert_eq!(xs, vec![1024.0, 1124.0, 1224.0]);
    }

    #[test]
    fn indices_feed_patience_budgets() {
        let (mut queue, mut rng, patience, handicap) = setup();
        queue.replenish(&mut rng, &patience, &handicap);
        let budgets: Vec<Option<f64>> = queue.line().map(|(_, c)| c.patience_budget).collect();
        assert_eq!(budgets, vec![Some(120.0), Some(60.0), Some(30.0)]);
    }

    #[test]
    fn only_front_speaks() {
        let (mut queue, mut rng, patience, handicap) = setup();
        let id = run_until_speaking(&mut queue, &mut rng, &patience, &handicap);
        assert_eq!(queue.front_id(), Some(id));
        let speaking = queue.line().filter(|(_, c)| c.is_attending()).count();
        assert_eq!(speaking, 1);
        assert_eq!(queue.front().unwrap().time_left, 1.0);
    }

    #[test]
    fn speaking_is_reported_once() {
        let (mut queue, mut rng, patience, handicap) = setup();
        let id = run_until_speaking(&mut queue, &mut rng, &patience, &handicap);
        for _ in 0..120 {
            let events = queue.update(DT, &mut rng, &patience, &handicap);
            assert!(!events.contains(&QueueEvent::Speaking(id)));
        }
        assert_eq!(queue.front_id(), Some(id));
    }

    #[test]
    fn serve_requires_attending_front() {
        let (mut queue, mut rng, patience, handicap) = setup();
        queue.replenish(&mut rng, &patience, &handicap);
        assert_eq!(queue.serve_front(Tier::Great), None);
        assert_eq!(queue.len(), 3);

        let id = run_until_speaking(&mut queue, &mut rng, &patience, &handicap);
        assert_eq!(queue.serve_front(Tier::Great), Some(id));
        assert_eq!(queue.len(), 2);
        let served = queue.get(id).unwrap();
        assert_eq!(served.state, CustomerState::Served);
        assert_eq!(served.happiness, Some(Tier::Great));
        assert!(!served.timed_out);

        queue.replenish(&mut rng, &patience, &handicap);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn front_times_out_past_epsilon() {
        let (mut queue, mut rng, patience, handicap) = setup();
        let id = run_until_speaking(&mut queue, &mut rng, &patience, &handicap);

        queue.front_mut().unwrap().time_left = -0.04;
        // Freeze patience so the boundary value is what gets checked.
        queue.front_mut().unwrap().patience_budget = None;
        let events = queue.update(DT, &mut rng, &patience, &handicap);
        assert!(!events.contains(&QueueEvent::TimedOut(id)));

        queue.front_mut().unwrap().time_left = -0.06;
        let events = queue.update(DT, &mut rng, &patience, &handicap);
        assert!(events.contains(&QueueEvent::TimedOut(id)));
        assert_ne!(queue.front_id(), Some(id));

        let gone = queue.get(id).unwrap();
        assert!(gone.timed_out);
        assert_eq!(gone.happiness, Some(Tier::Bad));
        assert_eq!(queue.departing().count(), 1);
    }

    #[test]
    fn departed_customers_are_dropped() {
        let (mut queue, mut rng, patience, handicap) = setup();
        let id = run_until_speaking(&mut queue, &mut rng, &patience, &handicap);
        queue.serve_front(Tier::Okay);
        for _ in 0..600 {
            queue.update(DT, &mut rng, &patience, &handicap);
        }
        assert!(queue.get(id).is_none());
        assert_eq!(queue.departing().count(), 0);
    }

    #[test]
    fn explicit_order_is_kept() {
        let (mut queue, mut rng, patience, handicap) = setup();
        let want = FlavorVector::new(70.0, 20.0, 10.0);
        let id = queue.push_customer(&mut rng, 0.4, Some(want), &patience, &handicap);
        let c = queue.get(id).unwrap();
        assert_eq!(c.tolerance, 0.4);
        assert!(c.desired_flavor.approx_eq(&want, 1e-12));
    }
}
