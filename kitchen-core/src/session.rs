//! One play session: the pot, the line, the robot, lives and score.
//!
//! Frame order in [`Session::update`]: queue dynamics (and reactions to
//! whatever the queue reports), then the robot. Player actions
//! ([`Session::add_ingredient`], [`Session::serve`]) apply immediately.
//! Once lives drop below zero the session is over and everything becomes a
//! no-op.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::catalog::IngredientCatalog;
use crate::config::GameConfig;
use crate::flavor::FlavorSpace;
use crate::goal::GoalMatcher;
use crate::patience::{Handicap, PatienceModel};
use crate::pot::Pot;
use crate::queue::{CustomerQueue, QueueEvent};
use crate::rack::SpiceRack;
use crate::robot::Dispenser;
use crate::score::{ScoreAccumulator, ScoreBreakdown};
use crate::snapshot::{
    CustomerSnapshot, RackSlotSnapshot, RobotSnapshot, ServeOutcome, SessionEvent,
    SessionResult, SessionSnapshot,
};
use crate::types::{CustomerId, KeyToU64, Tier};

pub struct Session {
    config: GameConfig,
    catalog: Arc<IngredientCatalog>,
    space: FlavorSpace,
    pot: Pot,
    goal: GoalMatcher,
    queue: CustomerQueue,
    patience: PatienceModel,
    handicap: Handicap,
    score: ScoreAccumulator,
    rack: SpiceRack,
    robot: Dispenser,
    lives: i32,
    tick: u64,
    rng: StdRng,
    events: Vec<SessionEvent>,
    over: bool,
}

impl Session {
    pub fn new(catalog: Arc<IngredientCatalog>, config: GameConfig, seed: u64) -> Self {
        let mut session = Self {
            space: FlavorSpace::new(config.flavor_radius),
            pot: Pot::new(),
            goal: GoalMatcher::new(),
            queue: CustomerQueue::new(config.queue.clone(), config.patience.first_index),
            patience: PatienceModel::new(config.patience.clone()),
            handicap: Handicap::default(),
            score: ScoreAccumulator::new(),
            rack: SpiceRack::new(&catalog, config.rack_stock),
            robot: Dispenser::new(config.dispenser.clone()),
            lives: config.lives,
            tick: 0,
            rng: StdRng::seed_from_u64(seed),
            events: Vec::new(),
            over: false,
            catalog,
            config,
        };
        session.replenish();
        session
    }

    /// A session with default tuning.
    pub fn with_defaults(catalog: Arc<IngredientCatalog>, seed: u64) -> Self {
        Self::new(catalog, GameConfig::default(), seed)
    }

    // === Accessors ===

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn catalog(&self) -> &IngredientCatalog {
        &self.catalog
    }

    pub fn pot(&self) -> &Pot {
        &self.pot
    }

    pub fn goal(&self) -> &GoalMatcher {
        &self.goal
    }

    pub fn queue(&self) -> &CustomerQueue {
        &self.queue
    }

    pub fn robot(&self) -> &Dispenser {
        &self.robot
    }

    pub fn rack(&self) -> &SpiceRack {
        &self.rack
    }

    pub fn score(&self) -> &ScoreAccumulator {
        &self.score
    }

    pub fn handicap(&self) -> Handicap {
        self.handicap
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // === Frame ===

    pub fn update(&mut self, dt: f64) {
        if self.over {
            return;
        }
        self.tick += 1;

        let events = self
            .queue
            .update(dt, &mut self.rng, &self.patience, &self.handicap);
        for event in events {
            match event {
                QueueEvent::Spawned(id) => self.on_spawned(id),
                QueueEvent::Speaking(id) => self.on_speaking(id),
                QueueEvent::TimedOut(id) => self.on_timed_out(id),
            }
        }
        if self.over {
            return;
        }

        if let Some(dispensed) = self
            .robot
            .update(dt, &mut self.rng, &self.catalog, &mut self.pot)
        {
            #[cfg(feature = "instrument")]
            tracing::info!(
                target: "dispense",
                tick = self.tick,
                ingredient = dispensed.key.as_str(),
                line = dispensed.line.as_str(),
                spicy = self.pot.blend().spicy,
                savory = self.pot.blend().savory,
                sweet = self.pot.blend().sweet,
            );
            self.events.push(SessionEvent::Dispensed {
                key: dispensed.key,
                line: dispensed.line,
            });
        }
    }

    // === Player actions ===

    /// Drop one rack ingredient into the pot. Unknown or out-of-stock keys
    /// change nothing and return `false`.
    pub fn add_ingredient(&mut self, key: &str) -> bool {
        if self.over {
            return false;
        }
        let Some(ingredient) = self.catalog.get(key) else {
            return false;
        };
        if !self.rack.take(key) {
            return false;
        }
        self.pot.add_ingredient(ingredient);
        true
    }

    pub fn restock<'a>(&mut self, amounts: impl IntoIterator<Item = (&'a str, u32)>) {
        self.rack.restock(amounts);
    }

    /// Serve the pot to the front customer.
    ///
    /// `None` unless the front customer is speaking or waiting.
    pub fn serve(&mut self) -> Option<ServeOutcome> {
        if self.over {
            return None;
        }
        let time_left = self.queue.front().filter(|c| c.is_attending())?.time_left;
        let tier = self.goal.classify(self.pot.blend());
        let id = self.queue.serve_front(tier)?;

        #[cfg(feature = "instrument")]
        {
            let blend = self.pot.blend();
            tracing::info!(
                target: "serve",
                tick = self.tick,
                customer_id = id.to_u64(),
                tier = tier.rating(),
                time_left = time_left,
                distance = self.goal.distance(blend).unwrap_or(f64::NAN),
                ingredients = self.pot.ingredient_count(),
                spicy = blend.spicy,
                savory = blend.savory,
                sweet = blend.sweet,
            );
        }

        self.empty_pot();
        self.goal.clear();
        self.score.record(tier, time_left);
        self.patience.on_served(&mut self.handicap);
        self.events.push(SessionEvent::Served {
            id: id.to_u64(),
            tier,
            time_left,
        });

        let life_lost = tier == Tier::Bad;
        if life_lost {
            self.lose_life();
        }
        if !self.over {
            self.replenish();
        }

        Some(ServeOutcome {
            customer_id: id.to_u64(),
            tier,
            rating: tier.rating(),
            time_left,
            life_lost,
            lives: self.lives,
        })
    }

    /// How the pot would be judged right now, if anyone is waiting.
    pub fn preview_tier(&self) -> Option<Tier> {
        self.goal.goal()?;
        Some(self.goal.classify(self.pot.blend()))
    }

    // === Results ===

    pub fn breakdown(&self) -> ScoreBreakdown {
        self.score.breakdown(&self.config.scoring)
    }

    pub fn result(&self) -> SessionResult {
        let b = self.breakdown();
        SessionResult {
            customers_served: b.customers_served,
            raw_score: b.raw_score,
            rating_multiplier: b.rating_multiplier,
            quick_bonus: b.quick_bonus,
            favorite_ingredient: self.rack.favorite().map(str::to_string),
            final_score: b.final_score,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let goal = self.goal.goal().copied();
        SessionSnapshot {
            tick: self.tick,
            lives: self.lives,
            over: self.over,
            pot: *self.pot.blend(),
            pot_point: self.space.to_point(self.pot.blend()),
            ingredient_count: self.pot.ingredient_count(),
            goal,
            goal_point: goal.map(|g| self.space.to_point(&g.flavor)),
            preview_tier: self.preview_tier(),
            queue: self
                .queue
                .line()
                .map(|(id, c)| CustomerSnapshot::new(id, c))
                .collect(),
            departing: self
                .queue
                .departing()
                .map(|(id, c)| CustomerSnapshot::new(id, c))
                .collect(),
            robot: RobotSnapshot {
                state: self.robot.state(),
                pose: self.robot.pose(),
                dialog: self.robot.dialog().to_string(),
                dialog_visible: self.robot.dialog_visible(),
            },
            rack: self
                .catalog
                .rack_order()
                .into_iter()
                .map(|key| RackSlotSnapshot {
                    key: key.to_string(),
                    quantity: if self.rack.is_unlimited() {
                        None
                    } else {
                        self.rack.quantity(key)
                    },
                    used: self.rack.usage(key),
                })
                .collect(),
            score: self.score,
            handicap: self.handicap.value(),
        }
    }

    // === Internals ===

    fn replenish(&mut self) {
        let spawned = self
            .queue
            .replenish(&mut self.rng, &self.patience, &self.handicap);
        for id in spawned {
            self.on_spawned(id);
        }
    }

    /// Empty the pot and send the robot up for a fresh ingredient.
    fn empty_pot(&mut self) {
        self.pot.empty();
        self.robot.pop_up();
    }

    fn on_spawned(&mut self, id: CustomerId) {
        let Some(customer) = self.queue.get(id) else {
            return;
        };

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "spawn",
            tick = self.tick,
            customer_id = id.to_u64(),
            index = customer.index,
            tolerance = customer.tolerance,
            unlimited = customer.patience_budget.is_none(),
            patience = customer.patience_budget.unwrap_or(0.0),
            handicap = self.handicap.value(),
        );

        self.events.push(SessionEvent::CustomerSpawned {
            id: id.to_u64(),
            index: customer.index,
        });
    }

    fn on_speaking(&mut self, id: CustomerId) {
        let Some(customer) = self.queue.get(id) else {
            return;
        };
        let (desired_flavor, tolerance) = (customer.desired_flavor, customer.tolerance);
        self.goal.set_goal(desired_flavor, tolerance);

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "speak",
            tick = self.tick,
            customer_id = id.to_u64(),
            tolerance = tolerance,
            spicy = desired_flavor.spicy,
            savory = desired_flavor.savory,
            sweet = desired_flavor.sweet,
        );

        self.events.push(SessionEvent::CustomerSpeaking {
            id: id.to_u64(),
            desired_flavor,
            tolerance,
        });
    }

    fn on_timed_out(&mut self, id: CustomerId) {
        let time_left = self.queue.get(id).map_or(0.0, |c| c.time_left);

        self.patience.on_timeout(&mut self.handicap);
        self.empty_pot();
        self.goal.clear();
        self.score.record(Tier::Bad, time_left);

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "timeout",
            tick = self.tick,
            customer_id = id.to_u64(),
            time_left = time_left,
            handicap = self.handicap.value(),
        );

        self.events.push(SessionEvent::TimedOut {
            id: id.to_u64(),
            time_left,
        });
        self.lose_life();
        if !self.over {
            self.replenish();
        }
    }

    fn lose_life(&mut self) {
        self.lives -= 1;
        self.events.push(SessionEvent::LifeLost { lives: self.lives });
        if self.lives < 0 {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.over = true;
        let b = self.breakdown();

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "session_end",
            tick = self.tick,
            customers_served = b.customers_served,
            rating_multiplier = b.rating_multiplier,
            quick_bonus = b.quick_bonus,
            final_score = b.final_score,
        );

        self.events.push(SessionEvent::SessionOver {
            final_score: b.final_score,
        });
    }
}
