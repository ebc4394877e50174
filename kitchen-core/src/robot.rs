//! The robot that drops a random ingredient into the pot.
//!
//! Cycle: POPPING_UP -> UP (ingredient drops on arrival) -> POPPING_DOWN ->
//! DOWN. It stays down until the pot is emptied, which pops it back up. Its
//! pose eases toward the target like the customers do.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::catalog::IngredientCatalog;
use crate::config::DispenserConfig;
use crate::pot::Pot;
use crate::types::Point2;

/// Stock lines the robot can say after any drop.
pub const ROBOT_DIALOG: [&str; 13] = [
    "DELICIOUS AND NUTRITIOUS",
    "TASTY FOOD FOR TASTY HUMAN",
    "BEEP BOOP",
    "BOT APPETIT",
    "ALGORITHMS SAY YUM",
    "THIS INGREDIENT IS CRUCIAL",
    "96.5% CHANCE DISH IS EDIBLE",
    "HOT FOOD FROM A COLD-HEARTED MACHINE",
    "THIS WOULD BE EASIER IF I COULD TASTE",
    "THIS WOULD BE EASIER IF I COULD TASTE",
    "(WHIRR)",
    "BADA BING!",
    "MAMA MIA!",
];

pub const DEFAULT_DIALOG: &str = "TASTE ANALYSIS SAYS YUM";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub enum RobotState {
    PoppingUp,
    Up,
    PoppingDown,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct Pose {
    pub position: Point2,
    pub angle: f64,
}

/// What the robot dropped, and what it said about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispensed {
    pub key: String,
    pub line: String,
}

#[derive(Debug, Clone)]
pub struct Dispenser {
    config: DispenserConfig,
    state: RobotState,
    pose: Pose,
    target: Pose,
    since_up: f64,
    dialog: String,
    /// The dialog bubble shows while the robot is down.
    dialog_visible: bool,
}

impl Dispenser {
    pub fn new(config: DispenserConfig) -> Self {
        let down = Pose {
            position: config.down_position,
            angle: config.down_angle,
        };
        let mut robot = Self {
            config,
            state: RobotState::Down,
            pose: down,
            target: down,
            since_up: 0.0,
            dialog: DEFAULT_DIALOG.to_string(),
            dialog_visible: false,
        };
        robot.pop_up();
        robot
    }

    pub fn state(&self) -> RobotState {
        self.state
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn dialog(&self) -> &str {
        &self.dialog
    }

    pub fn dialog_visible(&self) -> bool {
        self.dialog_visible
    }

    /// Start rising to drop the next ingredient.
    pub fn pop_up(&mut self) {
        self.target = Pose {
            position: self.config.up_position,
            angle: self.config.up_angle,
        };
        self.state = RobotState::PoppingUp;
        self.dialog_visible = false;
    }

    fn pop_down(&mut self) {
        self.state = RobotState::PoppingDown;
        self.target = Pose {
            position: self.config.down_position,
            angle: self.config.down_angle,
        };
    }

    /// Advance one frame. Returns the drop, if one happened this frame.
    pub fn update<R: Rng>(
        &mut self,
        dt: f64,
        rng: &mut R,
        catalog: &IngredientCatalog,
        pot: &mut Pot,
    ) -> Option<Dispensed> {
        let d = self.target.position - self.pose.position;
        let rate = self.config.approach_rate * dt;
        self.pose.position += d * rate;
        self.pose.angle += (self.target.angle - self.pose.angle) * rate;

        let mut dispensed = None;
        match self.state {
            RobotState::PoppingUp if d.magnitude() < self.config.up_radius => {
                self.state = RobotState::Up;
                self.since_up = 0.0;
                dispensed = self.dispense(rng, catalog, pot);
            }
            RobotState::PoppingDown if d.magnitude() < self.config.down_radius => {
                self.state = RobotState::Down;
                self.dialog_visible = true;
            }
            RobotState::Up => {
                self.since_up += dt;
                if self.since_up > self.config.hold_time {
                    self.pop_down();
                }
            }
            _ => {}
        }
        dispensed
    }

    fn dispense<R: Rng>(
        &mut self,
        rng: &mut R,
        catalog: &IngredientCatalog,
        pot: &mut Pot,
    ) -> Option<Dispensed> {
        let keys: Vec<&str> = catalog.keys().collect();
        let key = *keys.choose(rng)?;
        let ingredient = catalog.get(key)?;
        pot.add_ingredient(ingredient);

        let provided = format!("I HAVE PROVIDED YOU {}", key.to_uppercase());
        let mut pool: Vec<&str> = ROBOT_DIALOG.to_vec();
        pool.extend(std::iter::repeat_n(
            provided.as_str(),
            self.config.provided_line_weight,
        ));
        pool.extend(ingredient.robot_lines.iter().map(String::as_str));
        if let Some(line) = pool.choose(rng) {
            self.dialog = line.to_string();
        }

        Some(Dispensed {
            key: key.to_string(),
            line: self.dialog.clone(),
        })
    }
}
