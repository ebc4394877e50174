use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::customer::Customer;
use crate::goal::Goal;
use crate::robot::{Pose, RobotState};
use crate::score::ScoreAccumulator;
use crate::types::{CustomerId, CustomerState, FlavorVector, KeyToU64, Point2, Tier};

// ============================================================================
// Events - What happened since the last drain
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
#[serde(tag = "kind")]
pub enum SessionEvent {
    CustomerSpawned {
        id: u64,
        index: i64,
    },
    CustomerSpeaking {
        id: u64,
        desired_flavor: FlavorVector,
        tolerance: f64,
    },
    Served {
        id: u64,
        tier: Tier,
        time_left: f64,
    },
    TimedOut {
        id: u64,
        time_left: f64,
    },
    LifeLost {
        lives: i32,
    },
    Dispensed {
        key: String,
        line: String,
    },
    SessionOver {
        final_score: i64,
    },
}

/// Result of a successful serve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct ServeOutcome {
    pub customer_id: u64,
    pub tier: Tier,
    pub rating: u32,
    pub time_left: f64,
    pub life_lost: bool,
    pub lives: i32,
}

/// Stats shown once the session is over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct SessionResult {
    pub customers_served: u32,
    pub raw_score: i64,
    pub rating_multiplier: f64,
    pub quick_bonus: i64,
    /// Most used rack ingredient, `None` if the player never added one.
    pub favorite_ingredient: Option<String>,
    pub final_score: i64,
}

// ============================================================================
// Snapshots - Render state
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct CustomerSnapshot {
    pub id: u64,
    pub index: i64,
    pub state: CustomerState,
    pub position: Point2,
    pub desired_flavor: FlavorVector,
    pub tolerance: f64,
    pub time_left: f64,
    pub happiness: Option<Tier>,
    pub timed_out: bool,
}

impl CustomerSnapshot {
    pub fn new(id: CustomerId, customer: &Customer) -> Self {
        Self {
            id: id.to_u64(),
            index: customer.index,
            state: customer.state,
            position: customer.position,
            desired_flavor: customer.desired_flavor,
            tolerance: customer.tolerance,
            time_left: customer.time_left,
            happiness: customer.happiness,
            timed_out: customer.timed_out,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct RobotSnapshot {
    pub state: RobotState,
    pub pose: Pose,
    pub dialog: String,
    pub dialog_visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct RackSlotSnapshot {
    pub key: String,
    /// `None` when the rack is unlimited.
    pub quantity: Option<u32>,
    pub used: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct SessionSnapshot {
    pub tick: u64,
    pub lives: i32,
    pub over: bool,
    pub pot: FlavorVector,
    /// Pot blend in flavor-triangle coordinates.
    pub pot_point: Point2,
    pub ingredient_count: u32,
    pub goal: Option<Goal>,
    pub goal_point: Option<Point2>,
    /// How the current pot would be judged if served now.
    pub preview_tier: Option<Tier>,
    /// Pending customers, front first.
    pub queue: Vec<CustomerSnapshot>,
    pub departing: Vec<CustomerSnapshot>,
    pub robot: RobotSnapshot,
    pub rack: Vec<RackSlotSnapshot>,
    pub score: ScoreAccumulator,
    pub handicap: f64,
}
