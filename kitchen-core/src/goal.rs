use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::flavor::FlavorSpace;
use crate::types::{FlavorVector, Tier};

/// The blend a customer asked for and how far from it they will accept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct Goal {
    pub flavor: FlavorVector,
    /// Outer tolerance radius in normalized flavor-space units.
    pub spread: f64,
}

/// Classifies candidate blends against the current goal.
///
/// Two concentric rings around the goal point: inside `spread / 2` is
/// [`Tier::Great`], inside `spread` is [`Tier::Okay`], everything else is
/// [`Tier::Bad`]. Both bounds are exclusive.
#[derive(Debug, Clone, Default)]
pub struct GoalMatcher {
    goal: Option<Goal>,
}

impl GoalMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_goal(&mut self, flavor: FlavorVector, spread: f64) {
        self.goal = Some(Goal {
            flavor: flavor.normalized(),
            spread,
        });
    }

    pub fn clear(&mut self) {
        self.goal = None;
    }

    pub fn goal(&self) -> Option<&Goal> {
        self.goal.as_ref()
    }

    /// Distance from `candidate` to the goal, if one is set.
    pub fn distance(&self, candidate: &FlavorVector) -> Option<f64> {
        self.goal
            .as_ref()
            .map(|goal| FlavorSpace::distance(candidate, &goal.flavor))
    }

    pub fn classify(&self, candidate: &FlavorVector) -> Tier {
        let Some(goal) = self.goal.as_ref() else {
            return Tier::Bad;
        };
        classify_distance(FlavorSpace::distance(candidate, &goal.flavor), goal.spread)
    }
}

/// Tier for a distance given a spread. Upper bounds are exclusive.
pub fn classify_distance(dist: f64, spread: f64) -> Tier {
    if dist < spread / 2.0 {
        Tier::Great
    } else if dist < spread {
        Tier::Okay
    } else {
        Tier::Bad
    }
}
