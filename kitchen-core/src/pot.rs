use serde::{Deserialize, Serialize};

use crate::catalog::Ingredient;
use crate::types::{Flavor, FlavorVector, UNIFORM_SHARE};

/// The mixing vessel.
///
/// Each ingredient pulls the blend by how far its profile deviates from the
/// uniform prior: `current + ingredient - 100/3` per flavor, negatives
/// clamped to zero, then renormalized to 100. An ingredient with an exactly
/// uniform profile leaves the blend where it was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pot {
    blend: FlavorVector,
    ingredient_count: u32,
}

impl Default for Pot {
    fn default() -> Self {
        Self::new()
    }
}

impl Pot {
    pub fn new() -> Self {
        Self {
            blend: FlavorVector::uniform(),
            ingredient_count: 0,
        }
    }

    pub fn blend(&self) -> &FlavorVector {
        &self.blend
    }

    pub fn ingredient_count(&self) -> u32 {
        self.ingredient_count
    }

    pub fn is_empty(&self) -> bool {
        self.ingredient_count == 0
    }

    pub fn add_ingredient(&mut self, ingredient: &Ingredient) {
        self.add_profile(&ingredient.flavors);
    }

    /// Mix in a normalized profile.
    pub fn add_profile(&mut self, profile: &FlavorVector) {
        for flavor in Flavor::gameplay() {
            self.blend[flavor] += profile[flavor] - UNIFORM_SHARE;
        }
        self.ingredient_count += 1;
        self.blend = self.blend.clamped_normalized();
    }

    pub fn empty(&mut self) {
        self.blend = FlavorVector::uniform();
        self.ingredient_count = 0;
    }
}
