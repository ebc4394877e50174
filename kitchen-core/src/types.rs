use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Sub};

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use tsify_next::Tsify;

// ============================================================================
// IDs - Using slotmap for generational indices
// ============================================================================

new_key_type! {
    pub struct CustomerId;
}

/// Trait for converting SlotMap keys to u64 for WASM boundary
pub trait KeyToU64 {
    fn to_u64(self) -> u64;
}

impl KeyToU64 for CustomerId {
    fn to_u64(self) -> u64 {
        self.0.as_ffi()
    }
}

// ============================================================================
// Flavors - The axes of the blend simplex
// ============================================================================

/// Total every normalized blend sums to.
pub const BLEND_TOTAL: f64 = 100.0;

/// Share of each gameplay flavor in the uniform blend.
pub const UNIFORM_SHARE: f64 = BLEND_TOTAL / 3.0;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Tsify,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Flavor {
    Spicy,
    Savory,
    Sweet,
    /// Defined by the catalog format but never part of a blend.
    Sour,
}

impl Flavor {
    /// The three flavors that take part in mixing and matching, in vertex order.
    pub const GAMEPLAY: [Flavor; 3] = [Flavor::Spicy, Flavor::Savory, Flavor::Sweet];

    /// Returns an iterator over the gameplay flavors
    pub fn gameplay() -> impl Iterator<Item = Flavor> {
        Self::GAMEPLAY.into_iter()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Flavor::Spicy => "spicy",
            Flavor::Savory => "savory",
            Flavor::Sweet => "sweet",
            Flavor::Sour => "sour",
        }
    }
}

/// Magnitude per flavor. Indexable by [`Flavor`], so a component can never be missing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct FlavorVector {
    pub spicy: f64,
    pub savory: f64,
    pub sweet: f64,
    #[serde(default)]
    pub sour: f64,
}

impl FlavorVector {
    pub fn new(spicy: f64, savory: f64, sweet: f64) -> Self {
        Self {
            spicy,
            savory,
            sweet,
            sour: 0.0,
        }
    }

    /// Equal thirds: the resting state of the pot.
    pub fn uniform() -> Self {
        Self::new(UNIFORM_SHARE, UNIFORM_SHARE, UNIFORM_SHARE)
    }

    /// Sum over the gameplay flavors (sour is excluded).
    pub fn total(&self) -> f64 {
        Flavor::gameplay().map(|f| self[f]).sum()
    }

    /// Scale the gameplay flavors so they sum to [`BLEND_TOTAL`].
    ///
    /// A vector with no positive mass has no direction, so it collapses to
    /// the uniform blend.
    pub fn normalized(mut self) -> Self {
        let total = self.total();
        if total <= 0.0 || !total.is_finite() {
            return Self::uniform();
        }
        let scale = BLEND_TOTAL / total;
        for flavor in Flavor::gameplay() {
            self[flavor] *= scale;
        }
        self
    }

    /// Clamp negative gameplay components to zero, then normalize.
    ///
    /// Order matters: clamping first discards how far below zero a component
    /// went.
    pub fn clamped_normalized(mut self) -> Self {
        for flavor in Flavor::gameplay() {
            if self[flavor] < 0.0 {
                self[flavor] = 0.0;
            }
        }
        self.normalized()
    }

    /// Gameplay flavor with the largest share strictly above `floor`.
    pub fn dominant(&self, floor: f64) -> Option<Flavor> {
        let mut best = None;
        let mut max = floor;
        for flavor in Flavor::gameplay() {
            if self[flavor] > max {
                max = self[flavor];
                best = Some(flavor);
            }
        }
        best
    }

    pub fn approx_eq(&self, other: &FlavorVector, eps: f64) -> bool {
        Flavor::gameplay().all(|f| (self[f] - other[f]).abs() <= eps)
    }
}

impl Index<Flavor> for FlavorVector {
    type Output = f64;

    fn index(&self, flavor: Flavor) -> &f64 {
        match flavor {
            Flavor::Spicy => &self.spicy,
            Flavor::Savory => &self.savory,
            Flavor::Sweet => &self.sweet,
            Flavor::Sour => &self.sour,
        }
    }
}

impl IndexMut<Flavor> for FlavorVector {
    fn index_mut(&mut self, flavor: Flavor) -> &mut f64 {
        match flavor {
            Flavor::Spicy => &mut self.spicy,
            Flavor::Savory => &mut self.savory,
            Flavor::Sweet => &mut self.sweet,
            Flavor::Sour => &mut self.sour,
        }
    }
}

// ============================================================================
// Tier - Outcome of matching a blend against a goal
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum Tier {
    Bad,
    Okay,
    Great,
}

impl Tier {
    /// Rating weight fed into the score multiplier.
    pub fn rating(&self) -> u32 {
        match self {
            Tier::Bad => 1,
            Tier::Okay => 3,
            Tier::Great => 5,
        }
    }
}

// ============================================================================
// Customer State
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum CustomerState {
    Queued,
    Speaking,
    Waiting,
    Served,
}

impl CustomerState {
    /// Speaking and waiting customers can be served and can time out.
    pub fn is_attending(&self) -> bool {
        matches!(self, CustomerState::Speaking | CustomerState::Waiting)
    }
}

// ============================================================================
// Point2 - Screen / flavor-space coordinates (y grows downward)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(&self, other: Point2) -> f64 {
        (*self - other).magnitude()
    }
}

impl Add for Point2 {
    type Output = Point2;

    fn add(self, rhs: Point2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point2 {
    fn add_assign(&mut self, rhs: Point2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point2 {
    type Output = Point2;

    fn sub(self, rhs: Point2) -> Point2 {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point2 {
    type Output = Point2;

    fn mul(self, rhs: f64) -> Point2 {
        Point2::new(self.x * rhs, self.y * rhs)
    }
}
