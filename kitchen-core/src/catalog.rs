//! Ingredient definitions.
//!
//! The catalog is loaded once at startup and shared read-only (behind an
//! `Arc`) by the session, the rack and the dispenser. Raw profiles are biased
//! toward the center of the simplex before normalization: every gameplay
//! component is offset by +100, so an ingredient listed as `{SWEET: 100}`
//! becomes `(25, 25, 50)` rather than a pure vertex.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Flavor, FlavorVector};

/// Added to each raw gameplay component before normalization.
pub const PROFILE_OFFSET: f64 = 100.0;

/// A flavor must exceed this share to count as an ingredient's primary flavor.
pub const PRIMARY_FLAVOR_FLOOR: f64 = 34.0;

/// Catalog entry as written in the definition file.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawIngredient {
    #[serde(default)]
    flavors: BTreeMap<Flavor, f64>,
    #[serde(default)]
    description: Option<String>,
    /// Extra lines the robot may say after dispensing this ingredient.
    #[serde(default)]
    robot: Vec<String>,
    #[serde(default)]
    image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ingredient {
    pub key: String,
    /// Normalized profile; the gameplay flavors sum to 100.
    pub flavors: FlavorVector,
    pub description: Option<String>,
    pub robot_lines: Vec<String>,
    pub image: Option<String>,
}

impl Ingredient {
    /// Build an ingredient from an un-normalized profile.
    pub fn from_raw_profile(key: impl Into<String>, raw: FlavorVector) -> Self {
        Self {
            key: key.into(),
            flavors: normalize_profile(raw),
            description: None,
            robot_lines: Vec::new(),
            image: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_robot_lines(mut self, lines: Vec<String>) -> Self {
        self.robot_lines = lines;
        self
    }

    pub fn primary_flavor(&self) -> Option<Flavor> {
        self.flavors.dominant(PRIMARY_FLAVOR_FLOOR)
    }

    /// Share of the primary flavor, or 0 when there is none.
    pub fn primary_intensity(&self) -> f64 {
        self.primary_flavor().map(|f| self.flavors[f]).unwrap_or(0.0)
    }

    fn from_raw(key: String, raw: RawIngredient) -> Self {
        let mut profile = FlavorVector::new(0.0, 0.0, 0.0);
        for (flavor, amount) in raw.flavors {
            profile[flavor] = amount;
        }
        Self {
            key,
            flavors: normalize_profile(profile),
            description: raw.description,
            robot_lines: raw.robot,
            image: raw.image,
        }
    }
}

/// Offset each gameplay component by [`PROFILE_OFFSET`] and scale to 100.
fn normalize_profile(mut raw: FlavorVector) -> FlavorVector {
    for flavor in Flavor::gameplay() {
        raw[flavor] += PROFILE_OFFSET;
    }
    raw.normalized()
}

/// Immutable table of every ingredient, keyed by identifier.
///
/// Backed by a `BTreeMap` so iteration order (and therefore any seeded random
/// choice over the keys) is stable.
#[derive(Debug, Clone, Default)]
pub struct IngredientCatalog {
    ingredients: BTreeMap<String, Ingredient>,
}

impl IngredientCatalog {
    /// Parse a catalog from its JSON definition.
    ///
    /// ```json
    /// { "chili": { "flavors": { "SPICY": 80 }, "description": "hot", "robot": ["CAREFUL"] } }
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, RawIngredient> = serde_json::from_str(json)?;
        let ingredients = raw
            .into_iter()
            .map(|(key, entry)| (key.clone(), Ingredient::from_raw(key, entry)))
            .collect::<BTreeMap<_, _>>();
        if ingredients.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        Ok(Self { ingredients })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_ingredients(ingredients: impl IntoIterator<Item = Ingredient>) -> Result<Self> {
        let ingredients: BTreeMap<_, _> = ingredients
            .into_iter()
            .map(|ingredient| (ingredient.key.clone(), ingredient))
            .collect();
        if ingredients.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        Ok(Self { ingredients })
    }

    pub fn get(&self, key: &str) -> Option<&Ingredient> {
        self.ingredients.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.ingredients.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.ingredients.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ingredient> {
        self.ingredients.values()
    }

    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }

    /// Display order for the rack: sweet, then spicy, then savory
    /// ingredients (those without a primary flavor last), strongest first
    /// within a group.
    pub fn rack_order(&self) -> Vec<&str> {
        let mut entries: Vec<&Ingredient> = self.ingredients.values().collect();
        entries.sort_by(|a, b| {
            let group = |i: &Ingredient| match i.primary_flavor() {
                Some(Flavor::Sweet) => 0u8,
                Some(Flavor::Spicy) => 1,
                Some(Flavor::Savory) => 2,
                Some(Flavor::Sour) => 3,
                None => u8::MAX,
            };
            group(a)
                .cmp(&group(b))
                .then(b.primary_intensity().total_cmp(&a.primary_intensity()))
                .then(a.key.cmp(&b.key))
        });
        entries.into_iter().map(|i| i.key.as_str()).collect()
    }
}
