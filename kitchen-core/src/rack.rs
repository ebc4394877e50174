// Spice rack: what the player can drop into the pot, and how often they did.

use std::collections::BTreeMap;

use crate::catalog::IngredientCatalog;

#[derive(Debug, Clone, PartialEq)]
pub struct SpiceRack {
    /// Copies left per ingredient. Ignored when `unlimited`.
    stock: BTreeMap<String, u32>,
    unlimited: bool,
    /// Successful player additions per ingredient.
    usage: BTreeMap<String, u32>,
    /// Keys in the order they were first added.
    first_used: Vec<String>,
}

impl SpiceRack {
    /// A rack holding every catalog ingredient. `None` stocks without limit.
    pub fn new(catalog: &IngredientCatalog, stock: Option<u32>) -> Self {
        Self {
            stock: catalog
                .keys()
                .map(|key| (key.to_string(), stock.unwrap_or(0)))
                .collect(),
            unlimited: stock.is_none(),
            usage: BTreeMap::new(),
            first_used: Vec::new(),
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.unlimited
    }

    /// Copies left, or `None` for keys the rack does not carry.
    pub fn quantity(&self, key: &str) -> Option<u32> {
        self.stock.get(key).copied()
    }

    /// Add copies. Keys not on the rack are skipped.
    pub fn restock<'a>(&mut self, amounts: impl IntoIterator<Item = (&'a str, u32)>) {
        for (key, amount) in amounts {
            if let Some(qty) = self.stock.get_mut(key) {
                *qty += amount;
            }
        }
    }

    /// Take one copy for the pot. Returns whether anything was taken.
    pub fn take(&mut self, key: &str) -> bool {
        let Some(qty) = self.stock.get_mut(key) else {
            return false;
        };
        if !self.unlimited {
            if *qty == 0 {
                return false;
            }
            *qty -= 1;
        }
        let count = self.usage.entry(key.to_string()).or_insert(0);
        if *count == 0 {
            self.first_used.push(key.to_string());
        }
        *count += 1;
        true
    }

    pub fn usage(&self, key: &str) -> u32 {
        self.usage.get(key).copied().unwrap_or(0)
    }

    /// Most used ingredient; ties go to the one added first.
    pub fn favorite(&self) -> Option<&str> {
        let mut best: Option<(&str, u32)> = None;
        for key in &self.first_used {
            let count = self.usage(key);
            if best.is_none_or(|(_, n)| count > n) {
                best = Some((key.as_str(), count));
            }
        }
        best.map(|(key, _)| key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> IngredientCatalog {
        IngredientCatalog::from_json(
            r#"{ "basil": { "flavors": { "SAVORY": 30 } },
                 "chili": { "flavors": { "SPICY": 90 } },
                 "sugar": { "flavors": { "SWEET": 90 } } }"#,
        )
        .unwrap()
    }

    #[test]
    fn unlimited_rack_never_runs_out() {
        let mut rack = SpiceRack::new(&catalog(), None);
        for _ in 0..50 {
            assert!(rack.take("chili"));
        }
        assert_eq!(rack.usage("chili"), 50);
    }

    #[test]
    fn limited_rack_runs_out_and_restocks() {
        let mut rack = SpiceRack::new(&catalog(), Some(2));
        assert!(rack.take("sugar"));
        assert!(rack.take("sugar"));
        assert!(!rack.take("sugar"));
        assert_eq!(rack.quantity("sugar"), Some(0));
        assert_eq!(rack.usage("sugar"), 2);

        rack.restock([("sugar", 1), ("saffron", 4)]);
        assert_eq!(rack.quantity("sugar"), Some(1));
        assert_eq!(rack.quantity("saffron"), None);
    }

    #[test]
    fn unknown_key_is_ignored() {
        let mut rack = SpiceRack::new(&catalog(), None);
        assert!(!rack.take("saffron"));
        assert_eq!(rack.usage("saffron"), 0);
        assert_eq!(rack.favorite(), None);
    }

    #[test]
    fn favorite_is_most_used() {
        let mut rack = SpiceRack::new(&catalog(), None);
        rack.take("basil");
        rack.take("chili");
        rack.take("chili");
        assert_eq!(rack.favorite(), Some("chili"));
        rack.take("basil");
        rack.take("basil");
        assert_eq!(rack.favorite(), Some("basil"));
    }

    #[test]
    fn favorite_ties_go_to_first_added() {
        let mut rack = SpiceRack::new(&catalog(), None);
        rack.take("sugar");
        rack.take("chili");
        assert_eq!(rack.favorite(), Some("sugar"));
        rack.take("chili");
        rack.take("sugar");
        assert_eq!(rack.favorite(), Some("sugar"));

        let mut rack = SpiceRack::new(&catalog(), None);
        rack.take("chili");
        rack.take("basil");
        assert_eq!(rack.favorite(), Some("chili"));
    }

    #[test]
    fn refused_take_does_not_count_as_first_use() {
        let mut rack = SpiceRack::new(&catalog(), Some(0));
        assert!(!rack.take("sugar"));
        rack.restock([("sugar", 1), ("chili", 1)]);
        assert!(rack.take("chili"));
        assert!(rack.take("sugar"));
        assert_eq!(rack.favorite(), Some("chili"));
    }
}
