use crate::error::ValidationError;
use crate::types::{Food, FoodCategory, Nutrient};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::IntoEnumIterator;

/// A validated, immutable collection of food records.
///
/// Construction checks every record against the catalog contract, so the
/// planning code can assume complete nutrient sets and positive costs.
/// Foods are addressed by their index in the catalog; names are display
/// labels and may repeat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodCatalog {
    foods: Vec<Food>,
}

/// Foods attaining the maximum per-unit amount of one nutrient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichestSource {
    pub nutrient: Nutrient,
    pub amount: f64,
    /// `(name, cost)` for every food reaching `amount`.
    pub foods: Vec<(String, f64)>,
}

/// Cheapest way to buy one unit of a nutrient, if any food supplies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheapestSource {
    pub nutrient: Nutrient,
    /// `(name, cost per nutrient unit)`; `None` when no food in the catalog
    /// carries a positive amount of the nutrient.
    pub food: Option<(String, f64)>,
}

impl FoodCatalog {
    /// Validate and wrap a list of foods. An empty catalog is allowed here;
    /// the planning entry points reject it.
    pub fn new(foods: Vec<Food>) -> Result<Self, ValidationError> {
        for food in &foods {
            food.validate()?;
        }
        Ok(FoodCatalog { foods })
    }

    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    /// Catalog indices grouped by category, in catalog order. Categories with
    /// no foods are absent from the map.
    pub fn by_category(&self) -> HashMap<FoodCategory, Vec<usize>> {
        let mut groups: HashMap<FoodCategory, Vec<usize>> = HashMap::new();
        for (index, food) in self.foods.iter().enumerate() {
            groups.entry(food.category).or_default().push(index);
        }
        groups
    }

    /// For each nutrient, the foods with the highest per-unit amount and
    /// their costs. Empty when the catalog is empty.
    pub fn richest_sources(&self) -> Vec<RichestSource> {
        if self.foods.is_empty() {
            return Vec::new();
        }
        Nutrient::iter()
            .map(|nutrient| {
                let amount = self
                    .foods
                    .iter()
                    .map(|food| food.nutrient(nutrient))
                    .fold(f64::NEG_INFINITY, f64::max);
                let foods = self
                    .foods
                    .iter()
                    .filter(|food| food.nutrient(nutrient) == amount)
                    .map(|food| (food.name.clone(), food.cost))
                    .collect();
                RichestSource {
                    nutrient,
                    amount,
                    foods,
                }
            })
            .collect()
    }

    /// For each nutrient, the food with the lowest cost per nutrient unit.
    /// Foods with a zero amount of the nutrient are skipped to avoid division
    /// by zero; a nutrient supplied by no food yields `None`.
    pub fn cheapest_sources(&self) -> Vec<CheapestSource> {
        Nutrient::iter()
            .map(|nutrient| {
                let food = self
                    .foods
                    .iter()
                    .filter(|food| food.nutrient(nutrient) > 0.0)
                    .map(|food| (food.name.clone(), food.cost / food.nutrient(nutrient)))
                    .min_by(|a, b| a.1.total_cmp(&b.1));
                CheapestSource { nutrient, food }
            })
            .collect()
    }
}
