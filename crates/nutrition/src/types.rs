use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::IntoEnumIterator;

/// The tracked nutrients. Every food record and target vector covers exactly
/// this set; the enum key makes extra entries unrepresentable.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumCount,
    strum::EnumIter,
)]
pub enum Nutrient {
    Carbohydrates,
    Protein,
    Fat,
    Fiber,
    Calcium,
    Iron,
}

/// Food groupings with a required per-day count in daily planning.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumCount,
    strum::EnumIter,
)]
pub enum FoodCategory {
    Fruit,
    Vegetable,
    Legume,
    Meat,
    /// Flour and bread products.
    Grain,
    Fish,
    Nuts,
}

/// A catalog entry: per-unit nutrient amounts and a per-unit cost.
///
/// The name is a display identifier and is not guaranteed unique. Records are
/// immutable once loaded into a computation; editing happens in the calling
/// application before a catalog is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Food {
    pub name: String,
    pub category: FoodCategory,
    pub nutrients: HashMap<Nutrient, f64>,
    pub cost: f64,
}

impl Food {
    /// Per-unit amount of one nutrient. Validated foods always carry the full
    /// nutrient set, so a missing entry reads as zero.
    pub fn nutrient(&self, nutrient: Nutrient) -> f64 {
        self.nutrients.get(&nutrient).copied().unwrap_or(0.0)
    }

    /// Check the record against the catalog contract: the full nutrient set,
    /// non-negative amounts, positive cost.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for nutrient in Nutrient::iter() {
            match self.nutrients.get(&nutrient) {
                None => {
                    return Err(ValidationError::MissingNutrient {
                        food: self.name.clone(),
                        nutrient,
                    })
                }
                Some(amount) if *amount < 0.0 => {
                    return Err(ValidationError::NegativeNutrient {
                        food: self.name.clone(),
                        nutrient,
                    })
                }
                Some(_) => {}
            }
        }
        if self.cost <= 0.0 {
            return Err(ValidationError::NonPositiveCost {
                food: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// Desired per-period intake for each tracked nutrient.
///
/// One instance is process-wide configuration owned by the calling
/// application; the engine only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutrientTargets {
    values: HashMap<Nutrient, f64>,
}

impl NutrientTargets {
    /// Build a target vector, requiring a non-negative value for every
    /// nutrient. An all-zero vector is accepted here (it is the initial state
    /// of a fresh installation); the planning entry points reject it.
    pub fn new(values: HashMap<Nutrient, f64>) -> Result<Self, ValidationError> {
        for nutrient in Nutrient::iter() {
            match values.get(&nutrient) {
                None => return Err(ValidationError::MissingTarget { nutrient }),
                Some(value) if *value < 0.0 => {
                    return Err(ValidationError::NegativeTarget { nutrient })
                }
                Some(_) => {}
            }
        }
        Ok(NutrientTargets { values })
    }

    pub fn get(&self, nutrient: Nutrient) -> f64 {
        self.values.get(&nutrient).copied().unwrap_or(0.0)
    }

    /// Target amounts in declaration order of [`Nutrient`], the row order of
    /// every nutrient matrix in the engine.
    pub fn to_vector(&self) -> Vec<f64> {
        Nutrient::iter().map(|nutrient| self.get(nutrient)).collect()
    }

    pub fn is_zero(&self) -> bool {
        Nutrient::iter().all(|nutrient| self.get(nutrient) == 0.0)
    }
}
