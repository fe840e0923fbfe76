use crate::types::Nutrient;
use thiserror::Error;

/// Input validation failures. These are fatal and must surface before any
/// computation starts.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("food '{food}' is missing a value for nutrient {nutrient}")]
    MissingNutrient { food: String, nutrient: Nutrient },

    #[error("food '{food}' has a negative amount of {nutrient}")]
    NegativeNutrient { food: String, nutrient: Nutrient },

    #[error("cost for food '{food}' must be positive")]
    NonPositiveCost { food: String },

    #[error("no target value provided for nutrient {nutrient}")]
    MissingTarget { nutrient: Nutrient },

    #[error("target for nutrient {nutrient} must be non-negative")]
    NegativeTarget { nutrient: Nutrient },

    #[error("nutrient targets are all zero; set targets before planning")]
    ZeroTargets,

    #[error("the food catalog is empty")]
    EmptyCatalog,
}
