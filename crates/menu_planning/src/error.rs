use chrono::Weekday;
use nutrition::{FoodCategory, ValidationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanningError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("linear algebra failure: {0}")]
    LinearAlgebra(String),

    #[error("select between 1 and {max} foods, got {selected}")]
    SelectionSize { selected: usize, max: usize },

    #[error("food index {index} is out of range for a catalog of {len} foods")]
    UnknownFood { index: usize, len: usize },

    #[error("non-positive cost for food '{food}'; check the catalog")]
    DataIntegrity { food: String },

    #[error(
        "not enough foods in category {category} for {weekday}: need {needed}, found {found}"
    )]
    CategoryShortage {
        weekday: Weekday,
        category: FoodCategory,
        needed: usize,
        found: usize,
    },

    #[error(
        "no menu for {weekday} stays under {budget:.2} even with targets reduced to 70%; \
         add cheaper foods or raise the budget"
    )]
    BudgetExhaustion { weekday: Weekday, budget: f64 },

    #[error("nutrient system is underdetermined: rank {rank} < {nutrients} nutrients")]
    Underdetermined { rank: usize, nutrients: usize },
}
