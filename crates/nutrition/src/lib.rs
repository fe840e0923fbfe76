//! Domain model for the diet-optimization engine: the closed nutrient and
//! category sets, validated food records and nutrient targets, and catalog
//! queries.
//!
//! Persistence of catalogs and targets is the calling application's concern;
//! this crate only validates and exposes the data as plain structures.

pub mod catalog;
pub mod error;
pub mod types;

pub use catalog::{CheapestSource, FoodCatalog, RichestSource};
pub use error::ValidationError;
pub use types::{Food, FoodCategory, Nutrient, NutrientTargets};
