//! Diet-optimization engine: plans food quantities that approximately satisfy
//! nutrient targets under cost and category constraints.
//!
//! Four independent call paths share one numeric primitive, the least-squares
//! nutrient solver in [`solver`]:
//!
//! - [`allocator`] — single-selection planning for hand-picked foods, with
//!   quantities redistributed by priority rank.
//! - [`planner`] / [`weekly`] — category-constrained daily menus with
//!   target-scale relaxation, driven Monday through Sunday.
//! - [`sensitivity`] — perturbation analysis of how one food's nutrient data
//!   moves its own quantity and the total cost.
//!
//! The engine performs no I/O and no rendering; catalogs and targets come in
//! as validated data from the calling application, and menus and reports go
//! back out as plain structures.

pub mod allocator;
pub mod error;
pub mod planner;
pub mod sensitivity;
pub mod solver;
pub mod weekly;

pub use allocator::{allocate, DietPlan, PlannedItem};
pub use error::PlanningError;
pub use planner::{plan_day, CategoryRequirements, DailyMenu, MenuItem, DAILY_BUDGET};
pub use sensitivity::{
    analyze, Delta, FoodSensitivity, PerturbationDistribution, SensitivityReport,
};
pub use solver::{nutrient_matrix, solve, target_vector, NutrientFit};
pub use weekly::{plan_week, WeeklyMenu, WEEK};
