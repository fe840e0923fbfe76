//! Weekly orchestration: run the daily planner Monday through Sunday,
//! discouraging repeats by tracking every food consumed so far. Any failed
//! day aborts the whole run; there is no partial-week result.

use crate::error::PlanningError;
use crate::planner::{self, DailyMenu};
use chrono::Weekday;
use nutrition::{FoodCatalog, FoodCategory, NutrientTargets, ValidationError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use strum::IntoEnumIterator;

/// The planning week, in order.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Seven accepted daily menus and their aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyMenu {
    /// Monday through Sunday.
    pub days: Vec<DailyMenu>,
    /// Every catalog index consumed during the week, including foods pulled
    /// in again through the in-day shortage fallback.
    pub used_food_indices: HashSet<usize>,
    pub total_cost: f64,
}

impl WeeklyMenu {
    /// Summed cost per category across the whole week.
    pub fn cost_by_category(&self, catalog: &FoodCatalog) -> HashMap<FoodCategory, f64> {
        let mut costs: HashMap<FoodCategory, f64> = HashMap::new();
        for day in &self.days {
            for item in &day.items {
                let category = catalog.foods()[item.food_index].category;
                *costs.entry(category).or_default() += item.cost;
            }
        }
        costs
    }

    /// Cost per category and day: rows follow [`FoodCategory`] declaration
    /// order, columns follow [`WEEK`]. Raw material for the caller's
    /// heatmap-style reporting.
    pub fn category_day_costs(&self, catalog: &FoodCatalog) -> Vec<Vec<f64>> {
        let categories: Vec<FoodCategory> = FoodCategory::iter().collect();
        let mut matrix = vec![vec![0.0; self.days.len()]; categories.len()];
        for (day_index, day) in self.days.iter().enumerate() {
            for item in &day.items {
                let category = catalog.foods()[item.food_index].category;
                let row = categories
                    .iter()
                    .position(|c| *c == category)
                    .unwrap_or_default();
                matrix[row][day_index] += item.cost;
            }
        }
        matrix
    }
}

/// Plan a full week against `targets` and a per-day `budget`.
///
/// Passing a seed makes the run reproducible; without one the seed is drawn
/// from the clock.
pub fn plan_week(
    catalog: &FoodCatalog,
    targets: &NutrientTargets,
    budget: f64,
    seed: Option<u64>,
) -> Result<WeeklyMenu, PlanningError> {
    if catalog.is_empty() {
        return Err(ValidationError::EmptyCatalog.into());
    }
    if targets.is_zero() {
        return Err(ValidationError::ZeroTargets.into());
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => {
            use std::time::{SystemTime, UNIX_EPOCH};
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            StdRng::seed_from_u64(now)
        }
    };

    let by_category = catalog.by_category();
    let mut used: HashSet<usize> = HashSet::new();
    let mut days = Vec::with_capacity(WEEK.len());
    let mut total_cost = 0.0;

    for weekday in WEEK {
        let day = planner::plan_day(
            catalog,
            &by_category,
            &used,
            targets,
            weekday,
            budget,
            &mut rng,
        )?;
        tracing::debug!(%weekday, cost = day.total_cost, scale = day.scale, "day accepted");
        used.extend(day.items.iter().map(|item| item.food_index));
        total_cost += day.total_cost;
        days.push(day);
    }

    Ok(WeeklyMenu {
        days,
        used_food_indices: used,
        total_cost,
    })
}
