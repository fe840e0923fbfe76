//! Daily menu planning: pick a category-constrained set of foods at random,
//! fit quantities to the nutrient target, and relax the target until the day
//! fits the budget or the relaxation floor is reached.

use crate::error::PlanningError;
use crate::solver;
use chrono::Weekday;
use nalgebra::DVector;
use nutrition::{FoodCatalog, FoodCategory, NutrientTargets};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use strum::IntoEnumIterator;

/// Default maximum cost for one day's menu, in currency units.
pub const DAILY_BUDGET: f64 = 20.0;

/// Target relaxation: scale runs 1.0, 0.95, … down to the floor of 0.70,
/// giving at most seven attempts per day.
const SCALE_STEP: f64 = 0.05;
const SCALE_STEPS: usize = 6;

/// Per-food quantity bounds for a daily menu, in units.
const QUANTITY_MIN: f64 = 0.1;
const QUANTITY_MAX: f64 = 20.0;

/// A fit is rejected when its residual exceeds this fraction of the summed
/// scaled target.
const RESIDUAL_LIMIT_RATIO: f64 = 0.5;

/// Fish replaces meat on these weekdays.
const FISH_DAYS: [Weekday; 2] = [Weekday::Wed, Weekday::Sun];

/// How many foods of each category one day's menu must contain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRequirements {
    counts: HashMap<FoodCategory, usize>,
}

impl CategoryRequirements {
    /// The base table, with meat and fish swapped on fish days.
    pub fn for_weekday(weekday: Weekday) -> Self {
        let fish_day = FISH_DAYS.contains(&weekday);
        let counts = HashMap::from([
            (FoodCategory::Fruit, 1),
            (FoodCategory::Vegetable, 2),
            (FoodCategory::Legume, 1),
            (FoodCategory::Meat, usize::from(!fish_day)),
            (FoodCategory::Grain, 1),
            (FoodCategory::Fish, usize::from(fish_day)),
            (FoodCategory::Nuts, 1),
        ]);
        CategoryRequirements { counts }
    }

    pub fn required(&self, category: FoodCategory) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    /// Total number of foods a conforming day contains.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// One food on a daily menu, addressed by catalog index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub food_index: usize,
    pub quantity: f64,
    pub cost: f64,
}

/// A planned day. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyMenu {
    pub weekday: Weekday,
    /// In category pick order.
    pub items: Vec<MenuItem>,
    pub total_cost: f64,
    /// Fraction of the nutrient target this day actually pursues, one of
    /// {1.0, 0.95, …, 0.70}.
    pub scale: f64,
}

/// Plan one day's menu.
///
/// `week_used` holds catalog indices already consumed earlier in the week;
/// they are avoided while the category pools allow it. The selection is
/// redrawn on every relaxation attempt.
pub fn plan_day(
    catalog: &FoodCatalog,
    by_category: &HashMap<FoodCategory, Vec<usize>>,
    week_used: &HashSet<usize>,
    targets: &NutrientTargets,
    weekday: Weekday,
    budget: f64,
    rng: &mut StdRng,
) -> Result<DailyMenu, PlanningError> {
    let requirements = CategoryRequirements::for_weekday(weekday);
    let base_target = targets.to_vector();

    for step in 0..=SCALE_STEPS {
        let scale = 1.0 - SCALE_STEP * step as f64;
        let picks = select_for_day(by_category, week_used, &requirements, weekday, rng)?;

        let foods: Vec<&nutrition::Food> =
            picks.iter().map(|&index| &catalog.foods()[index]).collect();
        let matrix = solver::nutrient_matrix(&foods);
        let target = DVector::from_iterator(
            base_target.len(),
            base_target.iter().map(|value| value * scale),
        );
        let fit = solver::solve(&matrix, &target)?;

        // Poor fit: pursue a smaller fraction of the target and redraw.
        if let Some(residual) = fit.residual {
            let limit = target.iter().sum::<f64>() * RESIDUAL_LIMIT_RATIO;
            if residual > limit {
                tracing::debug!(%weekday, scale, residual, "fit too poor, relaxing target");
                continue;
            }
        }

        let mut items = Vec::with_capacity(picks.len());
        let mut total_cost = 0.0;
        for (&index, &raw_quantity) in picks.iter().zip(&fit.quantities) {
            let food = &catalog.foods()[index];
            if food.cost <= 0.0 {
                return Err(PlanningError::DataIntegrity {
                    food: food.name.clone(),
                });
            }
            let quantity = raw_quantity.clamp(QUANTITY_MIN, QUANTITY_MAX);
            let cost = quantity * food.cost;
            total_cost += cost;
            items.push(MenuItem {
                food_index: index,
                quantity,
                cost,
            });
        }

        if total_cost <= budget {
            return Ok(DailyMenu {
                weekday,
                items,
                total_cost,
                scale,
            });
        }
        tracing::debug!(%weekday, scale, total_cost, budget, "over budget, relaxing target");
    }

    Err(PlanningError::BudgetExhaustion { weekday, budget })
}

/// Draw the required number of foods per category, preferring foods untouched
/// this week and falling back to any food in the category not already picked
/// today. A category that cannot be filled even with week-repeats is a
/// terminal shortage, not something scale relaxation can fix.
fn select_for_day(
    by_category: &HashMap<FoodCategory, Vec<usize>>,
    week_used: &HashSet<usize>,
    requirements: &CategoryRequirements,
    weekday: Weekday,
    rng: &mut StdRng,
) -> Result<Vec<usize>, PlanningError> {
    let mut picked: HashSet<usize> = HashSet::new();
    let mut picks = Vec::with_capacity(requirements.total());

    for category in FoodCategory::iter() {
        let needed = requirements.required(category);
        if needed == 0 {
            continue;
        }
        let indices = by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let mut pool: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|index| !week_used.contains(index) && !picked.contains(index))
            .collect();
        if pool.len() < needed {
            // Allow week-repeats, but never the same food twice in one day.
            pool = indices
                .iter()
                .copied()
                .filter(|index| !picked.contains(index))
                .collect();
        }
        if pool.len() < needed {
            return Err(PlanningError::CategoryShortage {
                weekday,
                category,
                needed,
                found: pool.len(),
            });
        }

        pool.shuffle(rng);
        for &index in pool.iter().take(needed) {
            picked.insert(index);
            picks.push(index);
        }
    }

    Ok(picks)
}
