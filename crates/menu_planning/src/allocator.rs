//! Single-selection planning: the user hand-picks foods in priority order
//! (1 = highest) and gets quantities sized by the nutrient fit but shaped by
//! a fixed priority table.
//!
//! The least-squares fit over the selection is used only for its scalar sum;
//! its per-food distribution is discarded and the total is redistributed by
//! rank. This makes the allocation predictable by priority at the price of a
//! looser nutrient fit, and it is preserved deliberately.

use crate::error::PlanningError;
use crate::solver;
use nutrition::{Food, FoodCategory, Nutrient, NutrientTargets, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::EnumCount;

/// Share of the total quantity assigned to each priority rank (1 = highest).
/// Ranks beyond the table fall back to [`DEFAULT_SHARE`].
const PRIORITY_SHARES: [f64; 6] = [0.30, 0.20, 0.15, 0.15, 0.10, 0.10];
const DEFAULT_SHARE: f64 = 0.10;

/// Per-food quantity bounds for a single-selection plan, in units.
const QUANTITY_MIN: f64 = 0.1;
const QUANTITY_MAX: f64 = 10.0;

/// Soft ceiling above which the plan's total cost is flagged as suspicious.
/// The plan is still returned.
const COST_CEILING: f64 = 100.0;

/// One food in a single-selection plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedItem {
    pub name: String,
    pub category: FoodCategory,
    /// Selection order; 1 = highest.
    pub priority: usize,
    pub quantity: f64,
    pub cost: f64,
}

/// Result of [`allocate`]: quantities, cost, and advisory flags the caller
/// is expected to surface to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietPlan {
    pub items: Vec<PlannedItem>,
    pub total_cost: f64,
    /// The nutrient fit had rank below `min(nutrients, foods)`; quantities
    /// are a rough guide rather than a reliable fit.
    pub underdetermined: bool,
    /// Total cost exceeded the soft ceiling.
    pub cost_excessive: bool,
}

impl DietPlan {
    /// Summed cost per category, for the caller's reporting.
    pub fn cost_by_category(&self) -> HashMap<FoodCategory, f64> {
        let mut costs: HashMap<FoodCategory, f64> = HashMap::new();
        for item in &self.items {
            *costs.entry(item.category).or_default() += item.cost;
        }
        costs
    }
}

/// The table share for a priority rank (1-based).
pub fn priority_share(priority: usize) -> f64 {
    priority
        .checked_sub(1)
        .and_then(|i| PRIORITY_SHARES.get(i).copied())
        .unwrap_or(DEFAULT_SHARE)
}

/// Spread `total` over `n` items by priority rank. The table is applied
/// literally, so the distributed sum equals `total` exactly when the shares
/// in play sum to one (the full six-rank table).
pub fn distribute_by_priority(total: f64, n: usize) -> Vec<f64> {
    (1..=n).map(|priority| total * priority_share(priority)).collect()
}

/// Plan quantities for hand-picked foods, given in priority order.
///
/// The selection size must satisfy `1 <= n <= m` where m is the number of
/// tracked nutrients; anything else fails before solving.
pub fn allocate(selection: &[Food], targets: &NutrientTargets) -> Result<DietPlan, PlanningError> {
    let m = Nutrient::COUNT;
    let n = selection.len();
    if n < 1 || n > m {
        return Err(PlanningError::SelectionSize {
            selected: n,
            max: m,
        });
    }
    if targets.is_zero() {
        return Err(ValidationError::ZeroTargets.into());
    }

    let foods: Vec<&Food> = selection.iter().collect();
    let matrix = solver::nutrient_matrix(&foods);
    let target = solver::target_vector(targets);
    let fit = solver::solve(&matrix, &target)?;

    let underdetermined = fit.is_underdetermined();
    if underdetermined {
        tracing::warn!(rank = fit.rank, foods = n, "nutrient system is underdetermined");
    }

    // Only the fit's total survives; the shape is the priority table's.
    let distributed = distribute_by_priority(fit.total_quantity(), n);

    let mut items = Vec::with_capacity(n);
    let mut total_cost = 0.0;
    for (i, food) in selection.iter().enumerate() {
        if food.cost <= 0.0 {
            return Err(PlanningError::DataIntegrity {
                food: food.name.clone(),
            });
        }
        let quantity = distributed[i].clamp(QUANTITY_MIN, QUANTITY_MAX);
        let cost = quantity * food.cost;
        total_cost += cost;
        items.push(PlannedItem {
            name: food.name.clone(),
            category: food.category,
            priority: i + 1,
            quantity,
            cost,
        });
    }

    let cost_excessive = total_cost > COST_CEILING;
    if cost_excessive {
        tracing::warn!(total_cost, ceiling = COST_CEILING, "total cost looks excessive");
    }

    Ok(DietPlan {
        items,
        total_cost,
        underdetermined,
        cost_excessive,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nutrition::Nutrient;
    use std::collections::HashMap;
    use strum::IntoEnumIterator;

    fn food(name: &str, category: FoodCategory, carbs: f64, cost: f64) -> Food {
        let mut nutrients: HashMap<Nutrient, f64> =
            Nutrient::iter().map(|n| (n, 0.0)).collect();
        nutrients.insert(Nutrient::Carbohydrates, carbs);
        Food {
            name: name.to_string(),
            category,
            nutrients,
            cost,
        }
    }

    fn carb_targets(amount: f64) -> NutrientTargets {
        let mut values: HashMap<Nutrient, f64> = Nutrient::iter().map(|n| (n, 0.0)).collect();
        values.insert(Nutrient::Carbohydrates, amount);
        NutrientTargets::new(values).unwrap()
    }

    #[test]
    fn share_table_covers_all_ranks() {
        assert_eq!(priority_share(1), 0.30);
        assert_eq!(priority_share(2), 0.20);
        assert_eq!(priority_share(3), 0.15);
        assert_eq!(priority_share(6), 0.10);
        // Ranks beyond the table default to 10%.
        assert_eq!(priority_share(7), 0.10);
    }

    #[test]
    fn full_table_distribution_conserves_the_total() {
        // The six table shares sum to one, so at full arity the
        // redistribution moves mass around without creating or losing any.
        let distributed = distribute_by_priority(12.0, 6);
        assert_abs_diff_eq!(distributed.iter().sum::<f64>(), 12.0, epsilon = 1e-12);
        assert_abs_diff_eq!(distributed[0], 3.6, epsilon = 1e-12);
    }

    #[test]
    fn empty_selection_is_rejected_before_solving() {
        let err = allocate(&[], &carb_targets(4.0)).unwrap_err();
        assert!(matches!(
            err,
            PlanningError::SelectionSize { selected: 0, max: 6 }
        ));
    }

    #[test]
    fn oversized_selection_is_rejected_before_solving() {
        let foods: Vec<Food> = (0..7)
            .map(|i| food(&format!("F{i}"), FoodCategory::Fruit, 1.0, 1.0))
            .collect();
        let err = allocate(&foods, &carb_targets(4.0)).unwrap_err();
        assert!(matches!(
            err,
            PlanningError::SelectionSize { selected: 7, max: 6 }
        ));
    }

    #[test]
    fn all_zero_targets_are_refused() {
        let foods = vec![food("A", FoodCategory::Fruit, 1.0, 1.0)];
        let err = allocate(&foods, &carb_targets(0.0)).unwrap_err();
        assert!(matches!(
            err,
            PlanningError::Validation(ValidationError::ZeroTargets)
        ));
    }

    #[test]
    fn two_food_scenario_matches_hand_computation() {
        // A supplies 1 carb unit at cost 1, B supplies 2 at cost 2; target is
        // 4 carbs. The minimum-norm fit is (0.8, 1.6), total 2.4, and the
        // priority table takes 30% and 20% of that total.
        let foods = vec![
            food("A", FoodCategory::Fruit, 1.0, 1.0),
            food("B", FoodCategory::Vegetable, 2.0, 2.0),
        ];
        let plan = allocate(&foods, &carb_targets(4.0)).unwrap();

        assert_abs_diff_eq!(plan.items[0].quantity, 0.72, epsilon = 1e-9);
        assert_abs_diff_eq!(plan.items[1].quantity, 0.48, epsilon = 1e-9);
        assert_eq!(plan.items[0].priority, 1);
        assert_eq!(plan.items[1].priority, 2);
        assert_abs_diff_eq!(plan.total_cost, 1.68, epsilon = 1e-9);
        // One nutrient row constrains two foods: rank 1 < 2.
        assert!(plan.underdetermined);
        assert!(!plan.cost_excessive);
    }

    #[test]
    fn tiny_quantities_are_raised_to_the_floor() {
        // A minuscule target makes the raw total nearly zero; every clamped
        // quantity lands on the 0.1 floor.
        let foods = vec![
            food("A", FoodCategory::Fruit, 1.0, 1.0),
            food("B", FoodCategory::Vegetable, 2.0, 2.0),
        ];
        let plan = allocate(&foods, &carb_targets(1e-6)).unwrap();
        for item in &plan.items {
            assert_abs_diff_eq!(item.quantity, 0.1, epsilon = 1e-12);
        }
    }

    #[test]
    fn excessive_cost_is_flagged_but_still_returned() {
        let foods = vec![food("Gold leaf", FoodCategory::Nuts, 1.0, 5000.0)];
        let plan = allocate(&foods, &carb_targets(4.0)).unwrap();
        assert!(plan.cost_excessive);
        assert!(plan.total_cost > 100.0);
    }

    #[test]
    fn cost_by_category_sums_item_costs() {
        let foods = vec![
            food("A", FoodCategory::Fruit, 1.0, 1.0),
            food("B", FoodCategory::Vegetable, 2.0, 2.0),
        ];
        let plan = allocate(&foods, &carb_targets(4.0)).unwrap();
        let costs = plan.cost_by_category();
        assert_abs_diff_eq!(costs[&FoodCategory::Fruit], 0.72, epsilon = 1e-9);
        assert_abs_diff_eq!(costs[&FoodCategory::Vegetable], 0.96, epsilon = 1e-9);
    }
}
