//! What-if analysis: jitter one food's nutrient data and measure how much
//! its own quantity and the total cost move, averaged over repeated trials.

use crate::error::PlanningError;
use crate::solver;
use nutrition::{Food, FoodCatalog, Nutrient, NutrientTargets, ValidationError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use strum::EnumCount;

/// Trials per analyzed food.
pub const TRIALS: usize = 10;

/// Multiplicative perturbation bounds (±5%).
const FACTOR_MIN: f64 = 0.95;
const FACTOR_MAX: f64 = 1.05;

/// Standard deviation of the normal perturbation; roughly ±5% at two sigma.
const NORMAL_STD_DEV: f64 = 0.015;

/// How perturbation factors are drawn, one per nutrient row per trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerturbationDistribution {
    /// Uniform over [0.95, 1.05].
    Uniform,
    /// Normal(1.0, 0.015), clipped to [0.95, 1.05].
    Normal,
}

impl PerturbationDistribution {
    fn sampler(self) -> impl FnMut(&mut StdRng) -> f64 {
        let normal =
            Normal::new(1.0, NORMAL_STD_DEV).expect("constant distribution parameters are valid");
        move |rng: &mut StdRng| match self {
            PerturbationDistribution::Uniform => rng.random_range(FACTOR_MIN..=FACTOR_MAX),
            PerturbationDistribution::Normal => {
                normal.sample(rng).clamp(FACTOR_MIN, FACTOR_MAX)
            }
        }
    }
}

/// An averaged effect, relative where the baseline allows it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Delta {
    /// Averaged absolute change as a percentage of the baseline value.
    Percent(f64),
    /// Averaged absolute change, unscaled; used when the baseline value is
    /// exactly zero and a percentage would be undefined.
    Absolute(f64),
}

/// Averaged perturbation effects for one analyzed food.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodSensitivity {
    pub food_index: usize,
    pub name: String,
    /// Effect on the food's own planned quantity.
    pub quantity_effect: Delta,
    /// Effect on the total cost across the whole catalog.
    pub cost_effect: Delta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub distribution: PerturbationDistribution,
    pub entries: Vec<FoodSensitivity>,
}

/// Run the analysis for `food_indices` over the full catalog.
///
/// The baseline fit must have full row rank; an underdetermined baseline
/// would make every delta meaningless, so it aborts the analysis instead of
/// being surfaced as a warning.
pub fn analyze(
    catalog: &FoodCatalog,
    targets: &NutrientTargets,
    food_indices: &[usize],
    distribution: PerturbationDistribution,
    seed: Option<u64>,
) -> Result<SensitivityReport, PlanningError> {
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
    let entries =
        analyze_with_sampler(catalog, targets, food_indices, distribution.sampler(), &mut rng)?;
    Ok(SensitivityReport {
        distribution,
        entries,
    })
}

/// The analysis with an explicit factor source, so callers (and tests) can
/// control the perturbation deterministically.
pub fn analyze_with_sampler(
    catalog: &FoodCatalog,
    targets: &NutrientTargets,
    food_indices: &[usize],
    mut sample: impl FnMut(&mut StdRng) -> f64,
    rng: &mut StdRng,
) -> Result<Vec<FoodSensitivity>, PlanningError> {
    if catalog.is_empty() {
        return Err(ValidationError::EmptyCatalog.into());
    }
    if targets.is_zero() {
        return Err(ValidationError::ZeroTargets.into());
    }
    if let Some(&index) = food_indices.iter().find(|&&i| i >= catalog.len()) {
        return Err(PlanningError::UnknownFood {
            index,
            len: catalog.len(),
        });
    }

    let m = Nutrient::COUNT;
    let foods: Vec<&Food> = catalog.foods().iter().collect();
    let matrix = solver::nutrient_matrix(&foods);
    let target = solver::target_vector(targets);

    let baseline = solver::solve(&matrix, &target)?;
    if baseline.rank < m {
        return Err(PlanningError::Underdetermined {
            rank: baseline.rank,
            nutrients: m,
        });
    }
    let base_cost = total_cost(catalog, &baseline.quantities);

    let mut entries = Vec::with_capacity(food_indices.len());
    for &index in food_indices {
        let mut quantity_delta_sum = 0.0;
        let mut cost_delta_sum = 0.0;

        for _ in 0..TRIALS {
            let mut perturbed = matrix.clone();
            for row in 0..m {
                perturbed[(row, index)] *= sample(rng);
            }
            let fit = solver::solve(&perturbed, &target)?;
            quantity_delta_sum += (fit.quantities[index] - baseline.quantities[index]).abs();
            cost_delta_sum += (total_cost(catalog, &fit.quantities) - base_cost).abs();
        }

        let avg_quantity_delta = quantity_delta_sum / TRIALS as f64;
        let avg_cost_delta = cost_delta_sum / TRIALS as f64;

        entries.push(FoodSensitivity {
            food_index: index,
            name: catalog.foods()[index].name.clone(),
            quantity_effect: relative_to(avg_quantity_delta, baseline.quantities[index]),
            cost_effect: relative_to(avg_cost_delta, base_cost),
        });
    }
    Ok(entries)
}

fn relative_to(delta: f64, baseline: f64) -> Delta {
    if baseline > 0.0 {
        Delta::Percent(delta / baseline * 100.0)
    } else {
        Delta::Absolute(delta)
    }
}

fn total_cost(catalog: &FoodCatalog, quantities: &[f64]) -> f64 {
    catalog
        .foods()
        .iter()
        .zip(quantities)
        .map(|(food, quantity)| quantity * food.cost)
        .sum()
}
