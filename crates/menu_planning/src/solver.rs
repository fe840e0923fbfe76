//! Least-squares nutrient fitting, the numeric primitive behind every
//! planning path.
//!
//! Given an m×n matrix of per-unit nutrient amounts (one row per nutrient,
//! one column per food) and a length-m target vector, the solver finds the
//! quantities minimizing the Euclidean misfit, taking the minimum-norm
//! solution when the system is underdetermined, and then floors negative
//! quantities at zero.
//!
//! The clamp is a deliberate approximation, not a nonnegativity-constrained
//! solve: a floored solution can fit worse than the true NNLS optimum. The
//! planner's residual gate and the sensitivity baseline both assume exactly
//! this behavior, so it must not be "upgraded".

use crate::error::PlanningError;
use nalgebra::{DMatrix, DVector};
use nutrition::{Food, Nutrient, NutrientTargets};
use strum::IntoEnumIterator;

/// SVD solve tolerances, tried strictest first. Near-collinear nutrient
/// columns (foods with proportional profiles) can defeat the strict
/// tolerance while still admitting a usable solution.
const SOLVE_TOLERANCES: [f64; 3] = [1e-10, 1e-8, 1e-6];

/// Singular values below this count as zero when ranking the matrix.
const RANK_EPS: f64 = 1e-10;

/// Result of one least-squares fit.
#[derive(Debug, Clone)]
pub struct NutrientFit {
    /// Per-food quantities with negative components floored at zero, in the
    /// column order of the solved matrix.
    pub quantities: Vec<f64>,
    /// Numerical rank of the nutrient matrix. Rank below `min(m, n)` means
    /// the fit is underdetermined; callers surface that as a non-fatal
    /// warning (except the sensitivity baseline, which treats it as fatal).
    pub rank: usize,
    /// Residual sum of squares of the unclamped solution. Reported only for
    /// overdetermined systems with full column rank, matching the behavior
    /// the daily planner's fit gate was built against.
    pub residual: Option<f64>,
    /// Row count of the solved matrix.
    pub nutrients: usize,
}

impl NutrientFit {
    pub fn total_quantity(&self) -> f64 {
        self.quantities.iter().sum()
    }

    pub fn is_underdetermined(&self) -> bool {
        self.rank < self.nutrients.min(self.quantities.len())
    }
}

/// Build the nutrient matrix for a list of foods: rows in [`Nutrient`]
/// declaration order, one column per food in the given order.
pub fn nutrient_matrix(foods: &[&Food]) -> DMatrix<f64> {
    let nutrients: Vec<Nutrient> = Nutrient::iter().collect();
    DMatrix::from_fn(nutrients.len(), foods.len(), |row, col| {
        foods[col].nutrient(nutrients[row])
    })
}

/// Target amounts as a column vector in matrix row order.
pub fn target_vector(targets: &NutrientTargets) -> DVector<f64> {
    DVector::from_vec(targets.to_vector())
}

/// Solve `matrix · quantities ≈ target` in the least-squares sense.
///
/// Fails with [`PlanningError::LinearAlgebra`] when the SVD solve produces no
/// finite solution at any tolerance.
pub fn solve(matrix: &DMatrix<f64>, target: &DVector<f64>) -> Result<NutrientFit, PlanningError> {
    let svd = matrix.clone().svd(true, true);
    let rank = svd.rank(RANK_EPS);

    let mut raw = None;
    for &tol in &SOLVE_TOLERANCES {
        if let Ok(solution) = svd.solve(target, tol) {
            if solution.iter().all(|v| v.is_finite()) {
                raw = Some(solution);
                break;
            }
        }
    }
    let raw = raw.ok_or_else(|| {
        PlanningError::LinearAlgebra(format!(
            "SVD solve failed for a {}x{} nutrient matrix",
            matrix.nrows(),
            matrix.ncols()
        ))
    })?;

    let residual = if matrix.nrows() > matrix.ncols() && rank == matrix.ncols() {
        Some((matrix * &raw - target).norm_squared())
    } else {
        None
    };

    let quantities = raw.iter().map(|&q| q.max(0.0)).collect();
    Ok(NutrientFit {
        quantities,
        rank,
        residual,
        nutrients: matrix.nrows(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn exact_system_is_solved_exactly() {
        // Two foods each supplying one distinct nutrient.
        let matrix = DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 4.0]);
        let target = DVector::from_row_slice(&[6.0, 8.0]);

        let fit = solve(&matrix, &target).unwrap();
        assert_eq!(fit.rank, 2);
        assert_abs_diff_eq!(fit.quantities[0], 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.quantities[1], 2.0, epsilon = 1e-9);
        assert!(!fit.is_underdetermined());
    }

    #[test]
    fn underdetermined_system_yields_minimum_norm_solution() {
        // One nutrient, two foods: t = [1, 2]^T * 4 / 5 is the min-norm fit.
        let matrix = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        let target = DVector::from_row_slice(&[4.0]);

        let fit = solve(&matrix, &target).unwrap();
        assert_eq!(fit.rank, 1);
        assert_abs_diff_eq!(fit.quantities[0], 0.8, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.quantities[1], 1.6, epsilon = 1e-9);
        assert!(fit.residual.is_none());
    }

    #[test]
    fn negative_components_are_floored_at_zero() {
        // The unconstrained optimum is t = -1; the clamp floors it.
        let matrix = DMatrix::from_row_slice(2, 1, &[1.0, 1.0]);
        let target = DVector::from_row_slice(&[-1.0, -1.0]);

        let fit = solve(&matrix, &target).unwrap();
        assert_eq!(fit.quantities, vec![0.0]);

        // Clamping is idempotent: re-flooring changes nothing.
        let reclamped: Vec<f64> = fit.quantities.iter().map(|&q| q.max(0.0)).collect();
        assert_eq!(reclamped, fit.quantities);
    }

    #[test]
    fn duplicate_columns_drop_the_rank() {
        let matrix = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 2.0, 2.0]);
        let target = DVector::from_row_slice(&[3.0, 6.0]);

        let fit = solve(&matrix, &target).unwrap();
        assert_eq!(fit.rank, 1);
        assert!(fit.is_underdetermined());
    }

    #[test]
    fn overdetermined_full_rank_system_reports_residual() {
        // Three equations, two unknowns, inconsistent by design.
        let matrix = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let target = DVector::from_row_slice(&[1.0, 1.0, 1.0]);

        let fit = solve(&matrix, &target).unwrap();
        assert_eq!(fit.rank, 2);
        // Least-squares solution is (2/3, 2/3); RSS is 1/3.
        assert_abs_diff_eq!(fit.residual.unwrap(), 1.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn square_full_rank_system_reports_no_residual() {
        let matrix = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]);
        let target = DVector::from_row_slice(&[1.0, 2.0]);

        let fit = solve(&matrix, &target).unwrap();
        assert!(fit.residual.is_none());
    }

    #[test]
    fn all_zero_matrix_solves_to_zero_quantities() {
        // Degenerate but not fatal: every singular value is zero, so the
        // pseudoinverse maps the target to the zero vector.
        let matrix = DMatrix::zeros(3, 2);
        let target = DVector::from_row_slice(&[1.0, 1.0, 1.0]);

        let fit = solve(&matrix, &target).unwrap();
        assert_eq!(fit.rank, 0);
        assert_eq!(fit.quantities, vec![0.0, 0.0]);
    }
}
