//! Mean-squared error between target and actual pairwise distances, with its analytic gradient.
//!
//! For every ordered pair `(i, j)` (the diagonal included):
//!
//! ```text
//! s_ij = |c_j - c_i|^2
//! a_ij = sqrt(s_ij + max_k(s_ik) * damping)
//! cost = mean((a_ij - D_ij)^2)
//! ```
//!
//! The row maximum in the damping term is treated as a constant when differentiating. Without the
//! damping term `a_ij` would be `0` for every coincident pair and `d sqrt(x)/dx` would blow up.

use crate::matrix::DistanceMatrix;
use nalgebra as na;

pub const DEFAULT_DAMPING: f64 = 1e-10;

#[derive(Debug, Clone)]
pub struct Evaluation {
    pub cost: f64,
    /// Gradient of `cost` w.r.t. every coordinate, laid out like the coordinate vector.
    pub gradient: na::DVector<f64>,
}

/// Actual pairwise distances for the current coordinates, damped row by row.
pub fn actual_distances(coords: &na::DVector<f64>, damping: f64) -> na::DMatrix<f64> {
    let n = coords.len() / 2;
    let mut dist = na::DMatrix::<f64>::zeros(n, n);
    for i in 0..n {
        let (xi, yi) = (coords[2 * i], coords[2 * i + 1]);
        let mut row_max = 0.0f64;
        for j in 0..n {
            let dx = coords[2 * j] - xi;
            let dy = coords[2 * j + 1] - yi;
            let sq = dx * dx + dy * dy;
            dist[(i, j)] = sq;
            row_max = row_max.max(sq);
        }
        let offset = row_max * damping;
        for j in 0..n {
            dist[(i, j)] = (dist[(i, j)] + offset).sqrt();
        }
    }
    dist
}

pub fn evaluate(coords: &na::DVector<f64>, desired: &DistanceMatrix, damping: f64) -> Evaluation {
    let n = desired.len();
    debug_assert_eq!(coords.len(), n * 2);

    let mut gradient = na::DVector::<f64>::zeros(coords.len());
    if n == 0 {
        return Evaluation { cost: 0.0, gradient };
    }

    let actual = actual_distances(coords, damping);
    let scale = 1.0 / (n * n) as f64;

    let mut cost = 0.0f64;
    for i in 0..n {
        let (xi, yi) = (coords[2 * i], coords[2 * i + 1]);
        for j in 0..n {
            let a = actual[(i, j)];
            let residual = a - desired.get(i, j);
            cost += residual * residual;

            // A zero distance only happens when the whole row collapsed onto `c_i`, in which case
            // the displacement below is zero as well.
            if i == j || a == 0.0 {
                continue;
            }
            // d cost / d s_ij, then d s_ij / d c_j = 2 (c_j - c_i).
            let g = 2.0 * residual * scale / a;
            let dx = g * (coords[2 * j] - xi);
            let dy = g * (coords[2 * j + 1] - yi);
            gradient[2 * j] += dx;
            gradient[2 * j + 1] += dy;
            gradient[2 * i] -= dx;
            gradient[2 * i + 1] -= dy;
        }
    }

    Evaluation {
        cost: cost * scale,
        gradient,
    }
}

#[cfg(test)]
mod tests {
    use super::{actual_distances, evaluate};
    use crate::matrix::DistanceMatrix;
    use nalgebra as na;

    fn desired(rows: &[&[f64]]) -> DistanceMatrix {
        let n = rows.len();
        DistanceMatrix::from_matrix(na::DMatrix::from_fn(n, n, |i, j| rows[i][j])).unwrap()
    }

    #[test]
    fn actual_distances_match_euclidean_without_damping() {
        let coords = na::DVector::from_vec(vec![0.0, 0.0, 3.0, 4.0]);
        let d = actual_distances(&coords, 0.0);
        assert_eq!(d[(0, 1)], 5.0);
        assert_eq!(d[(1, 0)], 5.0);
        assert_eq!(d[(0, 0)], 0.0);
    }

    #[test]
    fn damping_scales_with_row_maximum() {
        let coords = na::DVector::from_vec(vec![0.0, 0.0, 3.0, 4.0]);
        let d = actual_distances(&coords, 1e-2);
        // Row max of squared distances is 25.
        assert!((d[(0, 0)] - 0.5).abs() < 1e-12);
        assert!((d[(0, 1)] - (25.25f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn cost_is_mean_over_all_entries() {
        let coords = na::DVector::from_vec(vec![0.0, 0.0, 1.0, 0.0]);
        let target = desired(&[&[0.0, 3.0], &[3.0, 0.0]]);
        let eval = evaluate(&coords, &target, 0.0);
        // Two off-diagonal residuals of -2, two diagonal residuals of 0.
        assert!((eval.cost - 2.0).abs() < 1e-12);
    }

    #[test]
    fn gradient_matches_central_differences() {
        let coords = na::DVector::from_vec(vec![0.3, -1.2, 1.7, 0.4, -0.8, 0.9, 0.1, 2.2]);
        let target = desired(&[
            &[0.0, 1.0, 2.0, 0.5],
            &[1.5, 0.0, 0.7, 2.0],
            &[2.0, 0.7, 0.0, 1.1],
            &[0.4, 3.0, 1.1, 0.0],
        ]);
        let damping = 1e-8;
        let eval = evaluate(&coords, &target, damping);

        // The damping offset is held constant in the analytic gradient; with damping this small
        // its derivative is far below the finite-difference tolerance.
        let h = 1e-6;
        for k in 0..coords.len() {
            let mut plus = coords.clone();
            plus[k] += h;
            let mut minus = coords.clone();
            minus[k] -= h;
            let fd = (evaluate(&plus, &target, damping).cost
                - evaluate(&minus, &target, damping).cost)
                / (2.0 * h);
            assert!(
                (fd - eval.gradient[k]).abs() < 1e-5,
                "coordinate {k}: analytic {} vs numeric {fd}",
                eval.gradient[k]
            );
        }
    }

    #[test]
    fn single_point_is_well_defined() {
        let coords = na::DVector::from_vec(vec![0.25, -0.5]);
        let target = desired(&[&[0.0]]);
        let eval = evaluate(&coords, &target, 1e-10);
        assert_eq!(eval.cost, 0.0);
        assert_eq!(eval.gradient.as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn coincident_points_have_finite_gradient() {
        let coords = na::DVector::from_vec(vec![1.0, 1.0, 1.0, 1.0, 2.0, 1.0]);
        let target = desired(&[&[0.0, 1.0, 1.0], &[1.0, 0.0, 1.0], &[1.0, 1.0, 0.0]]);
        let eval = evaluate(&coords, &target, 1e-10);
        assert!(eval.cost.is_finite());
        assert!(eval.gradient.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn fully_collapsed_layout_does_not_divide_by_zero() {
        let coords = na::DVector::from_vec(vec![0.0; 6]);
        let target = desired(&[&[0.0, 1.0, 1.0], &[1.0, 0.0, 1.0], &[1.0, 1.0, 0.0]]);
        let eval = evaluate(&coords, &target, 1e-10);
        assert!(eval.cost.is_finite());
        assert!(eval.gradient.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn non_finite_targets_propagate_into_the_cost() {
        let coords = na::DVector::from_vec(vec![0.0, 0.0, 1.0, 0.0]);
        let target = desired(&[&[0.0, f64::INFINITY], &[1.0, 0.0]]);
        let eval = evaluate(&coords, &target, 1e-10);
        assert!(!eval.cost.is_finite());
    }

    #[test]
    fn empty_input_has_zero_cost() {
        let coords = na::DVector::<f64>::zeros(0);
        let target = DistanceMatrix::from_matrix(na::DMatrix::zeros(0, 0)).unwrap();
        let eval = evaluate(&coords, &target, 1e-10);
        assert_eq!(eval.cost, 0.0);
        assert!(eval.gradient.is_empty());
    }
}
