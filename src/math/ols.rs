//! Least squares via the SVD pseudo-inverse.
//!
//! Every limb-darkening fit solves
//!
//! ```text
//! minimize Σ (I_i - x_i^T c)^2
//! ```
//!
//! against the same design matrix, so the solution operator `X⁺` is computed
//! once per partition and each fit reduces to a matrix-vector product.
//!
//! Implementation choices:
//! - SVD handles tall, block-diagonal designs whose blocks may be rank
//!   deficient (an interval with fewer than five distinct samples); the
//!   pseudo-inverse then yields the minimum-norm solution for that block.
//! - Singular values are cut relative to the largest one.

use nalgebra::DMatrix;

/// Compute the least-squares solution operator `X⁺` of a design matrix.
///
/// Returns `None` if no tolerance yields a finite operator.
pub fn least_squares_operator(x: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return None;
    }
    let svd = x.clone().svd(true, true);
    let s_max = svd.singular_values.max();
    if !(s_max.is_finite() && s_max > 0.0) {
        return None;
    }

    // Try progressively looser cut-offs if the strict one leaves non-finite entries.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(pinv) = svd.clone().pseudo_inverse(tol * s_max) {
            if pinv.iter().all(|v| v.is_finite()) {
                return Some(pinv);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    #[test]
    fn operator_recovers_a_quadratic_profile() {
        // I(mu) = 0.4 + 0.5 mu + 0.1 mu², sampled at five angles.
        let mu: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];
        let x = DMatrix::from_fn(mu.len(), 3, |r, c| mu[r].powi(c as i32));
        let y = DVector::from_iterator(mu.len(), mu.iter().map(|m| 0.4 + 0.5 * m + 0.1 * m * m));

        let c = least_squares_operator(&x).unwrap() * y;
        assert!((c[0] - 0.4).abs() < 1e-12);
        assert!((c[1] - 0.5).abs() < 1e-12);
        assert!((c[2] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn rank_deficient_block_gets_minimum_norm_solution() {
        // Two identical columns: any split of the slope is a solution; the
        // minimum-norm one shares it equally.
        let x = DMatrix::from_row_slice(3, 2, &[0.0, 0.0, 1.0, 1.0, 2.0, 2.0]);
        let y = DVector::from_row_slice(&[0.0, 2.0, 4.0]);

        let beta = least_squares_operator(&x).unwrap() * y;
        assert!((beta[0] - 1.0).abs() < 1e-10);
        assert!((beta[1] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn empty_or_zero_designs_have_no_operator() {
        assert!(least_squares_operator(&DMatrix::<f64>::zeros(0, 3)).is_none());
        assert!(least_squares_operator(&DMatrix::<f64>::zeros(4, 2)).is_none());
    }
}
