//! Fixed-step open-interval quadrature with a truncated lower end.
//!
//! The extended open formula (Numerical Recipes, 3rd ed., eq. 4.1.18)
//!
//! ```text
//! ∫ f dz ≈ h [ 55/24 f_1 − 1/6 f_2 + 11/8 f_3 + f_4 + … + f_{N−3} + 11/8 f_{N−2} − 1/6 f_{N−1} + 55/24 f_N ]
//! ```
//!
//! covers `[z_1 − h, z_N + h]` without evaluating the end points, and is exact
//! for cubics.
//!
//! The lower integration bound `z₀` generally falls between grid nodes. With
//! `δ = z_1 − z₀ ∈ (0, h]` and an integrand that vanishes at `z₀` and is linear
//! near it:
//! - `δ >= h/2`: the scheme starts at `z_1 − h`, below `z₀`; add back the
//!   integral of the linear extrapolation over `[z_1 − h, z₀]`,
//!   `f_1 (h − δ)² / (2δ)`;
//! - `δ < h/2`: drop `f_1` from the scheme (which then starts at `z_1`) and add
//!   the triangle `f_1 δ / 2` over `[z₀, z_1]`.

use crate::error::StarError;

/// Minimum number of nodes for which the end weights do not overlap.
pub const MIN_OPEN_NODES: usize = 6;

/// Weights of the extended open formula for `n` nodes.
pub fn open_weights(n: usize) -> Result<Vec<f64>, StarError> {
    if n < MIN_OPEN_NODES {
        return Err(StarError::configuration(format!(
            "open quadrature needs at least {MIN_OPEN_NODES} nodes, got {n}"
        )));
    }
    let mut w = vec![1.0; n];
    w[0] = 55.0 / 24.0;
    w[n - 1] = 55.0 / 24.0;
    w[1] = -1.0 / 6.0;
    w[n - 2] = -1.0 / 6.0;
    w[2] = 11.0 / 8.0;
    w[n - 3] = 11.0 / 8.0;
    Ok(w)
}

/// How the first retained node is treated relative to the lower bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LowerBoundTreatment {
    /// Keep the first node in the scheme; add `correction`.
    Extrapolated { correction: f64 },
    /// Drop the first node from the scheme; add `correction`.
    Dropped { correction: f64 },
}

impl LowerBoundTreatment {
    pub fn correction(self) -> f64 {
        match self {
            LowerBoundTreatment::Extrapolated { correction }
            | LowerBoundTreatment::Dropped { correction } => correction,
        }
    }
}

/// Decide the lower-end correction for the first node value `f1` at distance
/// `delta` above the bound.
pub fn lower_bound_treatment(f1: f64, delta: f64, step: f64) -> LowerBoundTreatment {
    if delta >= step / 2.0 {
        LowerBoundTreatment::Extrapolated {
            correction: f1 * (step - delta).powi(2) / (2.0 * delta),
        }
    } else {
        LowerBoundTreatment::Dropped {
            correction: f1 * delta / 2.0,
        }
    }
}

/// Nodes needed before the lower-end treatment: one more when the first node
/// is dropped.
pub fn required_nodes(delta: f64, step: f64) -> usize {
    if delta >= step / 2.0 {
        MIN_OPEN_NODES
    } else {
        MIN_OPEN_NODES + 1
    }
}

/// Integrate node values `f` (ascending `z`, spacing `step`) from a lower bound
/// `delta` below the first node up to one step past the last node.
pub fn integrate_open_truncated(f: &[f64], step: f64, delta: f64) -> Result<f64, StarError> {
    if !(step.is_finite() && step > 0.0) {
        return Err(StarError::configuration(format!(
            "quadrature step must be finite and > 0, got {step}"
        )));
    }
    if !(delta > 0.0 && delta <= step * (1.0 + 1e-9)) {
        return Err(StarError::configuration(format!(
            "lower-bound offset {delta} must lie in (0, {step}]"
        )));
    }
    let Some(&first) = f.first() else {
        return Err(StarError::configuration("no quadrature nodes"));
    };
    let needed = required_nodes(delta, step);
    if f.len() < needed {
        return Err(StarError::configuration(format!(
            "open quadrature from {delta} below the first node needs at least {needed} nodes, got {}",
            f.len()
        )));
    }

    let treatment = lower_bound_treatment(first, delta, step);
    let nodes = match treatment {
        LowerBoundTreatment::Extrapolated { .. } => f,
        LowerBoundTreatment::Dropped { .. } => &f[1..],
    };
    let weights = open_weights(nodes.len())?;
    let sum: f64 = nodes.iter().zip(weights.iter()).map(|(v, w)| v * w).sum();
    Ok(step * sum + treatment.correction())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid(lo: f64, hi: f64, n: usize) -> (Vec<f64>, f64) {
        let h = (hi - lo) / n as f64;
        ((1..n).map(|k| lo + k as f64 * h).collect(), h)
    }

    #[test]
    fn weights_sum_to_interval_count() {
        let w = open_weights(10).unwrap();
        let total: f64 = w.iter().sum();
        assert!((total - 11.0).abs() < 1e-12);
        assert!(open_weights(5).is_err());
    }

    #[test]
    fn dropping_the_first_node_needs_one_more() {
        let f = [1.0; 6];
        assert!(integrate_open_truncated(&f, 0.1, 0.08).is_ok());
        let err = integrate_open_truncated(&f, 0.1, 0.02).unwrap_err();
        assert!(err.to_string().contains("at least 7 nodes, got 6"), "{err}");
        assert!(integrate_open_truncated(&[1.0; 7], 0.1, 0.02).is_ok());
    }

    #[test]
    fn exact_for_cubics_on_aligned_grid() {
        let (z, h) = open_grid(-1.0, 1.0, 20);
        let f: Vec<f64> = z.iter().map(|&x| x * x * x - 2.0 * x + 0.5).collect();
        let v = integrate_open_truncated(&f, h, h).unwrap();
        assert!((v - 1.0).abs() < 1e-12, "{v}");
    }

    #[test]
    fn linear_integrand_vanishing_at_bound_is_exact_in_both_branches() {
        let (z, h) = open_grid(-1.0, 1.0, 20);
        for &z0 in &[-0.33, -0.37, -0.41, -0.36] {
            let kept: Vec<f64> = z.iter().copied().filter(|&x| x > z0).collect();
            let delta = kept[0] - z0;
            let f: Vec<f64> = kept.iter().map(|&x| x - z0).collect();
            let v = integrate_open_truncated(&f, h, delta).unwrap();
            let expected = (1.0 - z0) * (1.0 - z0) / 2.0;
            assert!((v - expected).abs() < 1e-12, "z0={z0}: {v} vs {expected}");
        }
    }

    #[test]
    fn branch_selection_follows_half_step() {
        assert!(matches!(
            lower_bound_treatment(1.0, 0.5, 1.0),
            LowerBoundTreatment::Extrapolated { .. }
        ));
        assert!(matches!(
            lower_bound_treatment(1.0, 0.49, 1.0),
            LowerBoundTreatment::Dropped { .. }
        ));
        assert!(integrate_open_truncated(&[1.0; 8], 0.1, 0.0).is_err());
    }
}
