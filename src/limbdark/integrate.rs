//! Analytic azimuthal integration of the fit basis.
//!
//! At one height of the star the cosine of the viewing angle varies with the
//! azimuth as `mu(phi) = a cos(phi) + b`. For every interval of the partition
//! and every basis function `x^k` we need
//!
//! ```text
//! 2 ∫ mu · x^k |_(x = mu(phi)) dphi
//! ```
//!
//! over the part of `phi ∈ [0, pi]` where `mu` falls inside the interval and
//! the visible range. The factor 2 accounts for the mirror half `[-pi, 0]`.
//!
//! `mu` decreases with `phi`, so the upper `mu` bound of an interval maps to
//! its lower `phi` bound.

use std::f64::consts::PI;

use rayon::prelude::*;

use crate::error::StarError;
use crate::limbdark::partition::IntervalPartition;
use crate::math::{BASIS_LEN, projected_antiderivatives};

/// Tolerance on `b > 1` for a face-on height (`a = 0`).
const UNIT_SLACK: f64 = 1e-9;

/// Per-interval integrals of the basis, `m` rows of 5.
#[derive(Debug, Clone, PartialEq)]
pub struct AngularIntegrals {
    values: Vec<[f64; BASIS_LEN]>,
}

impl AngularIntegrals {
    fn zeros(m: usize) -> Self {
        Self {
            values: vec![[0.0; BASIS_LEN]; m],
        }
    }

    pub fn interval(&self, i: usize) -> Option<&[f64; BASIS_LEN]> {
        self.values.get(i)
    }

    pub fn as_slice(&self) -> &[[f64; BASIS_LEN]] {
        &self.values
    }

    /// `Σ coefficients · integrals`: the integrated intensity of one fit.
    pub fn contract(&self, coefficients: &[f64]) -> f64 {
        self.values
            .iter()
            .flatten()
            .zip(coefficients)
            .map(|(v, c)| v * c)
            .sum()
    }
}

impl IntervalPartition {
    /// Integrate the basis over the azimuth for `mu = a cos(phi) + b`.
    ///
    /// With `lower_bound_active` the limb crosses this height and only
    /// `mu >= 0` is visible; otherwise the whole ring is, down to
    /// `mu = b − a`. The partition covers `[0, 1]` only, so a ring reaching
    /// below `mu = 0` is clipped there either way and the two modes agree.
    pub fn integrate(
        &self,
        a: f64,
        b: f64,
        lower_bound_active: bool,
    ) -> Result<AngularIntegrals, StarError> {
        if !(a.is_finite() && b.is_finite()) {
            return Err(StarError::domain(format!(
                "angle coefficients must be finite, got a = {a}, b = {b}"
            )));
        }
        if a < 0.0 {
            return Err(StarError::domain(format!(
                "angle coefficient a = {a} must be >= 0"
            )));
        }

        let mut out = AngularIntegrals::zeros(self.interval_count());

        if a == 0.0 {
            if b <= 0.0 {
                return Ok(out);
            }
            if b > 1.0 + UNIT_SLACK {
                return Err(StarError::domain(format!(
                    "mu = b = {b} exceeds 1 on a face-on ring"
                )));
            }
            let Some(i) = self.interval_of(b.min(1.0)) else {
                return Err(StarError::domain(format!("mu = b = {b} is outside [0, 1]")));
            };
            let f = projected_antiderivatives(PI, 0.0, b);
            for (dst, v) in out.values[i].iter_mut().zip(f) {
                *dst = 2.0 * v;
            }
            return Ok(out);
        }

        let phi_of = |mu: f64| ((mu - b) / a).clamp(-1.0, 1.0).acos();

        let (mu_lo, phi_max) = if lower_bound_active {
            (0.0, phi_of(0.0))
        } else {
            (b - a, PI)
        };
        let mu_hi = a + b;

        for (i, &(lo, hi)) in self.intervals().iter().enumerate() {
            let (mu_bottom, phi_bottom) = if mu_lo >= lo {
                (mu_lo, phi_max)
            } else {
                (lo, phi_of(lo))
            };
            let (mu_top, phi_top) = if mu_hi < hi {
                (mu_hi, 0.0)
            } else {
                (hi, phi_of(hi))
            };
            if mu_bottom >= mu_top {
                continue;
            }

            let f_bottom = projected_antiderivatives(phi_bottom, a, b);
            let f_top = projected_antiderivatives(phi_top, a, b);
            for k in 0..BASIS_LEN {
                out.values[i][k] = 2.0 * (f_bottom[k] - f_top[k]);
            }
        }

        Ok(out)
    }

    /// [`IntervalPartition::integrate`] over many `(a, b, active)` triples in
    /// parallel; results keep the input order.
    pub fn integrate_batch(
        &self,
        triples: &[(f64, f64, bool)],
    ) -> Result<Vec<AngularIntegrals>, StarError> {
        triples
            .par_iter()
            .map(|&(a, b, active)| self.integrate(a, b, active))
            .collect()
    }
}
