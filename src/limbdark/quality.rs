//! Running diagnostics over many limb-darkening fits.
//!
//! A [`QualityRecord`] tracks the worst fits seen so far:
//! - the minimum fitted `I(0) / I(1)` (negative means an unphysical limb)
//! - the minimum step `(I(mu + 0.001) − I(mu)) / I(1)` (negative means the fit
//!   is not monotone)
//! - the maximum `|I_fit(mu_j) − I_j| / I(1)` over the reference grid
//!
//! Records are plain values: fold fits in with [`QualityRecord::observe`] or
//! combine partial records with [`QualityRecord::merge`]. Comparisons are
//! strict, so on ties the record seen first is kept.

use rayon::prelude::*;
use serde::Serialize;
use tracing::warn;

use crate::domain::{FitKey, MU_CHECK_POINTS, MU_CHECK_STEP, REFERENCE_MU};
use crate::limbdark::fit::LimbDarkeningFit;
use crate::limbdark::partition::IntervalPartition;

/// Where an extremum was found.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExtremumOrigin {
    pub key: FitKey,
    pub mu: f64,
}

/// One running extremum and the fit that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extremum {
    pub value: f64,
    pub origin: Option<ExtremumOrigin>,
}

impl Extremum {
    fn empty(value: f64) -> Self {
        Self {
            value,
            origin: None,
        }
    }

    fn candidate(value: f64, key: FitKey, mu: f64) -> Self {
        Self {
            value,
            origin: Some(ExtremumOrigin { key, mu }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityRecord {
    pub min_intensity_at_limb: Extremum,
    pub min_step: Extremum,
    pub max_deviation: Extremum,
}

impl Default for QualityRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl QualityRecord {
    pub fn new() -> Self {
        Self {
            min_intensity_at_limb: Extremum::empty(f64::INFINITY),
            min_step: Extremum::empty(f64::INFINITY),
            max_deviation: Extremum::empty(0.0),
        }
    }

    /// Fold one fit into the record.
    pub fn observe(&mut self, fit: &LimbDarkeningFit, partition: &IntervalPartition) {
        let key = fit.key();
        let i1 = fit.intensities().last().copied().unwrap_or(0.0);

        let i0 = fit.evaluate(partition, 0.0);
        if let Some(value) = relative_minimum(i0, i1) {
            let c = Extremum::candidate(value, key, 0.0);
            if keep_min(&mut self.min_intensity_at_limb, c) && value < 0.0 {
                warn!(?key, ratio = value, "fitted intensity at the limb is negative");
            }
        }

        let (step, step_mu) = steepest_descent(fit, partition);
        if let Some(value) = relative_minimum(step, i1) {
            let c = Extremum::candidate(value, key, step_mu);
            if keep_min(&mut self.min_step, c) && value < 0.0 {
                warn!(?key, mu = step_mu, step = value, "fitted intensity is not monotone");
            }
        }

        let (dev, dev_mu) = REFERENCE_MU
            .iter()
            .zip(fit.intensities())
            .map(|(&mu, &i)| ((fit.evaluate(partition, mu) - i).abs(), mu))
            .fold((f64::NEG_INFINITY, f64::NAN), |best, cur| {
                if cur.0 > best.0 { cur } else { best }
            });
        let value = if dev == 0.0 {
            0.0
        } else if i1 == 0.0 {
            f64::INFINITY
        } else {
            dev / i1
        };
        keep_max(&mut self.max_deviation, Extremum::candidate(value, key, dev_mu));
    }

    /// Combine with a record built from later fits.
    pub fn merge(mut self, later: QualityRecord) -> QualityRecord {
        keep_min(&mut self.min_intensity_at_limb, later.min_intensity_at_limb);
        keep_min(&mut self.min_step, later.min_step);
        keep_max(&mut self.max_deviation, later.max_deviation);
        self
    }

    /// Record of a whole collection of fits, checked in parallel.
    pub fn from_fits(fits: &[LimbDarkeningFit], partition: &IntervalPartition) -> QualityRecord {
        fits.par_iter()
            .map(|fit| fit.check(partition))
            .reduce(QualityRecord::new, QualityRecord::merge)
    }
}

/// `value / i1`, with an exact zero kept as zero and no value when `i1 == 0`.
fn relative_minimum(value: f64, i1: f64) -> Option<f64> {
    if value == 0.0 {
        Some(0.0)
    } else if i1 != 0.0 {
        Some(value / i1)
    } else {
        None
    }
}

/// Smallest forward difference of the fit on the check grid and its left `mu`.
fn steepest_descent(fit: &LimbDarkeningFit, partition: &IntervalPartition) -> (f64, f64) {
    let mut best = (f64::INFINITY, 0.0);
    let mut prev = fit.evaluate(partition, 0.0);
    for k in 1..MU_CHECK_POINTS {
        let mu = k as f64 * MU_CHECK_STEP;
        let cur = fit.evaluate(partition, mu);
        let d = cur - prev;
        if d < best.0 {
            best = (d, (k - 1) as f64 * MU_CHECK_STEP);
        }
        prev = cur;
    }
    best
}

fn keep_min(current: &mut Extremum, candidate: Extremum) -> bool {
    if candidate.value < current.value {
        *current = candidate;
        true
    } else {
        false
    }
}

fn keep_max(current: &mut Extremum, candidate: Extremum) -> bool {
    if candidate.value > current.value {
        *current = candidate;
        true
    } else {
        false
    }
}
