//! The partition of `[0, 1]` shared by all limb-darkening fits.
//!
//! Boundaries `b1 < … < bk` split the `mu` range into `m = k + 1` half-open
//! intervals `[0, b1), [b1, b2), …, [bk, 1)`; `mu = 1` belongs to the last one.
//! Membership is right-inclusive everywhere: the interval of `mu` is the
//! number of boundaries `<= mu`.
//!
//! The design matrix has one column per (interval, monomial) pair. Each
//! reference sample contributes a row whose only non-zero block is that of
//! its interval. The first sample of every interval after the first is also
//! duplicated into the preceding interval, so that neighbouring polynomials are
//! fitted to a common point; this is how continuity is obtained, in the
//! least-squares sense rather than as a hard constraint.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::domain::REFERENCE_MU;
use crate::error::StarError;
use crate::math::{BASIS_LEN, least_squares_operator, monomials};

/// Minimum number of reference samples per interval.
pub const MIN_SAMPLES_PER_INTERVAL: usize = 2;

/// One row of the design matrix: which interval block it fills and which
/// reference sample it evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesignRow {
    pub interval: usize,
    pub sample: usize,
}

/// Immutable partition configuration with its precomputed least-squares solver.
#[derive(Debug, Clone)]
pub struct IntervalPartition {
    boundaries: Vec<f64>,
    intervals: Vec<(f64, f64)>,
    rows: Vec<DesignRow>,
    design: DMatrix<f64>,
    solver: DMatrix<f64>,
}

impl IntervalPartition {
    /// Build the partition for the given interior boundaries.
    pub fn new(boundaries: &[f64]) -> Result<Self, StarError> {
        validate_boundaries(boundaries)?;

        let mut edges = Vec::with_capacity(boundaries.len() + 2);
        edges.push(0.0);
        edges.extend_from_slice(boundaries);
        edges.push(1.0);
        let intervals: Vec<(f64, f64)> = edges.windows(2).map(|w| (w[0], w[1])).collect();
        let m = intervals.len();

        // First reference sample of each interval: samples equal to a boundary
        // open the interval on their right.
        let mut starts = Vec::with_capacity(m + 1);
        starts.push(0);
        for &b in boundaries {
            starts.push(REFERENCE_MU.partition_point(|&mu| mu < b));
        }
        starts.push(REFERENCE_MU.len());

        for i in 0..m {
            let count = starts[i + 1] - starts[i];
            if count < MIN_SAMPLES_PER_INTERVAL {
                let (lo, hi) = intervals[i];
                return Err(StarError::configuration(format!(
                    "mu interval [{lo}, {hi}) holds {count} reference sample(s), need at least {MIN_SAMPLES_PER_INTERVAL}"
                )));
            }
        }

        let mut rows = Vec::with_capacity(REFERENCE_MU.len() + m - 1);
        for i in 0..m {
            for sample in starts[i]..starts[i + 1] {
                rows.push(DesignRow { interval: i, sample });
            }
            if i + 1 < m {
                rows.push(DesignRow {
                    interval: i,
                    sample: starts[i + 1],
                });
            }
        }

        let mut design = DMatrix::<f64>::zeros(rows.len(), BASIS_LEN * m);
        for (r, row) in rows.iter().enumerate() {
            let g = monomials(REFERENCE_MU[row.sample]);
            for (k, v) in g.iter().enumerate() {
                design[(r, row.interval * BASIS_LEN + k)] = *v;
            }
        }

        let solver = least_squares_operator(&design).ok_or_else(|| {
            StarError::LinearAlgebra(format!(
                "no least-squares solver for the {}x{} design of boundaries {boundaries:?}",
                design.nrows(),
                design.ncols()
            ))
        })?;

        debug!(
            intervals = m,
            rows = rows.len(),
            ?boundaries,
            "built mu partition"
        );

        Ok(Self {
            boundaries: boundaries.to_vec(),
            intervals,
            rows,
            design,
            solver,
        })
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    /// The half-open intervals `(lo, hi)` in increasing `mu` order.
    pub fn intervals(&self) -> &[(f64, f64)] {
        &self.intervals
    }

    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    /// Length of a coefficient vector: `5·m`.
    pub fn width(&self) -> usize {
        BASIS_LEN * self.intervals.len()
    }

    pub fn rows(&self) -> &[DesignRow] {
        &self.rows
    }

    pub fn design(&self) -> &DMatrix<f64> {
        &self.design
    }

    /// Index of the interval containing `mu`, or `None` outside `[0, 1]`.
    pub fn interval_of(&self, mu: f64) -> Option<usize> {
        if !(0.0..=1.0).contains(&mu) {
            return None;
        }
        Some(self.boundaries.partition_point(|&b| b <= mu))
    }

    /// Expand one intensity per reference sample into the duplicated
    /// right-hand side of the design. `intensities` holds one value per
    /// entry of [`REFERENCE_MU`].
    pub(crate) fn duplicate(&self, intensities: &[f64]) -> DVector<f64> {
        DVector::from_iterator(
            self.rows.len(),
            self.rows.iter().map(|row| intensities[row.sample]),
        )
    }

    /// Least-squares coefficients for one intensity per reference sample.
    pub(crate) fn solve(&self, intensities: &[f64]) -> DVector<f64> {
        &self.solver * self.duplicate(intensities)
    }
}

fn validate_boundaries(boundaries: &[f64]) -> Result<(), StarError> {
    if boundaries.is_empty() {
        return Err(StarError::configuration(
            "at least one interior mu boundary is required",
        ));
    }
    for (i, &b) in boundaries.iter().enumerate() {
        if !(b.is_finite() && b > 0.0 && b < 1.0) {
            return Err(StarError::configuration(format!(
                "mu boundary #{i} = {b} is not inside (0, 1)"
            )));
        }
        if i > 0 && b <= boundaries[i - 1] {
            return Err(StarError::configuration(format!(
                "mu boundaries must increase strictly: #{} = {} followed by #{i} = {b}",
                i - 1,
                boundaries[i - 1]
            )));
        }
    }
    Ok(())
}
