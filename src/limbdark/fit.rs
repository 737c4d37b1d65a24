//! Piecewise-polynomial fits of tabulated intensity profiles.
//!
//! Given:
//! - a shared [`IntervalPartition`]
//! - 17 intensities `I_j` at the reference `mu_j`
//!
//! we solve the least-squares problem `design · c ≈ I_dup` with the partition's
//! precomputed pseudo-inverse and keep the `5·m` coefficients. Many profiles
//! (one per wavelength, gravity and temperature) are fitted in parallel by
//! [`fit_all`].

use rayon::prelude::*;

use crate::domain::{FitKey, REFERENCE_MU};
use crate::error::StarError;
use crate::limbdark::partition::IntervalPartition;
use crate::limbdark::quality::QualityRecord;
use crate::math::{BASIS_LEN, eval_block};

/// A fitted intensity profile `I(mu)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LimbDarkeningFit {
    key: FitKey,
    intensities: Vec<f64>,
    coefficients: Vec<f64>,
}

impl LimbDarkeningFit {
    /// Fit one profile of 17 intensities on `partition`.
    pub fn new(
        partition: &IntervalPartition,
        key: FitKey,
        intensities: &[f64],
    ) -> Result<Self, StarError> {
        if intensities.len() != REFERENCE_MU.len() {
            return Err(StarError::configuration(format!(
                "expected {} intensities for {key:?}, got {}",
                REFERENCE_MU.len(),
                intensities.len()
            )));
        }
        if let Some((j, v)) = intensities.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(StarError::configuration(format!(
                "intensity at mu = {} is not finite ({v}) for {key:?}",
                REFERENCE_MU[j]
            )));
        }

        let coefficients: Vec<f64> = partition.solve(intensities).iter().copied().collect();
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(StarError::LinearAlgebra(format!(
                "non-finite fit coefficients for {key:?}"
            )));
        }

        Ok(Self {
            key,
            intensities: intensities.to_vec(),
            coefficients,
        })
    }

    pub fn key(&self) -> FitKey {
        self.key
    }

    /// The tabulated intensities the fit was built from.
    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    /// All `5·m` coefficients, block by block.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// The 5 coefficients of interval `i`.
    pub fn block(&self, i: usize) -> Option<&[f64]> {
        self.coefficients.get(i * BASIS_LEN..(i + 1) * BASIS_LEN)
    }

    /// Fitted intensity at `mu`; NaN outside `[0, 1]`.
    pub fn evaluate(&self, partition: &IntervalPartition, mu: f64) -> f64 {
        partition
            .interval_of(mu)
            .and_then(|i| self.block(i))
            .map(|block| eval_block(block, mu))
            .unwrap_or(f64::NAN)
    }

    pub fn try_evaluate(&self, partition: &IntervalPartition, mu: f64) -> Result<f64, StarError> {
        let Some(i) = partition.interval_of(mu) else {
            return Err(StarError::domain(format!("mu = {mu} is outside [0, 1]")));
        };
        let Some(block) = self.block(i) else {
            return Err(StarError::configuration(format!(
                "fit has {} coefficients, partition expects {}",
                self.coefficients.len(),
                partition.width()
            )));
        };
        Ok(eval_block(block, mu))
    }

    /// Quality diagnostics of this fit alone.
    pub fn check(&self, partition: &IntervalPartition) -> QualityRecord {
        let mut record = QualityRecord::new();
        record.observe(self, partition);
        record
    }
}

/// Fit many profiles on the same partition, in parallel; output order matches
/// input order.
pub fn fit_all(
    partition: &IntervalPartition,
    profiles: &[(FitKey, Vec<f64>)],
) -> Result<Vec<LimbDarkeningFit>, StarError> {
    profiles
        .par_iter()
        .map(|(key, intensities)| LimbDarkeningFit::new(partition, *key, intensities))
        .collect()
}
