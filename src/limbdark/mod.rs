//! Limb-darkening fits on a shared partition of `mu`.
//!
//! This module provides:
//!
//! - the partition of `[0, 1]` with its design matrix and solver (`partition`)
//! - piecewise-polynomial fits of tabulated profiles (`fit`)
//! - analytic azimuthal integration of the basis (`integrate`)
//! - running fit-quality diagnostics (`quality`)

pub mod fit;
pub mod integrate;
pub mod partition;
pub mod quality;

pub use fit::{LimbDarkeningFit, fit_all};
pub use integrate::AngularIntegrals;
pub use partition::{DesignRow, IntervalPartition};
pub use quality::{Extremum, ExtremumOrigin, QualityRecord};
