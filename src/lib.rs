//! `rotstar` library crate.
//!
//! Disk-integrated light of a rotating, gravity-darkened star:
//!
//! - piecewise-polynomial limb-darkening fits and their analytic azimuthal
//!   integrals (`limbdark`)
//! - Roche-surface geometry and sight-line intersections (`surface`)
//! - the height integral over the visible disk (`star`)
//!
//! Reading intensity tables, plotting, and run orchestration live with the
//! callers; this crate only computes.

pub mod domain;
pub mod error;
pub mod limbdark;
pub mod math;
pub mod star;
pub mod surface;
