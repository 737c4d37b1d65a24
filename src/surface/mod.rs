//! Geometry of the Roche surface.

pub mod roche;
pub mod sightline;

pub use roche::{Inclination, RocheSurface};
pub use sightline::SURFACE_RESIDUAL_TOL;
