//! Integration of the visible disk.
//!
//! - `map`: the height grid with per-height area elements and fit coefficients
//! - `disk`: the flux integral for a given inclination

pub mod disk;
pub mod map;

pub use disk::DiskIntegrator;
pub use map::{SurfaceMap, height_grid};
