//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - the reference `mu` grid and the monotonicity-check grid
//! - fit identities and injected physical constants
//! - surface-map samples and the run configuration

pub mod types;

pub use types::*;
