//! Shared domain types.
//!
//! This module defines:
//!
//! - the reference `mu` grid of the tabulated intensities
//! - fit identities (`FitKey`)
//! - injected physical constants (`PhysicalConstants`)
//! - per-height surface samples consumed by the disk integrator
//! - the run configuration (`StarConfig`)

use serde::{Deserialize, Serialize};

use crate::error::StarError;

/// The `mu` values of the Castelli & Kurucz (2004) intensity tables, ascending.
pub const REFERENCE_MU: [f64; 17] = [
    0.01, 0.025, 0.05, 0.075, 0.1, 0.125, 0.15, 0.2, 0.25, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0,
];

/// Step of the `mu` grid on which fitted intensities are checked for monotonicity.
pub const MU_CHECK_STEP: f64 = 0.001;

/// Number of points of the monotonicity grid `0, 0.001, …, 0.999`.
pub const MU_CHECK_POINTS: usize = 1000;

/// Identifies one fitted intensity profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitKey {
    /// Wavelength in nm.
    pub wavelength: f64,
    /// Base-10 log of surface gravity (cgs).
    pub log_g: f64,
    /// Effective temperature in K.
    pub temperature: f64,
}

impl FitKey {
    pub fn new(wavelength: f64, log_g: f64, temperature: f64) -> Self {
        Self {
            wavelength,
            log_g,
            temperature,
        }
    }
}

/// Physical constants in cgs units, injected rather than hard-wired.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    /// Gravitational constant, cm³ g⁻¹ s⁻².
    pub gravitational_constant: f64,
    /// Solar radius, cm.
    pub solar_radius: f64,
    /// Solar mass, g.
    pub solar_mass: f64,
    /// Solar luminosity, erg s⁻¹.
    pub solar_luminosity: f64,
    /// Stefan–Boltzmann constant, erg cm⁻² s⁻¹ K⁻⁴.
    pub stefan_boltzmann: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            gravitational_constant: 6.674e-8,
            solar_radius: 6.9551e10,
            solar_mass: 1.989e33,
            solar_luminosity: 3.839e33,
            stefan_boltzmann: 5.6704e-5,
        }
    }
}

impl PhysicalConstants {
    /// Effective temperature of the Sun implied by its luminosity and radius.
    pub fn solar_temperature(&self) -> f64 {
        (self.solar_luminosity
            / (4.0 * std::f64::consts::PI * self.stefan_boltzmann * self.solar_radius.powi(2)))
        .powf(0.25)
    }

    /// Additive constant relating normalized gravity to `log g` for a star of
    /// `mass` (solar masses) and equatorial radius `r_eq` (solar radii).
    pub fn log_g_offset(&self, mass: f64, r_eq: f64) -> f64 {
        (self.gravitational_constant * self.solar_mass / self.solar_radius.powi(2)).log10()
            + mass.log10()
            - 2.0 * r_eq.log10()
    }

    /// Multiplicative constant relating normalized temperature to `T_eff` for a
    /// star of `luminosity` (solar) and equatorial radius `r_eq` (solar radii).
    pub fn temperature_scale(&self, luminosity: f64, r_eq: f64) -> f64 {
        self.solar_temperature() * r_eq.powf(-0.5) * luminosity.powf(0.25)
    }

    /// Square of the equatorial radius in cm², the flux scale of a star of
    /// equatorial radius `r_eq` in solar radii.
    pub fn area_scale(&self, r_eq: f64) -> f64 {
        (r_eq * self.solar_radius).powi(2)
    }
}

/// One height of the surface map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSample {
    /// Height normalized by the polar radius, in `(-1, 1)`.
    pub z: f64,
    /// Area element per unit `phi` and `z`, in equatorial radii squared.
    pub area: f64,
    /// Fit coefficients at this height, one `5·m` vector per wavelength.
    pub coefficients: Vec<Vec<f64>>,
}

/// Configuration of one star for disk integration.
///
/// Callers usually deserialize this from their own run files; `validate`
/// checks everything that can be checked without building the star.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarConfig {
    /// Rotation parameter (angular velocity over break-up velocity), `[0, 1)`.
    pub omega: f64,
    /// Equatorial radius in solar radii.
    pub equatorial_radius: f64,
    /// Number of height steps `n`; the map holds the `n − 1` interior heights.
    pub height_steps: usize,
    /// Interior boundaries of the `mu` partition.
    pub mu_boundaries: Vec<f64>,
    #[serde(default)]
    pub constants: PhysicalConstants,
}

impl StarConfig {
    pub fn validate(&self) -> Result<(), StarError> {
        if !(self.omega.is_finite() && (0.0..1.0).contains(&self.omega)) {
            return Err(StarError::configuration(format!(
                "omega = {} must lie in [0, 1)",
                self.omega
            )));
        }
        if !(self.equatorial_radius.is_finite() && self.equatorial_radius > 0.0) {
            return Err(StarError::configuration(format!(
                "equatorial radius = {} must be finite and > 0",
                self.equatorial_radius
            )));
        }
        if self.height_steps < 8 {
            return Err(StarError::configuration(format!(
                "height_steps = {} is too small (need >= 8)",
                self.height_steps
            )));
        }
        if self.mu_boundaries.is_empty() {
            return Err(StarError::configuration("mu_boundaries must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_grid_is_ascending_and_ends_at_one() {
        assert!(REFERENCE_MU.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(REFERENCE_MU[REFERENCE_MU.len() - 1], 1.0);
    }

    #[test]
    fn solar_values_are_consistent() {
        let c = PhysicalConstants::default();
        let t_sun = c.solar_temperature();
        assert!((t_sun - 5778.0).abs() < 10.0, "{t_sun}");
        assert!((c.temperature_scale(1.0, 1.0) - t_sun).abs() < 1e-9);
        // log g of the Sun is about 4.44.
        assert!((c.log_g_offset(1.0, 1.0) - 4.438).abs() < 0.01);
        assert!((c.area_scale(2.0) - 4.0 * c.solar_radius.powi(2)).abs() < 1e-6 * c.area_scale(2.0));
    }

    #[test]
    fn config_validation_names_the_bad_field() {
        let mut cfg = StarConfig {
            omega: 0.5,
            equatorial_radius: 2.0,
            height_steps: 100,
            mu_boundaries: vec![0.1, 0.4],
            constants: PhysicalConstants::default(),
        };
        assert!(cfg.validate().is_ok());
        cfg.omega = 1.2;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("omega = 1.2"));
    }
}
