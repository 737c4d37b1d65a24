//! Height grid of the star and the per-height data the integrator consumes.
//!
//! The grid is open: for `n` steps of `dz = 2 / n` it holds
//! `z_k = −1 + k·dz`, `k = 1..n−1`. The poles are left out because the
//! cylindrical radius vanishes there and `dr/dz` diverges.

use crate::domain::SurfaceSample;
use crate::error::StarError;
use crate::surface::RocheSurface;

/// Minimum number of height steps.
pub const MIN_HEIGHT_STEPS: usize = 8;

/// Interior heights of an `n`-step grid over `[-1, 1]` and the step.
pub fn height_grid(steps: usize) -> Result<(Vec<f64>, f64), StarError> {
    if steps < MIN_HEIGHT_STEPS {
        return Err(StarError::configuration(format!(
            "height steps = {steps} is too small (need >= {MIN_HEIGHT_STEPS})"
        )));
    }
    let dz = 2.0 / steps as f64;
    let z = (1..steps).map(|k| -1.0 + k as f64 * dz).collect();
    Ok((z, dz))
}

/// Ordered surface samples on a fixed-step height grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMap {
    samples: Vec<SurfaceSample>,
    step: f64,
}

impl SurfaceMap {
    pub fn new(samples: Vec<SurfaceSample>, step: f64) -> Result<Self, StarError> {
        if !(step.is_finite() && step > 0.0) {
            return Err(StarError::configuration(format!(
                "height step = {step} must be finite and > 0"
            )));
        }
        let Some(first) = samples.first() else {
            return Err(StarError::configuration("surface map has no samples"));
        };
        let wavelengths = first.coefficients.len();
        let width = first.coefficients.first().map_or(0, Vec::len);
        if wavelengths == 0 || width == 0 {
            return Err(StarError::configuration(
                "surface samples carry no fit coefficients",
            ));
        }

        for (k, s) in samples.iter().enumerate() {
            if !(s.z.is_finite() && s.z.abs() < 1.0) {
                return Err(StarError::configuration(format!(
                    "sample #{k}: z = {} is outside (-1, 1)",
                    s.z
                )));
            }
            if !(s.area.is_finite() && s.area >= 0.0) {
                return Err(StarError::configuration(format!(
                    "sample #{k}: area element = {} is invalid",
                    s.area
                )));
            }
            if s.coefficients.len() != wavelengths
                || s.coefficients.iter().any(|c| c.len() != width)
            {
                return Err(StarError::configuration(format!(
                    "sample #{k} at z = {}: expected {wavelengths} coefficient vectors of length {width}",
                    s.z
                )));
            }
        }
        if let Some(w) = samples.windows(2).find(|w| w[1].z <= w[0].z) {
            return Err(StarError::configuration(format!(
                "sample heights must ascend: z = {} followed by z = {}",
                w[0].z, w[1].z
            )));
        }

        Ok(Self { samples, step })
    }

    /// Sample the open grid of `height_steps` steps on `surface`, asking
    /// `coefficients` for the per-wavelength fit coefficients at each height.
    pub fn from_surface<F>(
        surface: &RocheSurface,
        height_steps: usize,
        mut coefficients: F,
    ) -> Result<Self, StarError>
    where
        F: FnMut(f64) -> Result<Vec<Vec<f64>>, StarError>,
    {
        let (heights, step) = height_grid(height_steps)?;
        let mut samples = Vec::with_capacity(heights.len());
        for z in heights {
            samples.push(SurfaceSample {
                z,
                area: surface.area_element(z)?,
                coefficients: coefficients(z)?,
            });
        }
        Self::new(samples, step)
    }

    pub fn samples(&self) -> &[SurfaceSample] {
        &self.samples
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn wavelength_count(&self) -> usize {
        self.samples.first().map_or(0, |s| s.coefficients.len())
    }

    /// Length of every coefficient vector.
    pub fn coefficient_width(&self) -> usize {
        self.samples
            .first()
            .and_then(|s| s.coefficients.first())
            .map_or(0, Vec::len)
    }
}
