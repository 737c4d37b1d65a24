//! Disk integration of a rotating star.
//!
//! For a given inclination the visible flux at each wavelength is
//!
//! ```text
//! F = (R_eq R_sun)² ∫_{−z1}^{1} A(z) Σ_k c_k(z) J_k(z) dz
//! ```
//!
//! where `A` is the area element and `J_k` the azimuthal integrals of the fit
//! basis at height `z`. Heights at or below `−z1` are hidden. The height
//! integral uses the open quadrature of [`crate::math::quadrature`], whose
//! lower end is corrected for `−z1` falling between grid nodes.

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{PhysicalConstants, StarConfig, SurfaceSample};
use crate::error::StarError;
use crate::limbdark::IntervalPartition;
use crate::math::{integrate_open_truncated, required_nodes};
use crate::star::map::SurfaceMap;
use crate::surface::RocheSurface;

pub struct DiskIntegrator<'a> {
    surface: RocheSurface,
    partition: &'a IntervalPartition,
    map: SurfaceMap,
    equatorial_radius: f64,
    constants: PhysicalConstants,
}

impl<'a> DiskIntegrator<'a> {
    pub fn new(
        surface: RocheSurface,
        partition: &'a IntervalPartition,
        map: SurfaceMap,
        equatorial_radius: f64,
        constants: PhysicalConstants,
    ) -> Result<Self, StarError> {
        if !(equatorial_radius.is_finite() && equatorial_radius > 0.0) {
            return Err(StarError::configuration(format!(
                "equatorial radius = {equatorial_radius} must be finite and > 0"
            )));
        }
        if map.coefficient_width() != partition.width() {
            return Err(StarError::configuration(format!(
                "surface map carries {} coefficients per wavelength, the mu partition needs {}",
                map.coefficient_width(),
                partition.width()
            )));
        }
        Ok(Self {
            surface,
            partition,
            map,
            equatorial_radius,
            constants,
        })
    }

    /// Build the surface and its map from a run configuration.
    ///
    /// `partition` must have been built from `config.mu_boundaries`.
    pub fn from_config<F>(
        config: &StarConfig,
        partition: &'a IntervalPartition,
        coefficients: F,
    ) -> Result<Self, StarError>
    where
        F: FnMut(f64) -> Result<Vec<Vec<f64>>, StarError>,
    {
        config.validate()?;
        if partition.boundaries() != config.mu_boundaries.as_slice() {
            return Err(StarError::configuration(format!(
                "partition boundaries {:?} differ from the configured {:?}",
                partition.boundaries(),
                config.mu_boundaries
            )));
        }
        let surface = RocheSurface::new(config.omega)?;
        let map = SurfaceMap::from_surface(&surface, config.height_steps, coefficients)?;
        Self::new(
            surface,
            partition,
            map,
            config.equatorial_radius,
            config.constants,
        )
    }

    pub fn surface(&self) -> &RocheSurface {
        &self.surface
    }

    pub fn map(&self) -> &SurfaceMap {
        &self.map
    }

    /// Flux at every wavelength of the map, seen at `inclination` radians.
    pub fn integrate(&mut self, inclination: f64) -> Result<Vec<f64>, StarError> {
        let z1 = self.surface.set_inclination(inclination)?;

        let kept: Vec<&SurfaceSample> =
            self.map.samples().iter().filter(|s| s.z > -z1).collect();
        let Some(first) = kept.first() else {
            return Err(StarError::configuration(format!(
                "no map heights above the hidden cap z <= {}",
                -z1
            )));
        };
        let delta = first.z + z1;
        let needed = required_nodes(delta, self.map.step());
        if kept.len() < needed {
            return Err(StarError::configuration(format!(
                "only {} map heights above z = {} (need at least {needed})",
                kept.len(),
                -z1
            )));
        }

        let surface = &self.surface;
        let partition = self.partition;
        let rows: Vec<Vec<f64>> = kept
            .par_iter()
            .map(|sample| -> Result<Vec<f64>, StarError> {
                let (a, b) = surface.angle_coefficients(sample.z)?;
                let integrals = partition.integrate(a, b, sample.z < z1)?;
                Ok(sample
                    .coefficients
                    .iter()
                    .map(|c| sample.area * integrals.contract(c))
                    .collect())
            })
            .collect::<Result<_, _>>()?;

        let scale = self.constants.area_scale(self.equatorial_radius);
        let step = self.map.step();
        let mut flux = Vec::with_capacity(self.map.wavelength_count());
        let mut column = Vec::with_capacity(rows.len());
        for w in 0..self.map.wavelength_count() {
            column.clear();
            column.extend(rows.iter().map(|r| r[w]));
            flux.push(scale * integrate_open_truncated(&column, step, delta)?);
        }

        debug!(
            inclination,
            z1,
            heights = kept.len(),
            wavelengths = flux.len(),
            "integrated disk"
        );
        Ok(flux)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    use crate::domain::{FitKey, REFERENCE_MU};
    use crate::limbdark::LimbDarkeningFit;

    fn uniform(partition: &IntervalPartition) -> Vec<f64> {
        LimbDarkeningFit::new(partition, FitKey::new(500.0, 4.0, 9000.0), &[1.0; 17])
            .unwrap()
            .coefficients()
            .to_vec()
    }

    #[test]
    fn uniform_sphere_shows_its_cross_section() {
        let partition = IntervalPartition::new(&[0.1, 0.4]).unwrap();
        let coeffs = uniform(&partition);
        let surface = RocheSurface::new(0.0).unwrap();
        let map =
            SurfaceMap::from_surface(&surface, 2000, |_| Ok(vec![coeffs.clone()])).unwrap();
        let constants = PhysicalConstants {
            solar_radius: 1.0,
            ..PhysicalConstants::default()
        };
        let mut disk = DiskIntegrator::new(surface, &partition, map, 1.0, constants).unwrap();

        for &i in &[0.0, 0.3, 0.9, PI / 2.0] {
            let flux = disk.integrate(i).unwrap();
            assert!((flux[0] - PI).abs() < 1e-4 * PI, "i={i}: {}", flux[0] / PI);
        }
    }

    #[test]
    fn barely_rotating_star_still_shines() {
        let partition = IntervalPartition::new(&[0.1, 0.4]).unwrap();
        let coeffs = uniform(&partition);
        let surface = RocheSurface::new(1e-9).unwrap();
        let map =
            SurfaceMap::from_surface(&surface, 2000, |_| Ok(vec![coeffs.clone()])).unwrap();
        let constants = PhysicalConstants {
            solar_radius: 1.0,
            ..PhysicalConstants::default()
        };
        let mut disk = DiskIntegrator::new(surface, &partition, map, 1.0, constants).unwrap();
        for &i in &[0.0, 0.7, PI / 2.0] {
            let flux = disk.integrate(i).unwrap();
            assert!((flux[0] - PI).abs() < 1e-4 * PI, "i={i}: {}", flux[0] / PI);
        }
    }

    #[test]
    fn linear_limb_darkening_on_a_sphere() {
        // I(mu) = 1 − u (1 − mu) integrates to pi (1 − u/3).
        let partition = IntervalPartition::new(&[0.1, 0.4]).unwrap();
        let u = 0.6;
        let data: Vec<f64> = REFERENCE_MU.iter().map(|&mu| 1.0 - u * (1.0 - mu)).collect();
        let coeffs = LimbDarkeningFit::new(&partition, FitKey::new(500.0, 4.0, 9000.0), &data)
            .unwrap()
            .coefficients()
            .to_vec();
        let surface = RocheSurface::new(0.0).unwrap();
        let map =
            SurfaceMap::from_surface(&surface, 2000, |_| Ok(vec![coeffs.clone()])).unwrap();
        let constants = PhysicalConstants {
            solar_radius: 1.0,
            ..PhysicalConstants::default()
        };
        let mut disk = DiskIntegrator::new(surface, &partition, map, 1.0, constants).unwrap();
        let expected = PI * (1.0 - u / 3.0);
        for &i in &[0.2, 1.0] {
            let flux = disk.integrate(i).unwrap();
            assert!((flux[0] - expected).abs() < 1e-4 * expected, "i={i}: {}", flux[0]);
        }
    }

    #[test]
    fn mismatched_map_width_is_rejected() {
        let partition = IntervalPartition::new(&[0.1, 0.4]).unwrap();
        let surface = RocheSurface::new(0.3).unwrap();
        let map = SurfaceMap::from_surface(&surface, 50, |_| Ok(vec![vec![1.0; 10]])).unwrap();
        let err = DiskIntegrator::new(surface, &partition, map, 1.0, PhysicalConstants::default())
            .err()
            .unwrap();
        assert!(matches!(err, StarError::Configuration(_)));
    }

    #[test]
    fn coarse_map_cannot_cover_a_pole_on_view() {
        let partition = IntervalPartition::new(&[0.4]).unwrap();
        let coeffs = uniform(&partition);
        let config = StarConfig {
            omega: 0.5,
            equatorial_radius: 1.0,
            height_steps: 8,
            mu_boundaries: vec![0.4],
            constants: PhysicalConstants::default(),
        };
        let mut disk =
            DiskIntegrator::from_config(&config, &partition, |_| Ok(vec![coeffs.clone()]))
                .unwrap();
        // Pole-on only z > 0 is visible: 3 of the 7 heights.
        assert!(matches!(
            disk.integrate(0.0),
            Err(StarError::Configuration(_))
        ));
        assert!(disk.integrate(2.0).is_err());
    }

    #[test]
    fn six_heights_suffice_only_without_the_drop() {
        // 12 steps: heights k/6 − 1. With z1 < 1/6 the six heights from z = 0
        // up are kept.
        let partition = IntervalPartition::new(&[0.4]).unwrap();
        let coeffs = uniform(&partition);
        let surface = RocheSurface::new(0.0).unwrap();
        let map = SurfaceMap::from_surface(&surface, 12, |_| Ok(vec![coeffs.clone()])).unwrap();
        let mut disk =
            DiskIntegrator::new(surface, &partition, map, 1.0, PhysicalConstants::default())
                .unwrap();

        // z1 = sin(0.12) lies past half a step: the first node is kept.
        assert!(disk.integrate(0.12).is_ok());
        // z1 = sin(0.05) is within half a step: it is dropped, leaving five.
        let err = disk.integrate(0.05).unwrap_err();
        assert!(matches!(err, StarError::Configuration(_)));
        assert!(err.to_string().contains("only 6 map heights"), "{err}");
        assert!(err.to_string().contains("need at least 7"), "{err}");
    }

    #[test]
    fn config_and_partition_must_agree() {
        let partition = IntervalPartition::new(&[0.4]).unwrap();
        let config = StarConfig {
            omega: 0.5,
            equatorial_radius: 1.0,
            height_steps: 100,
            mu_boundaries: vec![0.1, 0.4],
            constants: PhysicalConstants::default(),
        };
        assert!(DiskIntegrator::from_config(&config, &partition, |_| Ok(vec![vec![0.0; 10]])).is_err());
    }
}
