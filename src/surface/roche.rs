//! Roche-model surface of a rotating star.
//!
//! Coordinates:
//! - `z`: cylindrical height over the polar radius, `[-1, 1]`
//! - `r`: cylindrical radius over the equatorial radius
//! - `u = z / f`: height over the equatorial radius, with flattening
//!   `f = 1 + omega² / 2` (equatorial over polar radius)
//!
//! The surface is `r² = s(u)`, where `s` is the physical root of the cubic
//! obtained from the Roche potential, written with `w = 1 + 2 / omega²`. For
//! `omega = 0` the star is the unit sphere and `s(u) = 1 − u²`.
//!
//! The trigonometric root cancels `O(w)` terms, so once `w` exceeds
//! [`NEAR_SPHERE_W`] the surface is taken to first order in `omega²`: the
//! spheroid `s(u) = 1 − (1 + omega²) u²`, whose neglected terms are below
//! `omega⁴ / 4`.
//!
//! Once an inclination is set, the cosine of the viewing angle at height `z`
//! and azimuth `phi` is `mu = a cos(phi) + b`; the part of the star with
//! `z <= −z1` is hidden behind the limb.

use std::f64::consts::{FRAC_PI_2, PI};

use tracing::debug;

use crate::error::StarError;
use crate::math::real_roots_in;

/// Slack on the `[0, 1]` bracket of the bound polynomial's root.
const BOUND_ROOT_SLACK: f64 = 1e-9;

/// Above this `w` (`omega` below about `1.4e-3`) the surface is the first-order
/// spheroid.
pub const NEAR_SPHERE_W: f64 = 1e6;

/// First secant step and iteration cap of the height-bound refinement.
const SECANT_STEP: f64 = 1e-7;
const MAX_SECANT_STEPS: usize = 8;

/// Viewing inclination and the quantities derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inclination {
    /// Angle between the rotation axis and the line of sight, `[0, pi/2]`.
    pub angle: f64,
    pub sin: f64,
    pub cos: f64,
    /// Height bound `z1`: the limb crosses every height in `(−z1, z1)`.
    pub z1: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RocheSurface {
    omega: f64,
    w: f64,
    f: f64,
    inclination: Option<Inclination>,
}

impl RocheSurface {
    pub fn new(omega: f64) -> Result<Self, StarError> {
        if !(omega.is_finite() && (0.0..1.0).contains(&omega)) {
            return Err(StarError::domain(format!(
                "rotation parameter omega = {omega} must lie in [0, 1)"
            )));
        }
        let w = if omega == 0.0 {
            f64::INFINITY
        } else {
            1.0 + 2.0 / (omega * omega)
        };
        Ok(Self {
            omega,
            w,
            f: 1.0 + omega * omega / 2.0,
            inclination: None,
        })
    }

    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// `1 + 2 / omega²`; infinite for a non-rotating star.
    pub fn w(&self) -> f64 {
        self.w
    }

    /// Flattening: equatorial over polar radius.
    pub fn flattening(&self) -> f64 {
        self.f
    }

    pub fn is_spherical(&self) -> bool {
        self.w.is_infinite()
    }

    /// Whether the surface is evaluated as the first-order spheroid.
    pub fn is_near_spherical(&self) -> bool {
        self.w > NEAR_SPHERE_W
    }

    pub fn inclination(&self) -> Option<Inclination> {
        self.inclination
    }

    pub fn u_of_z(&self, z: f64) -> f64 {
        z / self.f
    }

    pub fn z_of_u(&self, u: f64) -> f64 {
        u * self.f
    }

    /// `cos` of the trigonometric root of the Roche cubic at `u`.
    fn v(&self, u: f64) -> f64 {
        let w = self.w;
        let (u2, w2) = (u * u, w * w);
        let num = 27.0 - 2.0 * u2 * u2 * u2 - 54.0 * w - 6.0 * u2 * u2 * w + 27.0 * w2
            - 6.0 * u2 * w2
            - 2.0 * w2 * w;
        let den = 2.0 * (u2 + w).powi(3);
        let t = (num / den).clamp(-1.0, 1.0).acos();
        ((2.0 * PI + t) / 3.0).cos()
    }

    /// Squared cylindrical radius `s(u)`.
    pub fn s(&self, u: f64) -> f64 {
        if self.is_near_spherical() {
            return 1.0 - (1.0 + self.omega * self.omega) * u * u;
        }
        let w = self.w;
        (2.0 * w - u * u + 2.0 * (u * u + w) * self.v(u)) / 3.0
    }

    /// `ds/du`.
    pub fn ds(&self, u: f64) -> f64 {
        if self.is_near_spherical() {
            return -2.0 * (1.0 + self.omega * self.omega) * u;
        }
        let v = self.v(u);
        2.0 * u * (1.0 - 2.0 * v) / (3.0 + 6.0 * v)
    }

    /// Cylindrical radius at height `z`, exactly 0 at the poles.
    pub fn radius(&self, z: f64) -> Result<f64, StarError> {
        check_height(z)?;
        if z.abs() == 1.0 {
            return Ok(0.0);
        }
        Ok(self.s(self.u_of_z(z)).max(0.0).sqrt())
    }

    /// `dr/dz`; infinite at the poles.
    pub fn radius_derivative(&self, z: f64) -> Result<f64, StarError> {
        let r = self.radius(z)?;
        Ok(self.ds(self.u_of_z(z)) / (2.0 * self.f * r))
    }

    /// Surface area per unit `phi` and `z`, in equatorial radii squared.
    pub fn area_element(&self, z: f64) -> Result<f64, StarError> {
        check_height(z)?;
        let u = self.u_of_z(z);
        let ds = self.ds(u);
        Ok((self.s(u).max(0.0) + ds * ds / 4.0).sqrt() / self.f)
    }

    /// Spherical radius of the point at cylindrical `(r, z)`.
    pub fn spherical_radius_rz(&self, r: f64, z: f64) -> f64 {
        r.hypot(self.u_of_z(z))
    }

    /// Spherical radius of the surface at polar angle `theta`.
    pub fn spherical_radius(&self, theta: f64) -> f64 {
        if self.is_near_spherical() {
            let c = theta.cos();
            return 1.0 / (1.0 + self.omega * self.omega * c * c).sqrt();
        }
        let w = self.w;
        let sine = theta.sin();
        if sine == 0.0 {
            // Polar radius.
            return (w - 1.0) / w;
        }
        let arg = (1.5 * 3.0_f64.sqrt() * (w - 1.0) * sine / w.powf(1.5)).clamp(-1.0, 1.0);
        2.0 * (w / 3.0).sqrt() * (arg.asin() / 3.0).sin() / sine
    }

    /// Set the viewing inclination and recompute the height bound `z1`.
    pub fn set_inclination(&mut self, angle: f64) -> Result<f64, StarError> {
        if !(angle.is_finite() && (0.0..=FRAC_PI_2).contains(&angle)) {
            return Err(StarError::domain(format!(
                "inclination = {angle} must lie in [0, pi/2]"
            )));
        }
        let (sin, cos) = angle.sin_cos();
        let z1 = self.height_bound(angle, sin, cos)?;
        debug!(omega = self.omega, inclination = angle, z1, "set inclination");
        self.inclination = Some(Inclination {
            angle,
            sin,
            cos,
            z1,
        });
        Ok(z1)
    }

    fn require_inclination(&self) -> Result<Inclination, StarError> {
        self.inclination
            .ok_or_else(|| StarError::State("no inclination has been set".to_string()))
    }

    /// `z1` of the current inclination.
    pub fn integration_bound(&self) -> Result<f64, StarError> {
        Ok(self.require_inclination()?.z1)
    }

    fn height_bound(&self, angle: f64, sin: f64, cos: f64) -> Result<f64, StarError> {
        if self.is_spherical() {
            return Ok(sin);
        }
        if sin == 0.0 {
            return Ok(0.0);
        }
        if angle == FRAC_PI_2 {
            return Ok(1.0);
        }
        if self.is_near_spherical() {
            // Highest limb point of the spheroid.
            let e = self.omega * self.omega;
            let z1 = self.f * sin / ((1.0 + e) * (1.0 + e * cos * cos)).sqrt();
            return Ok(z1.min(1.0));
        }

        let w = self.w;
        let (w2, w3) = (w * w, w * w * w);
        let t = (sin / cos).powi(2);
        let g = -2.0 + 4.0 * w - 2.0 * w2 + w3;
        let coeffs = [
            -1.0 - t,
            6.0 * (1.0 + t) * w,
            -15.0 * (1.0 + t) * w2,
            1.0 - 2.0 * w + w2 + 20.0 * w3 + 4.0 * t * (-1.0 + 2.0 * w - w2 + 5.0 * w3),
            -(w * (4.0 - 8.0 * w + 4.0 * w2 + 15.0 * w3
                + 3.0 * t * (-4.0 + 8.0 * w - 4.0 * w2 + 5.0 * w3))),
            6.0 * w2 * (1.0 - 2.0 * w + w2 + w3 + t * g),
            -(t * g * g) - w3 * (4.0 - 8.0 * w + 4.0 * w2 + w3),
            (w - 1.0).powi(2) * w2 * w2,
        ];

        let roots = real_roots_in(&coeffs, -BOUND_ROOT_SLACK, 1.0 + BOUND_ROOT_SLACK)?;
        let Some(&s) = roots.first() else {
            return Err(StarError::RootFinding(format!(
                "no root in [0, 1] for the height bound at omega = {}, inclination = {angle}",
                self.omega
            )));
        };
        if roots.len() > 1 {
            debug!(?roots, "height-bound polynomial has several roots in [0, 1]");
        }
        let s = s.clamp(0.0, 1.0);
        let u2 = -((s - 1.0) * (s + s * s + (w - 1.0).powi(2) - 2.0 * s * w)) / (s - w).powi(2);
        let z1 = self.z_of_u(u2.max(0.0).sqrt()).min(1.0);
        Ok(self.refine_height_bound(z1, sin, cos))
    }

    /// `cos(i)·s'(u) + 2 sin(i)·sqrt(s(u))`: zero where `b = a`, positive
    /// below `z1` and negative above.
    fn limb_residual(&self, z: f64, sin: f64, cos: f64) -> f64 {
        let u = self.u_of_z(z);
        cos * self.ds(u) + 2.0 * sin * self.s(u).max(0.0).sqrt()
    }

    /// Secant polish of the polynomial root. The conversion from the root to
    /// `z1` loses digits for slowly rotating stars.
    fn refine_height_bound(&self, z1: f64, sin: f64, cos: f64) -> f64 {
        let r0 = self.limb_residual(z1, sin, cos);
        let (mut a, mut ra) = (z1, r0);
        let mut b = if z1 < 1.0 - SECANT_STEP {
            z1 + SECANT_STEP
        } else {
            z1 - SECANT_STEP
        };
        let mut rb = self.limb_residual(b, sin, cos);
        for _ in 0..MAX_SECANT_STEPS {
            if rb == ra {
                break;
            }
            let c = b - rb * (b - a) / (rb - ra);
            if !(c > 0.0 && c < 1.0) {
                break;
            }
            (a, ra) = (b, rb);
            (b, rb) = (c, self.limb_residual(c, sin, cos));
            if (b - a).abs() < 1e-15 {
                break;
            }
        }
        if rb.abs() <= r0.abs() { b } else { z1 }
    }

    /// Coefficients `(a, b)` of `mu = a cos(phi) + b` at height `z`.
    pub fn angle_coefficients(&self, z: f64) -> Result<(f64, f64), StarError> {
        let inc = self.require_inclination()?;
        check_height(z)?;
        if z.abs() == 1.0 {
            // The normal at a pole is the rotation axis.
            return Ok((0.0, z.signum() * inc.cos));
        }
        let d = self.f * self.radius_derivative(z)?;
        let q = (1.0 + d * d).sqrt();
        Ok((inc.sin / q, -inc.cos * d / q))
    }

    /// `cos(phi)` of the limb at height `z`, or `None` when the star is seen
    /// pole-on and no limb crosses the ring.
    pub fn cos_phi_boundary(&self, z: f64) -> Result<Option<f64>, StarError> {
        let inc = self.require_inclination()?;
        check_height(z)?;
        if inc.sin == 0.0 {
            return Ok(None);
        }
        if z == inc.z1 {
            return Ok(Some(-1.0));
        }
        if z == -inc.z1 {
            return Ok(Some(1.0));
        }
        let d = self.f * self.radius_derivative(z)?;
        Ok(Some((d * inc.cos / inc.sin).clamp(-1.0, 1.0)))
    }
}

fn check_height(z: f64) -> Result<(), StarError> {
    if z.is_nan() || z.abs() > 1.0 {
        return Err(StarError::domain(format!(
            "height z = {z} is outside [-1, 1]"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_rotating_star_is_the_unit_sphere() {
        let mut s = RocheSurface::new(0.0).unwrap();
        assert!(s.is_spherical());
        for &z in &[-0.9, -0.3, 0.0, 0.5, 0.99] {
            let r = s.radius(z).unwrap();
            assert!((r - (1.0 - z * z).sqrt()).abs() < 1e-14);
            assert!((s.area_element(z).unwrap() - 1.0).abs() < 1e-14);
            assert!((s.spherical_radius_rz(r, z) - 1.0).abs() < 1e-14);
        }
        assert_eq!(s.radius(1.0).unwrap(), 0.0);

        for &i in &[0.0, 0.4, 1.1, FRAC_PI_2] {
            let z1 = s.set_inclination(i).unwrap();
            assert!((z1 - i.sin()).abs() < 1e-15);
            let (a, b) = s.angle_coefficients(0.6).unwrap();
            assert!((a - i.sin() * 0.8).abs() < 1e-12);
            assert!((b - i.cos() * 0.6).abs() < 1e-12);
        }
    }

    #[test]
    fn rotating_star_has_unit_equator_and_flattened_poles() {
        let s = RocheSurface::new(0.6).unwrap();
        assert!((s.radius(0.0).unwrap() - 1.0).abs() < 1e-12);
        assert!(s.s(1.0 / s.flattening()).abs() < 1e-12);
        assert!((s.spherical_radius(0.0) - 1.0 / s.flattening()).abs() < 1e-12);
        assert!((s.spherical_radius(FRAC_PI_2) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn both_spherical_radius_forms_agree() {
        for &omega in &[0.3, 0.6, 0.9] {
            let s = RocheSurface::new(omega).unwrap();
            for &z in &[0.0, 0.3, 0.8, 0.99] {
                let r = s.radius(z).unwrap();
                let theta = r.atan2(s.u_of_z(z));
                let a = s.spherical_radius_rz(r, z);
                let b = s.spherical_radius(theta);
                assert!((a - b).abs() < 1e-12, "omega={omega} z={z}: {a} vs {b}");
            }
        }
    }

    #[test]
    fn radius_derivative_matches_finite_difference() {
        let s = RocheSurface::new(0.7).unwrap();
        let h = 1e-6;
        for &z in &[-0.7, 0.1, 0.6] {
            let fd = (s.radius(z + h).unwrap() - s.radius(z - h).unwrap()) / (2.0 * h);
            assert!((s.radius_derivative(z).unwrap() - fd).abs() < 1e-6);
        }
    }

    #[test]
    fn limb_closes_exactly_at_the_height_bound() {
        for &omega in &[0.3, 0.6, 0.9] {
            let mut s = RocheSurface::new(omega).unwrap();
            for &i in &[0.3, 0.7, 1.2] {
                let z1 = s.set_inclination(i).unwrap();
                assert!(z1 > 0.0 && z1 < 1.0);
                // mu(phi = pi) = b − a vanishes at z1 and is positive above.
                let (a, b) = s.angle_coefficients(z1).unwrap();
                assert!((b - a).abs() < 1e-7, "omega={omega} i={i}: {}", b - a);
                let (a, b) = s.angle_coefficients(z1 + 1e-3).unwrap();
                assert!(b - a > 0.0);
                assert_eq!(s.cos_phi_boundary(z1).unwrap(), Some(-1.0));
            }
        }

        let mut s = RocheSurface::new(0.6).unwrap();
        let z1 = s.set_inclination(0.7).unwrap();
        assert!((z1 - 0.564008).abs() < 1e-5, "{z1}");
    }

    #[test]
    fn slow_rotation_stays_close_to_the_sphere() {
        for &omega in &[1e-9, 1e-7, 1e-4] {
            let s = RocheSurface::new(omega).unwrap();
            assert!(s.is_near_spherical());
            let r = s.radius(0.5).unwrap();
            assert!((r - 0.75_f64.sqrt()).abs() < 1e-6, "omega={omega}: {r}");
            assert!((s.radius(0.0).unwrap() - 1.0).abs() < 1e-12);
            assert!((s.area_element(0.3).unwrap() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn height_bound_is_accurate_for_slow_rotation() {
        for &omega in &[1e-9, 1e-3, 3e-3, 1e-2, 3e-2] {
            let mut s = RocheSurface::new(omega).unwrap();
            for &i in &[0.3, 1.0, 1.5] {
                let z1 = s.set_inclination(i).unwrap();
                assert!((z1 - i.sin()).abs() < omega * omega, "omega={omega} i={i}: {z1}");
                let (a, b) = s.angle_coefficients(z1).unwrap();
                assert!((b - a).abs() < 1e-7, "omega={omega} i={i}: {}", b - a);
            }
        }
    }

    #[test]
    fn height_bound_special_inclinations() {
        let mut s = RocheSurface::new(0.5).unwrap();
        assert_eq!(s.set_inclination(0.0).unwrap(), 0.0);
        assert_eq!(s.cos_phi_boundary(0.2).unwrap(), None);
        assert_eq!(s.set_inclination(FRAC_PI_2).unwrap(), 1.0);
        assert_eq!(s.integration_bound().unwrap(), 1.0);
    }

    #[test]
    fn invalid_inputs() {
        assert!(RocheSurface::new(1.0).is_err());
        assert!(RocheSurface::new(-0.1).is_err());
        let mut s = RocheSurface::new(0.5).unwrap();
        assert!(matches!(
            s.angle_coefficients(0.0),
            Err(StarError::State(_))
        ));
        assert!(s.set_inclination(2.0).is_err());
        assert!(s.radius(1.2).is_err());
        assert!(s.radius(f64::NAN).is_err());
    }
}
