//! Intersections of sight lines with the stellar surface.
//!
//! The view plane is spanned by `y` (perpendicular to the projected rotation
//! axis) and `u'` (along it), both in equatorial radii. A sight line through
//! `(u', y)` meets the surface where
//!
//! ```text
//! s(u) = x² + y²,   x = −u' cos(i) + (u − u' sin(i)) tan(i)
//! ```
//!
//! Eliminating the cubic root inside `s` gives a degree-6 polynomial in `u`.
//! Squaring introduces roots that lie on the other branches of the cubic, so
//! every candidate is checked against the surface equation itself. A nearly
//! spherical star is a spheroid and the condition is a quadratic.

use std::f64::consts::FRAC_PI_2;

use rayon::prelude::*;

use crate::error::StarError;
use crate::math::real_roots_in;
use crate::surface::roche::RocheSurface;

/// Largest `|s(u) − x² − y²|` accepted for a root on the surface.
pub const SURFACE_RESIDUAL_TOL: f64 = 1e-6;

impl RocheSurface {
    /// Scaled height `u` of the first surface point on the sight line through
    /// `(u_proj, y_proj)`, or `None` if the line misses the star.
    pub fn line_of_sight_intersection(
        &self,
        u_proj: f64,
        y_proj: f64,
    ) -> Result<Option<f64>, StarError> {
        let Some(inc) = self.inclination() else {
            return Err(StarError::State("no inclination has been set".to_string()));
        };
        if !(u_proj.is_finite() && y_proj.is_finite()) {
            return Err(StarError::domain(format!(
                "view-plane point ({u_proj}, {y_proj}) is not finite"
            )));
        }

        if inc.angle == FRAC_PI_2 {
            // Seen equator-on, u and u' coincide.
            let z = self.z_of_u(u_proj);
            if z.abs() > inc.z1 {
                return Ok(None);
            }
            let hit = y_proj.abs() <= self.radius(z)?;
            return Ok(hit.then_some(u_proj));
        }
        if self.is_near_spherical() {
            return Ok(self.spheroid_intersection(u_proj, y_proj, inc.sin, inc.cos));
        }

        let coeffs = self.sight_line_polynomial(u_proj, y_proj, inc.sin, inc.cos);
        let bound = 1.0 / self.flattening();
        let tan = inc.sin / inc.cos;
        let on_surface: Vec<f64> = real_roots_in(&coeffs, -bound, bound)?
            .into_iter()
            .filter(|&u| {
                let x = -u_proj * inc.cos + (u - u_proj * inc.sin) * tan;
                (self.s(u) - (x * x + y_proj * y_proj)).abs() < SURFACE_RESIDUAL_TOL
            })
            .collect();

        match on_surface.as_slice() {
            [_, far] => Ok(Some(*far)),
            _ => Ok(None),
        }
    }

    /// [`RocheSurface::line_of_sight_intersection`] for many view-plane points,
    /// in parallel.
    pub fn line_of_sight_intersections(
        &self,
        points: &[(f64, f64)],
    ) -> Result<Vec<Option<f64>>, StarError> {
        points
            .par_iter()
            .map(|&(u_proj, y_proj)| self.line_of_sight_intersection(u_proj, y_proj))
            .collect()
    }

    /// Larger root of
    /// `(1 + omega² + tan²i) u² − 2 tan(i) sec(i) u' u + sec²(i) u'² + y² − 1 = 0`.
    fn spheroid_intersection(&self, up: f64, y: f64, sin: f64, cos: f64) -> Option<f64> {
        let t = sin / cos;
        let sec = 1.0 / cos;
        let a = 1.0 + self.omega() * self.omega() + t * t;
        let b = -2.0 * t * sec * up;
        let c = (up * sec).powi(2) + y * y - 1.0;
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        Some((-b + disc.sqrt()) / (2.0 * a))
    }

    /// Coefficients, highest degree first, of the sight-line polynomial in `u`.
    fn sight_line_polynomial(&self, up: f64, y: f64, sin: f64, cos: f64) -> [f64; 7] {
        let o2 = self.omega() * self.omega();
        let o4 = o2 * o2;
        let s = 1.0 / cos;
        let t = sin / cos;
        let (s2, t2) = (s * s, t * t);
        let (s3, s4) = (s2 * s, s2 * s2);
        let (t3, t4) = (t2 * t, t2 * t2);
        let (up2, y2) = (up * up, y * y);
        let (up3, up4) = (up2 * up, up2 * up2);
        let y4 = y2 * y2;
        let k = 4.0 + 4.0 * o2 + o4;

        [
            o4 * t4 * (1.0 + t2) / 4.0,
            -(o4 * s * t3 * (2.0 + 3.0 * t2) * up) / 2.0,
            t2 * (-2.0 * o4 - 2.0 * o4 * t2 - 4.0 * o2 * (1.0 + t2)) / 4.0
                + t2 * (6.0 * o4 * s2 + 15.0 * o4 * s2 * t2) * up2 / 4.0
                + t2 * (2.0 * o4 + 3.0 * o4 * t2) * y2 / 4.0,
            s * t * (-o4 * s2 - 5.0 * o4 * s2 * t2) * up3
                + up * (s * t * (o4 + 2.0 * o4 * t2 + o2 * (2.0 + 4.0 * t2))
                    + s * t * (-o4 - 3.0 * o4 * t2) * y2),
            1.0 + o2 + o4 / 4.0 + t2 + o2 * t2 + o4 * t2 / 4.0
                + (o4 * s4 / 4.0 + 15.0 * o4 * s4 * t2 / 4.0) * up4
                + (-o2 - o4 / 2.0 - 2.0 * o2 * t2 - o4 * t2) * y2
                + (o4 / 4.0 + 3.0 * o4 * t2 / 4.0) * y4
                + up2
                    * (-o2 * s2 - o4 * s2 / 2.0 - 6.0 * o2 * s2 * t2 - 3.0 * o4 * s2 * t2
                        + (o4 * s2 / 2.0 + 9.0 * o4 * s2 * t2 / 2.0) * y2),
            -1.5 * o4 * s4 * s * t * up4 * up
                + up3 * (s * (8.0 * o2 * s2 + 4.0 * o4 * s2) * t / 2.0 - 3.0 * o4 * s3 * t * y2)
                + up * (-k * s * t / 2.0 + (8.0 * o2 + 4.0 * o4) * s * t * y2 / 2.0
                    - 1.5 * o4 * s * t * y4),
            -1.0 + o4 * s4 * s2 * up4 * up2 / 4.0 + k * y2 / 4.0
                + (-4.0 * o2 - 2.0 * o4) * y4 / 4.0
                + o4 * y4 * y2 / 4.0
                + up4 * ((-4.0 * o2 * s4 - 2.0 * o4 * s4) / 4.0 + 3.0 * o4 * s4 * y2 / 4.0)
                + up2
                    * (k * s2 / 4.0 + (-8.0 * o2 * s2 - 4.0 * o4 * s2) * y2 / 4.0
                        + 3.0 * o4 * s2 * y4 / 4.0),
        ]
    }
}
