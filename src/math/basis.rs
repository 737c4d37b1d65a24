//! Fixed polynomial basis of the limb-darkening fit.
//!
//! On every `mu` interval the fit is a linear combination of the monomials
//!
//! - `g_k(x) = x^k`, `k = 0..=4`.
//!
//! The disk integrator needs, for each basis function, the integral over the
//! azimuth `phi` of `mu · g_k(mu)` with `mu(phi) = a cos(phi) + b` (the extra `mu`
//! projects the surface element onto the sky). The antiderivatives of
//! `mu^1 … mu^5` are expanded binomially into antiderivatives of `cos^j(phi)`,
//! which are hard-coded here in multiple-angle form.
//!
//! Changing the basis means re-deriving `projected_antiderivatives`.

/// Number of basis functions active on one interval.
pub const BASIS_LEN: usize = 5;

/// Evaluate the basis `[1, x, x², x³, x⁴]` at `x`.
pub fn monomials(x: f64) -> [f64; BASIS_LEN] {
    let x2 = x * x;
    [1.0, x, x2, x2 * x, x2 * x2]
}

/// Dot product of a 5-coefficient block with the basis at `x`.
pub fn eval_block(block: &[f64], x: f64) -> f64 {
    block
        .iter()
        .zip(monomials(x))
        .map(|(c, g)| c * g)
        .sum()
}

/// Antiderivatives of `cos^j(phi)` for `j = 0..=5`, each vanishing at `phi = 0`.
fn cosine_power_antiderivatives(phi: f64) -> [f64; 6] {
    let s1 = phi.sin();
    let s2 = (2.0 * phi).sin();
    let s3 = (3.0 * phi).sin();
    let s4 = (4.0 * phi).sin();
    let s5 = (5.0 * phi).sin();
    [
        phi,
        s1,
        phi / 2.0 + s2 / 4.0,
        0.75 * s1 + s3 / 12.0,
        3.0 * phi / 8.0 + s2 / 4.0 + s4 / 32.0,
        5.0 * s1 / 8.0 + 5.0 * s3 / 48.0 + s5 / 80.0,
    ]
}

/// Antiderivatives with respect to `phi` of `mu^(k+1)`, `k = 0..=4`, where
/// `mu = a cos(phi) + b`.
///
/// Entry `k` belongs to basis function `x^k`, multiplied by the projection
/// factor `mu`.
pub fn projected_antiderivatives(phi: f64, a: f64, b: f64) -> [f64; BASIS_LEN] {
    let j = cosine_power_antiderivatives(phi);
    let (a2, b2) = (a * a, b * b);
    let (a3, b3) = (a2 * a, b2 * b);
    let (a4, b4) = (a2 * a2, b2 * b2);
    let (a5, b5) = (a4 * a, b4 * b);

    [
        b * j[0] + a * j[1],
        b2 * j[0] + 2.0 * a * b * j[1] + a2 * j[2],
        b3 * j[0] + 3.0 * a * b2 * j[1] + 3.0 * a2 * b * j[2] + a3 * j[3],
        b4 * j[0] + 4.0 * a * b3 * j[1] + 6.0 * a2 * b2 * j[2] + 4.0 * a3 * b * j[3] + a4 * j[4],
        b5 * j[0]
            + 5.0 * a * b4 * j[1]
            + 10.0 * a2 * b3 * j[2]
            + 10.0 * a3 * b2 * j[3]
            + 5.0 * a4 * b * j[4]
            + a5 * j[5],
    ]
}
