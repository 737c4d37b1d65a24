//! Polynomial roots from the eigenvalues of a scaled companion matrix.
//!
//! Coefficients are given highest degree first (the `numpy.roots` order).
//!
//! Numerical notes:
//! - Leading zero coefficients are stripped, so a polynomial whose top terms
//!   vanish (e.g. at zero inclination) degrades to a lower degree.
//! - Trailing zeros are factored out as exact zero roots.
//! - Before building the companion matrix the variable is rescaled,
//!   `x = σ·v` with `σ = max_k |c_k / c_0|^(1/k)`, which maps every root into
//!   the unit disk and keeps the companion entries bounded by 1. Without this,
//!   the high-degree coefficients of the Roche polynomials (`tan(i)^6`,
//!   `w^8`) make the unscaled matrix badly balanced.
//! - The scaled roots lie in `|v| <= 2`, so the companion matrix is shifted
//!   by `3·I` before the decomposition. nalgebra's deflation test is relative
//!   to the neighbouring diagonal entries; on the bare companion matrix those
//!   can vanish (roots in `±` pairs, as for a sight line through `u' = 0`) and
//!   the QR sweep never deflates. On the shifted matrix the test is relative
//!   to the matrix norm.
//! - Eigenvalues come from nalgebra's real Schur decomposition with a bounded
//!   iteration count, retried with looser tolerances before giving up.

use nalgebra::{Complex, DMatrix, linalg::Schur};

use crate::error::StarError;

/// Iteration cap of the Schur decomposition.
const MAX_SCHUR_ITERATIONS: usize = 10_000;

/// Deflation tolerances tried in turn.
const SCHUR_TOLERANCES: [f64; 3] = [f64::EPSILON, 1e-14, 1e-12];

/// Diagonal shift applied to the scaled companion matrix.
const COMPANION_SHIFT: f64 = 3.0;

/// Relative imaginary-part tolerance below which a root is considered real.
pub const REAL_ROOT_TOL: f64 = 1e-8;

/// All complex roots of `coeffs[0]·x^n + … + coeffs[n]`.
pub fn polynomial_roots(coeffs: &[f64]) -> Result<Vec<Complex<f64>>, StarError> {
    if let Some(bad) = coeffs.iter().find(|c| !c.is_finite()) {
        return Err(StarError::RootFinding(format!(
            "non-finite polynomial coefficient {bad}"
        )));
    }
    let Some(lead) = coeffs.iter().position(|&c| c != 0.0) else {
        return Err(StarError::RootFinding(
            "all polynomial coefficients vanish".to_string(),
        ));
    };
    let last = coeffs.iter().rposition(|&c| c != 0.0).unwrap_or(lead);
    let zero_roots = coeffs.len() - 1 - last;
    let core = &coeffs[lead..=last];
    let degree = core.len() - 1;

    let mut roots = vec![Complex::new(0.0, 0.0); zero_roots];
    if degree == 0 {
        return Ok(roots);
    }

    let monic: Vec<f64> = core[1..].iter().map(|c| c / core[0]).collect();
    let sigma = monic
        .iter()
        .enumerate()
        .map(|(k, c)| c.abs().powf(1.0 / (k as f64 + 1.0)))
        .fold(0.0_f64, f64::max);
    let sigma = if sigma > 0.0 && sigma.is_finite() { sigma } else { 1.0 };

    if degree == 1 {
        roots.push(Complex::new(-monic[0], 0.0));
        return Ok(roots);
    }

    let mut companion = DMatrix::<f64>::zeros(degree, degree);
    let mut scale = 1.0;
    for (k, c) in monic.iter().enumerate() {
        scale *= sigma;
        companion[(0, k)] = -c / scale;
    }
    for i in 1..degree {
        companion[(i, i - 1)] = 1.0;
    }
    for i in 0..degree {
        companion[(i, i)] += COMPANION_SHIFT;
    }

    for &eps in &SCHUR_TOLERANCES {
        if let Some(schur) = Schur::try_new(companion.clone(), eps, MAX_SCHUR_ITERATIONS) {
            let shift = Complex::new(COMPANION_SHIFT, 0.0);
            roots.extend(
                schur
                    .complex_eigenvalues()
                    .iter()
                    .map(|z| (*z - shift) * sigma),
            );
            return Ok(roots);
        }
    }
    Err(StarError::RootFinding(format!(
        "Schur decomposition of a degree-{degree} companion matrix did not converge"
    )))
}

/// Whether a complex root is real within [`REAL_ROOT_TOL`].
pub fn is_real(root: &Complex<f64>) -> bool {
    root.im.abs() <= REAL_ROOT_TOL * root.re.abs().max(1.0)
}

/// Real roots lying in `[lo, hi]`, in ascending order.
pub fn real_roots_in(coeffs: &[f64], lo: f64, hi: f64) -> Result<Vec<f64>, StarError> {
    let mut out: Vec<f64> = polynomial_roots(coeffs)?
        .iter()
        .filter(|z| is_real(z))
        .map(|z| z.re)
        .filter(|&x| x >= lo && x <= hi)
        .collect();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Ok(out)
}
