//! Polynomial root finding via companion matrix eigenvalues
//!
//! Reference: Numerical Recipes Ch. 9.5. Eigenvalues come from nalgebra's real Schur
//! decomposition, then each root is polished with Newton-Raphson.

use crate::error::{DspError, DspResult};
use nalgebra::{linalg::Schur, DMatrix};
use num_complex::Complex64;
use tracing::debug;

/// Iteration cap for the Schur decomposition
const MAX_SCHUR_ITERATIONS: usize = 10_000;

/// Newton-Raphson steps per root
const POLISH_ITERATIONS: usize = 20;

/// Largest accepted relative residual |p(r)| / Σ|cᵢ||r|ⁱ
const RESIDUAL_TOLERANCE: f64 = 1e-6;

/// Find the roots of a polynomial
///
/// # Arguments
/// * `coefficients` - Coefficients in descending powers: c[0]·z^n + … + c[n]
///
/// # Returns
/// n roots (multiplicity by repetition), where n is the degree after removing
/// leading zero coefficients
///
/// # Errors
/// * `InvalidArgument` for an empty, all-zero or non-finite coefficient sequence
/// * `NumericalInstability` when the eigenvalue iteration fails or a root does not
///   satisfy the polynomial
pub fn roots(coefficients: &[f64]) -> DspResult<Vec<Complex64>> {
    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(DspError::invalid("polynomial coefficients must be finite"));
    }

    let first = coefficients
        .iter()
        .position(|&c| c != 0.0)
        .ok_or_else(|| DspError::invalid("the zero polynomial has no finite root set"))?;
    let last = coefficients
        .iter()
        .rposition(|&c| c != 0.0)
        .unwrap_or(first);

    // Trailing zero coefficients are exact roots at the origin
    let zero_roots = coefficients.len() - 1 - last;
    let poly = &coefficients[first..=last];
    let degree = poly.len() - 1;

    debug!(
        "roots: degree {} ({} at origin)",
        degree + zero_roots,
        zero_roots
    );

    let mut found = vec![Complex64::new(0.0, 0.0); zero_roots];

    match degree {
        0 => {}
        1 => found.push(Complex64::new(-poly[1] / poly[0], 0.0)),
        _ => found.extend(companion_roots(poly)?),
    }

    Ok(found)
}

/// Roots of a polynomial with non-zero leading and trailing coefficients (degree >= 2)
fn companion_roots(poly: &[f64]) -> DspResult<Vec<Complex64>> {
    let degree = poly.len() - 1;
    let lead = poly[0];

    // Companion matrix: -c[i]/c[0] in the first row, ones on the subdiagonal
    let mut companion = DMatrix::<f64>::zeros(degree, degree);
    for i in 0..degree {
        companion[(0, i)] = -poly[i + 1] / lead;
    }
    for i in 1..degree {
        companion[(i, i - 1)] = 1.0;
    }

    let schur = Schur::try_new(companion, f64::EPSILON, MAX_SCHUR_ITERATIONS).ok_or_else(|| {
        DspError::NumericalInstability(format!(
            "companion matrix eigenvalues did not converge (degree {})",
            degree
        ))
    })?;

    let mut found: Vec<Complex64> = schur
        .complex_eigenvalues()
        .iter()
        .map(|e| Complex64::new(e.re, e.im))
        .collect();

    let reversed: Vec<f64> = poly.iter().rev().copied().collect();

    for root in found.iter_mut() {
        *root = polish_root(poly, &reversed, *root);

        let residual = relative_residual(poly, &reversed, *root);
        if !root.is_finite() || (residual.is_finite() && residual > RESIDUAL_TOLERANCE) {
            return Err(DspError::NumericalInstability(format!(
                "root {} has relative residual {:e}",
                root, residual
            )));
        }
    }

    Ok(found)
}

/// Evaluate a polynomial and its derivative at z (Horner's method)
fn eval_polynomial(poly: &[f64], z: Complex64) -> (Complex64, Complex64) {
    let mut p_val = Complex64::new(0.0, 0.0);
    let mut dp_val = Complex64::new(0.0, 0.0);

    for &coeff in poly {
        dp_val = dp_val * z + p_val;
        p_val = p_val * z + coeff;
    }

    (p_val, dp_val)
}

/// Polynomial and evaluation point to use for a root at z
///
/// Outside the unit circle this is the reversed polynomial zⁿ·p(1/z) at 1/z, whose
/// value is p(z)/zⁿ. Terms then stay bounded by the coefficients.
fn scaled_form<'a>(
    poly: &'a [f64],
    reversed: &'a [f64],
    z: Complex64,
) -> (&'a [f64], Complex64) {
    if z.norm() > 1.0 {
        (reversed, z.inv())
    } else {
        (poly, z)
    }
}

/// |p(z)| relative to the magnitude of its individual terms
fn relative_residual(poly: &[f64], reversed: &[f64], z: Complex64) -> f64 {
    let (coeffs, w) = scaled_form(poly, reversed, z);
    let (p_val, _) = eval_polynomial(coeffs, w);
    let r = w.norm();
    let scale = coeffs.iter().fold(0.0, |acc, &c| acc * r + c.abs());

    if scale == 0.0 {
        p_val.norm()
    } else {
        p_val.norm() / scale
    }
}

/// Newton-Raphson polishing in the scaled form of the root
fn polish_root(poly: &[f64], reversed: &[f64], z: Complex64) -> Complex64 {
    if z.norm() > 1.0 {
        newton(reversed, z.inv()).inv()
    } else {
        newton(poly, z)
    }
}

/// Newton-Raphson iteration; a step is kept only if it lowers |p(z)|
fn newton(poly: &[f64], mut z: Complex64) -> Complex64 {
    let (mut p_val, mut dp_val) = eval_polynomial(poly, z);

    for _ in 0..POLISH_ITERATIONS {
        if dp_val.norm() < 1e-30 || p_val.norm() == 0.0 {
            break;
        }

        let candidate = z - p_val / dp_val;
        let (p_next, dp_next) = eval_polynomial(poly, candidate);

        let improved = p_next.norm() < p_val.norm();
        if !improved {
            break;
        }

        z = candidate;
        p_val = p_next;
        dp_val = dp_next;
    }

    z
}
