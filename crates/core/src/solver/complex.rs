//! Checked complex arithmetic for the regime iterations.
//!
//! Roughness lengths and the Obukhov length can leave the positive reals
//! mid-iteration (a negative friction velocity, a negative `z/L` under the
//! unstable quarter power). Everything is carried as [`Complex64`] so those
//! passes stay defined, and the three genuine singularities are surfaced as
//! [`NumericFault`] instead of silently producing infinities.

use crate::error::NumericFault;
use num_complex::Complex64;

/// Complex zero
pub(crate) const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// Lift a real value onto the complex plane
#[inline]
pub(crate) fn real(value: f64) -> Complex64 {
    Complex64::new(value, 0.0)
}

/// Principal natural logarithm, faulting on exact zero
#[inline]
pub(crate) fn ln(z: Complex64) -> Result<Complex64, NumericFault> {
    if z == ZERO {
        return Err(NumericFault::LogOfZero);
    }
    Ok(z.ln())
}

/// Exponential, faulting when a finite argument overflows
#[inline]
pub(crate) fn exp(z: Complex64) -> Result<Complex64, NumericFault> {
    let result = z.exp();
    if z.is_finite() && !result.is_finite() {
        return Err(NumericFault::Overflow);
    }
    Ok(result)
}

/// Division, faulting on an exact-zero denominator
///
/// Uses Smith's scaling so that real operands divide exactly as `f64` and
/// `|c + di|²` never has to be formed.
pub(crate) fn div(numerator: Complex64, denominator: Complex64) -> Result<Complex64, NumericFault> {
    if denominator == ZERO {
        return Err(NumericFault::DivisionByZero);
    }
    let (a, b) = (numerator.re, numerator.im);
    let (c, d) = (denominator.re, denominator.im);

    if c.abs() >= d.abs() {
        let ratio = d / c;
        let scale = c + d * ratio;
        Ok(Complex64::new((a + b * ratio) / scale, (b - a * ratio) / scale))
    } else if d.abs() >= c.abs() {
        let ratio = c / d;
        let scale = c * ratio + d;
        Ok(Complex64::new((a * ratio + b) / scale, (b * ratio - a) / scale))
    } else {
        // At least one NaN component
        Ok(Complex64::new(f64::NAN, f64::NAN))
    }
}

/// True when the value has no imaginary component at all
#[inline]
pub(crate) fn is_real(z: Complex64) -> bool {
    z.im == 0.0
}
