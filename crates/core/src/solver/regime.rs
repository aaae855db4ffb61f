//! Atmospheric stability regimes
//!
//! The surface layer over open water is either stably stratified (air warmer
//! than the water, `z/L > 0`), unstably stratified (`z/L < 0`) or neutral.
//! Each regime contributes its own Monin-Obukhov stability correction to the
//! log-law profiles and its own acceptance rule for the resulting bulk
//! transfer coefficient.
//!
//! # Stability Functions
//!
//! Stable (linear form):
//! ```text
//! ψ_m = ψ_q = −5.2 z/L
//! ```
//!
//! Unstable (Businger-Dyer form), with `x = (1 − 16 z/L)^¼`:
//! ```text
//! ψ_m = 2 ln((1 + x)/2) + ln((1 + x²)/2) − 2 atan(x) + π/2
//! ψ_q = 2 ln((1 + x²)/2)
//! ```
//!
//! Neutral: no correction.
//!
//! # Scientific References
//!
//! - Businger, J.A. et al. (1971). "Flux-profile relationships in the
//!   atmospheric surface layer." J. Atmos. Sci. 28:181-189.
//! - Dyer, A.J. (1974). "A review of flux-profile relationships."
//!   Boundary-Layer Meteorol. 7:363-372.
//! - Brutsaert, W. (1982). "Evaporation into the Atmosphere." Reidel.

use super::complex::{self, real, ZERO};
use crate::constants::{STABLE_SLOPE, UNSTABLE_COEFFICIENT};
use crate::error::NumericFault;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::fmt;

/// Atmospheric stratification regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StabilityRegime {
    /// Air warmer than the surface; turbulence suppressed (`z/L > 0`)
    Stable,
    /// Surface warmer than the air; buoyancy-enhanced turbulence (`z/L < 0`)
    Unstable,
    /// No buoyancy effect (`z/L = 0`)
    Neutral,
}

impl StabilityRegime {
    /// All regimes, in selection priority order
    pub const PRIORITY: [StabilityRegime; 3] = [
        StabilityRegime::Stable,
        StabilityRegime::Unstable,
        StabilityRegime::Neutral,
    ];

    /// Lowercase label used in diagnostics
    pub fn label(self) -> &'static str {
        match self {
            StabilityRegime::Stable => "stable",
            StabilityRegime::Unstable => "unstable",
            StabilityRegime::Neutral => "neutral",
        }
    }

    /// Whether this regime carries a Monin-Obukhov length at all
    pub fn uses_obukhov_length(self) -> bool {
        !matches!(self, StabilityRegime::Neutral)
    }

    /// Stability corrections `(ψ_m, ψ_q)` for momentum and vapor
    ///
    /// # Arguments
    ///
    /// * `sensor_height` - Measurement height z (m)
    /// * `obukhov_length` - Current Monin-Obukhov length L (m)
    ///
    /// # Errors
    ///
    /// Faults when `L` is exactly zero, or when the unstable form hits a
    /// logarithm of zero.
    pub(crate) fn stability_corrections(
        self,
        sensor_height: f64,
        obukhov_length: Complex64,
    ) -> Result<(Complex64, Complex64), NumericFault> {
        match self {
            StabilityRegime::Stable => {
                let psi = complex::div(real(-STABLE_SLOPE * sensor_height), obukhov_length)?;
                Ok((psi, psi))
            }
            StabilityRegime::Unstable => {
                let zeta = complex::div(real(sensor_height), obukhov_length)?;
                let x = (real(1.0) - UNSTABLE_COEFFICIENT * zeta).powf(0.25);
                let x2 = x * x;

                let psi_m = 2.0 * complex::ln((real(1.0) + x) / 2.0)?
                    + complex::ln((real(1.0) + x2) / 2.0)?
                    - 2.0 * x.atan()
                    + FRAC_PI_2;
                let psi_q = 2.0 * complex::ln((real(1.0) + x2) / 2.0)?;
                Ok((psi_m, psi_q))
            }
            StabilityRegime::Neutral => Ok((ZERO, ZERO)),
        }
    }

    /// Whether a stability parameter `z/L` is consistent with this regime
    ///
    /// Neutral accepts anything; its stability is reported as zero.
    pub fn accepts(self, stability: f64) -> bool {
        match self {
            StabilityRegime::Stable => stability > 0.0,
            StabilityRegime::Unstable => stability < 0.0,
            StabilityRegime::Neutral => true,
        }
    }
}

impl fmt::Display for StabilityRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
