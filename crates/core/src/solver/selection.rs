//! Per-regime candidates and the priority cascade between them.

use super::complex;
use super::iteration::{RegimeState, SurfaceLayer};
use super::regime::StabilityRegime;
use crate::error::NumericFault;
use serde::{Deserialize, Serialize};

/// Outcome of one regime's iteration
///
/// A candidate whose `transfer_coefficient` is NaN was rejected: its
/// iteration faulted, its Obukhov length ended complex, or the sign of its
/// stability contradicts the regime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeCandidate {
    /// Regime that produced this candidate
    pub regime: StabilityRegime,
    /// Bulk transfer coefficient Ce (dimensionless), NaN when rejected
    pub transfer_coefficient: f64,
    /// Stability parameter z/L (real part); 0 for neutral, NaN on fault
    pub stability: f64,
    /// Final friction velocity u* (m/s, real part)
    pub friction_velocity: f64,
    /// Final humidity scale q* (kg/kg, real part); 0 for neutral
    pub humidity_scale: f64,
    /// Whether the iteration ran all its passes without a numerical fault
    pub completed: bool,
}

impl RegimeCandidate {
    /// Candidate of a regime whose iteration was aborted
    pub fn failed(regime: StabilityRegime) -> Self {
        Self {
            regime,
            transfer_coefficient: f64::NAN,
            stability: f64::NAN,
            friction_velocity: f64::NAN,
            humidity_scale: f64::NAN,
            completed: false,
        }
    }

    /// Whether this candidate can be selected
    pub fn is_usable(&self) -> bool {
        self.transfer_coefficient.is_finite()
    }

    /// Extract the candidate from a finished iteration
    ///
    /// The coefficient is only accepted when the Obukhov length is real and
    /// the sign of z/L matches the regime. A neutral coefficient that came out
    /// complex is rejected as well.
    pub(crate) fn from_state(
        state: &RegimeState,
        layer: &SurfaceLayer<'_>,
    ) -> Result<Self, NumericFault> {
        let regime = state.regime;
        let stability = state.stability(layer.sensor_height)?;

        let transfer_coefficient = if regime.uses_obukhov_length() {
            if complex::is_real(state.obukhov_length) && regime.accepts(stability.re) {
                state.coefficient(layer)?.re
            } else {
                f64::NAN
            }
        } else {
            let coefficient = state.coefficient(layer)?;
            if complex::is_real(coefficient) {
                coefficient.re
            } else {
                f64::NAN
            }
        };

        Ok(Self {
            regime,
            transfer_coefficient,
            stability: stability.re,
            friction_velocity: state.friction_velocity.re,
            humidity_scale: state.scaling_humidity.re,
            completed: true,
        })
    }
}

/// Pick the coefficient to report
///
/// A priority cascade, not a best fit: stable if usable, else unstable if
/// usable, else neutral. Returns `None` when none of the three is usable.
pub fn select_regime<'a>(
    stable: &'a RegimeCandidate,
    unstable: &'a RegimeCandidate,
    neutral: &'a RegimeCandidate,
) -> Option<&'a RegimeCandidate> {
    [stable, unstable, neutral]
        .into_iter()
        .find(|candidate| candidate.is_usable())
}
