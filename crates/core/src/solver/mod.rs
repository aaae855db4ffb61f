//! Bulk transfer solver
//!
//! Estimates open-water evaporation from one observation with the
//! aerodynamic bulk mass-transfer method:
//!
//! ```text
//! E = ρ_air × Ce × (q_sat − q_air) × U × Δt        (mm per timestep)
//! ```
//!
//! The transfer coefficient Ce is found by iterating the Monin-Obukhov
//! similarity equations three times, once per stability regime, and taking
//! the first physically consistent result in the order stable, unstable,
//! neutral.
//!
//! # Phases
//!
//! 0. Validate the observation and compute [`DerivedQuantities`]
//! 1. Stable iteration
//! 2. Unstable iteration
//! 3. Neutral iteration
//! 4. Regime selection and evaporation
//!
//! Nothing is shared between calls, so the solver can be fanned out across
//! threads without synchronization (see [`solve_all`]).
//!
//! # Scientific References
//!
//! - Charnock, H. (1955). "Wind stress on a water surface."
//!   Q. J. R. Meteorol. Soc. 81:639-640.
//! - Brutsaert, W. (1982). "Evaporation into the Atmosphere." Reidel.
//! - Verburg, P. and Antenucci, J.P. (2010). "Persistent unstable atmospheric
//!   boundary layer enhances sensible and latent heat loss in a tropical
//!   great lake: Lake Tanganyika." J. Geophys. Res. 115:D11109.

mod complex;
mod iteration;
mod regime;
mod selection;

pub use regime::StabilityRegime;
pub use selection::{select_regime, RegimeCandidate};

use crate::constants::ITERATIONS;
use crate::core_types::Observation;
use crate::error::ConvergenceFailure;
use crate::meteorology::DerivedQuantities;
use iteration::SurfaceLayer;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How a solver call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// A coefficient was selected from this regime
    Converged(StabilityRegime),
    /// At least one input was missing or unusable; nothing was computed
    MissingInput,
    /// No regime produced a usable coefficient
    AllRegimesFailed,
}

/// Output of one solver call
///
/// Invalid outcomes are reported as NaN, never as an error;
/// [`BulkTransferResult::status`] says why. Missing input, or a fault in
/// every regime, makes all four values NaN. When the neutral iteration
/// finished but its coefficient is unusable, VPD is still reported and the
/// stability is 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BulkTransferResult {
    /// Evaporation (mm per timestep)
    pub evaporation: f64,
    /// Bulk transfer coefficient Ce (dimensionless)
    pub transfer_coefficient: f64,
    /// Vapor pressure deficit (kPa)
    pub vapor_pressure_deficit: f64,
    /// Stability parameter z/L of the selected regime (0 for neutral)
    pub stability: f64,
    /// Outcome classification
    pub status: SolveStatus,
}

/// A usable solver result, without NaN sentinels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// Evaporation (mm per timestep)
    pub evaporation: f64,
    /// Bulk transfer coefficient Ce (dimensionless)
    pub transfer_coefficient: f64,
    /// Vapor pressure deficit (kPa)
    pub vapor_pressure_deficit: f64,
    /// Stability parameter z/L
    pub stability: f64,
    /// Regime the coefficient came from
    pub regime: StabilityRegime,
}

impl BulkTransferResult {
    fn invalid(status: SolveStatus) -> Self {
        Self {
            evaporation: f64::NAN,
            transfer_coefficient: f64::NAN,
            vapor_pressure_deficit: f64::NAN,
            stability: f64::NAN,
            status,
        }
    }

    /// All-NaN result for an observation with missing input
    pub fn missing_input() -> Self {
        Self::invalid(SolveStatus::MissingInput)
    }

    /// All-NaN result for an observation every regime aborted on
    pub fn all_regimes_failed() -> Self {
        Self::invalid(SolveStatus::AllRegimesFailed)
    }

    /// Regime of the selected coefficient, if any
    pub fn regime(&self) -> Option<StabilityRegime> {
        match self.status {
            SolveStatus::Converged(regime) => Some(regime),
            SolveStatus::MissingInput | SolveStatus::AllRegimesFailed => None,
        }
    }

    /// The result as an optional, for callers that do not want NaN
    pub fn estimate(&self) -> Option<Estimate> {
        self.regime().map(|regime| Estimate {
            evaporation: self.evaporation,
            transfer_coefficient: self.transfer_coefficient,
            vapor_pressure_deficit: self.vapor_pressure_deficit,
            stability: self.stability,
            regime,
        })
    }

    /// `(E, Ce, VPD, z/L)`
    pub fn values(&self) -> (f64, f64, f64, f64) {
        (
            self.evaporation,
            self.transfer_coefficient,
            self.vapor_pressure_deficit,
            self.stability,
        )
    }
}

/// Estimate evaporation for one set of measurements
///
/// # Arguments
///
/// * `wind_speed` - Wind speed (m/s)
/// * `pressure` - Air pressure (mb)
/// * `air_temperature` - Air temperature (°C)
/// * `skin_temperature` - Water surface temperature (°C)
/// * `relative_humidity` - Relative humidity (0-100)
/// * `sensor_height` - Sensor height above the water (m)
/// * `timestep` - Sampling interval (s)
///
/// # Returns
///
/// Evaporation (mm/timestep), Ce, VPD (kPa) and z/L. E and Ce are NaN when
/// the input is incomplete or no regime yields a usable coefficient.
pub fn solve(
    wind_speed: f64,
    pressure: f64,
    air_temperature: f64,
    skin_temperature: f64,
    relative_humidity: f64,
    sensor_height: f64,
    timestep: f64,
) -> BulkTransferResult {
    solve_observation(&Observation {
        timestamp: 0,
        wind_speed,
        pressure,
        air_temperature,
        skin_temperature,
        relative_humidity,
        sensor_height,
        timestep,
    })
}

/// Estimate evaporation for one observation
///
/// The observation's timestamp labels any diagnostics emitted on the way.
pub fn solve_observation(observation: &Observation) -> BulkTransferResult {
    let timestamp = observation.timestamp;

    if let Err(reason) = observation.validate() {
        debug!(timestamp, %reason, "One or more variables missing");
        return BulkTransferResult::missing_input();
    }

    let derived = DerivedQuantities::from_observation(observation);
    let [stable, unstable, neutral] = run_regimes(observation, &derived);

    let (selected, status) = match select_regime(&stable, &unstable, &neutral) {
        Some(selected) => (selected, SolveStatus::Converged(selected.regime)),
        // Neutral stays the fallback when it finished but its coefficient is unusable
        None if neutral.completed => {
            warn!(timestamp, "No stability regime produced a usable transfer coefficient");
            (&neutral, SolveStatus::AllRegimesFailed)
        }
        None => {
            warn!(timestamp, "No usable transfer coefficient and the neutral fallback aborted");
            return BulkTransferResult::all_regimes_failed();
        }
    };

    let ce = selected.transfer_coefficient;
    let evaporation = derived.air_density
        * ce
        * (derived.saturation_specific_humidity - derived.air_specific_humidity)
        * observation.wind_speed
        * observation.timestep;

    BulkTransferResult {
        evaporation,
        transfer_coefficient: ce,
        vapor_pressure_deficit: derived.vapor_pressure_deficit,
        stability: selected.stability,
        status,
    }
}

/// Candidates of all three regimes, in priority order
///
/// Exposes the intermediate results behind [`solve_observation`]. Returns
/// `None` for an observation that fails validation.
pub fn evaluate_regimes(observation: &Observation) -> Option<[RegimeCandidate; 3]> {
    observation.validate().ok()?;
    let derived = DerivedQuantities::from_observation(observation);
    Some(run_regimes(observation, &derived))
}

/// Solve many observations in parallel, preserving order
pub fn solve_all(observations: &[Observation]) -> Vec<BulkTransferResult> {
    observations.par_iter().map(solve_observation).collect()
}

fn run_regimes(observation: &Observation, derived: &DerivedQuantities) -> [RegimeCandidate; 3] {
    let layer = SurfaceLayer {
        sensor_height: observation.sensor_height,
        wind_speed: observation.wind_speed,
        derived,
    };
    StabilityRegime::PRIORITY.map(|regime| evaluate_regime(regime, &layer, observation.timestamp))
}

/// Iterate one regime and extract its candidate, absorbing any fault
fn evaluate_regime(regime: StabilityRegime, layer: &SurfaceLayer<'_>, timestamp: i64) -> RegimeCandidate {
    let outcome = iteration::iterate(regime, layer).and_then(|state| {
        RegimeCandidate::from_state(&state, layer).map_err(|fault| ConvergenceFailure {
            regime,
            iteration: ITERATIONS + 1,
            fault,
        })
    });

    match outcome {
        Ok(candidate) => candidate,
        Err(failure) => {
            warn!(
                timestamp,
                regime = %failure.regime,
                iteration = failure.iteration,
                fault = %failure.fault,
                "Could not converge"
            );
            RegimeCandidate::failed(regime)
        }
    }
}
