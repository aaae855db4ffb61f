//! Fixed-point iteration of the surface-layer similarity equations.
//!
//! One generic loop serves all three regimes; the regime only decides which
//! stability corrections are applied and whether an Obukhov length is
//! carried. Each pass updates, in order, using values from earlier in the
//! same pass:
//!
//! ```text
//! 1. u*  = K (U − u*) / (ln(z/z0) − ψ_m)          neutral: K U / ln(z/z0)
//! 2. θ*  = K (θ_air − θ_skin) / (ln(z/z0t) − ψ_t)
//! 3. q*  = K (q_air − q_sat) / (ln(z/z0q) − ψ_q)
//! 4. ψ_m, ψ_q from z/L                              regime specific
//! 5. z0  = a u*²/g + 0.11 ν/u*                      Charnock + smooth flow
//! 6. z0q = 7.4 z0 exp(−2.25 (z0 u*/ν)^¼)
//! 7. L   = T_v u*² / (K g θ*)
//! ```
//!
//! Steps 2, 3, 4 and 7 are skipped for the neutral regime. The temperature
//! roughness length `z0t` is fixed by the seeding pass and `ψ_t` stays zero.

use super::complex::{self, real, ZERO};
use super::regime::StabilityRegime;
use crate::constants::{
    CHARNOCK, GRAVITY, ITERATIONS, SCALAR_ROUGHNESS_DECAY, SCALAR_ROUGHNESS_PREFACTOR,
    SEED_ROUGHNESS_LENGTH, SMOOTH_FLOW_COEFFICIENT, VON_KARMAN,
};
use crate::error::{ConvergenceFailure, NumericFault};
use crate::meteorology::DerivedQuantities;
use num_complex::Complex64;

/// Inputs shared by every pass of every regime for one observation
#[derive(Debug, Clone, Copy)]
pub(crate) struct SurfaceLayer<'a> {
    /// Sensor height z (m)
    pub(crate) sensor_height: f64,
    /// Wind speed U at sensor height (m/s)
    pub(crate) wind_speed: f64,
    /// Thermodynamic state of the observation
    pub(crate) derived: &'a DerivedQuantities,
}

impl SurfaceLayer<'_> {
    /// `ln(z / length)` on the complex plane
    fn log_height_ratio(&self, length: Complex64) -> Result<Complex64, NumericFault> {
        complex::ln(complex::div(real(self.sensor_height), length)?)
    }

    /// Scalar (vapor/temperature) roughness length for a momentum roughness
    /// length and friction velocity
    fn scalar_roughness(
        &self,
        momentum_roughness: Complex64,
        friction_velocity: Complex64,
    ) -> Result<Complex64, NumericFault> {
        let roughness_reynolds = momentum_roughness * friction_velocity
            / self.derived.kinematic_viscosity;
        Ok(SCALAR_ROUGHNESS_PREFACTOR
            * momentum_roughness
            * complex::exp(-SCALAR_ROUGHNESS_DECAY * roughness_reynolds.powf(0.25))?)
    }

    /// Momentum roughness length: Charnock term plus smooth-flow term
    fn momentum_roughness(&self, friction_velocity: Complex64) -> Result<Complex64, NumericFault> {
        let charnock = CHARNOCK * (friction_velocity * friction_velocity) / GRAVITY;
        let smooth = complex::div(
            real(SMOOTH_FLOW_COEFFICIENT * self.derived.kinematic_viscosity),
            friction_velocity,
        )?;
        Ok(charnock + smooth)
    }

    /// Monin-Obukhov length from friction velocity and temperature scale
    fn obukhov_length(
        &self,
        friction_velocity: Complex64,
        scaling_temperature: Complex64,
    ) -> Result<Complex64, NumericFault> {
        complex::div(
            *self.derived.virtual_temperature * (friction_velocity * friction_velocity),
            VON_KARMAN * GRAVITY * scaling_temperature,
        )
    }

    /// Scaling quantity `K Δ / (ln(z/length) − ψ)`
    fn scaling(
        &self,
        difference: f64,
        roughness: Complex64,
        correction: Complex64,
    ) -> Result<Complex64, NumericFault> {
        complex::div(
            real(VON_KARMAN * difference),
            self.log_height_ratio(roughness)? - correction,
        )
    }
}

/// Mutable iteration state of one regime
///
/// Seeded per regime, advanced for [`ITERATIONS`] passes, then consumed by
/// [`RegimeState::coefficient`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RegimeState {
    pub(crate) regime: StabilityRegime,
    /// ψ_m
    pub(crate) stability_momentum: Complex64,
    /// ψ_t
    pub(crate) stability_temperature: Complex64,
    /// ψ_q
    pub(crate) stability_vapor: Complex64,
    /// u*
    pub(crate) friction_velocity: Complex64,
    /// z0
    pub(crate) roughness_momentum: Complex64,
    /// z0q
    pub(crate) roughness_vapor: Complex64,
    /// z0t
    pub(crate) roughness_temperature: Complex64,
    /// θ*
    pub(crate) scaling_temperature: Complex64,
    /// q*
    pub(crate) scaling_humidity: Complex64,
    /// L
    pub(crate) obukhov_length: Complex64,
}

impl RegimeState {
    /// Seed a regime
    ///
    /// Stable and unstable regimes run one pre-pass with no stability
    /// correction to establish a first Obukhov length. Neutral starts from the
    /// seed roughness length alone.
    pub(crate) fn seed(regime: StabilityRegime, layer: &SurfaceLayer<'_>) -> Result<Self, NumericFault> {
        let mut state = Self {
            regime,
            stability_momentum: ZERO,
            stability_temperature: ZERO,
            stability_vapor: ZERO,
            friction_velocity: ZERO,
            roughness_momentum: real(SEED_ROUGHNESS_LENGTH),
            roughness_vapor: ZERO,
            roughness_temperature: ZERO,
            scaling_temperature: ZERO,
            scaling_humidity: ZERO,
            obukhov_length: ZERO,
        };

        if !regime.uses_obukhov_length() {
            return Ok(state);
        }

        state.friction_velocity = complex::div(
            real(VON_KARMAN * layer.wind_speed),
            layer.log_height_ratio(state.roughness_momentum)? - state.stability_momentum,
        )?;
        state.roughness_vapor =
            layer.scalar_roughness(state.roughness_momentum, state.friction_velocity)?;
        state.roughness_temperature = state.roughness_vapor;
        state.scaling_temperature = layer.scaling(
            layer.derived.potential_temperature_difference(),
            state.roughness_temperature,
            state.stability_temperature,
        )?;
        state.scaling_humidity = layer.scaling(
            layer.derived.humidity_difference(),
            state.roughness_vapor,
            state.stability_vapor,
        )?;
        state.obukhov_length =
            layer.obukhov_length(state.friction_velocity, state.scaling_temperature)?;

        Ok(state)
    }

    /// Advance one pass
    pub(crate) fn step(&mut self, layer: &SurfaceLayer<'_>) -> Result<(), NumericFault> {
        if self.regime.uses_obukhov_length() {
            self.friction_velocity = complex::div(
                VON_KARMAN * (real(layer.wind_speed) - self.friction_velocity),
                layer.log_height_ratio(self.roughness_momentum)? - self.stability_momentum,
            )?;
            self.scaling_temperature = layer.scaling(
                layer.derived.potential_temperature_difference(),
                self.roughness_temperature,
                self.stability_temperature,
            )?;
            self.scaling_humidity = layer.scaling(
                layer.derived.humidity_difference(),
                self.roughness_vapor,
                self.stability_vapor,
            )?;
            let (psi_m, psi_q) = self
                .regime
                .stability_corrections(layer.sensor_height, self.obukhov_length)?;
            self.stability_momentum = psi_m;
            self.stability_vapor = psi_q;
        } else {
            self.friction_velocity = complex::div(
                real(VON_KARMAN * layer.wind_speed),
                layer.log_height_ratio(self.roughness_momentum)?,
            )?;
        }

        self.roughness_momentum = layer.momentum_roughness(self.friction_velocity)?;
        self.roughness_vapor =
            layer.scalar_roughness(self.roughness_momentum, self.friction_velocity)?;

        if self.regime.uses_obukhov_length() {
            self.obukhov_length =
                layer.obukhov_length(self.friction_velocity, self.scaling_temperature)?;
        }
        Ok(())
    }

    /// Stability parameter `z/L`; zero for the neutral regime
    pub(crate) fn stability(&self, sensor_height: f64) -> Result<Complex64, NumericFault> {
        if self.regime.uses_obukhov_length() {
            complex::div(real(sensor_height), self.obukhov_length)
        } else {
            Ok(ZERO)
        }
    }

    /// Bulk transfer coefficient `K² / ((ln(z/z0) − ψ_m)(ln(z/z0q) − ψ_q))`
    pub(crate) fn coefficient(&self, layer: &SurfaceLayer<'_>) -> Result<Complex64, NumericFault> {
        let momentum = layer.log_height_ratio(self.roughness_momentum)? - self.stability_momentum;
        let vapor = layer.log_height_ratio(self.roughness_vapor)? - self.stability_vapor;
        complex::div(real(VON_KARMAN * VON_KARMAN), momentum * vapor)
    }
}

/// Seed and run one regime for the full iteration budget
///
/// # Errors
///
/// The first [`NumericFault`] aborts the regime; the failure records which
/// pass it happened in (0 for seeding).
pub(crate) fn iterate(
    regime: StabilityRegime,
    layer: &SurfaceLayer<'_>,
) -> Result<RegimeState, ConvergenceFailure> {
    let fail = |iteration: usize| {
        move |fault: NumericFault| ConvergenceFailure {
            regime,
            iteration,
            fault,
        }
    };

    let mut state = RegimeState::seed(regime, layer).map_err(fail(0))?;
    for pass in 1..=ITERATIONS {
        state.step(layer).map_err(fail(pass))?;
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Observation;
    use approx::assert_relative_eq;

    fn derived(obs: &Observation) -> DerivedQuantities {
        DerivedQuantities::from_observation(obs)
    }

    fn unstable_reference() -> Observation {
        Observation {
            timestamp: 731_947,
            wind_speed: 11.7661091674962,
            pressure: 920.0627,
            air_temperature: 0.4288,
            skin_temperature: 6.3593,
            relative_humidity: 82.2214,
            sensor_height: 2.0,
            timestep: 86_400.0,
        }
    }

    #[test]
    fn test_seed_neutral_only_sets_roughness() {
        let obs = unstable_reference();
        let d = derived(&obs);
        let layer = SurfaceLayer {
            sensor_height: 2.0,
            wind_speed: obs.wind_speed,
            derived: &d,
        };
        let state = RegimeState::seed(StabilityRegime::Neutral, &layer).unwrap();
        assert_eq!(state.roughness_momentum, real(SEED_ROUGHNESS_LENGTH));
        assert_eq!(state.friction_velocity, ZERO);
        assert_eq!(state.obukhov_length, ZERO);
    }

    #[test]
    fn test_seed_stable_gives_log_law_friction_velocity() {
        let obs = unstable_reference();
        let d = derived(&obs);
        let layer = SurfaceLayer {
            sensor_height: 2.0,
            wind_speed: obs.wind_speed,
            derived: &d,
        };
        let state = RegimeState::seed(StabilityRegime::Stable, &layer).unwrap();

        let expected = VON_KARMAN * obs.wind_speed / (2.0 / SEED_ROUGHNESS_LENGTH).ln();
        assert_relative_eq!(state.friction_velocity.re, expected, max_relative = 1e-12);
        assert_eq!(state.roughness_temperature, state.roughness_vapor);
        // Skin warmer than air: negative temperature scale, negative L
        assert!(state.scaling_temperature.re < 0.0);
        assert!(state.obukhov_length.re < 0.0);
    }

    #[test]
    fn test_unstable_reference_converges_to_real_negative_length() {
        let obs = unstable_reference();
        let d = derived(&obs);
        let layer = SurfaceLayer {
            sensor_height: 2.0,
            wind_speed: obs.wind_speed,
            derived: &d,
        };
        let state = iterate(StabilityRegime::Unstable, &layer).unwrap();

        assert!(complex::is_real(state.obukhov_length));
        let zeta = state.stability(2.0).unwrap().re;
        assert_relative_eq!(zeta, -0.022861642296593532, max_relative = 1e-6);

        let ce = state.coefficient(&layer).unwrap();
        assert_relative_eq!(ce.re, 0.0018362059624694976, max_relative = 1e-6);
    }

    #[test]
    fn test_zero_wind_faults_neutral_in_first_pass() {
        let mut obs = unstable_reference();
        obs.wind_speed = 0.0;
        let d = derived(&obs);
        let layer = SurfaceLayer {
            sensor_height: 2.0,
            wind_speed: 0.0,
            derived: &d,
        };
        let failure = iterate(StabilityRegime::Neutral, &layer).unwrap_err();
        assert_eq!(failure.regime, StabilityRegime::Neutral);
        assert_eq!(failure.iteration, 1);
        assert_eq!(failure.fault, NumericFault::DivisionByZero);
    }

    #[test]
    fn test_equal_potential_temperatures_fault_at_seeding() {
        // No temperature gradient: θ* = 0 and L is undefined
        let mut obs = unstable_reference();
        obs.skin_temperature = obs.air_temperature;
        let d = derived(&obs);
        let layer = SurfaceLayer {
            sensor_height: 2.0,
            wind_speed: obs.wind_speed,
            derived: &d,
        };
        let failure = iterate(StabilityRegime::Stable, &layer).unwrap_err();
        assert_eq!(failure.iteration, 0);
        assert_eq!(failure.fault, NumericFault::DivisionByZero);
    }

    #[test]
    fn test_iteration_is_deterministic() {
        let obs = unstable_reference();
        let d = derived(&obs);
        let layer = SurfaceLayer {
            sensor_height: 2.0,
            wind_speed: obs.wind_speed,
            derived: &d,
        };
        let a = iterate(StabilityRegime::Unstable, &layer).unwrap();
        let b = iterate(StabilityRegime::Unstable, &layer).unwrap();
        assert_eq!(a, b);
    }
}
