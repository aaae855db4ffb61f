//! Derived meteorological quantities
//!
//! Leaf computations that turn one observation into the thermodynamic state
//! shared by all three stability regimes. Nothing here iterates.
//!
//! # Formulas
//!
//! ```text
//! θ     = T × (1000 / P)^0.286                       potential temperature
//! e_s   = 0.6108 × exp(17.27 Tc / (Tc + 237.3))      Tetens, kPa
//! q     = 0.62 e / (P/10 − 0.38 e)                    specific humidity
//! ρ     = (P/10 × 1000) / (T × 286.9 × (1 + 0.61 q))  air density
//! ν     = (4.94e-8 Tc + 1.7185e-5) / ρ                kinematic viscosity
//! T_v   = T × (1 + 0.61 q)                            virtual temperature
//! ```
//!
//! P is station pressure in millibars throughout.
//!
//! # Scientific References
//!
//! - Tetens, O. (1930). "Über einige meteorologische Begriffe."
//!   Z. Geophys. 6:297-309.
//! - Montgomery, R.B. (1947). "Viscosity and thermal conductivity of air and
//!   diffusivity of water vapor in air." J. Meteorol. 4:193-196.
//! - Verburg, P. and Antenucci, J.P. (2010). "Persistent unstable atmospheric
//!   boundary layer enhances sensible and latent heat loss in a tropical
//!   great lake: Lake Tanganyika." J. Geophys. Res. 115:D11109.

use crate::core_types::units::{Celsius, Kelvin, Kilopascals, Millibars};
use crate::core_types::Observation;
use serde::{Deserialize, Serialize};

/// Poisson exponent R/c_p for dry air
const POISSON_EXPONENT: f64 = 0.286;

/// Gas constant of dry air as used by the density formula (J/kg·K)
const DRY_AIR_GAS_CONSTANT: f64 = 286.9;

/// Potential temperature referenced to 1000 mb
pub fn potential_temperature(temperature: Kelvin, pressure: Millibars) -> Kelvin {
    Kelvin::new(*temperature * (*Millibars::REFERENCE / *pressure).powf(POISSON_EXPONENT))
}

/// Saturation vapor pressure over water (Tetens formula)
///
/// A pure exponential, defined for every finite temperature.
pub fn saturation_vapor_pressure(temperature: Celsius) -> Kilopascals {
    let tc = *temperature;
    Kilopascals::new(0.6108 * ((17.27 * tc) / (tc + 237.3)).exp())
}

/// Actual vapor pressure from relative humidity (percent, 0-100)
pub fn vapor_pressure(temperature: Celsius, relative_humidity: f64) -> Kilopascals {
    Kilopascals::new((relative_humidity / 100.0) * *saturation_vapor_pressure(temperature))
}

/// Specific humidity (kg/kg) from vapor pressure
pub fn specific_humidity(vapor_pressure: Kilopascals, pressure: Millibars) -> f64 {
    let e = *vapor_pressure;
    0.62 * e / (*pressure.to_kilopascals() - 0.38 * e)
}

/// Moist air density (kg/m³)
pub fn air_density(temperature: Kelvin, pressure: Millibars, specific_humidity: f64) -> f64 {
    (*pressure.to_kilopascals() * 1000.0)
        / (*temperature * DRY_AIR_GAS_CONSTANT * (1.0 + 0.61 * specific_humidity))
}

/// Kinematic viscosity of air (m²/s)
///
/// Linear fit of dynamic viscosity in air temperature, divided by density.
pub fn kinematic_viscosity(temperature: Celsius, density: f64) -> f64 {
    (4.94e-8 * *temperature + 1.7185e-5) / density
}

/// Virtual temperature
pub fn virtual_temperature(temperature: Kelvin, specific_humidity: f64) -> Kelvin {
    Kelvin::new(*temperature * (1.0 + 0.61 * specific_humidity))
}

/// Thermodynamic state computed once per observation
///
/// Pure function of the observation; feeds unchanged into every regime
/// iteration and into the final evaporation formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedQuantities {
    /// Air potential temperature at sensor height
    pub air_potential_temperature: Kelvin,
    /// Water-surface (skin) potential temperature
    pub skin_potential_temperature: Kelvin,
    /// Atmospheric vapor pressure at sensor height
    pub air_vapor_pressure: Kilopascals,
    /// Saturated vapor pressure at the water surface
    pub saturation_vapor_pressure: Kilopascals,
    /// Atmospheric specific humidity (kg/kg)
    pub air_specific_humidity: f64,
    /// Saturated specific humidity at the water surface (kg/kg)
    pub saturation_specific_humidity: f64,
    /// Vapor pressure deficit `e_sat(skin) - e_air` (kPa)
    pub vapor_pressure_deficit: f64,
    /// Air density (kg/m³)
    pub air_density: f64,
    /// Kinematic viscosity of air (m²/s)
    pub kinematic_viscosity: f64,
    /// Virtual temperature of the air
    pub virtual_temperature: Kelvin,
}

impl DerivedQuantities {
    /// Compute the derived state of a validated observation
    pub fn from_observation(observation: &Observation) -> Self {
        let pressure = Millibars::new(observation.pressure);
        let air_c = Celsius::new(observation.air_temperature);
        let skin_c = Celsius::new(observation.skin_temperature);
        let air_k = air_c.to_kelvin();
        let skin_k = skin_c.to_kelvin();

        let air_vapor_pressure = vapor_pressure(air_c, observation.relative_humidity);
        let surface_vapor_pressure = saturation_vapor_pressure(skin_c);
        let air_specific_humidity = specific_humidity(air_vapor_pressure, pressure);
        let saturation_specific_humidity = specific_humidity(surface_vapor_pressure, pressure);

        let density = air_density(air_k, pressure, air_specific_humidity);

        Self {
            air_potential_temperature: potential_temperature(air_k, pressure),
            skin_potential_temperature: potential_temperature(skin_k, pressure),
            air_vapor_pressure,
            saturation_vapor_pressure: surface_vapor_pressure,
            air_specific_humidity,
            saturation_specific_humidity,
            vapor_pressure_deficit: surface_vapor_pressure - air_vapor_pressure,
            air_density: density,
            kinematic_viscosity: kinematic_viscosity(air_c, density),
            virtual_temperature: virtual_temperature(air_k, air_specific_humidity),
        }
    }

    /// Air minus skin potential temperature (K)
    pub fn potential_temperature_difference(&self) -> f64 {
        self.air_potential_temperature - self.skin_potential_temperature
    }

    /// Air minus saturated surface specific humidity (kg/kg)
    ///
    /// Negative when the surface is evaporating.
    pub fn humidity_difference(&self) -> f64 {
        self.air_specific_humidity - self.saturation_specific_humidity
    }
}
