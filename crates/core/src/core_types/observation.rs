//! One timestamped set of meteorological measurements.

use crate::error::InvalidObservation;
use serde::{Deserialize, Serialize};

/// Meteorological observation over open water for one sampling interval
///
/// Missing measurements are represented as NaN, the same way a column of a
/// [`MeteoTable`](crate::MeteoTable) marks gaps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Caller-defined timestamp (e.g. Unix seconds); only used to label
    /// diagnostics and to align batch output
    pub timestamp: i64,
    /// Wind speed at sensor height (m/s)
    pub wind_speed: f64,
    /// Station air pressure (mb)
    pub pressure: f64,
    /// Air temperature at sensor height (°C)
    pub air_temperature: f64,
    /// Water surface (skin) temperature (°C)
    pub skin_temperature: f64,
    /// Relative humidity (0-100)
    pub relative_humidity: f64,
    /// Height of the wind/temperature/humidity sensors above the water (m)
    pub sensor_height: f64,
    /// Sampling interval (s); evaporation is reported per this interval
    pub timestep: f64,
}

impl Observation {
    /// Check that every quantity is present and physically usable
    ///
    /// All seven quantities must be finite; pressure and sensor height must
    /// also be strictly positive since both appear under a logarithm or as a
    /// divisor.
    ///
    /// # Errors
    ///
    /// Returns the first offending field, in declaration order.
    pub fn validate(&self) -> Result<(), InvalidObservation> {
        for (field, value) in self.fields() {
            if !value.is_finite() {
                return Err(InvalidObservation::Missing { field });
            }
        }
        if self.pressure <= 0.0 {
            return Err(InvalidObservation::NonPositive {
                field: "pressure",
                value: self.pressure,
            });
        }
        if self.sensor_height <= 0.0 {
            return Err(InvalidObservation::NonPositive {
                field: "sensor_height",
                value: self.sensor_height,
            });
        }
        Ok(())
    }

    /// Named numeric inputs, in solver argument order
    pub fn fields(&self) -> [(&'static str, f64); 7] {
        [
            ("wind_speed", self.wind_speed),
            ("pressure", self.pressure),
            ("air_temperature", self.air_temperature),
            ("skin_temperature", self.skin_temperature),
            ("relative_humidity", self.relative_humidity),
            ("sensor_height", self.sensor_height),
            ("timestep", self.timestep),
        ]
    }

    /// Estimate evaporation for this observation
    pub fn solve(&self) -> crate::BulkTransferResult {
        crate::solver::solve_observation(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Observation {
        Observation {
            timestamp: 731_947,
            wind_speed: 11.766,
            pressure: 920.06,
            air_temperature: 0.4288,
            skin_temperature: 6.3593,
            relative_humidity: 82.22,
            sensor_height: 2.0,
            timestep: 86_400.0,
        }
    }

    #[test]
    fn test_valid_observation_passes() {
        assert_eq!(valid().validate(), Ok(()));
    }

    #[test]
    fn test_nan_field_is_missing() {
        let mut obs = valid();
        obs.relative_humidity = f64::NAN;
        assert_eq!(
            obs.validate(),
            Err(InvalidObservation::Missing {
                field: "relative_humidity"
            })
        );
    }

    #[test]
    fn test_infinite_field_is_missing() {
        let mut obs = valid();
        obs.wind_speed = f64::INFINITY;
        assert_eq!(
            obs.validate(),
            Err(InvalidObservation::Missing { field: "wind_speed" })
        );
    }

    #[test]
    fn test_first_missing_field_reported() {
        let mut obs = valid();
        obs.timestep = f64::NAN;
        obs.pressure = f64::NAN;
        assert_eq!(
            obs.validate(),
            Err(InvalidObservation::Missing { field: "pressure" })
        );
    }

    #[test]
    fn test_non_positive_pressure_and_height() {
        let mut obs = valid();
        obs.pressure = 0.0;
        assert!(matches!(
            obs.validate(),
            Err(InvalidObservation::NonPositive {
                field: "pressure",
                ..
            })
        ));

        let mut obs = valid();
        obs.sensor_height = -2.0;
        assert!(matches!(
            obs.validate(),
            Err(InvalidObservation::NonPositive {
                field: "sensor_height",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_wind_is_valid_input() {
        // Calm conditions are a numerical problem for the solver, not an
        // input error.
        let mut obs = valid();
        obs.wind_speed = 0.0;
        assert!(obs.validate().is_ok());
    }
}
