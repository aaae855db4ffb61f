use crate::error::DefaultAeroEvapError;
use crate::helpers::handle_ffi_result;
use crate::AeroEvapErrorCode;
use aeroevap_core::{solve, solve_all, BulkTransferResult, Observation, SolveStatus, StabilityRegime};

/// C-compatible observation (see `aeroevap_core::Observation`).
///
/// Missing measurements are passed as NaN.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AeroEvapObservation {
    /// Caller-defined timestamp, used only in diagnostics
    pub timestamp: i64,
    /// Wind speed (m/s)
    pub wind_speed: f64,
    /// Air pressure (mb)
    pub pressure: f64,
    /// Air temperature (°C)
    pub air_temperature: f64,
    /// Water skin temperature (°C)
    pub skin_temperature: f64,
    /// Relative humidity (0-100)
    pub relative_humidity: f64,
    /// Sensor height above the water (m)
    pub sensor_height: f64,
    /// Sampling interval (s)
    pub timestep: f64,
}

impl From<AeroEvapObservation> for Observation {
    fn from(obs: AeroEvapObservation) -> Self {
        Observation {
            timestamp: obs.timestamp,
            wind_speed: obs.wind_speed,
            pressure: obs.pressure,
            air_temperature: obs.air_temperature,
            skin_temperature: obs.skin_temperature,
            relative_humidity: obs.relative_humidity,
            sensor_height: obs.sensor_height,
            timestep: obs.timestep,
        }
    }
}

/// Outcome of one observation.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AeroEvapStatus {
    /// Coefficient taken from the stable regime
    Stable = 0,
    /// Coefficient taken from the unstable regime
    Unstable = 1,
    /// Coefficient taken from the neutral regime
    Neutral = 2,
    /// A measurement was missing; all outputs are NaN
    MissingInput = 3,
    /// No usable coefficient; E and Ce are NaN
    AllRegimesFailed = 4,
}

impl From<SolveStatus> for AeroEvapStatus {
    fn from(status: SolveStatus) -> Self {
        match status {
            SolveStatus::Converged(StabilityRegime::Stable) => AeroEvapStatus::Stable,
            SolveStatus::Converged(StabilityRegime::Unstable) => AeroEvapStatus::Unstable,
            SolveStatus::Converged(StabilityRegime::Neutral) => AeroEvapStatus::Neutral,
            SolveStatus::MissingInput => AeroEvapStatus::MissingInput,
            SolveStatus::AllRegimesFailed => AeroEvapStatus::AllRegimesFailed,
        }
    }
}

/// C-compatible solver output.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AeroEvapResult {
    /// Evaporation (mm per timestep)
    pub evaporation: f64,
    /// Bulk transfer coefficient Ce
    pub transfer_coefficient: f64,
    /// Vapor pressure deficit (kPa)
    pub vapor_pressure_deficit: f64,
    /// Stability parameter z/L
    pub stability: f64,
    /// Outcome classification
    pub status: AeroEvapStatus,
}

impl From<BulkTransferResult> for AeroEvapResult {
    fn from(result: BulkTransferResult) -> Self {
        Self {
            evaporation: result.evaporation,
            transfer_coefficient: result.transfer_coefficient,
            vapor_pressure_deficit: result.vapor_pressure_deficit,
            stability: result.stability,
            status: result.status.into(),
        }
    }
}

/// Estimate evaporation for one set of measurements.
///
/// # Parameters
/// - `wind_speed`: Wind speed (m/s)
/// - `pressure`: Air pressure (mb)
/// - `air_temperature`: Air temperature (°C)
/// - `skin_temperature`: Water skin temperature (°C)
/// - `relative_humidity`: Relative humidity (0-100)
/// - `sensor_height`: Sensor height (m)
/// - `timestep`: Sampling interval (s)
/// - `out`: Receives the result
///
/// # Returns
/// - `AeroEvapErrorCode::Ok` with `out` written. Missing input or failed
///   convergence is reported in `out->status`, not as an error.
/// - `AeroEvapErrorCode::NullPointer` if `out` is null
///
/// # Safety
/// `out` must be null or valid for writing one `AeroEvapResult`.
#[no_mangle]
pub unsafe extern "C" fn aeroevap_solve(
    wind_speed: f64,
    pressure: f64,
    air_temperature: f64,
    skin_temperature: f64,
    relative_humidity: f64,
    sensor_height: f64,
    timestep: f64,
    out: *mut AeroEvapResult,
) -> AeroEvapErrorCode {
    handle_ffi_result(|| {
        if out.is_null() {
            return Err(DefaultAeroEvapError::null_pointer("out"));
        }
        let result = solve(
            wind_speed,
            pressure,
            air_temperature,
            skin_temperature,
            relative_humidity,
            sensor_height,
            timestep,
        );
        // SAFETY: non-null and valid for writes per the caller contract
        unsafe { out.write(result.into()) };
        Ok(())
    })
}

/// Estimate evaporation for `len` observations in parallel.
///
/// `out[i]` receives the result of `observations[i]`.
///
/// # Returns
/// - `AeroEvapErrorCode::Ok` with all `len` results written
/// - `AeroEvapErrorCode::NullPointer` if either pointer is null and `len > 0`
/// - `AeroEvapErrorCode::InvalidParameter` if `len` exceeds the addressable size
///
/// # Safety
/// When `len > 0`, `observations` must be valid for reading and `out` valid
/// for writing `len` elements, and the two ranges must not overlap.
#[no_mangle]
pub unsafe extern "C" fn aeroevap_solve_batch(
    observations: *const AeroEvapObservation,
    len: usize,
    out: *mut AeroEvapResult,
) -> AeroEvapErrorCode {
    handle_ffi_result(|| {
        if len == 0 {
            return Ok(());
        }
        if observations.is_null() {
            return Err(DefaultAeroEvapError::null_pointer("observations"));
        }
        if out.is_null() {
            return Err(DefaultAeroEvapError::null_pointer("out"));
        }
        let max_len = isize::MAX as usize / std::mem::size_of::<AeroEvapObservation>();
        if len > max_len {
            return Err(DefaultAeroEvapError::invalid_parameter(
                "len",
                &format!("must not exceed {max_len}, got {len}"),
            ));
        }

        // SAFETY: non-null, in bounds and non-overlapping per the caller contract
        let (inputs, outputs) = unsafe {
            (
                std::slice::from_raw_parts(observations, len),
                std::slice::from_raw_parts_mut(out, len),
            )
        };

        let batch: Vec<Observation> = inputs.iter().map(|&obs| obs.into()).collect();
        for (slot, result) in outputs.iter_mut().zip(solve_all(&batch)) {
            *slot = result.into();
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{aeroevap_get_last_error, aeroevap_get_last_error_code};
    use std::ffi::CStr;
    use std::ptr;

    fn empty_result() -> AeroEvapResult {
        AeroEvapResult {
            evaporation: 0.0,
            transfer_coefficient: 0.0,
            vapor_pressure_deficit: 0.0,
            stability: 0.0,
            status: AeroEvapStatus::MissingInput,
        }
    }

    #[test]
    fn test_solve_writes_result() {
        let mut out = empty_result();
        let code = unsafe { aeroevap_solve(0.597, 878.4, 5.72, 5.424, 91.1, 2.0, 1800.0, &mut out) };

        assert_eq!(code, AeroEvapErrorCode::Ok);
        assert_eq!(out.status, AeroEvapStatus::Neutral);
        assert!((out.transfer_coefficient - 0.0017333926077895863).abs() < 1e-9);
        assert_eq!(aeroevap_get_last_error_code(), AeroEvapErrorCode::Ok);
        assert!(aeroevap_get_last_error().is_null());
    }

    #[test]
    fn test_solve_missing_input_is_not_an_error() {
        let mut out = empty_result();
        let code = unsafe {
            aeroevap_solve(f64::NAN, 878.4, 5.72, 5.424, 91.1, 2.0, 1800.0, &mut out)
        };

        assert_eq!(code, AeroEvapErrorCode::Ok);
        assert_eq!(out.status, AeroEvapStatus::MissingInput);
        assert!(out.evaporation.is_nan());
    }

    #[test]
    fn test_solve_null_out_sets_last_error() {
        let code = unsafe {
            aeroevap_solve(0.597, 878.4, 5.72, 5.424, 91.1, 2.0, 1800.0, ptr::null_mut())
        };

        assert_eq!(code, AeroEvapErrorCode::NullPointer);
        assert_eq!(aeroevap_get_last_error_code(), AeroEvapErrorCode::NullPointer);
        let msg = unsafe { CStr::from_ptr(aeroevap_get_last_error()) };
        assert_eq!(msg.to_str().unwrap(), "Parameter 'out' cannot be null");
    }

    #[test]
    fn test_batch_preserves_order() {
        let neutral = AeroEvapObservation {
            timestamp: 1,
            wind_speed: 0.597,
            pressure: 878.4,
            air_temperature: 5.72,
            skin_temperature: 5.424,
            relative_humidity: 91.1,
            sensor_height: 2.0,
            timestep: 1800.0,
        };
        let unstable = AeroEvapObservation {
            timestamp: 2,
            wind_speed: 11.766,
            pressure: 920.06,
            air_temperature: 0.4288,
            skin_temperature: 6.3593,
            relative_humidity: 82.22,
            sensor_height: 2.0,
            timestep: 86400.0,
        };
        let missing = AeroEvapObservation {
            relative_humidity: f64::NAN,
            ..neutral
        };
        let inputs = [neutral, unstable, missing];
        let mut outputs = [empty_result(); 3];

        let code = unsafe { aeroevap_solve_batch(inputs.as_ptr(), inputs.len(), outputs.as_mut_ptr()) };

        assert_eq!(code, AeroEvapErrorCode::Ok);
        assert_eq!(outputs[0].status, AeroEvapStatus::Neutral);
        assert_eq!(outputs[1].status, AeroEvapStatus::Unstable);
        assert!(outputs[1].stability < 0.0);
        assert_eq!(outputs[2].status, AeroEvapStatus::MissingInput);
    }

    #[test]
    fn test_batch_null_pointers() {
        let mut outputs = [empty_result(); 1];
        let code = unsafe { aeroevap_solve_batch(ptr::null(), 1, outputs.as_mut_ptr()) };
        assert_eq!(code, AeroEvapErrorCode::NullPointer);

        // Nothing to read or write
        let code = unsafe { aeroevap_solve_batch(ptr::null(), 0, ptr::null_mut()) };
        assert_eq!(code, AeroEvapErrorCode::Ok);
        assert!(aeroevap_get_last_error().is_null());
    }

    #[test]
    fn test_batch_rejects_oversized_len() {
        let input = [AeroEvapObservation {
            timestamp: 0,
            wind_speed: 1.0,
            pressure: 1000.0,
            air_temperature: 10.0,
            skin_temperature: 12.0,
            relative_humidity: 70.0,
            sensor_height: 2.0,
            timestep: 1800.0,
        }];
        let mut outputs = [empty_result(); 1];
        let code = unsafe { aeroevap_solve_batch(input.as_ptr(), usize::MAX, outputs.as_mut_ptr()) };

        assert_eq!(code, AeroEvapErrorCode::InvalidParameter);
        assert_eq!(aeroevap_get_last_error_code(), AeroEvapErrorCode::InvalidParameter);
    }
}
