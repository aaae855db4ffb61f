//! Batch driver
//!
//! Runs the solver over every row of a [`MeteoTable`] and writes the four
//! outputs back as columns. Rows are independent, so they are fanned out
//! over a dedicated rayon pool and written back in index order.
//!
//! Input columns are looked up by their canonical names:
//!
//! | Column   | Quantity                | Unit |
//! |----------|-------------------------|------|
//! | `WS`     | wind speed              | m/s  |
//! | `P`      | air pressure            | mb   |
//! | `T_air`  | air temperature         | °C   |
//! | `T_skin` | water skin temperature  | °C   |
//! | `RH`     | relative humidity       | %    |
//!
//! and the outputs are written as `E` (mm per timestep), `Ce`, `VPD` (kPa)
//! and `stability` (z/L). Tables that use other names can pass a mapping in
//! [`BatchConfig::variable_names`]; the table itself is never renamed.

mod table;

pub use table::MeteoTable;

use crate::core_types::Observation;
use crate::error::BatchError;
use crate::solver::{solve_observation, BulkTransferResult, SolveStatus};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Wind speed column
pub const WIND_SPEED: &str = "WS";
/// Air pressure column
pub const PRESSURE: &str = "P";
/// Air temperature column
pub const AIR_TEMPERATURE: &str = "T_air";
/// Skin temperature column
pub const SKIN_TEMPERATURE: &str = "T_skin";
/// Relative humidity column
pub const RELATIVE_HUMIDITY: &str = "RH";

/// Required input columns, in solver argument order
pub const INPUT_COLUMNS: [&str; 5] = [
    WIND_SPEED,
    PRESSURE,
    AIR_TEMPERATURE,
    SKIN_TEMPERATURE,
    RELATIVE_HUMIDITY,
];

/// Evaporation output column
pub const EVAPORATION: &str = "E";
/// Transfer coefficient output column
pub const TRANSFER_COEFFICIENT: &str = "Ce";
/// Vapor pressure deficit output column
pub const VAPOR_PRESSURE_DEFICIT: &str = "VPD";
/// Stability output column
pub const STABILITY: &str = "stability";

/// Output columns, in write order
pub const OUTPUT_COLUMNS: [&str; 4] = [
    EVAPORATION,
    TRANSFER_COEFFICIENT,
    VAPOR_PRESSURE_DEFICIT,
    STABILITY,
];

/// Batch-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Sensor height above the water (m), shared by all rows
    pub sensor_height: f64,
    /// Sampling interval (s), shared by all rows
    pub timestep: f64,
    /// Table column name -> canonical name (e.g. `"surface_temp" -> "T_skin"`)
    #[serde(default)]
    pub variable_names: Option<FxHashMap<String, String>>,
    /// Worker threads; defaults to half the available cores
    #[serde(default)]
    pub threads: Option<usize>,
}

impl BatchConfig {
    /// Config with no column mapping and the default thread count
    pub fn new(sensor_height: f64, timestep: f64) -> Self {
        Self {
            sensor_height,
            timestep,
            variable_names: None,
            threads: None,
        }
    }

    /// Add one column mapping
    pub fn with_variable_name(mut self, column: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.variable_names
            .get_or_insert_with(FxHashMap::default)
            .insert(column.into(), canonical.into());
        self
    }

    /// Set the worker thread count
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Thread count actually used
    pub fn worker_threads(&self) -> usize {
        self.threads.unwrap_or_else(default_threads)
    }

    fn validate(&self) -> Result<(), BatchError> {
        if !(self.sensor_height.is_finite() && self.sensor_height > 0.0) {
            return Err(BatchError::InvalidParameter {
                name: "sensor_height",
                reason: format!("must be a positive height in meters, got {}", self.sensor_height),
            });
        }
        if !self.timestep.is_finite() {
            return Err(BatchError::InvalidParameter {
                name: "timestep",
                reason: format!("must be finite, got {}", self.timestep),
            });
        }
        if self.threads == Some(0) {
            return Err(BatchError::InvalidParameter {
                name: "threads",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Half the available cores, at least one
fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map_or(1, |cores| cores.get() / 2)
        .max(1)
}

/// Record counts of a finished batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Rows processed
    pub records: usize,
    /// Rows with a selected coefficient
    pub converged: usize,
    /// Rows skipped for missing input
    pub missing_input: usize,
    /// Rows where no regime produced a coefficient
    pub all_regimes_failed: usize,
    /// Worker threads used
    pub threads: usize,
}

impl BatchSummary {
    fn tally(results: &[BulkTransferResult], threads: usize) -> Self {
        results.iter().fold(
            Self {
                records: results.len(),
                threads,
                ..Self::default()
            },
            |mut summary, result| {
                match result.status {
                    SolveStatus::Converged(_) => summary.converged += 1,
                    SolveStatus::MissingInput => summary.missing_input += 1,
                    SolveStatus::AllRegimesFailed => summary.all_regimes_failed += 1,
                }
                summary
            },
        )
    }
}

/// Find the table column holding each canonical input
///
/// A mapped column takes precedence over a column that already carries the
/// canonical name.
fn resolve_columns<'t>(
    table: &'t MeteoTable,
    variable_names: Option<&FxHashMap<String, String>>,
) -> Result<[&'t [f64]; 5], BatchError> {
    let lookup = |canonical: &str| -> Option<&'t [f64]> {
        variable_names
            .and_then(|names| {
                names
                    .iter()
                    .filter(|(_, target)| target.as_str() == canonical)
                    .find_map(|(column, _)| table.column(column))
            })
            .or_else(|| table.column(canonical))
    };

    let resolved = INPUT_COLUMNS.map(lookup);
    let missing: Vec<String> = INPUT_COLUMNS
        .iter()
        .zip(&resolved)
        .filter(|(_, column)| column.is_none())
        .map(|(name, _)| (*name).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(BatchError::MissingColumns { missing });
    }

    Ok(resolved.map(|column| column.unwrap_or_default()))
}

/// Solve every row of `table` and write `E`, `Ce`, `VPD` and `stability`
///
/// # Arguments
///
/// * `table` - Input series; output columns are added or overwritten
/// * `config` - Sensor height, timestep, column mapping and thread count
///
/// # Returns
///
/// Counts of converged, missing and failed rows.
///
/// # Errors
///
/// Fails before any row is computed if a required column cannot be found,
/// if a batch parameter is invalid, or if the worker pool cannot be built.
/// Individual rows never fail; they are written as NaN.
pub fn run(table: &mut MeteoTable, config: &BatchConfig) -> Result<BatchSummary, BatchError> {
    let [wind, pressure, air_temperature, skin_temperature, humidity] =
        resolve_columns(table, config.variable_names.as_ref())?;
    config.validate()?;

    let threads = config.worker_threads();
    info!(records = table.len(), threads, "Starting evaporation batch");

    let observations: Vec<Observation> = table
        .index()
        .iter()
        .enumerate()
        .map(|(row, &timestamp)| Observation {
            timestamp,
            wind_speed: wind[row],
            pressure: pressure[row],
            air_temperature: air_temperature[row],
            skin_temperature: skin_temperature[row],
            relative_humidity: humidity[row],
            sensor_height: config.sensor_height,
            timestep: config.timestep,
        })
        .collect();

    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    let results: Vec<BulkTransferResult> =
        pool.install(|| observations.par_iter().map(solve_observation).collect());

    let summary = BatchSummary::tally(&results, threads);
    write_outputs(table, &results)?;

    info!(
        records = summary.records,
        converged = summary.converged,
        missing_input = summary.missing_input,
        all_regimes_failed = summary.all_regimes_failed,
        "Finished evaporation batch"
    );
    Ok(summary)
}

fn write_outputs(table: &mut MeteoTable, results: &[BulkTransferResult]) -> Result<(), BatchError> {
    let column = |value: fn(&BulkTransferResult) -> f64| results.iter().map(value).collect::<Vec<_>>();

    table.insert_column(EVAPORATION, column(|r| r.evaporation))?;
    table.insert_column(TRANSFER_COEFFICIENT, column(|r| r.transfer_coefficient))?;
    table.insert_column(VAPOR_PRESSURE_DEFICIT, column(|r| r.vapor_pressure_deficit))?;
    table.insert_column(STABILITY, column(|r| r.stability))?;
    Ok(())
}
