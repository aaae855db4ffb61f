//! Open-Water Evaporation Core Library
//!
//! Estimates evaporation from open water (lakes, reservoirs) with the
//! aerodynamic bulk mass-transfer method. The bulk transfer coefficient is
//! solved from Monin-Obukhov similarity theory under stable, unstable and
//! neutral stratification, and the first physically consistent regime is
//! used.
//!
//! ## Layout
//!
//! - [`meteorology`]: potential temperature, vapor pressure, specific
//!   humidity, air density and viscosity
//! - [`solver`]: per-regime fixed-point iteration, regime selection and the
//!   evaporation estimate
//! - [`batch`]: column-wise driver over a [`MeteoTable`]
//!
//! ## Example
//!
//! ```
//! use aeroevap_core::{solve, SolveStatus, StabilityRegime};
//!
//! let result = solve(0.597, 878.4, 5.72, 5.424, 91.1, 2.0, 1800.0);
//! assert_eq!(result.status, SolveStatus::Converged(StabilityRegime::Neutral));
//! assert!(result.evaporation > 0.0);
//! ```

pub mod batch;
pub mod constants;
pub mod core_types;
pub mod error;
pub mod meteorology;
pub mod solver;

// Re-export core types
pub use core_types::{Celsius, Kelvin, Kilopascals, Millibars, Observation};

// Re-export solver entry points
pub use solver::{
    evaluate_regimes, select_regime, solve, solve_all, solve_observation, BulkTransferResult,
    Estimate, RegimeCandidate, SolveStatus, StabilityRegime,
};

// Re-export batch driver
pub use batch::{run, BatchConfig, BatchSummary, MeteoTable};

pub use error::{BatchError, ConvergenceFailure, InvalidObservation, NumericFault};
pub use meteorology::DerivedQuantities;
