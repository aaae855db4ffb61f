//! Error types
//!
//! Only the batch driver can fail in the `Result` sense. Everything the
//! solver runs into for a single observation is soft: it is recorded on the
//! [`BulkTransferResult`](crate::BulkTransferResult) as NaN values plus a
//! [`SolveStatus`](crate::SolveStatus), and logged. The types below carry the
//! detail for those diagnostics.

use crate::solver::StabilityRegime;
use thiserror::Error;

/// Arithmetic fault raised inside one fixed-point pass
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericFault {
    /// Logarithm of exactly zero
    #[error("logarithm of zero")]
    LogOfZero,

    /// Division by an exact-zero denominator
    #[error("division by zero")]
    DivisionByZero,

    /// Exponential of a finite argument overflowed
    #[error("exponential overflow")]
    Overflow,
}

/// A stability regime whose iteration was aborted
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("could not converge for {regime} conditions at pass {iteration}: {fault}")]
pub struct ConvergenceFailure {
    /// Regime whose candidate coefficient is discarded
    pub regime: StabilityRegime,
    /// Pass in which the fault occurred (0 = seeding, 1..=199 = loop,
    /// 200 = coefficient extraction)
    pub iteration: usize,
    /// Underlying arithmetic fault
    pub fault: NumericFault,
}

/// Observation rejected before any derived quantity is computed
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum InvalidObservation {
    /// NaN or infinite measurement
    #[error("{field} is missing")]
    Missing {
        /// Offending field
        field: &'static str,
    },

    /// Pressure or sensor height that is zero or negative
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Offending field
        field: &'static str,
        /// Value supplied
        value: f64,
    },
}

/// Batch driver failure
///
/// Raised before any record is computed; a batch never stops halfway.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Required input columns absent after applying the name mapping
    #[error("missing one or more needed columns for calculation: {}", .missing.join(", "))]
    MissingColumns {
        /// Canonical names that could not be resolved
        missing: Vec<String>,
    },

    /// Column length differs from the table index
    #[error("column '{column}' has {found} values, index has {expected}")]
    LengthMismatch {
        /// Column name
        column: String,
        /// Index length
        expected: usize,
        /// Column length
        found: usize,
    },

    /// Batch-wide parameter outside its domain
    #[error("invalid batch parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// Worker pool could not be created
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convergence_failure_message_names_regime() {
        let failure = ConvergenceFailure {
            regime: StabilityRegime::Unstable,
            iteration: 12,
            fault: NumericFault::LogOfZero,
        };
        assert_eq!(
            failure.to_string(),
            "could not converge for unstable conditions at pass 12: logarithm of zero"
        );
    }

    #[test]
    fn test_missing_columns_message_lists_all() {
        let err = BatchError::MissingColumns {
            missing: vec!["WS".to_string(), "RH".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "missing one or more needed columns for calculation: WS, RH"
        );
    }

    #[test]
    fn test_invalid_observation_messages() {
        let missing = InvalidObservation::Missing { field: "pressure" };
        assert_eq!(missing.to_string(), "pressure is missing");

        let negative = InvalidObservation::NonPositive {
            field: "sensor_height",
            value: -1.0,
        };
        assert_eq!(negative.to_string(), "sensor_height must be positive, got -1");
    }
}
