//! Core types and utilities

pub mod observation;
pub mod units;

pub use observation::Observation;
pub use units::*;
