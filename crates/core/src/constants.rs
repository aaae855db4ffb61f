//! Physical constants of the bulk transfer formulation.
//!
//! These are fixed, not configuration: changing any of them breaks parity
//! with the historical evaporation record computed from the same formulas.

/// von Kármán constant (dimensionless)
pub const VON_KARMAN: f64 = 0.41;

/// Gravitational acceleration (m/s²)
pub const GRAVITY: f64 = 9.81;

/// Charnock constant for the aerodynamic roughness of open water
pub const CHARNOCK: f64 = 0.0123;

/// Number of fixed-point passes per stability regime.
///
/// There is no convergence tolerance; every regime runs exactly this many
/// passes unless a numerical fault aborts it.
pub const ITERATIONS: usize = 199;

/// Roughness length of momentum used to seed every regime (m)
pub const SEED_ROUGHNESS_LENGTH: f64 = 1.0e-4;

/// Coefficient of the smooth-flow term of the momentum roughness length
pub const SMOOTH_FLOW_COEFFICIENT: f64 = 0.11;

/// Prefactor of the scalar (vapor/temperature) roughness length relation
pub const SCALAR_ROUGHNESS_PREFACTOR: f64 = 7.4;

/// Exponent coefficient of the scalar roughness length relation
pub const SCALAR_ROUGHNESS_DECAY: f64 = 2.25;

/// Slope of the linear stable-regime stability function
pub const STABLE_SLOPE: f64 = 5.2;

/// Coefficient in the unstable-regime argument `x = (1 - 16 z/L)^¼`
pub const UNSTABLE_COEFFICIENT: f64 = 16.0;
