//! Semantic unit types for the observed meteorological quantities
//!
//! Newtype wrappers that keep temperatures and pressures from being mixed up
//! on their way into the bulk transfer formulas.
//!
//! # Design Philosophy
//! - Everything is `f64`: the solver iterates 199 times and is compared
//!   against historical output, so precision matters more than footprint
//! - Constructors do not range-check; validity of an observation is decided
//!   once, in [`Observation::validate`](crate::Observation::validate)
//! - `Deref<Target = f64>` for terse use inside formulas
//! - Serde support for serialization
//!
//! # Usage
//! ```
//! use aeroevap_core::core_types::units::{Celsius, Millibars};
//!
//! let kelvin = Celsius::new(25.0).to_kelvin();
//! assert!((*kelvin - 298.15).abs() < 1e-9);
//!
//! let kpa = Millibars::new(1013.25).to_kilopascals();
//! assert!((*kpa - 101.325).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, Sub};

// ============================================================================
// TEMPERATURE TYPES
// ============================================================================

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Celsius(f64);

impl Deref for Celsius {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Celsius {
    /// Celsius to Kelvin conversion offset (0°C = 273.15 K)
    pub const KELVIN_OFFSET: f64 = 273.15;

    /// Water freezing point
    pub const FREEZING: Celsius = Celsius(0.0);

    /// Create a new Celsius temperature
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Celsius(value)
    }

    /// Convert to Kelvin
    #[inline]
    #[must_use]
    pub fn to_kelvin(self) -> Kelvin {
        Kelvin(self.0 + Self::KELVIN_OFFSET)
    }
}

impl From<f64> for Celsius {
    fn from(v: f64) -> Self {
        Celsius(v)
    }
}

impl From<Celsius> for Kelvin {
    fn from(c: Celsius) -> Kelvin {
        c.to_kelvin()
    }
}

impl From<Celsius> for f64 {
    fn from(c: Celsius) -> f64 {
        c.0
    }
}

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}°C", self.0)
    }
}

/// Temperature in Kelvin (absolute scale)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kelvin(f64);

impl Deref for Kelvin {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Kelvin {
    /// Create a new Kelvin temperature
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Kelvin(value)
    }

    /// Convert to Celsius
    #[inline]
    #[must_use]
    pub fn to_celsius(self) -> Celsius {
        Celsius(self.0 - Celsius::KELVIN_OFFSET)
    }
}

/// Difference of two absolute temperatures, in K
impl Sub for Kelvin {
    type Output = f64;
    fn sub(self, rhs: Kelvin) -> f64 {
        self.0 - rhs.0
    }
}

impl From<f64> for Kelvin {
    fn from(v: f64) -> Self {
        Kelvin(v)
    }
}

impl From<Kelvin> for f64 {
    fn from(k: Kelvin) -> f64 {
        k.0
    }
}

impl fmt::Display for Kelvin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} K", self.0)
    }
}

// ============================================================================
// PRESSURE TYPES
// ============================================================================

/// Air pressure in millibars (hPa)
///
/// Station pressure is always supplied in millibars; the humidity and
/// density formulas work in kPa and convert through
/// [`Millibars::to_kilopascals`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Millibars(f64);

impl Deref for Millibars {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Millibars {
    /// Reference pressure for potential temperature (1000 mb)
    pub const REFERENCE: Millibars = Millibars(1000.0);

    /// Create a new pressure in millibars
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Millibars(value)
    }

    /// Convert to kilopascals (1 kPa = 10 mb)
    #[inline]
    #[must_use]
    pub fn to_kilopascals(self) -> Kilopascals {
        Kilopascals(self.0 / 10.0)
    }
}

impl From<f64> for Millibars {
    fn from(v: f64) -> Self {
        Millibars(v)
    }
}

impl fmt::Display for Millibars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} mb", self.0)
    }
}

/// Pressure in kilopascals, used for vapor pressures
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilopascals(f64);

impl Deref for Kilopascals {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Kilopascals {
    /// Create a new pressure in kilopascals
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Kilopascals(value)
    }
}

/// Difference of two pressures, in kPa
impl Sub for Kilopascals {
    type Output = f64;
    fn sub(self, rhs: Kilopascals) -> f64 {
        self.0 - rhs.0
    }
}

impl From<f64> for Kilopascals {
    fn from(v: f64) -> Self {
        Kilopascals(v)
    }
}

impl From<Kilopascals> for f64 {
    fn from(p: Kilopascals) -> f64 {
        p.0
    }
}

impl fmt::Display for Kilopascals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} kPa", self.0)
    }
}
