//! # Reflectance module
//!
//! Reading the downward line sensors and calibrating the black threshold that
//! separates "on line" from "off line".

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod sampler;
mod sensors;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use sampler::*;
pub use sensors::*;

use crate::input::InputError;
use hub_if::Side;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Lowest reflectance a sensor can report.
pub const MIN_REFLECTANCE_PCT: f64 = 0.0;

/// Highest reflectance a sensor can report.
pub const MAX_REFLECTANCE_PCT: f64 = 100.0;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors raised while sensing or calibrating reflectance.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ReflectError {
    #[error("The {0} line sensor is not fitted")]
    SensorUnavailable(Side),

    #[error("No line sensors are fitted, cannot calibrate")]
    NoSensors,

    #[error("At least one sample per sensor is required for calibration")]
    ZeroSamples,

    #[error("Black threshold {0} is outside the reflectance range [0, 100]")]
    InvalidThreshold(f64),

    #[error("Invalid reflectance parameters: {0}")]
    InvalidParams(String),

    #[error("Calibration trigger not received: {0}")]
    Trigger(#[from] InputError),
}
