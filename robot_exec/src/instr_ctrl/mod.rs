//! Instrument control module
//!
//! Position control of the auxiliary mechanisms (arms, tools). An instrument
//! is driven by one or two motors which always move together to the same
//! angle, bounded by calibrated limits.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calib;
mod limits;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use calib::*;
pub use limits::*;
pub use params::*;
pub use state::*;

use crate::input::InputError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The largest number of motors driving one instrument.
pub const MAX_INSTR_MOTORS: usize = 2;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during instrument control.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InstrCtrlError {
    #[error("Instrument \"{0}\" has no angle limits, calibrate it before moving")]
    Uncalibrated(String),

    #[error("An instrument needs 1 to 2 motors, {0} were given")]
    InvalidMotorCount(usize),

    #[error("Invalid angle limits: [{lower}, {upper}] must be finite with lower at most upper")]
    InvalidLimits { lower: f64, upper: f64 },

    #[error("Invalid instrument parameters: {0}")]
    InvalidParams(String),

    #[error("Target angle {0} is not a number")]
    InvalidTarget(f64),

    #[error("Manual calibration input failed: {0}")]
    Input(#[from] InputError),
}
