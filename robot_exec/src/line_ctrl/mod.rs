//! Line following control module

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_dual;
mod calc_single;
mod cmd;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use cmd::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Highest commandable speed or duty cycle.
///
/// Units: percent
pub const MAX_DUTY_PCT: f64 = 100.0;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LineCtrl operation.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LineCtrlError {
    #[error("At least one line sensor must be selected for line following")]
    NoSensorSelected,

    #[error("The {0:?} mode needs a reading from the {1} sensor but none was given")]
    MissingReading(FollowMode, hub_if::Side),

    #[error("Invalid LineCtrl parameters: {0}")]
    InvalidParams(String),
}
