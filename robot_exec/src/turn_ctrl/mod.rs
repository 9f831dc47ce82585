//! Turn control module
//!
//! Two kinds of turn are handled here:
//! - a gyro-corrected turn by a fixed angle, delegated to the drive base with
//!   a drift bias applied,
//! - turn-until-line, a single tick decision spinning the robot in place
//!   until a sensor sees the line.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

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
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during TurnCtrl operation.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TurnCtrlError {
    #[error("Recieved an invalid turn command: {0:?}")]
    InvalidTurnCmd(TurnCmd),

    #[error("Invalid TurnCtrl parameters: {0}")]
    InvalidParams(String),
}
