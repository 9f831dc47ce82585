//! # Robot library.
//!
//! Control software for a small wheeled competition robot: line following,
//! gyro corrected turns, black threshold calibration and instrument position
//! control. The hub equipment is reached only through the `hub_if` traits.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Button input - bounded, cancellable waits on the hub buttons
pub mod input;

/// Instrument control - angle limited position control of the auxiliary motors
pub mod instr_ctrl;

/// Line control - maps reflectance readings into drive motor duty cycles
pub mod line_ctrl;

/// Reflectance - line sensor reading and black threshold calibration
pub mod reflect;

/// The robot, binding every controller to the hub equipment
pub mod robot;

/// Simulated hub equipment running on virtual time
pub mod sim;

/// Turn control - drift corrected turns and turn-until-line
pub mod turn_ctrl;
