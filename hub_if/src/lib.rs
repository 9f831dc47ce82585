//! # Hub interface crate.
//!
//! Provides the capability interfaces through which the robot software reaches the hub's
//! buttons, motors, reflectance sensors and drive base. The drivers behind these traits are
//! provided by the platform (or by the simulation in `robot_lib::sim`).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Identifiers shared by all capability sets (buttons, sides, stop policies)
pub mod ids;

/// Capability traits for the hub equipment
pub mod devices;

// ------------------------------------------------------------------------------------------------
// REEXPORTS
// ------------------------------------------------------------------------------------------------

pub use devices::*;
pub use ids::*;
