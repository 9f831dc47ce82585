//! Utility library for the robot software

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod logger;
pub mod maths;
pub mod module;
pub mod params;
pub mod session;
pub mod time;
