//! Parameters structure for TurnCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for turn control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    /// Overshoot added to the magnitude of every gyro turn to compensate
    /// the drive base's systematic under-rotation.
    ///
    /// Units: degrees
    pub drift_bias_deg: f64,

    /// Period between two ticks of turn-until-line.
    ///
    /// Units: seconds
    pub line_search_tick_s: f64,

    /// Bound on a full turn-until-line search.
    ///
    /// Units: seconds
    pub line_search_timeout_s: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            drift_bias_deg: 5.0,
            line_search_tick_s: 0.01,
            line_search_timeout_s: 10.0,
        }
    }
}
