//! Parameters structure for LineCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for line following.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- SINGLE SENSOR ----

    /// Upper edge of the straight driving corridor in left-only mode. Left
    /// readings at or above this are treated as drifting off the line edge.
    ///
    /// Units: percent reflectance
    pub upper_band_pct: f64,

    // ---- DUAL SENSOR ----

    /// Nominal reading of a sensor sitting exactly on the line edge.
    ///
    /// Units: percent reflectance
    pub dual_midpoint_pct: f64,

    /// Proportional gain from reflectance error to differential duty cycle.
    ///
    /// Units: percent duty / percent reflectance
    pub dual_k_p: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            upper_band_pct: 90.0,
            dual_midpoint_pct: 50.0,
            dual_k_p: 0.5,
        }
    }
}
