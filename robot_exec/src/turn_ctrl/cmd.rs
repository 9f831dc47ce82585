//! Commands passed into and out of TurnCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::line_ctrl::DriveDems;
use hub_if::TurnProfile;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A turn request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TurnCmd {
    /// Turn in place by a fixed angle using the gyro.
    TurnBy {
        /// Units: degrees, positive clockwise
        angle_deg: f64,
        /// Units: percent
        rate_pct: f64,
    },

    /// One tick of turning in place until the line is found.
    LineSearch {
        /// Reading of the sensor looking for the line.
        reading_pct: f64,
        black_threshold_pct: f64,
        /// Units: percent, only the magnitude is used
        speed_pct: f64,
    },
}

/// What the drive must do to carry out a turn command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TurnDems {
    /// Delegate a turn to the drive base, holding the final heading.
    Turn {
        angle_deg: f64,
        profile: TurnProfile,
    },

    /// Run the drive motors at these duty cycles.
    Spin(DriveDems),

    /// Stop both drive motors.
    Stop,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TurnCmd {

    /// Determine if the command is valid (i.e. all values are finite).
    pub fn is_valid(&self) -> bool {
        match self {
            TurnCmd::TurnBy { angle_deg, rate_pct } => 
                angle_deg.is_finite() && rate_pct.is_finite(),
            TurnCmd::LineSearch { reading_pct, black_threshold_pct, speed_pct } =>
                reading_pct.is_finite()
                && black_threshold_pct.is_finite()
                && speed_pct.is_finite()
        }
    }
}
