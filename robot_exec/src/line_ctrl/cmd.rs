//! Inputs and outputs of LineCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::LineCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Duty cycle demands for the two drive motors.
///
/// Units: percent, -100 to 100
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct DriveDems {
    pub left_pct: f64,
    pub right_pct: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Which sensors drive the control law, fixed per call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FollowMode {
    /// Proportional law from both sensors.
    Dual,
    /// Three zone bang-bang law on the left sensor.
    LeftOnly,
    /// Two zone bang-bang law on the right sensor.
    RightOnly,
}

/// The branch of the control law taken on a cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Zone {
    /// Left motor off, right motor at speed.
    HardRight,
    /// Both motors at speed.
    Straight,
    /// Right motor off, left motor at speed.
    HardLeft,
    /// Continuous correction from the dual sensor law.
    Proportional,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FollowMode {
    /// Select the mode from the two sensor flags.
    pub fn from_flags(use_left: bool, use_right: bool) -> Result<Self, LineCtrlError> {
        match (use_left, use_right) {
            (true, true) => Ok(FollowMode::Dual),
            (true, false) => Ok(FollowMode::LeftOnly),
            (false, true) => Ok(FollowMode::RightOnly),
            (false, false) => Err(LineCtrlError::NoSensorSelected),
        }
    }

    /// Whether the mode reads the left sensor.
    pub fn uses_left(&self) -> bool {
        matches!(self, FollowMode::Dual | FollowMode::LeftOnly)
    }

    /// Whether the mode reads the right sensor.
    pub fn uses_right(&self) -> bool {
        matches!(self, FollowMode::Dual | FollowMode::RightOnly)
    }
}

impl DriveDems {
    pub fn new(left_pct: f64, right_pct: f64) -> Self {
        Self {
            left_pct,
            right_pct,
        }
    }

    /// Both motors stopped.
    pub fn stopped() -> Self {
        Self::default()
    }

    /// Left motor off, right motor at `speed`.
    pub fn hard_right(speed_pct: f64) -> Self {
        Self::new(0.0, speed_pct)
    }

    /// Right motor off, left motor at `speed`.
    pub fn hard_left(speed_pct: f64) -> Self {
        Self::new(speed_pct, 0.0)
    }

    /// Both motors at `speed`.
    pub fn straight(speed_pct: f64) -> Self {
        Self::new(speed_pct, speed_pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_flags() {
        assert_eq!(FollowMode::from_flags(true, true), Ok(FollowMode::Dual));
        assert_eq!(FollowMode::from_flags(true, false), Ok(FollowMode::LeftOnly));
        assert_eq!(FollowMode::from_flags(false, true), Ok(FollowMode::RightOnly));
        assert_eq!(
            FollowMode::from_flags(false, false),
            Err(LineCtrlError::NoSensorSelected)
        );
        assert!(FollowMode::Dual.uses_left() && FollowMode::Dual.uses_right());
        assert!(!FollowMode::RightOnly.uses_left());
    }
}
