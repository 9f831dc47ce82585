//! Single sensor bang-bang laws

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use super::*;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LineCtrl {

    /// Left-only edge following law.
    ///
    /// The sensor sits on the line's edge and the robot steers to keep the
    /// reading inside the `[threshold, upper_band)` corridor:
    /// - below the threshold: hard right,
    /// - inside the corridor: straight,
    /// - at or above the upper band: hard left.
    pub(crate) fn calc_left_only(
        &self,
        left_pct: f64,
        threshold_pct: f64,
        speed_pct: f64
    ) -> (DriveDems, Zone) {
        if left_pct < threshold_pct {
            (DriveDems::hard_right(speed_pct), Zone::HardRight)
        }
        else if left_pct < self.params.upper_band_pct {
            (DriveDems::straight(speed_pct), Zone::Straight)
        }
        else {
            (DriveDems::hard_left(speed_pct), Zone::HardLeft)
        }
    }

    /// Right-only law, two zones about the threshold: below it hard left, at
    /// or above it hard right.
    pub(crate) fn calc_right_only(
        &self,
        right_pct: f64,
        threshold_pct: f64,
        speed_pct: f64
    ) -> (DriveDems, Zone) {
        if right_pct < threshold_pct {
            (DriveDems::hard_left(speed_pct), Zone::HardLeft)
        }
        else {
            (DriveDems::hard_right(speed_pct), Zone::HardRight)
        }
    }
}
