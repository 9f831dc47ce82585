//! Dual sensor proportional law

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use super::*;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LineCtrl {

    /// Symmetric proportional law.
    ///
    /// A single error term, the left reading's offset from the edge midpoint,
    /// is scaled into a correction which is added to the left motor and
    /// taken from the right one.
    pub(crate) fn calc_dual(&self, left_pct: f64, speed_pct: f64) -> (DriveDems, Zone) {
        let error_pct = left_pct - self.params.dual_midpoint_pct;
        let correction_pct = self.params.dual_k_p * error_pct;

        (
            DriveDems::new(speed_pct + correction_pct, speed_pct - correction_pct),
            Zone::Proportional
        )
    }
}
