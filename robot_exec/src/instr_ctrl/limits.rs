//! Instrument angle limits

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::InstrCtrlError;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Closed range every instrument target is clamped into.
///
/// Units: degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct InstrumentLimits {
    lower: f64,
    upper: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl InstrumentLimits {
    /// Create the limits, rejecting `lower > upper` and bounds which are not
    /// finite.
    pub fn new(lower: f64, upper: f64) -> Result<Self, InstrCtrlError> {
        if lower.is_finite() && upper.is_finite() && lower <= upper {
            Ok(Self { lower, upper })
        } else {
            Err(InstrCtrlError::InvalidLimits { lower, upper })
        }
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Limit `angle_deg` into `[lower, upper]`.
    pub fn clamp(&self, angle_deg: f64) -> f64 {
        clamp(&angle_deg, &self.lower, &self.upper)
    }
}
