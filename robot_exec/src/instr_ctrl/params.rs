//! Parameters structure for instrument control

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use hub_if::ButtonId;
use serde::Deserialize;

use super::{InstrCtrlError, InstrumentLimits};
use util::time::try_secs_to_duration;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters shared by all instruments.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- LIMITS ----

    /// Limits installed at construction, `None` leaves the instrument
    /// uncalibrated until a calibration is run.
    ///
    /// Units: degrees, `[lower, upper]`
    pub default_limits_deg: Option<[f64; 2]>,

    /// Limits relative to the new zero after an automatic calibration, also
    /// used for a bound that a manual calibration does not set.
    ///
    /// Units: degrees, `[lower, upper]`
    pub auto_limits_deg: [f64; 2],

    // ---- AUTOMATIC CALIBRATION ----

    /// Relative move made before declaring the zero reference.
    ///
    /// Units: degrees
    pub retract_angle_deg: f64,

    /// Speed of the retract move.
    ///
    /// Units: percent
    pub retract_speed_pct: f64,

    // ---- MANUAL CALIBRATION ----

    /// Held to jog the instrument down.
    pub down_button: ButtonId,

    /// Held to jog the instrument up.
    pub up_button: ButtonId,

    /// Duty cycle magnitude while jogging.
    ///
    /// Units: percent
    pub jog_duty_pct: f64,

    /// Longest a jog button may be held.
    ///
    /// Units: seconds
    pub max_jog_s: f64,
}

impl Params {
    /// Check the limits, retract move and jog time are usable.
    pub fn check(&self) -> Result<(), InstrCtrlError> {
        if let Some([lower, upper]) = self.default_limits_deg {
            InstrumentLimits::new(lower, upper)?;
        }
        InstrumentLimits::new(self.auto_limits_deg[0], self.auto_limits_deg[1])?;

        if !(self.retract_angle_deg.is_finite()
            && self.retract_speed_pct.is_finite()
            && self.jog_duty_pct.is_finite())
        {
            return Err(InstrCtrlError::InvalidParams(
                "retract and jog values must be finite".into()
            ));
        }

        try_secs_to_duration(self.max_jog_s)
            .map_err(|e| InstrCtrlError::InvalidParams(format!("max_jog_s: {}", e)))?;

        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            default_limits_deg: None,
            auto_limits_deg: [0.0, 90.0],
            retract_angle_deg: -20.0,
            retract_speed_pct: 30.0,
            down_button: ButtonId::Left,
            up_button: ButtonId::Right,
            jog_duty_pct: 30.0,
            max_jog_s: 20.0,
        }
    }
}
