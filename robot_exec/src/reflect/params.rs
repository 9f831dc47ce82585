//! Parameters structure for reflectance sensing

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use hub_if::ButtonId;
use serde::Deserialize;

use super::ReflectError;
use util::time::try_secs_to_duration;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the line sensors and black calibration.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Black threshold used until a calibration has been run.
    ///
    /// Units: percent reflectance
    pub default_black_threshold_pct: f64,

    /// Button which starts the black calibration.
    pub trigger_button: ButtonId,

    /// Delay between two consecutive samples.
    ///
    /// Units: seconds
    pub sample_delay_s: f64,

    /// Number of samples taken per sensor when no count is given.
    pub default_sample_count: usize,
}

impl Params {
    /// Check the sample delay is a usable duration.
    pub fn check(&self) -> Result<(), ReflectError> {
        try_secs_to_duration(self.sample_delay_s)
            .map_err(|e| ReflectError::InvalidParams(format!("sample_delay_s: {}", e)))?;

        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            default_black_threshold_pct: 50.0,
            trigger_button: ButtonId::Center,
            sample_delay_s: 0.01,
            default_sample_count: 10,
        }
    }
}
