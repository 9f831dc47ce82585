//! Black threshold calibration

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};

// Internal
use super::{LineSensors, Params, ReflectError, MAX_REFLECTANCE_PCT, MIN_REFLECTANCE_PCT};
use crate::input::Input;
use hub_if::Side;
use util::{maths::mean, time::secs_to_duration};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Calibration shared by every line detection decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationState {
    black_threshold_pct: f64,
}

/// Outcome of a black calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibReport {
    /// Mean reading of each sensor that took part.
    pub sensor_means_pct: Vec<(Side, f64)>,

    /// The resulting threshold, the mean of the sensor means.
    pub black_threshold_pct: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CalibrationState {
    /// Create the calibration with an initial threshold.
    pub fn new(black_threshold_pct: f64) -> Result<Self, ReflectError> {
        validate_threshold(black_threshold_pct)?;
        Ok(Self {
            black_threshold_pct,
        })
    }

    /// Reflectance below which a sensor is over the line.
    ///
    /// Units: percent
    pub fn black_threshold(&self) -> f64 {
        self.black_threshold_pct
    }

    /// Overwrite the threshold.
    pub fn set_black_threshold(&mut self, black_threshold_pct: f64) -> Result<(), ReflectError> {
        validate_threshold(black_threshold_pct)?;
        self.black_threshold_pct = black_threshold_pct;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Calibrate the black threshold.
///
/// Waits for the trigger button, then takes `sample_count` readings from every
/// fitted sensor with the sample delay between each, and sets the threshold to
/// the mean of the per-sensor means. With only one sensor fitted its mean is
/// the threshold.
///
/// On any error the calibration is left untouched.
pub fn calibrate_black(
    sensors: &mut LineSensors,
    input: &mut Input,
    params: &Params,
    sample_count: usize,
    calib: &mut CalibrationState,
) -> Result<CalibReport, ReflectError> {
    // Check the request before blocking on the operator
    let sides = sensors.fitted();
    if sides.is_empty() {
        return Err(ReflectError::NoSensors);
    }
    if sample_count == 0 {
        return Err(ReflectError::ZeroSamples);
    }
    params.check()?;

    info!(
        "Black calibration: place the robot on the line and press {:?}",
        params.trigger_button
    );
    let timeout = input.default_timeout();
    input.wait_button(params.trigger_button, timeout)?;

    // Collect the samples, interleaving the sensors
    let delay = secs_to_duration(params.sample_delay_s);
    let mut samples: Vec<Vec<f64>> = vec![Vec::with_capacity(sample_count); sides.len()];

    for _ in 0..sample_count {
        for (i, side) in sides.iter().enumerate() {
            samples[i].push(sensors.read(*side)?);
        }
        input.wait(delay);
    }

    let mut sensor_means_pct = Vec::with_capacity(sides.len());
    for (side, s) in sides.iter().zip(samples.iter()) {
        // Never empty since sample_count > 0
        let m = mean(s).unwrap_or(MIN_REFLECTANCE_PCT);
        debug!("{} sensor mean over {} samples: {:.2}", side, s.len(), m);
        sensor_means_pct.push((*side, m));
    }

    let means: Vec<f64> = sensor_means_pct.iter().map(|(_, m)| *m).collect();
    let black_threshold_pct = mean(&means).unwrap_or(MIN_REFLECTANCE_PCT);

    calib.set_black_threshold(black_threshold_pct)?;

    info!("Black threshold calibrated to {:.2}", black_threshold_pct);

    Ok(CalibReport {
        sensor_means_pct,
        black_threshold_pct,
    })
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn validate_threshold(threshold_pct: f64) -> Result<(), ReflectError> {
    if (MIN_REFLECTANCE_PCT..=MAX_REFLECTANCE_PCT).contains(&threshold_pct) {
        Ok(())
    } else {
        Err(ReflectError::InvalidThreshold(threshold_pct))
    }
}
