//! # Hub equipment capabilities
//!
//! Each trait is the minimal contract the robot software needs from one kind of equipment. All
//! commands are fire-and-forget: the driver owns the physical state and nothing is verified.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::{collections::HashSet, time::Duration};

use crate::ids::{ButtonId, StopPolicy};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Turn settings applied to the drive base before an in-place turn.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TurnProfile {
    /// Turn acceleration as a percentage of the drive base maximum.
    pub acceleration_pct: f64,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The hub's face buttons.
pub trait Buttons {
    /// The set of buttons currently held down.
    fn pressed(&self) -> HashSet<ButtonId>;

    /// Set the button which aborts the running program, or `None` to disable it.
    fn set_stop_button(&mut self, button: Option<ButtonId>);
}

/// A downward facing reflectance sensor.
pub trait ReflectanceSensor {
    /// Measured reflection as a percentage, 0 (dark) to 100 (bright).
    fn reflection(&mut self) -> f64;
}

/// A motor with a built in rotation sensor.
pub trait Motor {
    /// Run at the given signed duty cycle (-100 to 100 percent) until told otherwise.
    fn run_at_duty_cycle(&mut self, duty_pct: f64);

    /// Rotate by `delta_deg` relative to the current angle at `speed_pct`.
    ///
    /// If `wait` is true the call blocks until the motor has stopped, otherwise it returns
    /// as soon as the move is started.
    fn run_to_relative_angle(&mut self, speed_pct: f64, delta_deg: f64, wait: bool);

    /// Current angle relative to the angle reference.
    ///
    /// Units: degrees
    fn current_angle(&self) -> f64;

    /// Actively hold the current position.
    fn hold(&mut self);

    /// Stop driving and let the motor coast.
    fn stop(&mut self);

    /// Redefine the current position as `angle_deg`.
    fn reset_angle_reference(&mut self, angle_deg: f64);
}

/// A differential drive base with gyro assistance.
///
/// Manoeuvres block until the drive base's own closed loop has completed.
pub trait Chassis {
    /// Reset the travelled distance and heading to zero.
    fn reset_odometry(&mut self);

    /// Apply turn settings for subsequent turns.
    fn configure_turn_profile(&mut self, profile: TurnProfile);

    /// Turn in place by `angle_deg`, positive is clockwise seen from above.
    fn turn_in_place(&mut self, angle_deg: f64, then: StopPolicy);

    /// Drive straight for `distance_mm`, negative is backwards.
    fn straight(&mut self, distance_mm: f64, then: StopPolicy);

    /// Enable or disable gyro assistance.
    fn use_gyro(&mut self, enabled: bool);
}

/// Time source and blocking delay.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed epoch.
    fn now(&self) -> Duration;

    /// Block the control task for `duration`.
    fn wait(&mut self, duration: Duration);
}
