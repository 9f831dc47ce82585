//! Line sensor pair

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;

// Internal
use super::{ReflectError, MAX_REFLECTANCE_PCT, MIN_REFLECTANCE_PCT};
use hub_if::{ReflectanceSensor, Side};
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The one or two downward facing sensors fitted to the robot.
///
/// Which sensors exist is fixed at construction.
pub struct LineSensors {
    left: Option<Box<dyn ReflectanceSensor>>,
    right: Option<Box<dyn ReflectanceSensor>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LineSensors {
    pub fn new(
        left: Option<Box<dyn ReflectanceSensor>>,
        right: Option<Box<dyn ReflectanceSensor>>,
    ) -> Self {
        Self { left, right }
    }

    /// Returns true if the sensor on `side` is fitted.
    pub fn is_fitted(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left.is_some(),
            Side::Right => self.right.is_some(),
        }
    }

    /// The sides with a fitted sensor, left first.
    pub fn fitted(&self) -> Vec<Side> {
        [Side::Left, Side::Right]
            .iter()
            .copied()
            .filter(|s| self.is_fitted(*s))
            .collect()
    }

    /// Take one reading from the sensor on `side`.
    ///
    /// Readings outside [0, 100] are clamped into range.
    pub fn read(&mut self, side: Side) -> Result<f64, ReflectError> {
        let sensor = match side {
            Side::Left => self.left.as_mut(),
            Side::Right => self.right.as_mut(),
        }
        .ok_or(ReflectError::SensorUnavailable(side))?;

        let raw = sensor.reflection();
        let reading = clamp(&raw, &MIN_REFLECTANCE_PCT, &MAX_REFLECTANCE_PCT);

        if reading != raw {
            warn!("{} sensor reading {} out of range, clamped to {}", side, raw, reading);
        }

        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimSensor;

    #[test]
    fn test_read_and_clamp() {
        let mut sensors = LineSensors::new(
            Some(Box::new(SimSensor::new(vec![120.0, -3.0, 42.0]))),
            None,
        );

        assert_eq!(sensors.fitted(), vec![Side::Left]);
        assert_eq!(sensors.read(Side::Left), Ok(100.0));
        assert_eq!(sensors.read(Side::Left), Ok(0.0));
        assert_eq!(sensors.read(Side::Left), Ok(42.0));
        assert_eq!(
            sensors.read(Side::Right),
            Err(ReflectError::SensorUnavailable(Side::Right))
        );
    }
}
