//! Instrument calibration procedures

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};

// Internal
use super::{InstrCtrlError, Instrument, InstrumentLimits};
use crate::{input::Input, line_ctrl::MAX_DUTY_PCT};
use hub_if::ButtonId;
use util::{maths::clamp, time::secs_to_duration};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Instrument {

    /// Automatic calibration.
    ///
    /// Every motor retracts by the retract angle, pushing against its end
    /// stop, and the resulting position becomes the zero reference. The
    /// automatic limits are then installed.
    pub fn calibrate_auto(&mut self) -> Result<InstrumentLimits, InstrCtrlError> {
        let [lower, upper] = self.params.auto_limits_deg;
        let limits = InstrumentLimits::new(lower, upper)?;

        let speed = clamp(&self.params.retract_speed_pct, &0.0, &MAX_DUTY_PCT);
        let deltas = vec![self.params.retract_angle_deg; self.motors.len()];

        debug!(
            "Instrument \"{}\" retracting {:.1} deg",
            self.name, self.params.retract_angle_deg
        );
        self.run_relative(speed, &deltas);

        for m in self.motors.iter_mut() {
            m.reset_angle_reference(0.0);
        }

        self.set_limits(limits);

        Ok(limits)
    }

    /// Manual calibration with the operator jogging the instrument.
    ///
    /// In the down phase the operator holds the down button to drive the
    /// instrument to its lowest position, where the zero reference of every
    /// motor is set to `lower_value` (0 if `None`) and recorded as the lower
    /// limit. In the up phase the up button drives it to its highest position
    /// and the angle of the first motor becomes the upper limit.
    ///
    /// A bound whose phase is skipped keeps its current value, or the
    /// automatic limit if the instrument has never been calibrated. The
    /// limits are only replaced once both phases have succeeded. With neither
    /// phase requested the current limits are returned unchanged, and an
    /// uncalibrated instrument is an error.
    pub fn calibrate_manual(
        &mut self,
        input: &mut Input,
        down: bool,
        up: bool,
        lower_value: Option<f64>,
    ) -> Result<InstrumentLimits, InstrCtrlError> {
        // Nothing measured, an uncalibrated instrument stays uncalibrated
        if !down && !up {
            return self.limits
                .ok_or_else(|| InstrCtrlError::Uncalibrated(self.name.clone()));
        }

        let (mut lower, mut upper) = match self.limits {
            Some(l) => (l.lower(), l.upper()),
            None => (self.params.auto_limits_deg[0], self.params.auto_limits_deg[1]),
        };

        if down {
            info!(
                "Instrument \"{}\": hold {:?} to lower it",
                self.name, self.params.down_button
            );
            self.jog(input, self.params.down_button, -self.params.jog_duty_pct)?;

            lower = lower_value.unwrap_or(0.0);
            for m in self.motors.iter_mut() {
                m.reset_angle_reference(lower);
            }
        }

        if up {
            info!(
                "Instrument \"{}\": hold {:?} to raise it",
                self.name, self.params.up_button
            );
            self.jog(input, self.params.up_button, self.params.jog_duty_pct)?;

            upper = self.motors[0].current_angle();
        }

        let limits = InstrumentLimits::new(lower, upper)?;
        self.set_limits(limits);

        Ok(limits)
    }

    /// Run every motor at `duty_pct` for as long as `button` is held.
    ///
    /// The motors hold their position afterwards, including on error.
    fn jog(&mut self, input: &mut Input, button: ButtonId, duty_pct: f64) -> Result<(), InstrCtrlError> {
        let timeout = input.default_timeout();
        input.wait_pressed(button, timeout)?;

        let duty = clamp(&duty_pct, &-MAX_DUTY_PCT, &MAX_DUTY_PCT);
        for m in self.motors.iter_mut() {
            m.run_at_duty_cycle(duty);
        }

        let held = input.wait_while_held(button, secs_to_duration(self.params.max_jog_s));
        self.hold();

        held.map_err(InstrCtrlError::from)
    }
}
