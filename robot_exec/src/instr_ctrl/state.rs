//! Implementations for the Instrument structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use serde::Serialize;

// Internal
use super::{InstrCtrlError, InstrumentLimits, Params, MAX_INSTR_MOTORS};
use crate::line_ctrl::MAX_DUTY_PCT;
use hub_if::Motor;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An instrument driven by one or two motors.
///
/// All motors of an instrument share one set of limits and always receive
/// the same target angle.
pub struct Instrument {
    pub(crate) name: String,

    pub(crate) params: Params,

    pub(crate) motors: Vec<Box<dyn Motor>>,

    pub(crate) limits: Option<InstrumentLimits>,
}

/// What a `move_to` call commanded.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MoveReport {
    /// The target after clamping into the limits.
    ///
    /// Units: degrees
    pub target_deg: f64,

    /// Relative move issued to each motor, in motor order.
    ///
    /// Units: degrees
    pub deltas_deg: Vec<f64>,

    /// The requested target was outside the limits.
    pub target_limited: bool,

    /// The requested speed was outside [0, 100].
    pub speed_limited: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Instrument {

    /// Create an instrument from its motors.
    ///
    /// The default limits from the parameters are installed if there are
    /// any, otherwise the instrument must be calibrated before it can move.
    pub fn new(
        name: &str,
        motors: Vec<Box<dyn Motor>>,
        params: Params
    ) -> Result<Self, InstrCtrlError> {
        if motors.is_empty() || motors.len() > MAX_INSTR_MOTORS {
            return Err(InstrCtrlError::InvalidMotorCount(motors.len()));
        }

        params.check()?;

        let limits = match params.default_limits_deg {
            Some([lower, upper]) => Some(InstrumentLimits::new(lower, upper)?),
            None => None
        };

        debug!(
            "Instrument \"{}\" created with {} motor(s), limits {:?}",
            name, motors.len(), limits
        );

        Ok(Self {
            name: name.to_string(),
            params,
            motors,
            limits,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_motors(&self) -> usize {
        self.motors.len()
    }

    /// Current limits, `None` if the instrument is uncalibrated.
    pub fn limits(&self) -> Option<InstrumentLimits> {
        self.limits
    }

    /// Replace the limits.
    pub fn set_limits(&mut self, limits: InstrumentLimits) {
        info!(
            "Instrument \"{}\" limits set to [{:.1}, {:.1}]",
            self.name, limits.lower(), limits.upper()
        );
        self.limits = Some(limits)
    }

    /// Current angle of every motor, in motor order.
    pub fn angles(&self) -> Vec<f64> {
        self.motors.iter().map(|m| m.current_angle()).collect()
    }

    /// Move every motor to `target_deg` and hold it there.
    ///
    /// The target is clamped into the limits and each motor is sent its own
    /// relative move from its current angle. All moves are started together
    /// and the call returns when the last motor has stopped. Every motor then
    /// actively holds its position.
    pub fn move_to(
        &mut self,
        target_deg: f64,
        speed_pct: f64
    ) -> Result<MoveReport, InstrCtrlError> {
        let limits = self.limits
            .ok_or_else(|| InstrCtrlError::Uncalibrated(self.name.clone()))?;

        if target_deg.is_nan() {
            return Err(InstrCtrlError::InvalidTarget(target_deg));
        }

        let clamped_deg = limits.clamp(target_deg);
        let target_limited = clamped_deg != target_deg;
        if target_limited {
            debug!(
                "Instrument \"{}\" target {:.1} limited to {:.1}",
                self.name, target_deg, clamped_deg
            );
        }

        let speed = clamp(&speed_pct, &0.0, &MAX_DUTY_PCT);

        let deltas_deg: Vec<f64> = self.angles()
            .iter()
            .map(|a| clamped_deg - a)
            .collect();

        self.run_relative(speed, &deltas_deg);
        self.hold();

        Ok(MoveReport {
            target_deg: clamped_deg,
            deltas_deg,
            target_limited,
            speed_limited: speed != speed_pct,
        })
    }

    /// Start a relative move on every motor, blocking only on the last one.
    pub(crate) fn run_relative(&mut self, speed_pct: f64, deltas_deg: &[f64]) {
        let last = self.motors.len() - 1;

        for (i, (motor, delta)) in self.motors.iter_mut().zip(deltas_deg).enumerate() {
            motor.run_to_relative_angle(speed_pct, *delta, i == last);
        }
    }

    /// Actively hold every motor at its current position.
    pub(crate) fn hold(&mut self) {
        for m in self.motors.iter_mut() {
            m.hold();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{MotorEvent, SimClock, SimMotor};

    fn params_with_limits(lower: f64, upper: f64) -> Params {
        Params {
            default_limits_deg: Some([lower, upper]),
            ..Params::default()
        }
    }

    #[test]
    fn test_motor_count() {
        let clock = SimClock::new();
        let m = || Box::new(SimMotor::new(&clock)) as Box<dyn Motor>;

        assert!(matches!(
            Instrument::new("arm", vec![], Params::default()),
            Err(InstrCtrlError::InvalidMotorCount(0))
        ));
        assert!(matches!(
            Instrument::new("arm", vec![m(), m(), m()], Params::default()),
            Err(InstrCtrlError::InvalidMotorCount(3))
        ));
        assert_eq!(Instrument::new("arm", vec![m()], Params::default()).unwrap().num_motors(), 1);
        assert_eq!(Instrument::new("arm", vec![m(), m()], Params::default()).unwrap().num_motors(), 2);
    }

    #[test]
    fn test_params_checked() {
        let clock = SimClock::new();
        let m = || Box::new(SimMotor::new(&clock)) as Box<dyn Motor>;

        for max_jog_s in [1e20, f64::INFINITY].iter() {
            let params = Params { max_jog_s: *max_jog_s, ..Params::default() };
            assert!(matches!(
                Instrument::new("arm", vec![m()], params),
                Err(InstrCtrlError::InvalidParams(_))
            ));
        }

        let params = params_with_limits(f64::NEG_INFINITY, f64::INFINITY);
        assert!(matches!(
            Instrument::new("arm", vec![m()], params),
            Err(InstrCtrlError::InvalidLimits { .. })
        ));
    }

    #[test]
    fn test_uncalibrated_fails_fast() {
        let clock = SimClock::new();
        let motor = SimMotor::new(&clock);
        let mut instr = Instrument::new(
            "arm", vec![Box::new(motor.clone())], Params::default()
        ).unwrap();

        assert_eq!(
            instr.move_to(45.0, 50.0),
            Err(InstrCtrlError::Uncalibrated("arm".into()))
        );
        assert!(motor.events().is_empty());
    }

    #[test]
    fn test_single_move_clamped() {
        let clock = SimClock::new();
        let motor = SimMotor::new(&clock);
        motor.set_angle(10.0);
        let mut instr = Instrument::new(
            "arm", vec![Box::new(motor.clone())], params_with_limits(-10.0, 90.0)
        ).unwrap();

        let report = instr.move_to(150.0, 60.0).unwrap();

        assert_eq!(report.target_deg, 90.0);
        assert_eq!(report.deltas_deg, vec![80.0]);
        assert!(report.target_limited);
        assert!(!report.speed_limited);
        assert_eq!(
            motor.events(),
            vec![
                MotorEvent::RelAngle { speed_pct: 60.0, delta_deg: 80.0, wait: true },
                MotorEvent::Hold
            ]
        );
        assert_eq!(motor.current_angle(), 90.0);
    }

    #[test]
    fn test_commanded_target_always_within_limits() {
        let clock = SimClock::new();
        let motor = SimMotor::new(&clock);
        let mut instr = Instrument::new(
            "arm", vec![Box::new(motor.clone())], params_with_limits(-10.0, 90.0)
        ).unwrap();

        for target in [-1e9, -10.5, -10.0, 0.0, 45.0, 90.0, 90.1, 1e9, f64::INFINITY].iter() {
            let before = motor.current_angle();
            let report = instr.move_to(*target, 50.0).unwrap();
            let commanded = before + report.deltas_deg[0];

            assert!((-10.0..=90.0).contains(&commanded), "target {} commanded {}", target, commanded);
        }

        assert!(matches!(
            instr.move_to(f64::NAN, 50.0),
            Err(InstrCtrlError::InvalidTarget(t)) if t.is_nan()
        ));
    }

    #[test]
    fn test_dual_move_joins_on_last() {
        let clock = SimClock::new();
        let first = SimMotor::new(&clock);
        let second = SimMotor::new(&clock);
        first.set_angle(20.0);
        second.set_angle(25.0);

        let mut instr = Instrument::new(
            "lift",
            vec![Box::new(first.clone()), Box::new(second.clone())],
            params_with_limits(0.0, 120.0)
        ).unwrap();

        let report = instr.move_to(60.0, 250.0).unwrap();

        // Deltas are computed per motor from each motor's own angle
        assert_eq!(report.deltas_deg, vec![40.0, 35.0]);
        assert!(report.speed_limited);

        // Only the last motor's move is waited on, both hold afterwards
        assert_eq!(
            first.events(),
            vec![
                MotorEvent::RelAngle { speed_pct: 100.0, delta_deg: 40.0, wait: false },
                MotorEvent::Hold
            ]
        );
        assert_eq!(
            second.events(),
            vec![
                MotorEvent::RelAngle { speed_pct: 100.0, delta_deg: 35.0, wait: true },
                MotorEvent::Hold
            ]
        );
        assert_eq!(instr.angles(), vec![60.0, 60.0]);
    }
}
