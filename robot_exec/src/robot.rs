//! # Robot
//!
//! Binds the controllers to the hub equipment. The [`Robot`] owns the drive
//! motors, line sensors, buttons and drive base, and runs each control module
//! on demand. Instruments are built through the robot but owned by the caller,
//! since a mission may carry zero, one or two of them.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

// Internal
use crate::{
    input::{self, Input, InputError},
    instr_ctrl::{self, InstrCtrlError, Instrument, InstrumentLimits},
    line_ctrl::{self, DriveDems, FollowMode, LineCtrl, LineCtrlError},
    reflect::{self, CalibrationState, LineSensors, ReflectError},
    turn_ctrl::{self, TurnCmd, TurnCtrl, TurnCtrlError, TurnDems},
};
use hub_if::{ButtonId, Buttons, Chassis, Clock, Motor, ReflectanceSensor, Side, StopPolicy};
use util::{module::State, time::secs_to_duration};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The hub equipment the robot runs on.
///
/// A `None` line sensor is simply not fitted.
pub struct Hardware {
    pub buttons: Box<dyn Buttons>,
    pub clock: Box<dyn Clock>,
    pub left_motor: Box<dyn Motor>,
    pub right_motor: Box<dyn Motor>,
    pub left_sensor: Option<Box<dyn ReflectanceSensor>>,
    pub right_sensor: Option<Box<dyn ReflectanceSensor>>,
    pub chassis: Box<dyn Chassis>,
}

/// Drive base geometry.
#[derive(Debug, Clone, Deserialize)]
pub struct ChassisParams {
    /// Units: millimeters
    pub wheel_diameter_mm: f64,

    /// Units: millimeters
    pub axle_track_mm: f64,
}

/// Robot parameters, one table per module.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Params {
    pub chassis: ChassisParams,
    pub input: input::Params,
    pub reflect: reflect::Params,
    pub line_ctrl: line_ctrl::Params,
    pub turn_ctrl: turn_ctrl::Params,
    pub instr_ctrl: instr_ctrl::Params,
}

pub struct Robot {
    params: Params,

    input: Input,
    sensors: LineSensors,

    left_motor: Box<dyn Motor>,
    right_motor: Box<dyn Motor>,
    chassis: Box<dyn Chassis>,

    calib: CalibrationState,

    line_ctrl: LineCtrl,
    turn_ctrl: TurnCtrl,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum RobotError {
    #[error("Reflectance error: {0}")]
    Reflect(#[from] ReflectError),

    #[error("Line control error: {0}")]
    LineCtrl(#[from] LineCtrlError),

    #[error("Turn control error: {0}")]
    TurnCtrl(#[from] TurnCtrlError),

    #[error("Instrument control error: {0}")]
    InstrCtrl(#[from] InstrCtrlError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Line not found within {0:?}")]
    LineNotFound(Duration),

    #[error("Invalid straight distance: {0}")]
    InvalidDistance(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ChassisParams {
    fn default() -> Self {
        Self {
            wheel_diameter_mm: 55.0,
            axle_track_mm: 115.0,
        }
    }
}

impl Robot {
    /// Bring up the robot.
    ///
    /// Every module's parameters are checked here, so a bad parameter file
    /// fails at start up rather than mid mission. The black threshold starts
    /// at its default value and the drive base uses the gyro from the start.
    pub fn new(hardware: Hardware, params: Params) -> Result<Self, RobotError> {
        params.reflect.check()?;
        params.instr_ctrl.check()?;

        let calib = CalibrationState::new(params.reflect.default_black_threshold_pct)?;

        let mut line_ctrl = LineCtrl::default();
        line_ctrl.init(params.line_ctrl.clone())?;

        let mut turn_ctrl = TurnCtrl::default();
        turn_ctrl.init(params.turn_ctrl.clone())?;

        let mut chassis = hardware.chassis;
        chassis.use_gyro(true);

        let sensors = LineSensors::new(hardware.left_sensor, hardware.right_sensor);

        info!(
            "Robot initialised: wheel {} mm, axle track {} mm, line sensors {:?}, black threshold {:.1}",
            params.chassis.wheel_diameter_mm,
            params.chassis.axle_track_mm,
            sensors.fitted(),
            calib.black_threshold()
        );

        Ok(Self {
            input: Input::new(hardware.buttons, hardware.clock, params.input.clone())?,
            sensors,
            left_motor: hardware.left_motor,
            right_motor: hardware.right_motor,
            chassis,
            calib,
            line_ctrl,
            turn_ctrl,
            params,
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn calibration(&self) -> &CalibrationState {
        &self.calib
    }

    pub fn input_mut(&mut self) -> &mut Input {
        &mut self.input
    }

    // ---- BUTTONS ----

    pub fn button_pressed(&self, button: ButtonId) -> bool {
        self.input.is_pressed(button)
    }

    /// Wait for `button` to be pressed and every button to be released,
    /// bounded by the default button timeout.
    pub fn wait_button(&mut self, button: ButtonId) -> Result<(), RobotError> {
        let timeout = self.input.default_timeout();
        Ok(self.input.wait_button(button, timeout)?)
    }

    /// Choose the button that stops the program, `None` to disable it.
    pub fn set_program_stop_button(&mut self, button: Option<ButtonId>) {
        self.input.set_stop_button(button)
    }

    // ---- CALIBRATION ----

    /// Calibrate the black threshold from `sample_count` samples per sensor.
    ///
    /// Returns the new threshold.
    pub fn calibrate_black(&mut self, sample_count: usize) -> Result<f64, RobotError> {
        let report = reflect::calibrate_black(
            &mut self.sensors,
            &mut self.input,
            &self.params.reflect,
            sample_count,
            &mut self.calib,
        )?;

        Ok(report.black_threshold_pct)
    }

    // ---- DRIVING ----

    /// One tick of line following.
    ///
    /// Reads the selected sensors, runs the control law and applies the
    /// resulting duty cycles to the drive motors.
    pub fn follow_line(
        &mut self,
        speed_pct: f64,
        use_left: bool,
        use_right: bool,
    ) -> Result<DriveDems, RobotError> {
        let mode = FollowMode::from_flags(use_left, use_right)?;

        let left_pct = match mode.uses_left() {
            true => Some(self.sensors.read(Side::Left)?),
            false => None,
        };
        let right_pct = match mode.uses_right() {
            true => Some(self.sensors.read(Side::Right)?),
            false => None,
        };

        let (dems, report) = self.line_ctrl.proc(&line_ctrl::InputData {
            mode,
            speed_pct,
            left_pct,
            right_pct,
            black_threshold_pct: self.calib.black_threshold(),
        })?;

        trace!("LineCtrl {:?}: {:?} {:?}", mode, dems, report);

        self.apply(dems);

        Ok(dems)
    }

    /// Drive straight by `distance_mm` using the drive base, holding at the
    /// end.
    pub fn drive_straight(&mut self, distance_mm: f64) -> Result<(), RobotError> {
        if !distance_mm.is_finite() {
            return Err(RobotError::InvalidDistance(distance_mm));
        }

        debug!("Driving straight {:.1} mm", distance_mm);
        self.chassis.straight(distance_mm, StopPolicy::Hold);

        Ok(())
    }

    /// Stop both drive motors.
    pub fn stop(&mut self) {
        self.left_motor.stop();
        self.right_motor.stop();
    }

    // ---- TURNING ----

    /// Turn in place by `angle_deg` with the gyro, correcting for drift.
    pub fn turn_by(&mut self, angle_deg: f64, rate_pct: f64) -> Result<(), RobotError> {
        let (dems, report) = self.turn_ctrl.proc(&TurnCmd::TurnBy { angle_deg, rate_pct })?;
        trace!("TurnCtrl {:?} {:?}", dems, report);

        self.execute_turn(dems);

        Ok(())
    }

    /// One tick of turning until the sensor on `side` sees the line.
    ///
    /// Returns true once the line is found, in which case the drive motors
    /// have been stopped.
    pub fn turn_until_line_step(&mut self, side: Side, speed_pct: f64) -> Result<bool, RobotError> {
        let reading_pct = self.sensors.read(side)?;

        let (dems, _) = self.turn_ctrl.proc(&TurnCmd::LineSearch {
            reading_pct,
            black_threshold_pct: self.calib.black_threshold(),
            speed_pct,
        })?;

        Ok(self.execute_turn(dems))
    }

    /// Spin in place until the sensor on `side` sees the line.
    ///
    /// The search is bounded by `timeout`, or the default line search timeout
    /// if `None`. The drive motors are stopped on every exit.
    pub fn turn_until_line(
        &mut self,
        side: Side,
        speed_pct: f64,
        timeout: Option<Duration>,
    ) -> Result<(), RobotError> {
        let timeout = timeout
            .unwrap_or_else(|| secs_to_duration(self.params.turn_ctrl.line_search_timeout_s));
        let tick = secs_to_duration(self.params.turn_ctrl.line_search_tick_s);
        let deadline = self.input.now().saturating_add(timeout);

        let result = loop {
            if let Err(e) = self.input.check_cancelled() {
                break Err(RobotError::from(e));
            }

            match self.turn_until_line_step(side, speed_pct) {
                Ok(true) => {
                    debug!("Line found by the {} sensor", side);
                    return Ok(());
                }
                Ok(false) => (),
                Err(e) => break Err(e),
            }

            if self.input.now() >= deadline {
                break Err(RobotError::LineNotFound(timeout));
            }

            self.input.wait(tick);
        };

        self.stop();
        result
    }

    // ---- INSTRUMENTS ----

    /// Build an instrument from one or two motors using the robot's
    /// instrument parameters.
    pub fn new_instrument(
        &self,
        name: &str,
        motors: Vec<Box<dyn Motor>>,
    ) -> Result<Instrument, RobotError> {
        Ok(Instrument::new(name, motors, self.params.instr_ctrl.clone())?)
    }

    /// Run a manual calibration of `instrument` using the robot's buttons.
    pub fn calibrate_instrument_manual(
        &mut self,
        instrument: &mut Instrument,
        down: bool,
        up: bool,
        lower_value: Option<f64>,
    ) -> Result<InstrumentLimits, RobotError> {
        Ok(instrument.calibrate_manual(&mut self.input, down, up, lower_value)?)
    }

    // ---- PRIVATE ----

    fn apply(&mut self, dems: DriveDems) {
        self.left_motor.run_at_duty_cycle(dems.left_pct);
        self.right_motor.run_at_duty_cycle(dems.right_pct);
    }

    /// Carry out turn demands, returns true if they stopped the robot.
    fn execute_turn(&mut self, dems: TurnDems) -> bool {
        match dems {
            TurnDems::Turn { angle_deg, profile } => {
                self.chassis.use_gyro(true);
                self.chassis.reset_odometry();
                self.chassis.configure_turn_profile(profile);
                self.chassis.turn_in_place(angle_deg, StopPolicy::Hold);
                false
            }
            TurnDems::Spin(d) => {
                self.apply(d);
                false
            }
            TurnDems::Stop => {
                self.stop();
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{ChassisEvent, MotorEvent, SimHub};
    use hub_if::TurnProfile;

    fn hub() -> SimHub {
        SimHub::new(55.0, 115.0)
    }

    fn robot_with_threshold(hub: &SimHub, threshold: f64) -> Robot {
        let mut params = Params::default();
        params.reflect.default_black_threshold_pct = threshold;
        params.input.button_timeout_s = 1.0;
        Robot::new(hub.hardware(), params).unwrap()
    }

    #[test]
    fn test_params_file() {
        let params: Params = util::params::from_str(
            include_str!("../../params/robot.toml")
        ).unwrap();

        assert_eq!(params.chassis.wheel_diameter_mm, 55.0);
        assert_eq!(params.chassis.axle_track_mm, 115.0);
        assert_eq!(params.input.stop_button, Some(ButtonId::Bluetooth));
        assert_eq!(params.reflect.trigger_button, ButtonId::Center);
        assert_eq!(params.turn_ctrl.drift_bias_deg, 5.0);
        assert_eq!(params.instr_ctrl.default_limits_deg, None);
        assert_eq!(params.instr_ctrl.retract_angle_deg, -20.0);

        assert!(Robot::new(hub().hardware(), params).is_ok());
    }

    #[test]
    fn test_follow_line_left_only() {
        let hub = hub();
        let mut robot = robot_with_threshold(&hub, 50.0);

        hub.left_sensor.set_script(vec![20.0, 50.0, 95.0]);

        assert_eq!(robot.follow_line(40.0, true, false).unwrap(), DriveDems::new(0.0, 40.0));
        assert_eq!(robot.follow_line(40.0, true, false).unwrap(), DriveDems::new(40.0, 40.0));
        assert_eq!(robot.follow_line(150.0, true, false).unwrap(), DriveDems::new(100.0, 0.0));

        assert_eq!(hub.left_motor.last_event(), Some(MotorEvent::Duty(100.0)));
        assert_eq!(hub.right_motor.last_event(), Some(MotorEvent::Duty(0.0)));
        assert_eq!(hub.right_sensor.num_reads(), 0);
    }

    #[test]
    fn test_follow_line_right_only_threshold() {
        let hub = hub();
        let mut robot = robot_with_threshold(&hub, 50.0);

        hub.right_sensor.set_script(vec![50.0]);

        assert_eq!(robot.follow_line(30.0, false, true).unwrap(), DriveDems::new(0.0, 30.0));
    }

    #[test]
    fn test_follow_line_errors() {
        let hub = hub();
        let mut robot = robot_with_threshold(&hub, 50.0);

        assert_eq!(
            robot.follow_line(30.0, false, false),
            Err(RobotError::LineCtrl(LineCtrlError::NoSensorSelected))
        );
        assert!(hub.left_motor.events().is_empty());

        let mut hardware = hub.hardware();
        hardware.right_sensor = None;
        let mut one_eyed = Robot::new(hardware, Params::default()).unwrap();

        assert_eq!(
            one_eyed.follow_line(30.0, false, true),
            Err(RobotError::Reflect(ReflectError::SensorUnavailable(Side::Right)))
        );
    }

    #[test]
    fn test_turn_until_line() {
        let hub = hub();
        let mut robot = robot_with_threshold(&hub, 35.0);

        hub.left_sensor.set_script(vec![80.0, 60.0, 40.0, 30.0]);

        robot
            .turn_until_line(Side::Left, -25.0, Some(Duration::from_secs(1)))
            .unwrap();

        // Three spin ticks, the sign of the speed is ignored
        assert_eq!(
            hub.left_motor.events(),
            vec![
                MotorEvent::Duty(25.0),
                MotorEvent::Duty(25.0),
                MotorEvent::Duty(25.0),
                MotorEvent::Stop
            ]
        );
        assert_eq!(hub.right_motor.events()[0], MotorEvent::Duty(-25.0));
        assert_eq!(hub.left_sensor.num_reads(), 4);
        assert_eq!(hub.clock.now(), Duration::from_millis(30));
    }

    #[test]
    fn test_turn_until_line_step() {
        let hub = hub();
        let mut robot = robot_with_threshold(&hub, 35.0);

        hub.right_sensor.set_script(vec![35.0]);

        // Exactly at the threshold counts as the line
        assert_eq!(robot.turn_until_line_step(Side::Right, 20.0), Ok(true));
        assert_eq!(hub.left_motor.events(), vec![MotorEvent::Stop]);
    }

    #[test]
    fn test_turn_until_line_timeout() {
        let hub = hub();
        let mut robot = robot_with_threshold(&hub, 35.0);

        assert_eq!(
            robot.turn_until_line(Side::Left, 25.0, Some(Duration::from_millis(100))),
            Err(RobotError::LineNotFound(Duration::from_millis(100)))
        );
        assert_eq!(hub.left_motor.last_event(), Some(MotorEvent::Stop));
        assert_eq!(hub.right_motor.last_event(), Some(MotorEvent::Stop));
    }

    #[test]
    fn test_turn_until_line_cancelled() {
        let hub = hub();
        let mut robot = robot_with_threshold(&hub, 35.0);

        robot.input_mut().cancel_token().cancel();

        assert_eq!(
            robot.turn_until_line(Side::Left, 25.0, None),
            Err(RobotError::Input(InputError::Cancelled))
        );
        assert_eq!(hub.left_motor.events(), vec![MotorEvent::Stop]);
        assert_eq!(hub.right_motor.events(), vec![MotorEvent::Stop]);
        assert_eq!(hub.left_sensor.num_reads(), 0);
    }

    #[test]
    fn test_unusable_timing_params_rejected() {
        let hub = hub();

        for timeout_s in [1e20, f64::INFINITY].iter() {
            let mut params = Params::default();
            params.turn_ctrl.line_search_timeout_s = *timeout_s;
            assert!(matches!(
                Robot::new(hub.hardware(), params),
                Err(RobotError::TurnCtrl(TurnCtrlError::InvalidParams(_)))
            ));

            let mut params = Params::default();
            params.input.button_timeout_s = *timeout_s;
            assert!(matches!(
                Robot::new(hub.hardware(), params),
                Err(RobotError::Input(InputError::InvalidParams(_)))
            ));

            let mut params = Params::default();
            params.instr_ctrl.max_jog_s = *timeout_s;
            assert!(matches!(
                Robot::new(hub.hardware(), params),
                Err(RobotError::InstrCtrl(InstrCtrlError::InvalidParams(_)))
            ));
        }
    }

    #[test]
    fn test_turn_by_biases_angle() {
        let hub = hub();
        let mut robot = robot_with_threshold(&hub, 50.0);

        robot.turn_by(30.0, 60.0).unwrap();
        robot.turn_by(-30.0, 60.0).unwrap();

        let profile = TurnProfile { acceleration_pct: 60.0 };
        assert_eq!(
            hub.chassis.events(),
            vec![
                ChassisEvent::UseGyro(true),
                ChassisEvent::UseGyro(true),
                ChassisEvent::ResetOdometry,
                ChassisEvent::TurnProfile(profile),
                ChassisEvent::Turn { angle_deg: 35.0, then: StopPolicy::Hold },
                ChassisEvent::UseGyro(true),
                ChassisEvent::ResetOdometry,
                ChassisEvent::TurnProfile(profile),
                ChassisEvent::Turn { angle_deg: -35.0, then: StopPolicy::Hold },
            ]
        );
    }

    #[test]
    fn test_calibrate_black() {
        let hub = hub();
        hub.buttons.press(ButtonId::Center, Duration::from_millis(10), Duration::from_millis(30));
        hub.left_sensor.set_script(vec![31.0]);
        hub.right_sensor.set_script(vec![41.0]);

        let mut robot = robot_with_threshold(&hub, 50.0);

        assert_eq!(robot.calibrate_black(5), Ok(36.0));
        assert_eq!(robot.calibration().black_threshold(), 36.0);
    }

    #[test]
    fn test_buttons_and_straight() {
        let hub = hub();
        hub.buttons.press(ButtonId::Left, Duration::from_millis(0), Duration::from_millis(20));
        let mut robot = robot_with_threshold(&hub, 50.0);

        assert!(robot.button_pressed(ButtonId::Left));
        assert!(!robot.button_pressed(ButtonId::Right));
        robot.wait_button(ButtonId::Left).unwrap();
        assert!(!robot.button_pressed(ButtonId::Left));

        robot.set_program_stop_button(Some(ButtonId::Center));
        assert_eq!(hub.buttons.stop_button(), Some(ButtonId::Center));

        robot.drive_straight(200.0).unwrap();
        assert_eq!(
            hub.chassis.events().last(),
            Some(&ChassisEvent::Straight { distance_mm: 200.0, then: StopPolicy::Hold })
        );
        assert_eq!(
            robot.drive_straight(f64::INFINITY),
            Err(RobotError::InvalidDistance(f64::INFINITY))
        );
    }

    #[test]
    fn test_instrument_through_robot() {
        let hub = hub();
        hub.buttons.press(ButtonId::Left, Duration::from_millis(0), Duration::from_millis(40));
        let mut robot = robot_with_threshold(&hub, 50.0);

        let motor = hub.instrument_motor();
        let mut arm = robot.new_instrument("arm", vec![Box::new(motor.clone())]).unwrap();

        let limits = robot
            .calibrate_instrument_manual(&mut arm, true, false, None)
            .unwrap();
        assert_eq!(limits, InstrumentLimits::new(0.0, 90.0).unwrap());

        arm.move_to(120.0, 50.0).unwrap();
        assert_eq!(motor.current_angle(), 90.0);
    }
}
