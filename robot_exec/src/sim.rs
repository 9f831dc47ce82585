//! # Simulated hub
//!
//! Deterministic stand-ins for the hub equipment. All time is virtual: it only
//! advances when the control task waits on the [`SimClock`]. Every handle is
//! cheaply cloneable and clones share state, so a test can keep a clone of a
//! motor after boxing the original into the robot and inspect what it was
//! commanded to do.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use std::{
    cell::{Cell, RefCell},
    collections::HashSet,
    rc::Rc,
    time::Duration,
};

// Internal
use crate::robot::Hardware;
use hub_if::{ButtonId, Buttons, Chassis, Clock, Motor, ReflectanceSensor, StopPolicy, TurnProfile};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Speed of a simulated motor at 100 % duty cycle.
///
/// Units: degrees/second
pub const SIM_MOTOR_MAX_SPEED_DEGS: f64 = 1000.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Virtual clock, advanced only by `wait`.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now: Rc<Cell<Duration>>,
}

/// Buttons pressed over scripted time intervals.
#[derive(Debug, Clone)]
pub struct SimButtons {
    clock: SimClock,
    presses: Rc<RefCell<Vec<(ButtonId, Duration, Duration)>>>,
    stop_button: Rc<Cell<Option<ButtonId>>>,
}

/// Reflectance sensor returning a scripted sequence of readings.
#[derive(Debug, Clone)]
pub struct SimSensor {
    state: Rc<RefCell<SensorState>>,
}

#[derive(Debug)]
struct SensorState {
    script: Vec<f64>,
    next: usize,
    cycle: bool,
    num_reads: usize,
}

/// A commanded motor action, recorded in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotorEvent {
    Duty(f64),
    RelAngle {
        speed_pct: f64,
        delta_deg: f64,
        wait: bool,
    },
    Hold,
    Stop,
    ResetAngle(f64),
}

/// Motor whose angle integrates the duty cycle over virtual time.
#[derive(Debug, Clone)]
pub struct SimMotor {
    clock: SimClock,
    state: Rc<RefCell<MotorState>>,
}

#[derive(Debug, Default)]
struct MotorState {
    max_speed_degs: f64,
    angle_deg: f64,
    duty_pct: f64,
    last_update: Duration,
    events: Vec<MotorEvent>,
}

/// A recorded drive base action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChassisEvent {
    ResetOdometry,
    TurnProfile(TurnProfile),
    Turn { angle_deg: f64, then: StopPolicy },
    Straight { distance_mm: f64, then: StopPolicy },
    UseGyro(bool),
}

/// Drive base which records every manoeuvre it is asked to make.
#[derive(Debug, Clone)]
pub struct SimChassis {
    /// Wheel diameter.
    ///
    /// Units: millimeters
    pub wheel_diameter_mm: f64,

    /// Distance between the two wheel contact points.
    ///
    /// Units: millimeters
    pub axle_track_mm: f64,

    events: Rc<RefCell<Vec<ChassisEvent>>>,
}

/// A complete simulated hub with two drive motors, two line sensors and a
/// drive base.
#[derive(Debug, Clone)]
pub struct SimHub {
    pub clock: SimClock,
    pub buttons: SimButtons,
    pub left_motor: SimMotor,
    pub right_motor: SimMotor,
    pub left_sensor: SimSensor,
    pub right_sensor: SimSensor,
    pub chassis: SimChassis,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SimClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn wait(&mut self, duration: Duration) {
        self.now.set(self.now.get() + duration)
    }
}

impl SimButtons {
    pub fn new(clock: &SimClock) -> Self {
        Self {
            clock: clock.clone(),
            presses: Rc::new(RefCell::new(Vec::new())),
            stop_button: Rc::new(Cell::new(None)),
        }
    }

    /// Hold `button` down from `from` (inclusive) until `until` (exclusive).
    pub fn press(&self, button: ButtonId, from: Duration, until: Duration) {
        self.presses.borrow_mut().push((button, from, until))
    }

    /// The button last set as the program stop button.
    pub fn stop_button(&self) -> Option<ButtonId> {
        self.stop_button.get()
    }
}

impl Buttons for SimButtons {
    fn pressed(&self) -> HashSet<ButtonId> {
        let now = self.clock.now();

        self.presses
            .borrow()
            .iter()
            .filter(|(_, from, until)| *from <= now && now < *until)
            .map(|(b, _, _)| *b)
            .collect()
    }

    fn set_stop_button(&mut self, button: Option<ButtonId>) {
        self.stop_button.set(button)
    }
}

impl SimSensor {
    /// Sensor returning `script` in order, then repeating the last value.
    pub fn new(script: Vec<f64>) -> Self {
        Self::build(script, false)
    }

    /// Sensor returning `script` in order, starting over at the end.
    pub fn cycling(script: Vec<f64>) -> Self {
        Self::build(script, true)
    }

    /// Sensor which always reads `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Replace the scripted readings, restarting from the first.
    pub fn set_script(&self, script: Vec<f64>) {
        let mut state = self.state.borrow_mut();
        state.script = script;
        state.next = 0;
    }

    /// Number of readings taken so far.
    pub fn num_reads(&self) -> usize {
        self.state.borrow().num_reads
    }

    fn build(script: Vec<f64>, cycle: bool) -> Self {
        Self {
            state: Rc::new(RefCell::new(SensorState {
                script,
                next: 0,
                cycle,
                num_reads: 0,
            })),
        }
    }
}

impl ReflectanceSensor for SimSensor {
    fn reflection(&mut self) -> f64 {
        let mut state = self.state.borrow_mut();
        state.num_reads += 1;

        if state.script.is_empty() {
            return 0.0;
        }

        let value = state.script[state.next.min(state.script.len() - 1)];

        state.next += 1;
        if state.next >= state.script.len() && state.cycle {
            state.next = 0;
        }

        value
    }
}

impl SimMotor {
    pub fn new(clock: &SimClock) -> Self {
        Self::with_max_speed(clock, SIM_MOTOR_MAX_SPEED_DEGS)
    }

    /// Motor turning at `max_speed_degs` at full duty cycle, as a differently
    /// geared motor would.
    pub fn with_max_speed(clock: &SimClock, max_speed_degs: f64) -> Self {
        Self {
            clock: clock.clone(),
            state: Rc::new(RefCell::new(MotorState {
                max_speed_degs,
                last_update: clock.now(),
                ..Default::default()
            })),
        }
    }

    /// Every command the motor has received, oldest first.
    pub fn events(&self) -> Vec<MotorEvent> {
        self.state.borrow().events.clone()
    }

    /// The last command the motor received.
    pub fn last_event(&self) -> Option<MotorEvent> {
        self.state.borrow().events.last().copied()
    }

    /// Move the motor by hand, as an external force would.
    pub fn set_angle(&self, angle_deg: f64) {
        self.advance();
        self.state.borrow_mut().angle_deg = angle_deg;
    }

    /// Integrate the duty cycle up to the current virtual time.
    fn advance(&self) {
        let now = self.clock.now();
        let mut state = self.state.borrow_mut();

        let dt_s = now.saturating_sub(state.last_update).as_secs_f64();
        state.angle_deg += state.duty_pct / 100.0 * state.max_speed_degs * dt_s;
        state.last_update = now;
    }

    fn record(&self, event: MotorEvent) {
        trace!("SimMotor {:?}", event);
        self.state.borrow_mut().events.push(event)
    }
}

impl Motor for SimMotor {
    fn run_at_duty_cycle(&mut self, duty_pct: f64) {
        self.advance();
        self.state.borrow_mut().duty_pct = duty_pct;
        self.record(MotorEvent::Duty(duty_pct));
    }

    fn run_to_relative_angle(&mut self, speed_pct: f64, delta_deg: f64, wait: bool) {
        self.advance();
        {
            let mut state = self.state.borrow_mut();
            state.duty_pct = 0.0;
            state.angle_deg += delta_deg;
        }
        self.record(MotorEvent::RelAngle {
            speed_pct,
            delta_deg,
            wait,
        });
    }

    fn current_angle(&self) -> f64 {
        self.advance();
        self.state.borrow().angle_deg
    }

    fn hold(&mut self) {
        self.advance();
        self.state.borrow_mut().duty_pct = 0.0;
        self.record(MotorEvent::Hold);
    }

    fn stop(&mut self) {
        self.advance();
        self.state.borrow_mut().duty_pct = 0.0;
        self.record(MotorEvent::Stop);
    }

    fn reset_angle_reference(&mut self, angle_deg: f64) {
        self.advance();
        self.state.borrow_mut().angle_deg = angle_deg;
        self.record(MotorEvent::ResetAngle(angle_deg));
    }
}

impl SimChassis {
    pub fn new(wheel_diameter_mm: f64, axle_track_mm: f64) -> Self {
        Self {
            wheel_diameter_mm,
            axle_track_mm,
            events: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Every manoeuvre requested so far, oldest first.
    pub fn events(&self) -> Vec<ChassisEvent> {
        self.events.borrow().clone()
    }

    fn record(&self, event: ChassisEvent) {
        trace!("SimChassis {:?}", event);
        self.events.borrow_mut().push(event)
    }
}

impl Chassis for SimChassis {
    fn reset_odometry(&mut self) {
        self.record(ChassisEvent::ResetOdometry)
    }

    fn configure_turn_profile(&mut self, profile: TurnProfile) {
        self.record(ChassisEvent::TurnProfile(profile))
    }

    fn turn_in_place(&mut self, angle_deg: f64, then: StopPolicy) {
        self.record(ChassisEvent::Turn { angle_deg, then })
    }

    fn straight(&mut self, distance_mm: f64, then: StopPolicy) {
        self.record(ChassisEvent::Straight { distance_mm, then })
    }

    fn use_gyro(&mut self, enabled: bool) {
        self.record(ChassisEvent::UseGyro(enabled))
    }
}

impl SimHub {
    /// Build a hub with both line sensors reading white (100).
    pub fn new(wheel_diameter_mm: f64, axle_track_mm: f64) -> Self {
        let clock = SimClock::new();

        Self {
            buttons: SimButtons::new(&clock),
            left_motor: SimMotor::new(&clock),
            right_motor: SimMotor::new(&clock),
            left_sensor: SimSensor::constant(100.0),
            right_sensor: SimSensor::constant(100.0),
            chassis: SimChassis::new(wheel_diameter_mm, axle_track_mm),
            clock,
        }
    }

    /// A new instrument motor running on this hub's clock.
    pub fn instrument_motor(&self) -> SimMotor {
        SimMotor::new(&self.clock)
    }

    /// Hardware set for the robot, with both line sensors fitted.
    pub fn hardware(&self) -> Hardware {
        Hardware {
            buttons: Box::new(self.buttons.clone()),
            clock: Box::new(self.clock.clone()),
            left_motor: Box::new(self.left_motor.clone()),
            right_motor: Box::new(self.right_motor.clone()),
            left_sensor: Some(Box::new(self.left_sensor.clone())),
            right_sensor: Some(Box::new(self.right_sensor.clone())),
            chassis: Box::new(self.chassis.clone()),
        }
    }
}
