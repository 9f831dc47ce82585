//! Main robot executable entry point.
//!
//! Runs a demonstration mission on the simulated hub:
//!
//!     - Set the program stop button
//!     - Calibrate the black threshold
//!     - Follow the line for a number of ticks
//!     - Turn with drift correction, then turn until the line is found
//!     - Calibrate the arm instrument and move it

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info};
use serde::Serialize;
use std::{fs, path::PathBuf, time::Duration};
use structopt::StructOpt;

// Internal
use hub_if::{ButtonId, Side};
use robot_lib::{
    instr_ctrl::{InstrumentLimits, MoveReport},
    line_ctrl::DriveDems,
    robot::{Params, Robot},
    sim::SimHub,
};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Speed used while following the line.
const FOLLOW_SPEED_PCT: f64 = 40.0;

/// Speed used while searching for the line.
const SEARCH_SPEED_PCT: f64 = 25.0;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "robot_exec", about = "Competition robot control executable")]
struct Opt {
    /// Parameter file, defaults to `robot.toml` in the software root's params
    #[structopt(short, long, parse(from_os_str))]
    params: Option<PathBuf>,

    /// Number of line following ticks
    #[structopt(short, long, default_value = "50")]
    ticks: usize,

    /// Follow the line with both sensors rather than the left one only
    #[structopt(long)]
    dual: bool,

    /// Sensor used to find the line again after the turn (left or right)
    #[structopt(long, default_value = "left")]
    search_side: Side,

    /// Override the program stop button from the parameters
    /// (left, right, center or bluetooth)
    #[structopt(long)]
    stop_button: Option<ButtonId>,

    /// Log debug and trace messages
    #[structopt(short, long)]
    verbose: bool,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Summary of the mission, saved in the session directory.
#[derive(Debug, Serialize)]
struct MissionReport {
    black_threshold_pct: f64,
    follow_ticks: usize,
    last_follow_dems: Option<DriveDems>,
    arm_limits: Option<InstrumentLimits>,
    arm_move: MoveReport,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    let session = Session::new("robot_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    let level = match opt.verbose {
        true => LevelFilter::Trace,
        false => LevelFilter::Info,
    };
    logger_init(level, Some(&session)).wrap_err("Failed to initialise logging")?;

    info!("Robot Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let params: Params = match &opt.params {
        Some(p) => util::params::load_from_path(p),
        None => util::params::load("robot.toml"),
    }
    .wrap_err("Could not load robot params")?;

    info!("Robot parameters loaded");

    // ---- SIMULATED HUB ----

    let hub = SimHub::new(
        params.chassis.wheel_diameter_mm,
        params.chassis.axle_track_mm,
    );
    script_operator(&hub, &params);

    let mut robot = Robot::new(hub.hardware(), params)
        .wrap_err("Failed to initialise the robot")?;

    // ---- MISSION ----

    let stop_button = opt.stop_button.or(robot.params().input.stop_button);
    robot.set_program_stop_button(stop_button);

    let sample_count = robot.params().reflect.default_sample_count;
    let threshold = robot
        .calibrate_black(sample_count)
        .wrap_err("Black calibration failed")?;
    info!("Black threshold: {:.1}", threshold);

    let mut last_follow_dems = None;
    for _ in 0..opt.ticks {
        let dems = robot
            .follow_line(FOLLOW_SPEED_PCT, true, opt.dual)
            .wrap_err("Line following failed")?;
        last_follow_dems = Some(dems);
        robot.input_mut().wait(Duration::from_millis(10));
    }
    robot.stop();
    info!("Line following complete after {} ticks", opt.ticks);

    robot.turn_by(90.0, 50.0).wrap_err("Turn failed")?;

    let search_sensor = match opt.search_side {
        Side::Left => &hub.left_sensor,
        Side::Right => &hub.right_sensor,
    };
    search_sensor.set_script(vec![90.0, 80.0, 60.0, 40.0, 20.0]);
    robot
        .turn_until_line(opt.search_side, SEARCH_SPEED_PCT, None)
        .wrap_err("Line search failed")?;

    robot.drive_straight(150.0).wrap_err("Straight failed")?;

    let mut arm = robot
        .new_instrument("arm", vec![Box::new(hub.instrument_motor())])
        .wrap_err("Failed to create the arm")?;
    arm.calibrate_auto().wrap_err("Arm calibration failed")?;
    let arm_move = arm.move_to(45.0, 50.0).wrap_err("Arm move failed")?;
    info!("{} moved to {:.1} deg", arm.name(), arm_move.target_deg);

    info!("Mission complete");

    // ---- REPORT ----

    let report = MissionReport {
        black_threshold_pct: threshold,
        follow_ticks: opt.ticks,
        last_follow_dems,
        arm_limits: arm.limits(),
        arm_move,
    };
    let report_path = session.session_root.join("mission.json");
    fs::write(
        &report_path,
        serde_json::to_string_pretty(&report).wrap_err("Failed to serialise the mission report")?,
    )
    .wrap_err("Failed to write the mission report")?;
    info!("Mission report saved to {:?}", report_path);

    Ok(())
}

/// Script the operator's button presses and the line seen by the sensors.
fn script_operator(hub: &SimHub, params: &Params) {
    // Calibration trigger, pressed shortly after start
    hub.buttons.press(
        params.reflect.trigger_button,
        Duration::from_millis(200),
        Duration::from_millis(400),
    );

    // Robot sitting on the line edge during calibration, then weaving over it
    hub.left_sensor.set_script(
        std::iter::repeat(30.0)
            .take(params.reflect.default_sample_count)
            .chain(vec![20.0, 35.0, 55.0, 75.0, 92.0, 70.0, 45.0, 25.0].into_iter().cycle().take(1000))
            .collect(),
    );
    hub.right_sensor.set_script(vec![60.0]);
}
