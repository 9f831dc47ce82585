//! Implementations for the LineCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{DriveDems, FollowMode, LineCtrlError, Params, Zone, MAX_DUTY_PCT};
use crate::reflect::{MAX_REFLECTANCE_PCT, MIN_REFLECTANCE_PCT};
use hub_if::Side;
use util::{maths::clamp, module::State};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Line following control module state
#[derive(Default)]
pub struct LineCtrl {

    pub(crate) params: Params,

    pub(crate) report: StatusReport,

    pub(crate) output: Option<DriveDems>,
}

/// Input data to Line Control, one set per control tick.
#[derive(Clone, Copy, Debug)]
pub struct InputData {
    /// Which law to run.
    pub mode: FollowMode,

    /// Requested forward speed, capped to [0, 100].
    ///
    /// Units: percent
    pub speed_pct: f64,

    /// Left sensor reading, required by `Dual` and `LeftOnly`.
    pub left_pct: Option<f64>,

    /// Right sensor reading, required by `Dual` and `RightOnly`.
    pub right_pct: Option<f64>,

    /// Calibrated black threshold.
    pub black_threshold_pct: f64,
}

/// Status report for LineCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// The requested speed was outside [0, 100] and has been capped.
    pub speed_limited: bool,

    /// A drive demand was outside [-100, 100] and has been capped.
    pub dems_limited: bool,

    /// Branch of the law taken on this cycle.
    pub zone: Option<Zone>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for LineCtrl {
    type InitData = Params;
    type InitError = LineCtrlError;

    type InputData = InputData;
    type OutputData = DriveDems;
    type StatusReport = StatusReport;
    type ProcError = LineCtrlError;

    /// Initialise the LineCtrl module.
    ///
    /// Expected init data is the module's parameters.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        check_params(&init_data)?;

        self.params = init_data;
        self.report = StatusReport::default();
        self.output = None;

        Ok(())
    }

    /// Perform one tick of line following.
    ///
    /// No state is carried between ticks, the output depends only on this
    /// tick's input.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();

        let speed_pct = clamp(&input_data.speed_pct, &0.0, &MAX_DUTY_PCT);
        if speed_pct != input_data.speed_pct {
            self.report.speed_limited = true;
        }

        let threshold = input_data.black_threshold_pct;

        let (dems, zone) = match input_data.mode {
            FollowMode::LeftOnly => {
                let left = reading(input_data, Side::Left)?;
                self.calc_left_only(left, threshold, speed_pct)
            },
            FollowMode::RightOnly => {
                let right = reading(input_data, Side::Right)?;
                self.calc_right_only(right, threshold, speed_pct)
            },
            FollowMode::Dual => {
                let left = reading(input_data, Side::Left)?;
                // The right reading is required so both sensors straddle the
                // edge, but the error term is taken from the left sensor only.
                reading(input_data, Side::Right)?;
                self.calc_dual(left, speed_pct)
            }
        };
        self.report.zone = Some(zone);

        let output = self.enforce_limits(dems);

        trace!(
            "LineCtrl {:?} {:?}: left {:.1}, right {:.1}",
            input_data.mode, zone, output.left_pct, output.right_pct
        );

        self.output = Some(output);

        Ok((output, self.report))
    }
}

impl LineCtrl {

    /// The output of the last successful tick.
    pub fn last_output(&self) -> Option<DriveDems> {
        self.output
    }

    /// Cap both demands to the motor duty cycle range.
    ///
    /// If a limit is reached the corresponding flag in the status report will
    /// be raised.
    fn enforce_limits(&mut self, dems: DriveDems) -> DriveDems {
        let limited = DriveDems::new(
            clamp(&dems.left_pct, &-MAX_DUTY_PCT, &MAX_DUTY_PCT),
            clamp(&dems.right_pct, &-MAX_DUTY_PCT, &MAX_DUTY_PCT),
        );

        if limited != dems {
            self.report.dems_limited = true;
        }

        limited
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn reading(input_data: &InputData, side: Side) -> Result<f64, LineCtrlError> {
    let r = match side {
        Side::Left => input_data.left_pct,
        Side::Right => input_data.right_pct,
    };

    r.ok_or(LineCtrlError::MissingReading(input_data.mode, side))
}

fn check_params(params: &Params) -> Result<(), LineCtrlError> {
    let range = MIN_REFLECTANCE_PCT..=MAX_REFLECTANCE_PCT;

    if !range.contains(&params.upper_band_pct) {
        return Err(LineCtrlError::InvalidParams(format!(
            "upper_band_pct must be within [0, 100], found {}",
            params.upper_band_pct
        )));
    }
    if !range.contains(&params.dual_midpoint_pct) {
        return Err(LineCtrlError::InvalidParams(format!(
            "dual_midpoint_pct must be within [0, 100], found {}",
            params.dual_midpoint_pct
        )));
    }
    if !params.dual_k_p.is_finite() {
        return Err(LineCtrlError::InvalidParams(format!(
            "dual_k_p must be finite, found {}",
            params.dual_k_p
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl() -> LineCtrl {
        let mut c = LineCtrl::default();
        c.init(Params::default()).unwrap();
        c
    }

    fn input(mode: FollowMode, speed_pct: f64, left: Option<f64>, right: Option<f64>) -> InputData {
        InputData {
            mode,
            speed_pct,
            left_pct: left,
            right_pct: right,
            black_threshold_pct: 35.0,
        }
    }

    #[test]
    fn test_speed_capped() {
        let mut c = ctrl();

        for speed in [100.5, 150.0, 1e6].iter() {
            for (mode, l, r) in [
                (FollowMode::LeftOnly, Some(50.0), None),
                (FollowMode::LeftOnly, Some(10.0), None),
                (FollowMode::LeftOnly, Some(95.0), None),
                (FollowMode::RightOnly, None, Some(10.0)),
                (FollowMode::RightOnly, None, Some(80.0)),
            ]
            .iter()
            {
                let (o, rpt) = c.proc(&input(*mode, *speed, *l, *r)).unwrap();
                assert!(o.left_pct <= 100.0 && o.right_pct <= 100.0);
                assert!(rpt.speed_limited);
            }
        }

        let (o, rpt) = c.proc(&input(FollowMode::LeftOnly, -20.0, Some(50.0), None)).unwrap();
        assert_eq!(o, DriveDems::straight(0.0));
        assert!(rpt.speed_limited);
    }

    #[test]
    fn test_dual_output_capped() {
        let mut c = LineCtrl::default();
        c.init(Params { dual_k_p: 10.0, ..Params::default() }).unwrap();

        let (o, rpt) = c.proc(&input(FollowMode::Dual, 200.0, Some(100.0), Some(0.0))).unwrap();
        assert_eq!(o, DriveDems::new(100.0, -100.0));
        assert!(rpt.speed_limited);
        assert!(rpt.dems_limited);
        assert_eq!(rpt.zone, Some(Zone::Proportional));
    }

    #[test]
    fn test_missing_readings() {
        let mut c = ctrl();

        assert_eq!(
            c.proc(&input(FollowMode::LeftOnly, 50.0, None, Some(20.0))),
            Err(LineCtrlError::MissingReading(FollowMode::LeftOnly, Side::Left))
        );
        assert_eq!(
            c.proc(&input(FollowMode::Dual, 50.0, Some(20.0), None)),
            Err(LineCtrlError::MissingReading(FollowMode::Dual, Side::Right))
        );
        assert_eq!(c.last_output(), None);
    }

    #[test]
    fn test_invalid_params() {
        let mut c = LineCtrl::default();
        assert!(matches!(
            c.init(Params { upper_band_pct: 120.0, ..Params::default() }),
            Err(LineCtrlError::InvalidParams(_))
        ));
        assert!(c.init(Params { dual_k_p: f64::NAN, ..Params::default() }).is_err());
    }
}
