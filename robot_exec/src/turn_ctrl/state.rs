//! Implementations for the TurnCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Serialize;

// Internal
use super::{Params, TurnCmd, TurnCtrlError, TurnDems};
use crate::line_ctrl::{DriveDems, MAX_DUTY_PCT};
use hub_if::TurnProfile;
use std::time::Duration;
use util::{maths::clamp, module::State, time::try_secs_to_duration};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Turn control module state
#[derive(Default)]
pub struct TurnCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,
}

/// Status report for TurnCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// The requested rate or speed was outside [0, 100] and has been capped.
    pub rate_limited: bool,

    /// Bias added to the requested turn angle.
    ///
    /// Units: degrees
    pub bias_deg: f64,

    /// A line search tick found the line.
    pub line_found: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for TurnCtrl {
    type InitData = Params;
    type InitError = TurnCtrlError;

    type InputData = TurnCmd;
    type OutputData = TurnDems;
    type StatusReport = StatusReport;
    type ProcError = TurnCtrlError;

    /// Initialise the TurnCtrl module.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        if !(init_data.drift_bias_deg.is_finite() && init_data.drift_bias_deg >= 0.0) {
            return Err(TurnCtrlError::InvalidParams(format!(
                "drift_bias_deg must be finite and non-negative, found {}",
                init_data.drift_bias_deg
            )));
        }

        let tick = try_secs_to_duration(init_data.line_search_tick_s)
            .map_err(|e| TurnCtrlError::InvalidParams(format!("line_search_tick_s: {}", e)))?;
        if tick == Duration::from_secs(0) {
            return Err(TurnCtrlError::InvalidParams(
                "line_search_tick_s must be above zero".into()
            ));
        }

        try_secs_to_duration(init_data.line_search_timeout_s)
            .map_err(|e| TurnCtrlError::InvalidParams(format!("line_search_timeout_s: {}", e)))?;

        self.params = init_data;
        self.report = StatusReport::default();

        Ok(())
    }

    /// Calculate the drive demands for a turn command.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        self.report = StatusReport::default();

        if !input_data.is_valid() {
            return Err(TurnCtrlError::InvalidTurnCmd(*input_data));
        }

        let dems = match *input_data {
            TurnCmd::TurnBy { angle_deg, rate_pct } => self.calc_turn_by(angle_deg, rate_pct),
            TurnCmd::LineSearch { reading_pct, black_threshold_pct, speed_pct } =>
                self.calc_line_search(reading_pct, black_threshold_pct, speed_pct)
        };

        Ok((dems, self.report))
    }
}

impl TurnCtrl {

    /// The biased turn for a gyro turn request.
    ///
    /// The bias is added for positive angles and subtracted for negative
    /// ones. A zero angle is passed through unbiased.
    fn calc_turn_by(&mut self, angle_deg: f64, rate_pct: f64) -> TurnDems {
        let bias_deg = if angle_deg > 0.0 {
            self.params.drift_bias_deg
        }
        else if angle_deg < 0.0 {
            -self.params.drift_bias_deg
        }
        else {
            0.0
        };
        self.report.bias_deg = bias_deg;

        let acceleration_pct = self.limit(rate_pct);

        debug!(
            "Turn by {:.1} deg requested, commanding {:.1} deg",
            angle_deg,
            angle_deg + bias_deg
        );

        TurnDems::Turn {
            angle_deg: angle_deg + bias_deg,
            profile: TurnProfile { acceleration_pct },
        }
    }

    /// One tick of turn-until-line.
    ///
    /// While the reading is brighter than the threshold the robot spins in
    /// place, left motor forwards and right motor backwards. The spin
    /// direction is fixed: only the magnitude of `speed_pct` is used.
    fn calc_line_search(
        &mut self,
        reading_pct: f64,
        black_threshold_pct: f64,
        speed_pct: f64
    ) -> TurnDems {
        if reading_pct > black_threshold_pct {
            let s = self.limit(speed_pct.abs());
            TurnDems::Spin(DriveDems::new(s, -s))
        }
        else {
            self.report.line_found = true;
            TurnDems::Stop
        }
    }

    /// Cap a rate or speed to [0, 100], raising the report flag if needed.
    fn limit(&mut self, value_pct: f64) -> f64 {
        let limited = clamp(&value_pct, &0.0, &MAX_DUTY_PCT);
        if limited != value_pct {
            self.report.rate_limited = true;
        }
        limited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl() -> TurnCtrl {
        let mut c = TurnCtrl::default();
        c.init(Params::default()).unwrap();
        c
    }

    fn turn_angle(dems: TurnDems) -> f64 {
        match dems {
            TurnDems::Turn { angle_deg, .. } => angle_deg,
            d => panic!("Expected a turn, got {:?}", d),
        }
    }

    #[test]
    fn test_turn_bias() {
        let mut c = ctrl();

        let (d, r) = c.proc(&TurnCmd::TurnBy { angle_deg: 30.0, rate_pct: 100.0 }).unwrap();
        assert_eq!(turn_angle(d), 35.0);
        assert_eq!(r.bias_deg, 5.0);

        let (d, r) = c.proc(&TurnCmd::TurnBy { angle_deg: -30.0, rate_pct: 100.0 }).unwrap();
        assert_eq!(turn_angle(d), -35.0);
        assert_eq!(r.bias_deg, -5.0);

        let (d, _) = c.proc(&TurnCmd::TurnBy { angle_deg: 0.0, rate_pct: 100.0 }).unwrap();
        assert_eq!(turn_angle(d), 0.0);
    }

    #[test]
    fn test_turn_rate_capped() {
        let mut c = ctrl();

        let (d, r) = c.proc(&TurnCmd::TurnBy { angle_deg: 90.0, rate_pct: 250.0 }).unwrap();
        assert_eq!(
            d,
            TurnDems::Turn { angle_deg: 95.0, profile: TurnProfile { acceleration_pct: 100.0 } }
        );
        assert!(r.rate_limited);
    }

    #[test]
    fn test_line_search_sequence() {
        let mut c = ctrl();
        let mut dems = Vec::new();

        for reading in [80.0, 60.0, 40.0, 30.0].iter() {
            let (d, _) = c.proc(&TurnCmd::LineSearch {
                reading_pct: *reading,
                black_threshold_pct: 35.0,
                speed_pct: 40.0,
            }).unwrap();
            dems.push(d);
        }

        let spin = TurnDems::Spin(DriveDems::new(40.0, -40.0));
        assert_eq!(dems, vec![spin, spin, spin, TurnDems::Stop]);
        assert!(c.report.line_found);
    }

    #[test]
    fn test_line_search_boundary_and_sign() {
        let mut c = ctrl();

        // At the threshold the line counts as found
        let (d, _) = c.proc(&TurnCmd::LineSearch {
            reading_pct: 35.0, black_threshold_pct: 35.0, speed_pct: 40.0
        }).unwrap();
        assert_eq!(d, TurnDems::Stop);

        // A negative speed spins the same way
        let (d, _) = c.proc(&TurnCmd::LineSearch {
            reading_pct: 90.0, black_threshold_pct: 35.0, speed_pct: -40.0
        }).unwrap();
        assert_eq!(d, TurnDems::Spin(DriveDems::new(40.0, -40.0)));
    }

    #[test]
    fn test_line_search_timing_params() {
        let mut c = TurnCtrl::default();

        for timeout_s in [1e20, f64::INFINITY, -2.0].iter() {
            assert!(matches!(
                c.init(Params { line_search_timeout_s: *timeout_s, ..Params::default() }),
                Err(TurnCtrlError::InvalidParams(_))
            ));
        }
        assert!(matches!(
            c.init(Params { line_search_tick_s: 0.0, ..Params::default() }),
            Err(TurnCtrlError::InvalidParams(_))
        ));
        assert!(c.init(Params::default()).is_ok());
    }

    #[test]
    fn test_invalid_cmd() {
        let mut c = ctrl();
        let cmd = TurnCmd::TurnBy { angle_deg: f64::NAN, rate_pct: 50.0 };
        assert!(matches!(c.proc(&cmd), Err(TurnCtrlError::InvalidTurnCmd(_))));
        assert!(matches!(
            c.init(Params { drift_bias_deg: -1.0, ..Params::default() }),
            Err(TurnCtrlError::InvalidParams(_))
        ));
    }
}
