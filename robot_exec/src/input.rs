//! # Button input
//!
//! Blocking waits on the hub buttons. Every wait is bounded by a timeout and
//! checks a [`CancelToken`] on each poll, so a missing button press can never
//! hang the control task.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use serde::Deserialize;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use thiserror::Error;

// Internal
use hub_if::{ButtonId, Buttons, Clock};
use util::time::{secs_to_duration, try_secs_to_duration};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for button input.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Period between two polls of the button state.
    ///
    /// Units: seconds
    pub poll_period_s: f64,

    /// Settle delay used while waiting for all buttons to be released.
    ///
    /// Units: seconds
    pub release_settle_s: f64,

    /// Default bound on waiting for a button press and release.
    ///
    /// Units: seconds
    pub button_timeout_s: f64,

    /// Button which stops the program, `None` to leave the hub's default.
    pub stop_button: Option<ButtonId>,
}

/// Cooperative cancellation flag checked by every blocking wait.
///
/// Cloning the token shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

/// Button input and timing for the control task.
pub struct Input {
    buttons: Box<dyn Buttons>,
    clock: Box<dyn Clock>,
    cancel: CancelToken,
    params: Params,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised by blocking input waits.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("Timed out after {0:?} waiting for the {1:?} button")]
    Timeout(Duration, ButtonId),

    #[error("Timed out after {0:?} waiting for all buttons to be released")]
    ReleaseTimeout(Duration),

    #[error("Wait cancelled")]
    Cancelled,

    #[error("Invalid input parameters: {0}")]
    InvalidParams(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            poll_period_s: 0.01,
            release_settle_s: 0.01,
            button_timeout_s: 60.0,
            stop_button: Some(ButtonId::Bluetooth),
        }
    }
}

impl Params {
    /// Check that every period is positive and every timeout representable.
    pub fn check(&self) -> Result<(), InputError> {
        for (name, value, positive) in [
            ("poll_period_s", self.poll_period_s, true),
            ("release_settle_s", self.release_settle_s, true),
            ("button_timeout_s", self.button_timeout_s, false),
        ].iter() {
            let d = try_secs_to_duration(*value)
                .map_err(|e| InputError::InvalidParams(format!("{}: {}", name, e)))?;

            if *positive && d == Duration::from_secs(0) {
                return Err(InputError::InvalidParams(format!("{} must be above zero", name)));
            }
        }

        Ok(())
    }
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that any running wait stops at its next poll.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed)
    }

    /// Clear a previous cancellation request.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed)
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Input {
    /// Create a new input from the hub's buttons and clock.
    pub fn new(
        buttons: Box<dyn Buttons>,
        clock: Box<dyn Clock>,
        params: Params
    ) -> Result<Self, InputError> {
        params.check()?;

        Ok(Self {
            buttons,
            clock,
            cancel: CancelToken::new(),
            params,
        })
    }

    /// A handle on the cancel token used by this input's waits.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The default button timeout from the parameters.
    pub fn default_timeout(&self) -> Duration {
        secs_to_duration(self.params.button_timeout_s)
    }

    /// Returns true if `button` is currently held down.
    pub fn is_pressed(&self, button: ButtonId) -> bool {
        self.buttons.pressed().contains(&button)
    }

    /// Set the button which stops the program, or `None` to disable it.
    pub fn set_stop_button(&mut self, button: Option<ButtonId>) {
        debug!("Program stop button set to {:?}", button);
        self.buttons.set_stop_button(button)
    }

    /// Current time of the control task's clock.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Block the control task for `duration`.
    pub fn wait(&mut self, duration: Duration) {
        self.clock.wait(duration)
    }

    /// Returns `Err(Cancelled)` if cancellation has been requested.
    pub fn check_cancelled(&self) -> Result<(), InputError> {
        match self.cancel.is_cancelled() {
            true => Err(InputError::Cancelled),
            false => Ok(()),
        }
    }

    /// Wait until `button` is pressed and then until every button is
    /// released.
    ///
    /// Both phases together are bounded by `timeout`.
    pub fn wait_button(&mut self, button: ButtonId, timeout: Duration) -> Result<(), InputError> {
        let deadline = self.now().saturating_add(timeout);

        self.wait_press(button, deadline, timeout)?;
        debug!("{:?} button pressed", button);

        self.wait_all_released(deadline, timeout)
    }

    /// Wait until `button` is pressed, without waiting for its release.
    pub fn wait_pressed(&mut self, button: ButtonId, timeout: Duration) -> Result<(), InputError> {
        let deadline = self.now().saturating_add(timeout);
        self.wait_press(button, deadline, timeout)
    }

    /// Wait while `button` stays held, for at most `max_hold`.
    ///
    /// Returns once the button is released. The caller is responsible for
    /// whatever runs while the button is held, and for stopping it on error.
    pub fn wait_while_held(&mut self, button: ButtonId, max_hold: Duration) -> Result<(), InputError> {
        let deadline = self.now().saturating_add(max_hold);
        let poll = secs_to_duration(self.params.poll_period_s);

        while self.is_pressed(button) {
            self.check_cancelled()?;
            if self.now() >= deadline {
                return Err(InputError::Timeout(max_hold, button));
            }
            self.wait(poll);
        }

        trace!("{:?} button released", button);

        // Let the contacts settle before anything reads the buttons again
        self.wait(secs_to_duration(self.params.release_settle_s));

        Ok(())
    }

    fn wait_press(
        &mut self,
        button: ButtonId,
        deadline: Duration,
        timeout: Duration,
    ) -> Result<(), InputError> {
        let poll = secs_to_duration(self.params.poll_period_s);

        loop {
            self.check_cancelled()?;
            if self.is_pressed(button) {
                return Ok(());
            }
            if self.now() >= deadline {
                return Err(InputError::Timeout(timeout, button));
            }
            self.wait(poll);
        }
    }

    fn wait_all_released(&mut self, deadline: Duration, timeout: Duration) -> Result<(), InputError> {
        let settle = secs_to_duration(self.params.release_settle_s);

        while !self.buttons.pressed().is_empty() {
            self.check_cancelled()?;
            if self.now() >= deadline {
                return Err(InputError::ReleaseTimeout(timeout));
            }
            self.wait(settle);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimButtons, SimClock};

    fn input_with(buttons: SimButtons, clock: SimClock) -> Input {
        Input::new(Box::new(buttons), Box::new(clock), Params::default()).unwrap()
    }

    #[test]
    fn test_wait_button_press_then_release() {
        let clock = SimClock::new();
        let buttons = SimButtons::new(&clock);
        buttons.press(ButtonId::Center, Duration::from_millis(50), Duration::from_millis(120));

        let mut input = input_with(buttons, clock.clone());
        input
            .wait_button(ButtonId::Center, Duration::from_secs(1))
            .unwrap();

        // Returns only once the button has been let go
        assert!(clock.now() >= Duration::from_millis(120));
        assert!(clock.now() < Duration::from_millis(140));
    }

    #[test]
    fn test_wait_button_ignores_other_buttons() {
        let clock = SimClock::new();
        let buttons = SimButtons::new(&clock);
        buttons.press(ButtonId::Left, Duration::from_millis(0), Duration::from_millis(30));

        let mut input = input_with(buttons, clock.clone());
        assert_eq!(
            input.wait_button(ButtonId::Right, Duration::from_millis(200)),
            Err(InputError::Timeout(Duration::from_millis(200), ButtonId::Right))
        );
        assert!(clock.now() >= Duration::from_millis(200));
    }

    #[test]
    fn test_release_timeout() {
        let clock = SimClock::new();
        let buttons = SimButtons::new(&clock);
        buttons.press(ButtonId::Center, Duration::from_millis(0), Duration::from_secs(10));

        let mut input = input_with(buttons, clock);
        assert_eq!(
            input.wait_button(ButtonId::Center, Duration::from_millis(100)),
            Err(InputError::ReleaseTimeout(Duration::from_millis(100)))
        );
    }

    #[test]
    fn test_cancelled_wait() {
        let clock = SimClock::new();
        let buttons = SimButtons::new(&clock);

        let mut input = input_with(buttons, clock.clone());
        input.cancel_token().cancel();
        assert_eq!(
            input.wait_button(ButtonId::Center, Duration::from_secs(1)),
            Err(InputError::Cancelled)
        );
        assert_eq!(clock.now(), Duration::from_secs(0));

        input.cancel_token().reset();
        assert!(input.check_cancelled().is_ok());
    }

    #[test]
    fn test_wait_while_held() {
        let clock = SimClock::new();
        let buttons = SimButtons::new(&clock);
        buttons.press(ButtonId::Left, Duration::from_millis(0), Duration::from_millis(300));

        let mut input = input_with(buttons, clock.clone());
        input
            .wait_while_held(ButtonId::Left, Duration::from_secs(1))
            .unwrap();
        assert!(clock.now() >= Duration::from_millis(300));

        assert_eq!(
            {
                let buttons = SimButtons::new(&clock);
                buttons.press(ButtonId::Left, Duration::from_millis(0), Duration::from_secs(100));
                let mut input = input_with(buttons, clock.clone());
                input.wait_while_held(ButtonId::Left, Duration::from_millis(50))
            },
            Err(InputError::Timeout(Duration::from_millis(50), ButtonId::Left))
        );
    }

    #[test]
    fn test_wait_pressed_returns_on_press() {
        let clock = SimClock::new();
        let buttons = SimButtons::new(&clock);
        buttons.press(ButtonId::Right, Duration::from_millis(40), Duration::from_secs(5));

        let mut input = input_with(buttons, clock.clone());
        input
            .wait_pressed(ButtonId::Right, Duration::from_secs(1))
            .unwrap();
        assert_eq!(clock.now(), Duration::from_millis(40));
        assert!(input.is_pressed(ButtonId::Right));
    }

    #[test]
    fn test_params_rejected() {
        let clock = SimClock::new();
        let new_input = |params: Params| {
            Input::new(Box::new(SimButtons::new(&clock)), Box::new(clock.clone()), params)
        };

        for timeout_s in [1e20, f64::INFINITY, f64::NAN, -1.0].iter() {
            let params = Params { button_timeout_s: *timeout_s, ..Params::default() };
            assert!(matches!(new_input(params), Err(InputError::InvalidParams(_))));
        }

        let params = Params { poll_period_s: 0.0, ..Params::default() };
        assert!(matches!(new_input(params), Err(InputError::InvalidParams(_))));

        assert!(new_input(Params { button_timeout_s: 0.0, ..Params::default() }).is_ok());
    }

    #[test]
    fn test_stop_button_forwarded() {
        let clock = SimClock::new();
        let buttons = SimButtons::new(&clock);

        let mut input = input_with(buttons.clone(), clock);
        input.set_stop_button(Some(ButtonId::Bluetooth));
        assert_eq!(buttons.stop_button(), Some(ButtonId::Bluetooth));
    }
}
