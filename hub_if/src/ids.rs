//! # Hub identifiers

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Buttons available on the hub face.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
#[serde(rename_all = "snake_case")]
pub enum ButtonId {
    Left,
    Right,
    Center,
    Bluetooth,
}

/// Side of the robot, used to select a drive motor or a reflectance sensor.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

/// What a motor shall do once a positional manoeuvre has completed.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
#[serde(rename_all = "snake_case")]
pub enum StopPolicy {
    /// Let the motor spin freely.
    Coast,

    /// Passively brake the motor.
    Brake,

    /// Actively resist external torque at the final position.
    Hold,
}

/// Error raised when parsing an identifier from a string.
#[derive(Debug, Error, PartialEq)]
pub enum ParseIdError {
    #[error("Unknown button \"{0}\", expected one of left, right, center, bluetooth")]
    UnknownButton(String),

    #[error("Unknown side \"{0}\", expected left or right")]
    UnknownSide(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FromStr for ButtonId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(ButtonId::Left),
            "right" => Ok(ButtonId::Right),
            "center" | "centre" => Ok(ButtonId::Center),
            "bluetooth" => Ok(ButtonId::Bluetooth),
            _ => Err(ParseIdError::UnknownButton(s.to_string())),
        }
    }
}

impl FromStr for Side {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            _ => Err(ParseIdError::UnknownSide(s.to_string())),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}
