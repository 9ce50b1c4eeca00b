//! # Lateral control telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Tuning for the LQR lateral controller.
///
/// Matrices are given as flat lists in row-major order, so that `a = [a00, a01, a10, a11]`. Their
/// lengths are checked when the tuning is turned into a controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LqrTuning {
    /// Version of this tuning. A replacement is only accepted if its version is greater than the
    /// one currently in use.
    pub version: u64,

    /// State transition matrix (2x2)
    pub a: Vec<f64>,

    /// Input matrix (2x1)
    pub b: Vec<f64>,

    /// Output matrix (1x2)
    pub c: Vec<f64>,

    /// Feedback gain (1x2)
    pub k: Vec<f64>,

    /// Observer gain (2x1)
    pub l: Vec<f64>,

    /// Steady state gain from command to steering angle, used for the feedforward term.
    pub dc_gain: f64,

    /// Scaling from controller output to actuator units.
    pub scale: f64,

    /// Integral gain of the trim.
    pub ki: f64,

    /// Time the output must be held saturated before saturation is reported.
    ///
    /// Units: seconds
    pub sat_limit_s: f64,
}
