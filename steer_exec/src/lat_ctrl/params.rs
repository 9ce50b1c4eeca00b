//! Lateral control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::steer_limit::SteerMaxParams;
use steer_if::tc::lat_ctrl::LqrTuning;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for lateral control
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Period of the control cycle. Fixed for the life of the executable,
    /// tuning replacements keep the period they were loaded with.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Controller tuning, gains precomputed offline.
    pub lqr: LqrTuning,

    /// Actuator torque limit as a function of speed.
    pub steer_max: SteerMaxParams
}
