//! # Lateral control module
//!
//! Lateral control (LatCtrl) turns the desired steering angle produced by the
//! path planner into a torque command for the steering actuator. It runs once
//! per control cycle and is built from four parts, executed in this order:
//!
//! 1. The state estimator, a discrete Kalman-style observer tracking a two
//!    element state (steering angle and a rate-like term) from the measured
//!    angle and the torque reported by the actuator. It runs every cycle,
//!    active or not, so that re-engaging does not require re-convergence.
//! 2. The control law, an LQR feedback on the estimated state plus a
//!    feedforward on the desired angle.
//! 3. The integral trim, which removes steady state bias. It will not grow in
//!    the direction that pushes an already saturated output further, and
//!    unwinds towards zero while the driver is overriding.
//! 4. The saturation monitor, a leaky bucket which reports when the output
//!    has been held at the actuator limit for longer than a set time.
//!
//! The final command is always clamped to the limit given by the
//! [`SteerLimit`](crate::steer_limit::SteerLimit) for the current speed.
//!
//! Below `MIN_ACTIVE_SPEED_MS`, or when the controller is not engaged, the
//! module is inactive: the command is zero and the trim and saturation
//! counter are held at zero.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod config;
mod control_law;
mod estimator;
mod integral_trim;
mod params;
mod sat_monitor;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use config::*;
pub use control_law::*;
pub use estimator::*;
pub use integral_trim::*;
pub use params::*;
pub use sat_monitor::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Speed below which the controller is always inactive.
///
/// Calibration constant, candidate for moving into the parameter file.
///
/// Units: meters/second
pub const MIN_ACTIVE_SPEED_MS: f64 = 0.3;

/// Offset of the speed dependent torque scale, `(OFFSET + v/SPEED)^2`.
///
/// Calibration constant modelling how actuator authority grows with speed,
/// candidate for moving into the parameter file.
pub const TORQUE_SCALE_OFFSET: f64 = 0.45;

/// Speed divisor of the torque scale, `(OFFSET + v/SPEED)^2`.
///
/// Units: meters/second
pub const TORQUE_SCALE_SPEED_MS: f64 = 60.0;

/// Speed above which the saturation monitor is allowed to count up.
///
/// Units: meters/second
pub const SAT_CHECK_MIN_SPEED_MS: f64 = 10.0;

/// Rate at which the trim unwinds during driver override, per second.
pub const TRIM_UNWIND_RATE: f64 = 0.3;

/// Rate multiplier of the trim integration, per second.
pub const TRIM_INTEGRAL_RATE: f64 = 1.0;

/// Rate at which the saturation counter fills or drains, per second.
pub const SAT_COUNT_RATE: f64 = 1.0;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LatCtrl construction or
/// reconfiguration.
#[derive(Debug, thiserror::Error)]
pub enum LatCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Matrix {name} must have {expected} elements, found {found}")]
    InvalidMatrixShape {
        name: &'static str,
        expected: usize,
        found: usize
    },

    #[error("Matrix {0} contains a non-finite element")]
    NonFiniteMatrix(&'static str),

    #[error("Parameter {name} must be finite and positive, found {value}")]
    NonPositiveScalar {
        name: &'static str,
        value: f64
    },

    #[error("Parameter {name} must be finite, found {value}")]
    NonFiniteScalar {
        name: &'static str,
        value: f64
    },

    #[error("Invalid steering limit map: {0}")]
    SteerLimitError(crate::steer_limit::SteerLimitError),

    #[error(
        "Configuration version {requested} rejected, versions must be greater than {current}")]
    StaleConfigVersion {
        current: u64,
        requested: u64
    },

    #[error("Could not initialise the LatCtrl archives: {0}")]
    ArchiveInitError(util::archive::ArchiveError)
}

/// Reasons a cycle can be rejected as numerically unsafe.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumericFault {
    #[error("Non-finite vehicle state or path plan input")]
    NonFiniteInput,

    #[error("Steering limit is not finite and non-negative")]
    InvalidSteerLimit,

    #[error("Estimated state is not finite")]
    NonFiniteEstimate,

    #[error("Computed command is not finite")]
    NonFiniteCommand
}
