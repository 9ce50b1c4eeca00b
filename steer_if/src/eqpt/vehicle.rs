//! # Vehicle interface records
//!
//! Decoded vehicle state and path planner outputs, as consumed once per control cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Measured vehicle state for a single cycle.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq)]
pub struct VehicleState {
    /// Vehicle speed over ground.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Measured steering wheel angle.
    ///
    /// Units: degrees
    pub steer_angle_deg: f64,

    /// Torque reported by the electric power steering unit, in actuator units.
    pub steer_torque_eps: f64,

    /// True if the driver is applying torque to the wheel (override).
    pub steer_pressed: bool,

    /// True if the actuator is currently rate limiting the command.
    pub steer_rate_limited: bool,
}

/// Path planner output for a single cycle.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq)]
pub struct PathPlan {
    /// Desired steering wheel angle.
    ///
    /// Units: degrees
    pub angle_steers_des_deg: f64,

    /// Learned steering angle offset, the measured angle at which the vehicle drives straight.
    ///
    /// Units: degrees
    pub angle_offset_deg: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl VehicleState {
    /// Returns true if every numeric field is finite.
    pub fn is_finite(&self) -> bool {
        self.speed_ms.is_finite()
            && self.steer_angle_deg.is_finite()
            && self.steer_torque_eps.is_finite()
    }
}

impl PathPlan {
    /// Returns true if every numeric field is finite.
    pub fn is_finite(&self) -> bool {
        self.angle_steers_des_deg.is_finite() && self.angle_offset_deg.is_finite()
    }

    /// The desired angle with the offset removed, so that zero angle corresponds to zero torque.
    pub fn corrected_des_deg(&self) -> f64 {
        self.angle_steers_des_deg - self.angle_offset_deg
    }
}
