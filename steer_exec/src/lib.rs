//! # Steering library.
//!
//! This library allows other crates in the workspace (and the benchmarks) to access items defined
//! inside the steering executable crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Data store - all data passed between modules during a cycle
pub mod data_store;

/// Drive log - per-cycle vehicle records replayed by the host
pub mod drive_log;

/// Lateral control module - turns a desired steering angle into a bounded torque command
pub mod lat_ctrl;

/// Steering limit - the maximum torque the actuator may be commanded at a given speed
pub mod steer_limit;
