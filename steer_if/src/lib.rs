//! # Steering interface crate.
//!
//! Provides all common interface definitions shared between the steering
//! control software and its external collaborators.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod tc;

/// Records exchanged with equipment (vehicle interface and path planner)
pub mod eqpt;
