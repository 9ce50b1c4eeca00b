//! # Equipment Interface
//!
//! This module defines the records delivered to the steering controller by external equipment.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod vehicle;
