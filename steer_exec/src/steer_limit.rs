//! # Steering limit
//!
//! The actuator may only be commanded up to a speed dependent torque. The
//! controller asks a [`SteerLimit`] for this value every cycle. Closures are
//! accepted directly, and [`SteerMaxMap`] provides the usual breakpoint table
//! loaded from the parameter file.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;
use thiserror::Error;
use util::maths::interp;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Source of the actuator torque limit.
///
/// Implementations must not allocate or block, they are called once per
/// control cycle.
pub trait SteerLimit {
    /// The maximum torque magnitude which may be commanded at the given speed.
    fn steer_max(&self, speed_ms: f64) -> f64;
}

impl<F> SteerLimit for F
where
    F: Fn(f64) -> f64
{
    fn steer_max(&self, speed_ms: f64) -> f64 {
        self(speed_ms)
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of a steering limit map.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SteerMaxParams {
    /// Speed breakpoints, increasing.
    ///
    /// Units: meters/second
    pub speed_bp_ms: Vec<f64>,

    /// Torque limit at each breakpoint, in actuator units.
    pub steer_max_v: Vec<f64>
}

/// A steering limit interpolated linearly between speed breakpoints and held
/// constant beyond either end.
#[derive(Debug, Clone, PartialEq)]
pub struct SteerMaxMap {
    speed_bp_ms: Vec<f64>,
    steer_max_v: Vec<f64>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors in the definition of a steering limit map.
#[derive(Debug, Error, PartialEq)]
pub enum SteerLimitError {
    #[error("The map must contain at least one breakpoint")]
    Empty,

    #[error("Found {0} breakpoints but {1} values")]
    LengthMismatch(usize, usize),

    #[error("Breakpoints must be finite and strictly increasing")]
    BreakpointsNotIncreasing,

    #[error("Limits must be finite and non-negative, found {0}")]
    InvalidLimit(f64)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SteerMaxMap {
    /// Create a new map from the parameters, checking they are valid.
    pub fn new(params: &SteerMaxParams) -> Result<Self, SteerLimitError> {
        let bp = &params.speed_bp_ms;
        let v = &params.steer_max_v;

        if bp.is_empty() {
            return Err(SteerLimitError::Empty)
        }
        if bp.len() != v.len() {
            return Err(SteerLimitError::LengthMismatch(bp.len(), v.len()))
        }
        if bp.iter().any(|s| !s.is_finite()) 
            || bp.windows(2).any(|w| w[1] <= w[0]) 
        {
            return Err(SteerLimitError::BreakpointsNotIncreasing)
        }
        if let Some(bad) = v.iter().find(|m| !m.is_finite() || **m < 0.0) {
            return Err(SteerLimitError::InvalidLimit(*bad))
        }

        Ok(Self {
            speed_bp_ms: bp.clone(),
            steer_max_v: v.clone()
        })
    }
}

impl SteerLimit for SteerMaxMap {
    fn steer_max(&self, speed_ms: f64) -> f64 {
        // The map is checked to be non-empty with matching lengths on
        // construction, so interp always returns a value.
        interp(speed_ms, &self.speed_bp_ms, &self.steer_max_v).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn params(bp: Vec<f64>, v: Vec<f64>) -> SteerMaxParams {
        SteerMaxParams {
            speed_bp_ms: bp,
            steer_max_v: v
        }
    }

    #[test]
    fn test_map_interpolates() {
        let map = SteerMaxMap::new(&params(vec![0.0, 10.0, 30.0], vec![1.0, 1.0, 0.6])).unwrap();

        assert_eq!(map.steer_max(0.0), 1.0);
        assert_eq!(map.steer_max(5.0), 1.0);
        assert!((map.steer_max(20.0) - 0.8).abs() < 1e-12);
        assert_eq!(map.steer_max(50.0), 0.6);
    }

    #[test]
    fn test_single_breakpoint_is_constant() {
        let map = SteerMaxMap::new(&params(vec![0.0], vec![1.0])).unwrap();

        assert_eq!(map.steer_max(0.0), 1.0);
        assert_eq!(map.steer_max(42.0), 1.0);
    }

    #[test]
    fn test_invalid_maps() {
        assert_eq!(
            SteerMaxMap::new(&params(vec![], vec![])), 
            Err(SteerLimitError::Empty)
        );
        assert_eq!(
            SteerMaxMap::new(&params(vec![0.0, 1.0], vec![1.0])), 
            Err(SteerLimitError::LengthMismatch(2, 1))
        );
        assert_eq!(
            SteerMaxMap::new(&params(vec![1.0, 1.0], vec![1.0, 1.0])), 
            Err(SteerLimitError::BreakpointsNotIncreasing)
        );
        assert_eq!(
            SteerMaxMap::new(&params(vec![0.0, 1.0], vec![1.0, -1.0])), 
            Err(SteerLimitError::InvalidLimit(-1.0))
        );
    }

    #[test]
    fn test_closure_limit() {
        let limit = |v: f64| if v > 20.0 { 0.5 } else { 1.0 };

        assert_eq!(limit.steer_max(10.0), 1.0);
        assert_eq!(limit.steer_max(30.0), 0.5);
    }
}
