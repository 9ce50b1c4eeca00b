//! Validated controller configuration

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Matrix2, RowVector2, Vector2};

// Internal
use super::*;
use steer_if::tc::lat_ctrl::LqrTuning;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The configuration of the controller for a drive.
///
/// A configuration can only be built through `from_tuning`, which checks the
/// matrix shapes and scalar ranges, so every instance is known to be valid.
/// All members are fixed size so that copying and using the configuration
/// never allocates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ControllerConfig {
    pub(crate) version: u64,

    /// State transition matrix
    pub(crate) a: Matrix2<f64>,

    /// Input matrix
    pub(crate) b: Vector2<f64>,

    /// Output matrix
    pub(crate) c: RowVector2<f64>,

    /// LQR feedback gain
    pub(crate) k: RowVector2<f64>,

    /// Observer gain
    pub(crate) l: Vector2<f64>,

    pub(crate) dc_gain: f64,
    pub(crate) scale: f64,
    pub(crate) ki: f64,

    /// Units: seconds
    pub(crate) sat_limit_s: f64,

    /// Units: seconds
    pub(crate) cycle_period_s: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ControllerConfig {

    /// Build a configuration from a tuning and the control cycle period.
    pub fn from_tuning(
        tuning: &LqrTuning, 
        cycle_period_s: f64
    ) -> Result<Self, LatCtrlError> {

        // Matrices are row-major flat lists
        check_matrix("A", &tuning.a, 4)?;
        check_matrix("B", &tuning.b, 2)?;
        check_matrix("C", &tuning.c, 2)?;
        check_matrix("K", &tuning.k, 2)?;
        check_matrix("L", &tuning.l, 2)?;

        check_positive("dc_gain", tuning.dc_gain)?;
        check_positive("scale", tuning.scale)?;
        check_positive("sat_limit_s", tuning.sat_limit_s)?;
        check_positive("cycle_period_s", cycle_period_s)?;

        if !tuning.ki.is_finite() {
            return Err(LatCtrlError::NonFiniteScalar {
                name: "ki",
                value: tuning.ki
            })
        }

        Ok(Self {
            version: tuning.version,
            a: Matrix2::from_row_slice(&tuning.a),
            b: Vector2::from_row_slice(&tuning.b),
            c: RowVector2::from_row_slice(&tuning.c),
            k: RowVector2::from_row_slice(&tuning.k),
            l: Vector2::from_row_slice(&tuning.l),
            dc_gain: tuning.dc_gain,
            scale: tuning.scale,
            ki: tuning.ki,
            sat_limit_s: tuning.sat_limit_s,
            cycle_period_s
        })
    }

    /// Version of the tuning this configuration was built from.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Units: seconds
    pub fn cycle_period_s(&self) -> f64 {
        self.cycle_period_s
    }

    /// Amount the trim magnitude decreases by each cycle during an override.
    pub fn unwind_step(&self) -> f64 {
        TRIM_UNWIND_RATE * self.cycle_period_s
    }

    /// Integration step of the trim.
    pub fn integral_step(&self) -> f64 {
        TRIM_INTEGRAL_RATE * self.cycle_period_s
    }

    /// Amount the saturation counter changes by each cycle.
    pub fn sat_count_step(&self) -> f64 {
        SAT_COUNT_RATE * self.cycle_period_s
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn check_matrix(
    name: &'static str, 
    values: &[f64], 
    expected: usize
) -> Result<(), LatCtrlError> {
    if values.len() != expected {
        return Err(LatCtrlError::InvalidMatrixShape {
            name,
            expected,
            found: values.len()
        })
    }

    if values.iter().any(|v| !v.is_finite()) {
        return Err(LatCtrlError::NonFiniteMatrix(name))
    }

    Ok(())
}

fn check_positive(name: &'static str, value: f64) -> Result<(), LatCtrlError> {
    // NaN fails the comparison so is rejected here too
    if value.is_finite() && value > 0.0 {
        Ok(())
    }
    else {
        Err(LatCtrlError::NonPositiveScalar { name, value })
    }
}

/// Reference configuration shared by the LatCtrl tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Reference tuning: a double integrator steering model at 100 Hz.
    pub(crate) fn ref_tuning() -> LqrTuning {
        LqrTuning {
            version: 1,
            a: vec![1.0, 0.01, 0.0, 1.0],
            b: vec![0.0, 0.01],
            c: vec![1.0, 0.0],
            k: vec![1.0, 0.1],
            l: vec![0.1, 0.01],
            dc_gain: 0.003,
            scale: 1800.0,
            ki: 0.015,
            sat_limit_s: 0.4
        }
    }

    pub(crate) fn ref_config() -> ControllerConfig {
        ControllerConfig::from_tuning(&ref_tuning(), 0.01).unwrap()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use super::fixtures::*;

    #[test]
    fn test_from_tuning_row_major() {
        let cfg = ref_config();

        assert_eq!(cfg.a[(0, 1)], 0.01);
        assert_eq!(cfg.a[(1, 0)], 0.0);
        assert_eq!(cfg.b[1], 0.01);
        assert_eq!(cfg.k[1], 0.1);
        assert_eq!(cfg.l[0], 0.1);
        assert_eq!(cfg.version(), 1);
        assert_eq!(cfg.cycle_period_s(), 0.01);
        assert!((cfg.unwind_step() - 0.003).abs() < 1e-15);
        assert_eq!(cfg.integral_step(), 0.01);
        assert_eq!(cfg.sat_count_step(), 0.01);
    }

    #[test]
    fn test_bad_shapes_rejected() {
        let mut t = ref_tuning();
        t.a = vec![1.0, 0.0, 1.0];
        assert!(matches!(
            ControllerConfig::from_tuning(&t, 0.01),
            Err(LatCtrlError::InvalidMatrixShape { name: "A", expected: 4, found: 3 })
        ));

        let mut t = ref_tuning();
        t.l = vec![0.1, 0.01, 0.0];
        assert!(matches!(
            ControllerConfig::from_tuning(&t, 0.01),
            Err(LatCtrlError::InvalidMatrixShape { name: "L", .. })
        ));

        let mut t = ref_tuning();
        t.k = vec![1.0, std::f64::NAN];
        assert!(matches!(
            ControllerConfig::from_tuning(&t, 0.01),
            Err(LatCtrlError::NonFiniteMatrix("K"))
        ));
    }

    #[test]
    fn test_bad_scalars_rejected() {
        let mut t = ref_tuning();
        t.scale = 0.0;
        assert!(matches!(
            ControllerConfig::from_tuning(&t, 0.01),
            Err(LatCtrlError::NonPositiveScalar { name: "scale", .. })
        ));

        let mut t = ref_tuning();
        t.dc_gain = -0.003;
        assert!(matches!(
            ControllerConfig::from_tuning(&t, 0.01),
            Err(LatCtrlError::NonPositiveScalar { name: "dc_gain", .. })
        ));

        let mut t = ref_tuning();
        t.sat_limit_s = std::f64::NAN;
        assert!(matches!(
            ControllerConfig::from_tuning(&t, 0.01),
            Err(LatCtrlError::NonPositiveScalar { name: "sat_limit_s", .. })
        ));

        let mut t = ref_tuning();
        t.ki = std::f64::INFINITY;
        assert!(matches!(
            ControllerConfig::from_tuning(&t, 0.01),
            Err(LatCtrlError::NonFiniteScalar { name: "ki", .. })
        ));

        assert!(matches!(
            ControllerConfig::from_tuning(&ref_tuning(), 0.0),
            Err(LatCtrlError::NonPositiveScalar { name: "cycle_period_s", .. })
        ));
    }
}
