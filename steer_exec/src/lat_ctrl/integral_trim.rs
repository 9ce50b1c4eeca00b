//! # Integral trim
//!
//! Removes the steady state bias left by the LQR law. The trim is guarded
//! against windup in two ways:
//!
//! - While the driver overrides, the trim unwinds towards zero by a fixed
//!   step each cycle and never changes sign.
//! - Otherwise the integrated value is only accepted if it does not push an
//!   output which is already at the limit further into saturation, in the
//!   direction of the error.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use util::maths::{clamp, unwind_toward_zero};

// Internal
use super::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Persistent state of the integral trim.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct IntegralTrim {
    i: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl IntegralTrim {

    /// The current trim value.
    pub fn value(&self) -> f64 {
        self.i
    }

    /// Clear the trim, used whenever the controller is inactive.
    pub fn reset(&mut self) {
        self.i = 0.0;
    }

    /// Update the trim for this cycle.
    ///
    /// - `error_deg`: desired angle minus the estimated angle.
    /// - `lqr_output`: the raw command this cycle.
    /// - `steer_max`: the actuator limit this cycle.
    pub fn update(
        &mut self,
        config: &ControllerConfig,
        steer_pressed: bool,
        error_deg: f64,
        lqr_output: f64,
        steer_max: f64
    ) {
        if steer_pressed {
            self.i = unwind_toward_zero(self.i, config.unwind_step());
            return
        }

        let i = self.i + config.ki * config.integral_step() * error_deg;
        let control = lqr_output + i;

        // Only accept the new value if it does not deepen saturation in the
        // direction of the error
        if (error_deg >= 0.0 && (control <= steer_max || i < 0.0))
            || (error_deg <= 0.0 && (control >= -steer_max || i > 0.0))
        {
            self.i = i;
        }
    }

    /// The final command, trimmed and clamped to the actuator limit.
    pub fn apply(&self, lqr_output: f64, steer_max: f64) -> f64 {
        clamp(&(lqr_output + self.i), &-steer_max, &steer_max)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lat_ctrl::config::fixtures::*;

    fn trim_with(i: f64) -> IntegralTrim {
        IntegralTrim { i }
    }

    #[test]
    fn test_integrates_error() {
        let cfg = ref_config();
        let mut trim = IntegralTrim::default();

        trim.update(&cfg, false, 5.0, 0.5, 1.0);
        assert!((trim.value() - 0.00075).abs() < 1e-15);

        trim.update(&cfg, false, -10.0, 0.5, 1.0);
        assert!((trim.value() + 0.00075).abs() < 1e-15);
    }

    #[test]
    fn test_no_windup_at_positive_limit() {
        let cfg = ref_config();
        let mut trim = trim_with(0.01);

        // Raw command already at the limit and error pushing further
        trim.update(&cfg, false, 5.0, 1.0, 1.0);
        assert_eq!(trim.value(), 0.01);
        assert_eq!(trim.apply(1.0, 1.0), 1.0);

        // Error in the other direction is still accepted
        trim.update(&cfg, false, -5.0, 1.0, 1.0);
        assert!(trim.value() < 0.01);
    }

    #[test]
    fn test_no_windup_at_negative_limit() {
        let cfg = ref_config();
        let mut trim = trim_with(-0.01);

        trim.update(&cfg, false, -5.0, -1.0, 1.0);
        assert_eq!(trim.value(), -0.01);

        trim.update(&cfg, false, 5.0, -1.0, 1.0);
        assert!(trim.value() > -0.01);
    }

    #[test]
    fn test_negative_trim_may_grow_back_while_saturated() {
        let cfg = ref_config();
        let mut trim = trim_with(-0.5);

        // Combined output is over the limit but the trim is negative, so
        // integrating a positive error towards zero is allowed.
        trim.update(&cfg, false, 5.0, 2.0, 1.0);
        assert!((trim.value() - (-0.5 + 0.00075)).abs() < 1e-15);
    }

    #[test]
    fn test_override_unwinds_without_sign_change() {
        let cfg = ref_config();
        let step = cfg.unwind_step();
        let mut trim = trim_with(0.0075);

        let mut prev = trim.value();
        for _ in 0..10 {
            trim.update(&cfg, true, 5.0, 0.0, 1.0);
            let now = trim.value();
            assert!(now >= 0.0);
            if prev > 0.0 {
                assert!(now < prev);
                assert!((prev - now - step.min(prev)).abs() < 1e-15);
            }
            else {
                assert_eq!(now, 0.0);
            }
            prev = now;
        }
        assert_eq!(trim.value(), 0.0);

        let mut trim = trim_with(-0.004);
        trim.update(&cfg, true, 5.0, 0.0, 1.0);
        assert!((trim.value() + 0.001).abs() < 1e-15);
        trim.update(&cfg, true, 5.0, 0.0, 1.0);
        assert_eq!(trim.value(), 0.0);
    }

    #[test]
    fn test_apply_clamps() {
        let trim = trim_with(0.2);

        assert_eq!(trim.apply(0.9, 1.0), 1.0);
        assert_eq!(trim.apply(-1.5, 1.0), -1.0);
        assert!((trim.apply(0.1, 1.0) - 0.3).abs() < 1e-15);
    }
}
