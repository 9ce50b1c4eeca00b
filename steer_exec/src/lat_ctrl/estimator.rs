//! # State estimator
//!
//! A discrete Kalman-style observer over the fixed linear steering model
//! `(A, B, C)` with precomputed observer gain `L`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;

// Internal
use super::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Persistent state of the estimator.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StateEstimator {
    /// Estimated state, `[angle, rate-like term]`
    x_hat: Vector2<f64>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for StateEstimator {
    fn default() -> Self {
        Self {
            x_hat: Vector2::zeros()
        }
    }
}

impl StateEstimator {

    /// The current state estimate.
    pub fn x_hat(&self) -> Vector2<f64> {
        self.x_hat
    }

    /// The angle predicted from the current estimate, `C x`.
    pub fn predicted_angle_deg(&self, config: &ControllerConfig) -> f64 {
        (config.c * self.x_hat)[0]
    }

    /// Update the estimate with this cycle's measurements.
    ///
    /// `steer_angle_deg` must have the angle offset removed. On success the
    /// angle predicted *before* the update is returned, which is the
    /// estimate the controller compares against the desired angle.
    ///
    /// If any input or the updated state is not finite the update is
    /// rejected and the previous estimate is kept.
    pub fn update(
        &mut self,
        config: &ControllerConfig,
        steer_angle_deg: f64,
        steer_torque_eps: f64,
        torque_scale: f64
    ) -> Result<f64, NumericFault> {
        if !steer_angle_deg.is_finite() 
            || !steer_torque_eps.is_finite() 
            || !torque_scale.is_finite()
        {
            return Err(NumericFault::NonFiniteInput)
        }

        let angle_steers_k_deg = self.predicted_angle_deg(config);
        let innovation = steer_angle_deg - angle_steers_k_deg;

        let x_hat = config.a * self.x_hat 
            + config.b * (steer_torque_eps / torque_scale)
            + config.l * innovation;

        if !(x_hat[0].is_finite() && x_hat[1].is_finite()) {
            return Err(NumericFault::NonFiniteEstimate)
        }

        self.x_hat = x_hat;

        Ok(angle_steers_k_deg)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lat_ctrl::config::fixtures::*;

    #[test]
    fn test_first_update() {
        let cfg = ref_config();
        let ts = torque_scale(20.0);
        let mut est = StateEstimator::default();

        let angle_k = est.update(&cfg, 4.0, 100.0, ts).unwrap();

        // The prediction is made from the zero initial state
        assert_eq!(angle_k, 0.0);

        // x = B * (torque / ts) + L * e
        let x = est.x_hat();
        assert!((x[0] - 0.4).abs() < 1e-12);
        assert!((x[1] - (1.0 / ts + 0.04)).abs() < 1e-12);
        assert!((est.predicted_angle_deg(&cfg) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_converges_to_constant_angle() {
        let cfg = ref_config();
        let mut est = StateEstimator::default();

        for _ in 0..20000 {
            est.update(&cfg, 3.0, 0.0, 1.0).unwrap();
        }

        assert!((est.predicted_angle_deg(&cfg) - 3.0).abs() < 1e-6);
        assert!(est.x_hat()[1].abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_rejected() {
        let cfg = ref_config();
        let mut est = StateEstimator::default();
        est.update(&cfg, 4.0, 100.0, 1.0).unwrap();
        let before = est;

        assert_eq!(
            est.update(&cfg, std::f64::NAN, 0.0, 1.0),
            Err(NumericFault::NonFiniteInput)
        );
        assert_eq!(
            est.update(&cfg, 0.0, std::f64::INFINITY, 1.0),
            Err(NumericFault::NonFiniteInput)
        );
        assert_eq!(
            est.update(&cfg, 0.0, std::f64::MAX, 1e-300),
            Err(NumericFault::NonFiniteEstimate)
        );
        assert_eq!(est, before);
    }
}
