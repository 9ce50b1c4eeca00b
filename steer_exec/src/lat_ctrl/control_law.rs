//! # LQR control law
//!
//! Converts the desired steering angle and the estimated state into a raw
//! torque command. The law is a feedforward term, `desired / dc_gain`, minus
//! the LQR feedback `K x`, scaled into actuator units by the speed dependent
//! torque scale.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;

// Internal
use super::*;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Speed dependent scaling of the actuator model.
///
/// Actuator authority grows with speed, the estimator divides the measured
/// torque by this scale and the control law multiplies its output by it.
pub fn torque_scale(speed_ms: f64) -> f64 {
    (TORQUE_SCALE_OFFSET + speed_ms / TORQUE_SCALE_SPEED_MS).powi(2)
}

/// Determine if the controller is allowed to act this cycle.
pub fn is_engaged(active: bool, speed_ms: f64) -> bool {
    active && speed_ms >= MIN_ACTIVE_SPEED_MS
}

/// Calculate the raw (untrimmed, unclamped) command.
///
/// `angle_steers_des_deg` must already have the angle offset removed.
pub fn lqr_output(
    config: &ControllerConfig,
    angle_steers_des_deg: f64,
    x_hat: &Vector2<f64>,
    torque_scale: f64
) -> f64 {
    let u_lqr = angle_steers_des_deg / config.dc_gain - (config.k * x_hat)[0];

    torque_scale * u_lqr / config.scale
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lat_ctrl::config::fixtures::*;

    #[test]
    fn test_torque_scale() {
        assert!((torque_scale(0.0) - 0.2025).abs() < 1e-12);
        assert!((torque_scale(20.0) - 0.6136111111111111).abs() < 1e-12);
        assert!(torque_scale(30.0) > torque_scale(20.0));
    }

    #[test]
    fn test_is_engaged() {
        assert!(is_engaged(true, 0.3));
        assert!(is_engaged(true, 20.0));
        assert!(!is_engaged(true, 0.29));
        assert!(!is_engaged(false, 20.0));
    }

    #[test]
    fn test_lqr_output_feedforward_only() {
        let cfg = ref_config();
        let ts = torque_scale(20.0);

        // Zero state, so only the feedforward term remains
        let out = lqr_output(&cfg, 0.9, &Vector2::zeros(), ts);
        assert!((out - ts * 300.0 / 1800.0).abs() < 1e-12);
    }

    #[test]
    fn test_lqr_output_feedback_opposes_state() {
        let cfg = ref_config();
        let ts = torque_scale(20.0);

        let out = lqr_output(&cfg, 0.0, &Vector2::new(18.0, 0.0), ts);
        assert!((out + ts * 18.0 / 1800.0).abs() < 1e-12);

        let out = lqr_output(&cfg, 0.0, &Vector2::new(0.0, -180.0), ts);
        assert!((out - ts * 18.0 / 1800.0).abs() < 1e-12);
    }
}
