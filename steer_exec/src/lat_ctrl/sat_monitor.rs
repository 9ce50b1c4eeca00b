//! # Saturation monitor
//!
//! A leaky bucket over the clamped output. Momentary saturation does not
//! trip the flag, saturation held for longer than the configured limit does.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use steer_if::eqpt::vehicle::VehicleState;
use util::maths::clamp;

// Internal
use super::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Persistent state of the saturation monitor.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct SatMonitor {
    /// Counter, always in [0, 1]
    count: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SatMonitor {

    /// The current counter value.
    pub fn count(&self) -> f64 {
        self.count
    }

    /// Clear the counter, used whenever the controller is inactive.
    pub fn reset(&mut self) {
        self.count = 0.0;
    }

    /// Whether the monitor may count up for the given vehicle state.
    ///
    /// Saturation is expected at low speed, while rate limited and while the
    /// driver is overriding, so none of these count.
    pub fn check_enabled(vehicle: &VehicleState) -> bool {
        vehicle.speed_ms > SAT_CHECK_MIN_SPEED_MS
            && !vehicle.steer_rate_limited
            && !vehicle.steer_pressed
    }

    /// Update the counter with this cycle's output and report saturation.
    ///
    /// `output` must already be clamped to `steer_max`, saturation is then
    /// exact equality with the limit.
    pub fn check(
        &mut self,
        config: &ControllerConfig,
        output: f64,
        steer_max: f64,
        enabled: bool
    ) -> bool {
        let saturated = output.abs() == steer_max;

        if saturated && enabled {
            self.count += config.sat_count_step();
        }
        else {
            self.count -= config.sat_count_step();
        }

        self.count = clamp(&self.count, &0.0, &1.0);

        self.count > config.sat_limit_s
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lat_ctrl::config::fixtures::*;

    #[test]
    fn test_hysteresis() {
        let cfg = ref_config();
        let mut mon = SatMonitor::default();

        for _ in 0..39 {
            assert!(!mon.check(&cfg, 1.0, 1.0, true));
        }
        mon.check(&cfg, -1.0, 1.0, true);
        assert!(mon.check(&cfg, 1.0, 1.0, true));

        // Saturation released, drains back to zero
        let mut flags = vec![];
        for _ in 0..100 {
            flags.push(mon.check(&cfg, 0.5, 1.0, true));
            assert!(mon.count() >= 0.0);
        }
        assert!(!flags[flags.len() - 1]);
        assert_eq!(mon.count(), 0.0);
    }

    #[test]
    fn test_disabled_does_not_count() {
        let cfg = ref_config();
        let mut mon = SatMonitor::default();

        for _ in 0..200 {
            assert!(!mon.check(&cfg, 1.0, 1.0, false));
        }
        assert_eq!(mon.count(), 0.0);
    }

    #[test]
    fn test_counter_capped_at_one() {
        let cfg = ref_config();
        let mut mon = SatMonitor::default();

        for _ in 0..500 {
            mon.check(&cfg, 1.0, 1.0, true);
        }
        assert_eq!(mon.count(), 1.0);

        // One second of release fully drains a full bucket
        for _ in 0..100 {
            mon.check(&cfg, 0.0, 1.0, true);
        }
        assert!(mon.count() < 1e-9);
    }

    #[test]
    fn test_check_enabled() {
        let mut v = VehicleState {
            speed_ms: 20.0,
            ..Default::default()
        };
        assert!(SatMonitor::check_enabled(&v));

        v.steer_pressed = true;
        assert!(!SatMonitor::check_enabled(&v));

        v.steer_pressed = false;
        v.steer_rate_limited = true;
        assert!(!SatMonitor::check_enabled(&v));

        v.steer_rate_limited = false;
        v.speed_ms = 10.0;
        assert!(!SatMonitor::check_enabled(&v));
    }
}
