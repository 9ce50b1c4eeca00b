//! # Data Store

use log::{info, warn};

use crate::lat_ctrl;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of consecutive faulted cycles after which safe mode is engaged.
pub const MAX_CONSEC_FAULTS: u64 = 10;

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the controller has been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SafeModeCause {
    MakeSafeTc,
    ConsecutiveFaults,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// Time of the current cycle, either from the drive log or the session
    /// clock.
    pub sim_time_s: f64,

    // Safe mode variables
    /// Determines if the controller is in safe mode.
    pub safe: bool,

    /// Gives the reason for the controller being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // LatCtrl
    pub lat_ctrl: lat_ctrl::LatCtrl,
    pub lat_ctrl_input: lat_ctrl::InputData,
    pub lat_ctrl_output: lat_ctrl::OutputData,
    pub lat_ctrl_status_rpt: lat_ctrl::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of consecutive cycles rejected by LatCtrl
    pub num_consec_faults: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Create a new store around an initialised LatCtrl.
    pub fn new(lat_ctrl: lat_ctrl::LatCtrl) -> Self {
        Self {
            num_cycles: 0,
            sim_time_s: 0.0,
            safe: false,
            safe_cause: None,
            lat_ctrl,
            lat_ctrl_input: lat_ctrl::InputData::default(),
            lat_ctrl_output: lat_ctrl::OutputData::default(),
            lat_ctrl_status_rpt: lat_ctrl::StatusReport::default(),
            num_consec_cycle_overruns: 0,
            num_consec_faults: 0,
        }
    }

    /// Puts the controller into safe mode with the given cause.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe = true;
            self.safe_cause = Some(cause);
        }
    }

    /// Attempts to disable the safe mode by clearing the given cause.
    ///
    /// To remove safe mode the provided cause must match the initial reason for safe mode being
    /// enabled, otherwise the root cause is returned as the error.
    ///
    /// If safe mode was not enabled `Ok(())` is returned
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> Result<(), SafeModeCause> {
        if !self.safe {
            return Ok(());
        }

        match self.safe_cause {
            Some(root_cause) => {
                if cause == root_cause {
                    self.safe = false;
                    self.safe_cause = None;
                    self.num_consec_faults = 0;
                    info!("Make unsafe requested, root cause match, safe mode disabled");
                    Ok(())
                } else {
                    Err(root_cause)
                }
            }
            None => Ok(()),
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Sets the input for this cycle and clears the previous outputs. In safe mode the input is
    /// never engaged.
    pub fn cycle_start(&mut self, sim_time_s: f64, input: lat_ctrl::InputData) {
        self.sim_time_s = sim_time_s;

        self.lat_ctrl_input = input;
        self.lat_ctrl_output = lat_ctrl::OutputData::default();
        self.lat_ctrl_status_rpt = lat_ctrl::StatusReport::default();
    }

    /// Gate the cycle input by the safe mode state.
    ///
    /// Called after telecommand processing so that a `MakeSafe` takes effect on the same cycle.
    pub fn apply_safe_mode(&mut self) {
        if self.safe {
            self.lat_ctrl_input.active = false;
        }
    }

    /// Track faults reported by LatCtrl, engaging safe mode once the limit is exceeded.
    pub fn check_faults(&mut self) {
        if !self.lat_ctrl_status_rpt.fault {
            self.num_consec_faults = 0;
            return;
        }

        self.num_consec_faults += 1;

        if self.num_consec_faults > MAX_CONSEC_FAULTS {
            if !self.safe {
                warn!(
                    "Maximum number of consecutive LatCtrl faults ({}) has been exceeded",
                    MAX_CONSEC_FAULTS
                );
            }
            self.make_safe(SafeModeCause::ConsecutiveFaults);
        }
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }
}
