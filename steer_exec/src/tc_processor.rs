//! # Telecommand processor module
//!
//! The telecommand processor handles various TCs coming from any source.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};

// Internal
use steer_if::tc::Tc;
use steer_lib::{
    data_store::{DataStore, SafeModeCause},
    lat_ctrl::ControllerConfig,
};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore to send commands to different modules.
pub(crate) fn exec(ds: &mut DataStore, tc: &Tc) {

    // Handle different Tcs
    match tc {
        Tc::MakeSafe => {
            debug!("Recieved MakeSafe command");
            ds.make_safe(SafeModeCause::MakeSafeTc);
        },
        Tc::MakeUnsafe => {
            debug!("Recieved MakeUnsafe command");

            // The operator may clear either cause
            let result = ds
                .make_unsafe(SafeModeCause::MakeSafeTc)
                .or_else(|_| ds.make_unsafe(SafeModeCause::ConsecutiveFaults));
            if let Err(cause) = result {
                info!("Make unsafe rejected, root cause is {:?}", cause);
            }
        },
        Tc::LatCtrlTuning(t) => {
            debug!("Recieved LatCtrlTuning command, version {}", t.version);

            // The cycle period is fixed for the life of the executable
            let cycle_period_s = ds.lat_ctrl.config().cycle_period_s();

            match ControllerConfig::from_tuning(t, cycle_period_s)
                .and_then(|c| ds.lat_ctrl.request_config(c))
            {
                Ok(()) => (),
                Err(e) => warn!("LatCtrlTuning rejected: {}", e)
            }
        }
    }

}
