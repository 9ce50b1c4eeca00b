//! Main steering executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop, once per drive log record:
//!         - Input acquisition from the drive log
//!         - Telecommand processing and handling
//!         - Safe mode gating
//!         - Lateral control processing
//!         - Fault monitoring
//!         - Archiving
//!         - Cycle management
//!
//! # Usage
//!
//! ```text
//! steer_exec [--realtime] <drive_log.csv> [script.tcs]
//! ```
//!
//! In replay mode (the default) cycles run back to back. With `--realtime` each cycle is held to
//! the configured cycle period and overruns are reported.
//!
//! # Modules
//!
//! All modules (e.g. `lat_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use steer_lib::{
    data_store::DataStore,
    drive_log::DriveLog,
    lat_ctrl::LatCtrl
};

mod tc_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};
use color_eyre::{Report, eyre::{WrapErr, eyre}};

// Internal
use util::{
    host,
    module::State,
    archive::Archived,
    logger::{logger_init, LevelFilter},
    session::Session,
    script_interpreter::{ScriptInterpreter, PendingTcs},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Path to the LatCtrl parameters, relative to the params directory.
const LAT_CTRL_PARAMS: &str = "lat_ctrl.toml";

/// Flag selecting real-time execution.
const REALTIME_FLAG: &str = "--realtime";

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    // ---- EARLY INITIALISATION ----

    color_eyre::install()?;

    // Initialise session
    let session = Session::new(
        "steer_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, LevelFilter::Info, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Steering Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- PARSE ARGUMENTS ----

    // Collect all arguments
    let mut args: Vec<String> = env::args().skip(1).collect();

    debug!("CLI arguments: {:?}", args);

    let mode = match args.iter().position(|a| a == REALTIME_FLAG) {
        Some(i) => {
            args.remove(i);
            ExecMode::RealTime
        },
        None => ExecMode::Replay
    };

    let (log_path, script_path) = match args.len() {
        1 => (&args[0], None),
        2 => (&args[0], Some(&args[1])),
        n => return Err(eyre!(
            "Expected a drive log and an optional script, found {} arguments", n
        ))
    };

    info!("Execution mode: {:?}", mode);

    // ---- LOAD INPUTS ----

    info!("Loading drive log from \"{}\"", log_path);

    let drive_log = DriveLog::from_path(log_path)
        .wrap_err("Failed to load the drive log")?;

    info!(
        "Loaded drive log lasts {:.02} s and contains {} records",
        drive_log.duration_s(),
        drive_log.len()
    );

    let mut script = match script_path {
        Some(p) => {
            info!("Loading script from \"{}\"", p);

            let si = ScriptInterpreter::new(p)
                .wrap_err("Failed to load script")?;

            info!(
                "Loaded script lasts {:.02} s and contains {} TCs\n",
                si.get_duration(),
                si.get_num_tcs()
            );

            Some(si)
        },
        None => {
            info!("No script provided\n");
            None
        }
    };

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut params_path = host::get_steer_sw_root()
        .wrap_err("Failed to find the software root")?;
    params_path.push("params");
    params_path.push(LAT_CTRL_PARAMS);

    let lat_ctrl: LatCtrl = LatCtrl::init(params_path, &session)
        .wrap_err("Failed to initialise LatCtrl")?;
    info!("LatCtrl init complete");

    let cycle_period = Duration::from_secs_f64(lat_ctrl.config().cycle_period_s());

    // ---- INITIALISE DATASTORE ----

    let mut ds = DataStore::new(lat_ctrl);

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut start_time_s = None;
    let mut num_faults: u64 = 0;

    for record in drive_log.iter() {

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Time is measured from the first record
        let start = *start_time_s.get_or_insert(record.time_s);

        ds.cycle_start(record.time_s - start, record.to_input());

        // ---- TELECOMMAND PROCESSING ----

        let end_of_script = match script {
            Some(ref mut si) => match si.get_pending_tcs(ds.sim_time_s) {
                PendingTcs::None => false,
                PendingTcs::Some(tc_vec) => {
                    for tc in tc_vec.iter() {
                        tc_processor::exec(&mut ds, tc);
                    }
                    false
                },
                PendingTcs::EndOfScript => true
            },
            None => false
        };

        if end_of_script {
            info!("End of TC script reached");
            script = None;
        }

        ds.apply_safe_mode();

        // ---- CONTROL ALGORITHM PROCESSING ----

        match ds.lat_ctrl.proc(&ds.lat_ctrl_input) {
            Ok((o, r)) => {
                trace!(
                    "LatCtrl: active {}, angle_k {:.3} deg, lqr {:.5}, i {:.5}, out {:.5}/{:.5}, sat {}",
                    r.active,
                    r.estimated_angle_deg,
                    r.lqr_output,
                    r.trim,
                    r.output,
                    r.steer_max,
                    r.saturated
                );
                ds.lat_ctrl_output = o;
                ds.lat_ctrl_status_rpt = r;
            },
            Err(e) => warn!("Error during LatCtrl processing: {}", e)
        };

        if ds.lat_ctrl_status_rpt.fault {
            num_faults += 1;
        }
        ds.check_faults();

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.lat_ctrl.write() {
            warn!("Could not write LatCtrl archives: {}", e);
        }

        // ---- CYCLE MANAGEMENT ----

        if mode == ExecMode::RealTime {
            let cycle_dur = Instant::now() - cycle_start_instant;

            // Get sleep duration
            match cycle_period.checked_sub(cycle_dur) {
                Some(d) => {
                    ds.num_consec_cycle_overruns = 0;
                    thread::sleep(d);
                },
                None => {
                    warn!(
                        "Cycle overran by {:.06} s",
                        cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                    );
                    ds.num_consec_cycle_overruns += 1;
                }
            }
        }

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    info!(
        "End of drive log, {} cycles executed with {} faults",
        ds.num_cycles,
        num_faults
    );
    info!("End of execution");

    Ok(())
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Pacing of the main loop.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ExecMode {
    /// Cycles are held to the cycle period.
    RealTime,

    /// Cycles run as fast as possible.
    Replay
}
