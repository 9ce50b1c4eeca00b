//! # Telecommand script interpreter module
//!
//! This module provides an interpreter for telecommand scripts, allowing 
//! telecommands to be executed at set times from a script file.
//!
//! Each line of a script has the form `<time_s>: <tc_json>;`, for example
//!
//! ```text
//! 0.0: {"type": "SAFE"};
//! 2.5: {"type": "UNSAFE"};
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::fs;
use regex::RegexBuilder;
use thiserror::Error;

// Internal
use steer_if::tc::{Tc, TcParseError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// A command line, `<time>: <json>;`, the JSON may span several lines.
const SCRIPT_LINE_PATTERN: &str = r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
pub struct Command {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The Telecommand to run
    tc: Tc
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use
/// `.get_pending_tcs` to acquire a list of telecommands that need executing.
pub struct ScriptInterpreter {
    _script_path: PathBuf,
    cmds: VecDeque<Command>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid TC at {0} s: {1}")]
    InvalidTc(f64, TcParseError)
}

#[derive(Debug, PartialEq)]
pub enum PendingTcs {
    None,
    Some(Vec<Tc>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());
        
        // Check that the script file exists.
        if !path.exists() {
            return Err(
                ScriptError::ScriptNotFound(path.to_string_lossy().to_string()));
        }

        // Load the script into a string
        let script = fs::read_to_string(&path)
            .map_err(ScriptError::ScriptLoadError)?;

        let cmds = Self::parse(&script)?;

        Ok(ScriptInterpreter {
            _script_path: path,
            cmds
        })
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_str(script: &str) -> Result<Self, ScriptError> {
        Ok(ScriptInterpreter {
            _script_path: PathBuf::new(),
            cmds: Self::parse(script)?
        })
    }

    fn parse(script: &str) -> Result<VecDeque<Command>, ScriptError> {
        // Empty queue of commands
        let mut tc_queue: VecDeque<Command> = VecDeque::new();

        let re = RegexBuilder::new(SCRIPT_LINE_PATTERN)
            .multi_line(true)
            .build()
            .expect("Script line pattern is a valid regex");

        for cap in re.captures_iter(script) {
            let (time_str, tc_str) = match (cap.get(1), cap.get(3)) {
                (Some(t), Some(p)) => (t.as_str(), p.as_str()),
                _ => continue
            };

            // Parse the exec time
            let exec_time_s: f64 = time_str.parse().map_err(|e| 
                ScriptError::InvalidTimestamp(format!("{}", e)))?;

            // Parse the TC from the payload. The scripts contain JSON only.
            let tc = Tc::from_json(tc_str)
                .map_err(|e| ScriptError::InvalidTc(exec_time_s, e))?;

            tc_queue.push_back(Command {
                exec_time_s,
                tc
            });
        }

        if tc_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        // Commands must be issued in time order regardless of their order in the file
        tc_queue.make_contiguous().sort_by(|a, b| 
            a.exec_time_s.total_cmp(&b.exec_time_s));

        Ok(tc_queue)
    }

    /// Return all TCs due at or before `current_time_s`.
    ///
    /// The time base is the host's, in replay this is the drive log time so
    /// that scripts are deterministic.
    pub fn get_pending_tcs(&mut self, current_time_s: f64) -> PendingTcs {

        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.cmds.is_empty() {
            return PendingTcs::EndOfScript
        }

        let mut tc_vec: Vec<Tc> = vec![];

        // Pop items from the queue while the head's exec time has been
        // reached.
        while let Some(cmd) = self.cmds.front() {
            if cmd.exec_time_s > current_time_s {
                break
            }
            if let Some(cmd) = self.cmds.pop_front() {
                tc_vec.push(cmd.tc);
            }
        }

        // If the vector is longer than 0 return Some, otherwise None
        if tc_vec.len() > 0 {
            PendingTcs::Some(tc_vec)
        }
        else {
            PendingTcs::None
        }
    }

    /// Get the number of TCs remaining in the script
    pub fn get_num_tcs(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_script_timing() {
        let mut si = ScriptInterpreter::from_str(
            "2.0: {\"type\": \"UNSAFE\"};\n\
             0.5: {\"type\": \"SAFE\"};\n"
        ).unwrap();

        assert_eq!(si.get_num_tcs(), 2);
        assert_eq!(si.get_duration(), 2.0);

        assert_eq!(si.get_pending_tcs(0.0), PendingTcs::None);
        assert_eq!(si.get_pending_tcs(0.5), PendingTcs::Some(vec![Tc::MakeSafe]));
        assert_eq!(si.get_pending_tcs(1.0), PendingTcs::None);
        assert_eq!(si.get_pending_tcs(3.0), PendingTcs::Some(vec![Tc::MakeUnsafe]));
        assert_eq!(si.get_pending_tcs(4.0), PendingTcs::EndOfScript);
    }

    #[test]
    fn test_line_pattern() {
        let re = RegexBuilder::new(SCRIPT_LINE_PATTERN)
            .multi_line(true)
            .build()
            .unwrap();

        let caps: Vec<_> = re
            .captures_iter("0.5: {\"type\": \"SAFE\"};\n  2: {\n\"type\": \"UNSAFE\"\n};")
            .map(|c| (c[1].to_string(), c[3].trim().to_string()))
            .collect();

        assert_eq!(caps.len(), 2);
        assert_eq!(caps[0].0, "0.5");
        assert_eq!(caps[1].0, "2");
        assert!(caps[1].1.contains("UNSAFE"));
    }

    #[test]
    fn test_empty_script() {
        assert!(matches!(
            ScriptInterpreter::from_str("# nothing here\n"),
            Err(ScriptError::ScriptEmpty)
        ));
    }

    #[test]
    fn test_invalid_tc() {
        assert!(matches!(
            ScriptInterpreter::from_str("1.0: {\"type\": \"TUNE\"};"),
            Err(ScriptError::InvalidTc(_, _))
        ));
    }
}
