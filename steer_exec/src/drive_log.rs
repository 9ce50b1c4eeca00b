//! # Drive log
//!
//! A drive log is a CSV file with one row per control cycle, giving the input
//! LatCtrl would have received on the vehicle. The executable replays a log
//! to run the controller offline.
//!
//! The expected header is:
//!
//! ```text
//! time_s,speed_ms,steer_angle_deg,steer_torque_eps,steer_pressed,steer_rate_limited,angle_steers_des_deg,angle_offset_deg,active
//! ```
//!
//! Non-finite values (`NaN`, `inf`) are accepted so that recorded sensor
//! faults can be replayed.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

// Internal
use crate::lat_ctrl::InputData;
use steer_if::eqpt::vehicle::{PathPlan, VehicleState};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single row of the drive log.
#[derive(Debug, Copy, Clone, Deserialize, PartialEq)]
pub struct DriveLogRecord {
    /// Time since the start of the log.
    ///
    /// Units: seconds
    pub time_s: f64,

    pub speed_ms: f64,
    pub steer_angle_deg: f64,
    pub steer_torque_eps: f64,
    pub steer_pressed: bool,
    pub steer_rate_limited: bool,
    pub angle_steers_des_deg: f64,
    pub angle_offset_deg: f64,
    pub active: bool,
}

/// A loaded drive log.
#[derive(Debug, Clone)]
pub struct DriveLog {
    records: Vec<DriveLogRecord>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DriveLogError {
    #[error("Could not open the drive log: {0}")]
    OpenError(csv::Error),

    #[error("Could not parse record {0} of the drive log: {1}")]
    ParseError(usize, csv::Error),

    #[error("The drive log contains no records")]
    Empty,

    #[error("Time of record {index} ({time_s} s) does not increase on the previous record")]
    TimeNotIncreasing { index: usize, time_s: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveLogRecord {
    /// Convert the record into LatCtrl input data.
    pub fn to_input(&self) -> InputData {
        InputData {
            active: self.active,
            vehicle: VehicleState {
                speed_ms: self.speed_ms,
                steer_angle_deg: self.steer_angle_deg,
                steer_torque_eps: self.steer_torque_eps,
                steer_pressed: self.steer_pressed,
                steer_rate_limited: self.steer_rate_limited,
            },
            path_plan: PathPlan {
                angle_steers_des_deg: self.angle_steers_des_deg,
                angle_offset_deg: self.angle_offset_deg,
            },
        }
    }
}

impl DriveLog {
    /// Load a drive log from the given path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DriveLogError> {
        let reader = csv::Reader::from_path(path).map_err(DriveLogError::OpenError)?;

        Self::from_csv(reader)
    }

    /// Load a drive log from any reader, for instance a string in memory.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, DriveLogError> {
        Self::from_csv(csv::Reader::from_reader(rdr))
    }

    /// Number of records in the log.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false, an empty log cannot be loaded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Time between the first and last records.
    ///
    /// Units: seconds
    pub fn duration_s(&self) -> f64 {
        match (self.records.first(), self.records.last()) {
            (Some(f), Some(l)) => l.time_s - f.time_s,
            _ => 0.0,
        }
    }

    /// Iterate over the records in time order.
    pub fn iter(&self) -> impl Iterator<Item = &DriveLogRecord> {
        self.records.iter()
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, DriveLogError> {
        let mut records: Vec<DriveLogRecord> = Vec::new();

        for (index, result) in reader.deserialize().enumerate() {
            let record: DriveLogRecord =
                result.map_err(|e| DriveLogError::ParseError(index, e))?;

            // Time must be usable to drive the script interpreter
            if let Some(prev) = records.last() {
                if !(record.time_s > prev.time_s) {
                    return Err(DriveLogError::TimeNotIncreasing {
                        index,
                        time_s: record.time_s,
                    });
                }
            } else if !record.time_s.is_finite() {
                return Err(DriveLogError::TimeNotIncreasing {
                    index,
                    time_s: record.time_s,
                });
            }

            records.push(record);
        }

        if records.is_empty() {
            return Err(DriveLogError::Empty);
        }

        Ok(Self { records })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const HEADER: &str = "time_s,speed_ms,steer_angle_deg,steer_torque_eps,steer_pressed,\
        steer_rate_limited,angle_steers_des_deg,angle_offset_deg,active\n";

    #[test]
    fn test_load() {
        let log_str = format!(
            "{}{}{}",
            HEADER,
            "0.00,20.0,4.0,100.0,false,false,5.0,0.0,true\n",
            "0.01,20.0,NaN,100.0,false,true,5.0,0.5,false\n"
        );

        let log = DriveLog::from_reader(log_str.as_bytes()).unwrap();

        assert_eq!(log.len(), 2);
        assert!((log.duration_s() - 0.01).abs() < 1e-12);

        let records: Vec<_> = log.iter().collect();
        let input = records[0].to_input();
        assert!(input.active);
        assert_eq!(input.vehicle.speed_ms, 20.0);
        assert_eq!(input.vehicle.steer_torque_eps, 100.0);
        assert_eq!(input.path_plan.angle_steers_des_deg, 5.0);

        let input = records[1].to_input();
        assert!(!input.active);
        assert!(input.vehicle.steer_angle_deg.is_nan());
        assert!(input.vehicle.steer_rate_limited);
        assert_eq!(input.path_plan.angle_offset_deg, 0.5);
    }

    #[test]
    fn test_invalid_logs() {
        assert!(matches!(
            DriveLog::from_reader(HEADER.as_bytes()),
            Err(DriveLogError::Empty)
        ));

        let log_str = format!(
            "{}{}{}",
            HEADER,
            "0.01,20.0,4.0,100.0,false,false,5.0,0.0,true\n",
            "0.01,20.0,4.0,100.0,false,false,5.0,0.0,true\n"
        );
        assert!(matches!(
            DriveLog::from_reader(log_str.as_bytes()),
            Err(DriveLogError::TimeNotIncreasing { index: 1, .. })
        ));

        let log_str = format!(
            "{}{}",
            HEADER, "0.00,20.0,4.0,100.0,maybe,false,5.0,0.0,true\n"
        );
        assert!(matches!(
            DriveLog::from_reader(log_str.as_bytes()),
            Err(DriveLogError::ParseError(0, _))
        ));
    }
}
