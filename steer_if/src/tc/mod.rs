//! # Telecommand module
//!
//! This module provides telecommand functionality to the steering interface. Telecommands are
//! issued by the calibration service (or a script) and are applied by the host between control
//! cycles.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod lat_ctrl;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Serialize, Deserialize};
use serde_json::{self, Value};
use thiserror::Error;

// Internal
use lat_ctrl::LqrTuning;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static TYPE_HAS_NO_PAYLOAD: [TcType; 2] = [
    TcType::MakeSafe,
    TcType::MakeUnsafe
];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the steering software by an external service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Tc {
    /// Force the controller inactive until a `MakeUnsafe` is received.
    MakeSafe,

    /// Release a previous `MakeSafe`.
    MakeUnsafe,

    /// Replace the lateral controller tuning at the next cycle boundary.
    LatCtrlTuning(LqrTuning),
}

/// Telecommand types. 
///
/// The type is used to identify the purpose of the telecommand, and is given by the `"type"` 
/// field of the JSON packet.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub enum TcType {
    MakeSafe,
    MakeUnsafe,
    LatCtrlTuning,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("TC has an invalid type ({0})")]
    InvalidType(String),

    #[error("TC of type {0:?} is expected to have a payload but it doesn't")]
    MissingPayload(TcType),

    #[error("TC of type {0:?} has an invalid payload: {1}")]
    InvalidPayload(TcType, serde_json::Error)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {

    /// Parse a new TC from a JSON packet.
    ///
    /// Packets have the form `{"type": "TUNE", "payload": {...}}`, the payload may be omitted for
    /// types which do not carry one.
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        // Parse the JSON string into a value
        let val: Value = serde_json::from_str(json_str)
            .map_err(TcParseError::InvalidJson)?;

        // Get the type of the TC
        let type_str = match val["type"].as_str() {
            Some(s) => s,
            None => return Err(TcParseError::InvalidType(String::from(
                "Expected \"type\" to be a string"
            )))
        };
        let tc_type = match TcType::from_str(type_str) {
            Some(t) => t,
            None => return Err(TcParseError::InvalidType(
                format!("{} is not a recognised TC type", type_str)
            ))
        };
        
        // Get the payload. If it's null and the type does not have a payload 
        // then an error is returned
        if val["payload"].is_null()
            &&
            !TYPE_HAS_NO_PAYLOAD.contains(&tc_type)
        {
            return Err(TcParseError::MissingPayload(tc_type))
        }

        Ok(match tc_type {
            TcType::MakeSafe => Tc::MakeSafe,
            TcType::MakeUnsafe => Tc::MakeUnsafe,
            TcType::LatCtrlTuning => Tc::LatCtrlTuning(
                serde_json::from_value(val["payload"].clone())
                    .map_err(|e| TcParseError::InvalidPayload(tc_type, e))?
            )
        })
    }

    /// Get the type of this TC.
    pub fn tc_type(&self) -> TcType {
        match self {
            Tc::MakeSafe => TcType::MakeSafe,
            Tc::MakeUnsafe => TcType::MakeUnsafe,
            Tc::LatCtrlTuning(_) => TcType::LatCtrlTuning
        }
    }
}

impl TcType {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "SAFE" => Some(TcType::MakeSafe),
            "UNSAFE" => Some(TcType::MakeUnsafe),
            "TUNE" => Some(TcType::LatCtrlTuning),
            _ => None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_no_payload() {
        assert_eq!(Tc::from_json(r#"{"type": "SAFE"}"#).unwrap(), Tc::MakeSafe);
        assert_eq!(Tc::from_json(r#"{"type": "UNSAFE"}"#).unwrap(), Tc::MakeUnsafe);
    }

    #[test]
    fn test_parse_tuning() {
        let tc = Tc::from_json(r#"{
            "type": "TUNE",
            "payload": {
                "version": 3,
                "a": [1.0, 0.01, 0.0, 1.0],
                "b": [0.0, 0.01],
                "c": [1.0, 0.0],
                "k": [1.0, 0.1],
                "l": [0.1, 0.01],
                "dc_gain": 0.003,
                "scale": 1800.0,
                "ki": 0.015,
                "sat_limit_s": 0.4
            }
        }"#).unwrap();

        assert_eq!(tc.tc_type(), TcType::LatCtrlTuning);
        match tc {
            Tc::LatCtrlTuning(t) => {
                assert_eq!(t.version, 3);
                assert_eq!(t.a, vec![1.0, 0.01, 0.0, 1.0]);
                assert_eq!(t.scale, 1800.0);
            },
            _ => panic!("Expected a tuning TC")
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Tc::from_json("{not json"), 
            Err(TcParseError::InvalidJson(_))
        ));
        assert!(matches!(
            Tc::from_json(r#"{"type": "LAUNCH"}"#), 
            Err(TcParseError::InvalidType(_))
        ));
        assert!(matches!(
            Tc::from_json(r#"{"type": 4}"#), 
            Err(TcParseError::InvalidType(_))
        ));
        assert!(matches!(
            Tc::from_json(r#"{"type": "TUNE"}"#), 
            Err(TcParseError::MissingPayload(TcType::LatCtrlTuning))
        ));
        assert!(matches!(
            Tc::from_json(r#"{"type": "TUNE", "payload": {"version": 1}}"#), 
            Err(TcParseError::InvalidPayload(TcType::LatCtrlTuning, _))
        ));
    }
}
