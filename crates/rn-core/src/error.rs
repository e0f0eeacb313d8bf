//! Error taxonomy for the navigation core
//!
//! None of these are fatal. Lookup and position errors degrade to "keep the
//! last good state and wait for the next trigger"; session errors reject a
//! single user action and leave the ride untouched.

use thiserror::Error;

use crate::ride::RideState;

/// Failure of a geocoding or routing lookup
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("network error: {0}")]
    Network(String),

    #[error("service responded with HTTP {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("no route between the requested points")]
    NoRoute,
}

/// Failure reported by the continuous position source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable: {0}")]
    Unavailable(String),

    #[error("no position fix within {0} ms")]
    Timeout(u64),
}

/// A user action the ride session cannot apply in its current state
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("cannot {action} while {state:?}")]
    InvalidTransition {
        state: RideState,
        action: &'static str,
    },

    #[error("no destination selected")]
    NoDestination,

    #[error("unknown suggestion '{0}'")]
    UnknownSuggestion(String),

    #[error("no map location has been clicked")]
    NoPendingClick,
}

/// Failure loading configuration from disk
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}
