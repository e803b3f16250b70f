//! Error handling for check-compost
//!
//! Every failure of the check maps to the Nagios UNKNOWN state. The variants
//! only differ in the one-line message printed before exiting.

use std::io;
use std::path::PathBuf;

/// Nagios exit code used for every error in this crate (UNKNOWN)
pub const UNKNOWN_EXIT_CODE: i32 = 3;

/// Result type alias using CheckError
pub type Result<T> = std::result::Result<T, CheckError>;

#[derive(thiserror::Error, Debug)]
pub enum CheckError {
    // ============================================================================
    // Usage and Configuration Errors
    // ============================================================================
    #[error("Unexpected command line input: {0}")]
    Usage(String),

    #[error("Error: warning value must be greater than critical value")]
    InvalidThresholds { warning: f64, critical: f64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Device Errors
    // ============================================================================
    #[error("No device detected.")]
    NoDevice { searched: PathBuf },

    #[error("Failed to read sensor {path}: {source}")]
    DeviceRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Malformed sensor data: {0}")]
    Parse(String),

    #[error("Sensor not ready after {attempts} attempts")]
    SensorNotReady { attempts: u32 },
}

impl CheckError {
    /// Create a usage error from a string
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a parse error from a string
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        UNKNOWN_EXIT_CODE
    }
}
