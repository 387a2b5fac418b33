//! Custom error types for the application.
//!
//! This module defines the primary error type, `NsiError`, for the whole façade.
//! Using the `thiserror` crate, it provides a centralized and consistent way to
//! report the few things that can go wrong when driving the NSI2000 console.
//!
//! ## Error Hierarchy
//!
//! `NsiError` consolidates the failure kinds an automation sequence can hit:
//!
//! - **`NotFound`**: A file the caller named (measurement, calibration, gain
//!   table, script) or a sidecar the vendor script should have produced does
//!   not exist.
//! - **`InvalidArgument`**: A value rejected before it reaches the console, such
//!   as a measurement file without the `.nsi` extension, a zero point count or
//!   a vendor code outside a closed enumeration.
//! - **`ExternalCallFailed`**: The console raised an error. The variant carries
//!   the operation label so a failing step can be diagnosed from the message
//!   alone.
//! - **`MalformedExternalOutput`**: Something the vendor produced (a sidecar
//!   file, a property of the wrong type) could not be interpreted.
//! - **`Io`** and **`Config`**: Wrapped `std::io::Error` and configuration
//!   loading errors.
//!
//! None of these are retried internally. The vendor application holds the
//! authoritative state, so callers are expected to stop the sequence on error.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::console::ConsoleError;

/// Convenience alias for results using the application error type.
pub type AppResult<T> = std::result::Result<T, NsiError>;

/// Error raised by every fallible operation in this crate.
#[derive(Error, Debug)]
pub enum NsiError {
    /// A required file does not exist.
    #[error("File not found: {}", path.display())]
    #[allow(missing_docs)]
    NotFound { path: PathBuf },

    /// A value was rejected before reaching the console.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The console raised an error while performing `operation`.
    #[error("Console call failed during '{operation}': {source}")]
    #[allow(missing_docs)]
    ExternalCallFailed {
        operation: String,
        #[source]
        source: ConsoleError,
    },

    /// Vendor-produced output could not be interpreted.
    #[error("Malformed output from '{}': {detail}", path.display())]
    #[allow(missing_docs)]
    MalformedExternalOutput { path: PathBuf, detail: String },

    /// Local file system failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl NsiError {
    pub(crate) fn not_found(path: impl Into<PathBuf>) -> Self {
        NsiError::NotFound { path: path.into() }
    }

    pub(crate) fn external(operation: impl Into<String>, source: ConsoleError) -> Self {
        NsiError::ExternalCallFailed {
            operation: operation.into(),
            source,
        }
    }

    /// True for failures raised by the vendor console itself.
    pub fn is_external(&self) -> bool {
        matches!(self, NsiError::ExternalCallFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::Command;

    #[test]
    fn test_error_display() {
        let err = NsiError::InvalidArgument("Filename must be a valid .nsi file".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid argument: Filename must be a valid .nsi file"
        );
    }

    #[test]
    fn test_external_error_names_operation() {
        let err = NsiError::external(
            "select beam 9",
            ConsoleError::call(Command::SelectBeam.name(), "beam index out of range"),
        );
        let message = err.to_string();
        assert!(message.contains("select beam 9"));
        assert!(message.contains("SELECT_BEAM"));
        assert!(err.is_external());
    }

    #[test]
    fn test_not_found_shows_path() {
        let err = NsiError::not_found("C:/NSI2000/Data/missing.nsi");
        assert!(err.to_string().contains("missing.nsi"));
        assert!(!err.is_external());
    }
}
