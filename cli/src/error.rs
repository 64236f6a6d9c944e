#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use derive_more::{Display, From};
use goalesce_core::AppError;

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// JSON rendering failure.
    #[display("JSON Error: {}", _0)]
    Json(serde_json::Error),

    /// YAML parsing or rendering failure.
    #[display("YAML Error: {}", _0)]
    Yaml(serde_yaml::Error),

    /// Pipeline failure.
    #[display("{}", _0)]
    App(AppError),

    /// General failure message.
    #[display("Operation failed: {}", _0)]
    General(String),
}

/// Manual implementation of the standard Error trait.
///
/// `General(String)` holds no source error, so `source()` stays at its default.
impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_passes_through() {
        let err: CliError = AppError::Declaration {
            line: 3,
            message: "expected type".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Declaration error at line 3: expected type");
    }

    #[test]
    fn test_io_error_wraps() {
        let err: CliError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.to_string().starts_with("IO Error:"));
    }
}
