// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the CAGW binary.

use thiserror::Error;

/// Result type alias for cagw-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Errors that can occur in the CAGW binary.
#[derive(Debug, Error)]
pub enum BinError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Initialization error.
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// Runtime error.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// API error.
    #[error("API error: {0}")]
    Api(#[from] cagw_api::ApiError),

    /// Config parsing error.
    #[error("Config error: {0}")]
    Config(#[from] cagw_config::ConfigError),

    /// Engine error.
    #[error("Engine error: {0}")]
    Engine(#[from] cagw_core::CagwError),

    /// Error with context.
    #[error("{context}: {source}")]
    WithContext {
        /// The context description.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates an initialization error.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    /// Creates a runtime error.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Creates an I/O error.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Adds context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Config(_) => 1,
            Self::Initialization(_) | Self::Engine(_) => 2,
            Self::Runtime(_) => 3,
            Self::Io(_) => 4,
            Self::Api(_) => 5,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }
}

impl From<std::io::Error> for BinError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<anyhow::Error> for BinError {
    fn from(err: anyhow::Error) -> Self {
        Self::Runtime(format!("{:#}", err))
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Prints an error and its cause chain to stderr.
pub fn report_error(error: &BinError) {
    eprintln!("Error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }
}

/// Reports an error and exits with its code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cagw_core::error::ConfigurationError;

    #[test]
    fn test_error_creation() {
        let err = BinError::config("missing file");
        assert_eq!(err.to_string(), "Configuration error: missing file");
    }

    #[test]
    fn test_error_with_context() {
        let err = BinError::init("bad root").with_context("opening storage");
        assert_eq!(err.to_string(), "opening storage: Initialization error: bad root");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(BinError::config("x").exit_code(), 1);
        assert_eq!(BinError::init("x").exit_code(), 2);
        assert_eq!(BinError::runtime("x").exit_code(), 3);
        assert_eq!(BinError::io("x").exit_code(), 4);
        assert_eq!(BinError::from(cagw_api::ApiError::internal("x")).exit_code(), 5);
        assert_eq!(
            BinError::from(cagw_config::ConfigError::validation("api.port", "zero")).exit_code(),
            1
        );
    }

    #[test]
    fn test_engine_error_conversion() {
        let err: BinError = cagw_core::CagwError::from(ConfigurationError::role_not_found("web")).into();
        assert!(matches!(err, BinError::Engine(_)));
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: BinError = anyhow::anyhow!("inner").context("outer").into();
        assert_eq!(err.to_string(), "Runtime error: outer: inner");
    }
}
