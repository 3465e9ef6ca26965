// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Errors raised while loading the engine's own settings file.
//!
//! These never reach a gateway request: they abort startup (or `cagw validate`)
//! before any role is consulted.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for settings loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file is not valid YAML, TOML or JSON for [`crate::CagwConfig`].
    #[error("cannot parse settings '{path}': {message}")]
    Parse {
        /// Settings file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// A setting holds a value the engine cannot run with.
    #[error("invalid setting {field}: {message}")]
    Validation {
        /// Dotted setting name, e.g. `engine.request_timeout`.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// The settings file exists but could not be read.
    #[error("cannot read settings '{path}': {source}")]
    Io {
        /// Settings file.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `CAGW_*` override could not be applied.
    #[error("bad value in {name}: {message}")]
    InvalidEnvVar {
        /// Environment variable name.
        name: String,
        /// What is wrong with it.
        message: String,
    },

    #[error("settings file {path} does not exist")]
    #[allow(missing_docs)]
    FileNotFound { path: PathBuf },

    /// The file extension is not one of yaml, yml, toml or json.
    #[error("unsupported settings format '{format}'")]
    UnsupportedFormat {
        /// Offending extension.
        format: String,
    },

    /// Raw deserializer failure before a path is known.
    #[error("{message}")]
    Serialization {
        /// Deserializer message.
        message: String,
    },
}

impl ConfigError {
    /// Creates a [`ConfigError::Parse`].
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a [`ConfigError::Validation`] for a dotted setting name.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a [`ConfigError::Io`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a [`ConfigError::InvalidEnvVar`].
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a [`ConfigError::FileNotFound`].
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates a [`ConfigError::UnsupportedFormat`].
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Creates a [`ConfigError::Serialization`].
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Returns the dotted setting or variable at fault, when there is one.
    pub fn setting(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            Self::InvalidEnvVar { name, .. } => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::validation("engine.request_timeout", "must be greater than zero");
        assert_eq!(
            err.to_string(),
            "invalid setting engine.request_timeout: must be greater than zero"
        );
        assert_eq!(err.setting(), Some("engine.request_timeout"));

        let err = ConfigError::file_not_found("/etc/cagw/cagw.yaml");
        assert!(err.to_string().contains("/etc/cagw/cagw.yaml"));
        assert_eq!(err.setting(), None);
    }

    #[test]
    fn test_env_var_names_setting() {
        let err = ConfigError::invalid_env_var("CAGW_API_PORT", "expected valid port number");
        assert_eq!(err.setting(), Some("CAGW_API_PORT"));
        assert!(err.to_string().starts_with("bad value in CAGW_API_PORT"));
    }
}
