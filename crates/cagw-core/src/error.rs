// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Unified error hierarchy for the enrollment pipeline.
//!
//! Every failure is terminal for the current call. Errors carry the pipeline
//! stage and the underlying cause so a failed enrollment can be diagnosed from
//! the error alone.
//!
//! # Error Hierarchy
//!
//! ```text
//! CagwError (root)
//! ├── ConfigurationError  - Missing or unparsable stored configuration
//! ├── TlsConfigError      - Bad client certificate/key or CA bundle
//! ├── ParseError          - Malformed subject variables, alt names, CSR, format
//! ├── NetworkError        - Transport failure reaching the gateway
//! ├── GatewayError        - Non-200 gateway response
//! ├── DecodeError         - Malformed enrollment body or certificate
//! ├── StorageError        - Storage collaborator failure
//! └── ValidationError     - Missing or malformed request fields
//! ```
//!
//! # Examples
//!
//! ```
//! use cagw_core::error::{CagwError, GatewayError};
//!
//! let error = GatewayError::structured("invalid profile", 400);
//! assert_eq!(error.to_string(), "Error from gateway: invalid profile (400)");
//!
//! let error: CagwError = error.into();
//! assert_eq!(error.stage(), "gateway");
//! assert_eq!(error.status_code(), 502);
//! ```

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type CagwResult<T> = Result<T, CagwError>;

// =============================================================================
// CagwError - Root Error Type
// =============================================================================

/// The root error type for the enrollment engine.
#[derive(Debug, Error)]
pub enum CagwError {
    /// Stored configuration error.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// TLS client configuration error.
    #[error(transparent)]
    Tls(#[from] TlsConfigError),

    /// Input parsing error.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Transport error.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Gateway-reported error.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Response decoding error.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Storage error.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Request validation error.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl CagwError {
    /// Returns the pipeline stage that produced this error.
    pub fn stage(&self) -> &'static str {
        match self {
            CagwError::Configuration(_) => "configuration",
            CagwError::Tls(_) => "tls",
            CagwError::Parse(_) => "parse",
            CagwError::Network(_) => "network",
            CagwError::Gateway(_) => "gateway",
            CagwError::Decode(_) => "decode",
            CagwError::Storage(_) => "storage",
            CagwError::Validation(_) => "validation",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            CagwError::Configuration(e) => e.status_code(),
            CagwError::Tls(_) => 500,
            CagwError::Parse(_) => 400,
            CagwError::Network(e) => e.status_code(),
            CagwError::Gateway(_) => 502,
            CagwError::Decode(_) => 502,
            CagwError::Storage(StorageError::NotFound { .. }) => 404,
            CagwError::Storage(_) => 500,
            CagwError::Validation(_) => 400,
        }
    }

    /// Returns `true` if this error means a requested resource does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            CagwError::Configuration(e) => e.is_not_found(),
            CagwError::Storage(StorageError::NotFound { .. }) => true,
            _ => false,
        }
    }
}

// =============================================================================
// ConfigurationError
// =============================================================================

/// Errors resolving stored role or profile configuration.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// No role configuration stored under this name.
    #[error("role configuration '{role}' could not be found")]
    RoleNotFound {
        /// The role name.
        role: String,
    },

    /// No profile configuration stored for this role and profile.
    #[error("profile configuration '{profile}' for role '{role}' could not be found")]
    ProfileNotFound {
        /// The role name.
        role: String,
        /// The profile identifier.
        profile: String,
    },

    /// Neither the request nor the role supplied a profile.
    #[error("a profile must be specified for this CA role configuration")]
    ProfileRequired {
        /// The role name.
        role: String,
    },

    /// The requested default profile does not exist on the gateway.
    #[error("Profile with ID {profile} not found for CA {ca_id}")]
    UnknownProfile {
        /// The profile identifier.
        profile: String,
        /// The CA identifier.
        ca_id: String,
    },

    /// A stored record could not be deserialized.
    #[error("stored configuration at '{key}' is corrupt: {message}")]
    Corrupt {
        /// The storage key.
        key: String,
        /// Error message.
        message: String,
    },
}

impl ConfigurationError {
    /// Creates a role not found error.
    pub fn role_not_found(role: impl Into<String>) -> Self {
        Self::RoleNotFound { role: role.into() }
    }

    /// Creates a profile not found error.
    pub fn profile_not_found(role: impl Into<String>, profile: impl Into<String>) -> Self {
        Self::ProfileNotFound {
            role: role.into(),
            profile: profile.into(),
        }
    }

    /// Creates a profile required error.
    pub fn profile_required(role: impl Into<String>) -> Self {
        Self::ProfileRequired { role: role.into() }
    }

    /// Creates an unknown profile error.
    pub fn unknown_profile(profile: impl Into<String>, ca_id: impl Into<String>) -> Self {
        Self::UnknownProfile {
            profile: profile.into(),
            ca_id: ca_id.into(),
        }
    }

    /// Creates a corrupt record error.
    pub fn corrupt(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Corrupt {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Returns `true` for missing records.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RoleNotFound { .. } | Self::ProfileNotFound { .. })
    }

    fn status_code(&self) -> u16 {
        match self {
            Self::RoleNotFound { .. } | Self::ProfileNotFound { .. } => 404,
            Self::Corrupt { .. } => 500,
            _ => 400,
        }
    }
}

// =============================================================================
// TlsConfigError
// =============================================================================

/// Errors building the mutually-authenticated TLS client.
#[derive(Debug, Error)]
pub enum TlsConfigError {
    /// The client certificate and key do not form a usable key pair.
    #[error("invalid client key pair: {message}")]
    InvalidKeyPair {
        /// Error message.
        message: String,
    },

    /// No certificates could be appended from the gateway CA bundle.
    #[error("Error appending CA certs: {message}")]
    InvalidCaBundle {
        /// Error message.
        message: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build TLS client: {message}")]
    ClientBuild {
        /// Error message.
        message: String,
    },
}

impl TlsConfigError {
    /// Creates an invalid key pair error.
    pub fn invalid_key_pair(message: impl Into<String>) -> Self {
        Self::InvalidKeyPair {
            message: message.into(),
        }
    }

    /// Creates an invalid CA bundle error.
    pub fn invalid_ca_bundle(message: impl Into<String>) -> Self {
        Self::InvalidCaBundle {
            message: message.into(),
        }
    }

    /// Creates a client build error.
    pub fn client_build(message: impl Into<String>) -> Self {
        Self::ClientBuild {
            message: message.into(),
        }
    }
}

// =============================================================================
// ParseError
// =============================================================================

/// Errors parsing caller-supplied input.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The subject could not be parsed as a distinguished name.
    #[error("invalid distinguished name '{input}': {message}")]
    InvalidDistinguishedName {
        /// The rejected input.
        input: String,
        /// Error message.
        message: String,
    },

    /// An alt-name token was not of the form `type=value`.
    #[error("invalid subject alt name '{token}': expected type=value")]
    InvalidAltName {
        /// The rejected token.
        token: String,
    },

    /// The CSR PEM could not be decoded.
    #[error("CSR could not be decoded: {message}")]
    InvalidCsr {
        /// Error message.
        message: String,
    },

    /// The output format is not one of `pem`, `der`, `pem_bundle`.
    #[error("Invalid format specified: {format}")]
    InvalidFormat {
        /// The rejected format.
        format: String,
    },
}

impl ParseError {
    /// Creates an invalid distinguished name error.
    pub fn invalid_dn(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDistinguishedName {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid alt name error.
    pub fn invalid_alt_name(token: impl Into<String>) -> Self {
        Self::InvalidAltName {
            token: token.into(),
        }
    }

    /// Creates an invalid CSR error.
    pub fn invalid_csr(message: impl Into<String>) -> Self {
        Self::InvalidCsr {
            message: message.into(),
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(format: impl Into<String>) -> Self {
        Self::InvalidFormat {
            format: format.into(),
        }
    }
}

// =============================================================================
// NetworkError
// =============================================================================

/// Transport-level failures reaching the gateway.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Connection or TLS handshake failure.
    #[error("request to '{url}' failed: {message}")]
    Request {
        /// The request URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// The request exceeded the configured timeout.
    #[error("request to '{url}' timed out")]
    Timeout {
        /// The request URL.
        url: String,
    },

    /// The response body could not be read.
    #[error("CAGW response could not be read: {message}")]
    Body {
        /// Error message.
        message: String,
    },
}

impl NetworkError {
    /// Creates a request error.
    pub fn request(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Request {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a body read error.
    pub fn body(message: impl Into<String>) -> Self {
        Self::Body {
            message: message.into(),
        }
    }

    fn status_code(&self) -> u16 {
        match self {
            Self::Timeout { .. } => 504,
            _ => 502,
        }
    }
}

// =============================================================================
// GatewayError
// =============================================================================

/// A non-200 response from the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway returned its structured error document.
    #[error("Error from gateway: {message} ({status})")]
    Structured {
        /// The gateway's error message.
        message: String,
        /// The gateway's error code, if any.
        code: Option<String>,
        /// HTTP status code.
        status: u16,
    },

    /// The error body was not a structured error document.
    #[error("CAGW error response could not be parsed ({status})")]
    Unparsable {
        /// HTTP status code.
        status: u16,
        /// Parser message.
        message: String,
    },
}

impl GatewayError {
    /// Creates a structured gateway error.
    pub fn structured(message: impl Into<String>, status: u16) -> Self {
        Self::Structured {
            message: message.into(),
            code: None,
            status,
        }
    }

    /// Creates an unparsable error response error.
    pub fn unparsable(status: u16, message: impl Into<String>) -> Self {
        Self::Unparsable {
            status,
            message: message.into(),
        }
    }

    /// Returns the HTTP status the gateway answered with.
    pub fn status(&self) -> u16 {
        match self {
            Self::Structured { status, .. } | Self::Unparsable { status, .. } => *status,
        }
    }
}

// =============================================================================
// DecodeError
// =============================================================================

/// Failures decoding a successful enrollment response.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The enrollment envelope was not valid JSON.
    #[error("CAGW enrollment response could not be parsed: {message}")]
    Envelope {
        /// Error message.
        message: String,
    },

    /// The enrollment body was not valid base64.
    #[error("Error decoding base64 response from CAGW: {message}")]
    Base64 {
        /// Error message.
        message: String,
    },

    /// The PKCS#12 container could not be opened.
    #[error("failed to unwrap PKCS#12 container: {message}")]
    Pkcs12 {
        /// Error message.
        message: String,
    },

    /// The PKCS#12 private key is neither RSA nor EC.
    #[error("unsupported private key type: {key_type}")]
    UnsupportedKeyType {
        /// The key algorithm reported by the container.
        key_type: String,
    },

    /// The certificate could not be parsed.
    #[error("Failed to parse the certificate: {message}")]
    Certificate {
        /// Error message.
        message: String,
    },

    /// A required part of the response was absent.
    #[error("enrollment response is missing {what}")]
    Missing {
        /// What was missing.
        what: String,
    },
}

impl DecodeError {
    /// Creates an envelope error.
    pub fn envelope(message: impl Into<String>) -> Self {
        Self::Envelope {
            message: message.into(),
        }
    }

    /// Creates a base64 error.
    pub fn base64(message: impl Into<String>) -> Self {
        Self::Base64 {
            message: message.into(),
        }
    }

    /// Creates a PKCS#12 error.
    pub fn pkcs12(message: impl Into<String>) -> Self {
        Self::Pkcs12 {
            message: message.into(),
        }
    }

    /// Creates an unsupported key type error.
    pub fn unsupported_key_type(key_type: impl Into<String>) -> Self {
        Self::UnsupportedKeyType {
            key_type: key_type.into(),
        }
    }

    /// Creates a certificate error.
    pub fn certificate(message: impl Into<String>) -> Self {
        Self::Certificate {
            message: message.into(),
        }
    }

    /// Creates a missing content error.
    pub fn missing(what: impl Into<String>) -> Self {
        Self::Missing { what: what.into() }
    }
}

// =============================================================================
// StorageError
// =============================================================================

/// Failures talking to the storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No record stored under this key.
    #[error("{message}")]
    NotFound {
        /// The storage key.
        key: String,
        /// User-facing message.
        message: String,
    },

    /// The key is not acceptable to the backend.
    #[error("invalid storage key '{key}': {message}")]
    InvalidKey {
        /// The storage key.
        key: String,
        /// Error message.
        message: String,
    },

    /// Reading or writing failed.
    #[error("storage operation on '{key}' failed: {source}")]
    Io {
        /// The storage key.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The record could not be (de)serialized.
    #[error("could not serialize record at '{key}': {message}")]
    Serialization {
        /// The storage key.
        key: String,
        /// Error message.
        message: String,
    },
}

impl StorageError {
    /// Creates a not found error.
    pub fn not_found(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid key error.
    pub fn invalid_key(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Creates an I/O error.
    pub fn io(key: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            key: key.into(),
            source,
        }
    }

    /// Creates a serialization error.
    pub fn serialization(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization {
            key: key.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// ValidationError
// =============================================================================

/// Boundary validation failures for typed requests.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field was absent or empty.
    #[error("missing required field: {field}")]
    MissingField {
        /// The field name.
        field: String,
    },

    /// A field was present but malformed.
    #[error("invalid value for '{field}': {message}")]
    InvalidField {
        /// The field name.
        field: String,
        /// Error message.
        message: String,
    },
}

impl ValidationError {
    /// Creates a missing field error.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates an invalid field error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the offending field name.
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field } | Self::InvalidField { field, .. } => field,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
