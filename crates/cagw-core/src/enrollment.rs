// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Enrollment request construction.
//!
//! An [`EnrollmentRequest`] is built fresh for every call and never stored.
//! Two output formats exist:
//!
//! - **PKCS12**: the gateway generates the key pair and returns it wrapped in a
//!   PKCS#12 container protected by a one-time [`EnrollmentPassword`].
//! - **X509**: the gateway signs a caller-supplied CSR and returns bare DER.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use cagw_core::enrollment::{EnrollmentPassword, EnrollmentRequest, RequestedFormat};
//! use cagw_core::subject::SubjectVariable;
//!
//! let password = EnrollmentPassword::generate();
//! let request = EnrollmentRequest::builder("prof-tls")
//!     .subject_variables(vec![SubjectVariable::new("cn", "test.example.com")])
//!     .ttl(Duration::from_secs(3600))
//!     .build(RequestedFormat::pkcs12(&password));
//!
//! assert_eq!(request.required_format.format, "PKCS12");
//! assert_eq!(request.optional_certificate_request_details.validity_period, "PT60M");
//! ```

use std::fmt;
use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use rand::Rng;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::subject::{SubjectAltName, SubjectVariable};
use crate::ttl::validity_period;

/// Alphabet for enrollment passwords.
pub const PASSWORD_ALPHABET: &[u8] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-";

/// Enrollment password length.
pub const PASSWORD_LENGTH: usize = 32;

const REDACTED: &str = "********";

// =============================================================================
// EnrollmentPassword
// =============================================================================

/// One-time password protecting a PKCS#12 enrollment response.
///
/// Drawn from the operating system CSPRNG for every enrollment and only held
/// for the lifetime of the call. `Debug` and `Display` never reveal it.
#[derive(Clone, PartialEq, Eq)]
pub struct EnrollmentPassword(String);

impl EnrollmentPassword {
    /// Generates a fresh password of [`PASSWORD_LENGTH`] symbols.
    pub fn generate() -> Self {
        let mut rng = OsRng;
        let password = (0..PASSWORD_LENGTH)
            .map(|_| PASSWORD_ALPHABET[rng.gen_range(0..PASSWORD_ALPHABET.len())] as char)
            .collect();
        Self(password)
    }

    /// Wraps an existing password, e.g. one read back from a request.
    pub fn from_string(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Returns the password text.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for EnrollmentPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnrollmentPassword({})", REDACTED)
    }
}

impl fmt::Display for EnrollmentPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

// =============================================================================
// Wire Types
// =============================================================================

/// The enrollment request document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRequest {
    /// Gateway profile to enroll under.
    pub profile_id: String,
    /// Requested output format.
    pub required_format: RequiredFormat,
    /// Base64 DER of the CSR; empty for PKCS12 enrollments.
    #[serde(default)]
    pub csr: String,
    /// Subject attributes.
    #[serde(default)]
    pub subject_variables: Vec<SubjectVariable>,
    /// Subject alternative names.
    #[serde(default)]
    pub subject_alt_names: Vec<SubjectAltName>,
    /// Validity period.
    pub optional_certificate_request_details: CertificateRequestDetails,
}

/// Output format and protection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredFormat {
    /// `PKCS12` or `X509`.
    pub format: String,
    /// Password protection; `null` for X509.
    pub protection: Option<Protection>,
}

/// Password protection block.
#[derive(Clone, Serialize, Deserialize)]
pub struct Protection {
    /// Always `PasswordProtection`.
    #[serde(rename = "type")]
    pub kind: String,
    /// The PKCS#12 password.
    pub password: String,
}

impl fmt::Debug for Protection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Protection")
            .field("kind", &self.kind)
            .field("password", &REDACTED)
            .finish()
    }
}

/// Optional request details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRequestDetails {
    /// ISO-8601 style duration in minutes, e.g. `PT60M`.
    pub validity_period: String,
}

impl EnrollmentRequest {
    /// Starts a builder for the given profile.
    pub fn builder(profile_id: impl Into<String>) -> EnrollmentRequestBuilder {
        EnrollmentRequestBuilder::new(profile_id)
    }

    /// Returns `true` for PKCS12 enrollments.
    pub fn is_pkcs12(&self) -> bool {
        self.required_format.format == FORMAT_PKCS12
    }

    /// Returns the PKCS#12 password if this request carries one.
    pub fn password(&self) -> Option<EnrollmentPassword> {
        self.required_format
            .protection
            .as_ref()
            .map(|p| EnrollmentPassword::from_string(p.password.clone()))
    }

    /// Serializes the request with the password masked, for logging.
    pub fn to_redacted_json(&self) -> String {
        let mut masked = self.clone();
        if let Some(protection) = masked.required_format.protection.as_mut() {
            protection.password = REDACTED.to_string();
        }
        serde_json::to_string(&masked).unwrap_or_else(|_| "<unserializable>".to_string())
    }
}

/// Format name for key-generating enrollments.
pub const FORMAT_PKCS12: &str = "PKCS12";
/// Format name for CSR enrollments.
pub const FORMAT_X509: &str = "X509";
/// Protection type for PKCS12 enrollments.
pub const PASSWORD_PROTECTION: &str = "PasswordProtection";

// =============================================================================
// RequestedFormat
// =============================================================================

/// What the gateway should return.
#[derive(Debug, Clone)]
pub enum RequestedFormat {
    /// Gateway-generated key pair wrapped in password-protected PKCS#12.
    Pkcs12 {
        /// Container password.
        password: EnrollmentPassword,
    },
    /// Certificate for the supplied CSR.
    X509 {
        /// DER bytes of the CSR.
        csr_der: Vec<u8>,
    },
}

impl RequestedFormat {
    /// PKCS12 with the given password.
    pub fn pkcs12(password: &EnrollmentPassword) -> Self {
        Self::Pkcs12 {
            password: password.clone(),
        }
    }

    /// X509 from DER CSR bytes.
    pub fn x509(csr_der: impl Into<Vec<u8>>) -> Self {
        Self::X509 {
            csr_der: csr_der.into(),
        }
    }
}

// =============================================================================
// EnrollmentRequestBuilder
// =============================================================================

/// Builder for [`EnrollmentRequest`].
#[derive(Debug, Clone)]
pub struct EnrollmentRequestBuilder {
    profile_id: String,
    subject_variables: Vec<SubjectVariable>,
    subject_alt_names: Vec<SubjectAltName>,
    ttl: Duration,
}

impl EnrollmentRequestBuilder {
    /// Creates a builder for the given profile.
    pub fn new(profile_id: impl Into<String>) -> Self {
        Self {
            profile_id: profile_id.into(),
            subject_variables: Vec::new(),
            subject_alt_names: Vec::new(),
            ttl: Duration::ZERO,
        }
    }

    /// Sets the subject variables.
    pub fn subject_variables(mut self, vars: Vec<SubjectVariable>) -> Self {
        self.subject_variables = vars;
        self
    }

    /// Sets the subject alternative names.
    pub fn subject_alt_names(mut self, names: Vec<SubjectAltName>) -> Self {
        self.subject_alt_names = names;
        self
    }

    /// Sets the resolved TTL.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Builds the request for the given output format.
    pub fn build(self, format: RequestedFormat) -> EnrollmentRequest {
        let (required_format, csr) = match format {
            RequestedFormat::Pkcs12 { password } => (
                RequiredFormat {
                    format: FORMAT_PKCS12.to_string(),
                    protection: Some(Protection {
                        kind: PASSWORD_PROTECTION.to_string(),
                        password: password.expose().to_string(),
                    }),
                },
                String::new(),
            ),
            RequestedFormat::X509 { csr_der } => (
                RequiredFormat {
                    format: FORMAT_X509.to_string(),
                    protection: None,
                },
                BASE64.encode(csr_der),
            ),
        };

        EnrollmentRequest {
            profile_id: self.profile_id,
            required_format,
            csr,
            subject_variables: self.subject_variables,
            subject_alt_names: self.subject_alt_names,
            optional_certificate_request_details: CertificateRequestDetails {
                validity_period: validity_period(self.ttl),
            },
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_shape() {
        let password = EnrollmentPassword::generate();
        assert_eq!(password.expose().len(), PASSWORD_LENGTH);
        assert!(password.expose().bytes().all(|b| PASSWORD_ALPHABET.contains(&b)));
        assert_eq!(PASSWORD_ALPHABET.len(), 63);
    }

    #[test]
    fn test_password_fresh_each_time() {
        let a = EnrollmentPassword::generate();
        let b = EnrollmentPassword::generate();
        assert_ne!(a, b);
        assert_ne!(a.expose(), "ChangeMe2");
    }

    #[test]
    fn test_password_never_printed() {
        let password = EnrollmentPassword::generate();
        assert!(!format!("{:?}", password).contains(password.expose()));
        assert!(!format!("{}", password).contains(password.expose()));
    }

    #[test]
    fn test_pkcs12_request_json() {
        let password = EnrollmentPassword::from_string("secret-password");
        let request = EnrollmentRequest::builder("prof-1")
            .subject_variables(vec![SubjectVariable::new("cn", "a.example.com")])
            .ttl(Duration::from_secs(7200))
            .build(RequestedFormat::pkcs12(&password));

        let json: serde_json::Value = serde_json::to_value(&request).unwrap();
        assert_eq!(json["profileId"], "prof-1");
        assert_eq!(json["requiredFormat"]["format"], "PKCS12");
        assert_eq!(json["requiredFormat"]["protection"]["type"], "PasswordProtection");
        assert_eq!(json["requiredFormat"]["protection"]["password"], "secret-password");
        assert_eq!(json["subjectVariables"][0]["type"], "cn");
        assert_eq!(json["optionalCertificateRequestDetails"]["validityPeriod"], "PT120M");
        assert_eq!(request.password().unwrap().expose(), "secret-password");
    }

    #[test]
    fn test_x509_request_json() {
        let request = EnrollmentRequest::builder("prof-1")
            .ttl(Duration::from_secs(60))
            .build(RequestedFormat::x509(vec![0x30, 0x03, 0x02, 0x01, 0x01]));

        let json: serde_json::Value = serde_json::to_value(&request).unwrap();
        assert_eq!(json["requiredFormat"]["format"], "X509");
        assert!(json["requiredFormat"]["protection"].is_null());
        assert_eq!(json["csr"], "MAMCAQE=");
        assert!(request.password().is_none());
        assert!(!request.is_pkcs12());
    }

    #[test]
    fn test_redacted_json_hides_password() {
        let password = EnrollmentPassword::generate();
        let request = EnrollmentRequest::builder("p").build(RequestedFormat::pkcs12(&password));
        let logged = request.to_redacted_json();
        assert!(!logged.contains(password.expose()));
        assert!(logged.contains(REDACTED));
    }
}
