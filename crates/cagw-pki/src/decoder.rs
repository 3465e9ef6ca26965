// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Decoding of successful enrollment bodies.
//!
//! The gateway returns the enrollment body as base64. For PKCS#12 requests it
//! is a password-protected container holding the new key, the leaf and its
//! chain. For X.509 requests it is the DER certificate.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use openssl::pkcs12::Pkcs12;
use openssl::x509::X509;
use tracing::debug;

use cagw_core::enrollment::EnrollmentPassword;
use cagw_core::error::DecodeError;
use cagw_core::types::{OutputFormat, SerialNumber};

use crate::key::PrivateKeyMaterial;
use crate::pem::{encode_pem, CERTIFICATE_LABEL};

// =============================================================================
// DecodedCertificate
// =============================================================================

/// Certificate material ready to be stored.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedCertificate {
    /// Leaf certificate: PEM, or the raw base64 body for `der`.
    pub certificate: String,
    /// Serial number in decimal.
    pub serial_number: SerialNumber,
    /// Private key PEM (PKCS#12 only).
    pub private_key: Option<String>,
    /// `rsa` or `ec` (PKCS#12 only).
    pub private_key_type: Option<String>,
    /// Newline-joined chain certificates (PKCS#12 only).
    pub chain: Option<String>,
}

impl std::fmt::Debug for DecodedCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedCertificate")
            .field("serial_number", &self.serial_number)
            .field("private_key_type", &self.private_key_type)
            .field("has_chain", &self.chain.is_some())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decodes a base64 PKCS#12 body with the one-time enrollment password.
pub fn decode_pkcs12(
    body: &str,
    password: &EnrollmentPassword,
) -> Result<DecodedCertificate, DecodeError> {
    let der = decode_base64(body)?;

    let parsed = Pkcs12::from_der(&der)
        .and_then(|p12| p12.parse2(password.expose()))
        .map_err(|e| DecodeError::pkcs12(e.to_string()))?;

    let key = parsed.pkey.ok_or_else(|| DecodeError::missing("a private key"))?;
    let leaf = parsed.cert.ok_or_else(|| DecodeError::missing("a certificate"))?;

    let key = PrivateKeyMaterial::from_pkey(key)?;
    let private_key = key.to_pem()?;

    let certificate = certificate_pem(&leaf)?;
    let serial_number = serial_of(&leaf)?;

    let chain: Vec<String> = match parsed.ca {
        Some(stack) => stack
            .iter()
            .map(|cert| certificate_pem(cert))
            .collect::<Result<_, _>>()?,
        None => Vec::new(),
    };

    debug!(
        serial = %serial_number,
        key_type = key.kind_name(),
        chain_len = chain.len(),
        "Unwrapped PKCS#12 enrollment"
    );

    Ok(DecodedCertificate {
        certificate,
        serial_number,
        private_key: Some(private_key),
        private_key_type: Some(key.kind_name().to_string()),
        chain: (!chain.is_empty()).then(|| chain.join("\n")),
    })
}

/// Decodes a base64 DER certificate body for a signing request.
///
/// For [`OutputFormat::Der`] the body is returned as-is. The serial number is
/// parsed in every format.
pub fn decode_x509(body: &str, format: OutputFormat) -> Result<DecodedCertificate, DecodeError> {
    let der = decode_base64(body)?;
    let cert = X509::from_der(&der).map_err(|e| DecodeError::certificate(e.to_string()))?;
    let serial_number = serial_of(&cert)?;

    let certificate = match format {
        OutputFormat::Der => body.to_string(),
        OutputFormat::Pem | OutputFormat::PemBundle => encode_pem(CERTIFICATE_LABEL, &der),
    };

    debug!(serial = %serial_number, format = %format, "Decoded X.509 enrollment");

    Ok(DecodedCertificate {
        certificate,
        serial_number,
        private_key: None,
        private_key_type: None,
        chain: None,
    })
}

/// Returns the decimal serial number of a certificate.
pub fn serial_of(cert: &X509) -> Result<SerialNumber, DecodeError> {
    let serial = cert
        .serial_number()
        .to_bn()
        .and_then(|bn| bn.to_dec_str().map(|s| s.to_string()))
        .map_err(|e| DecodeError::certificate(e.to_string()))?;
    Ok(SerialNumber::new(serial))
}

fn certificate_pem(cert: &openssl::x509::X509Ref) -> Result<String, DecodeError> {
    let der = cert
        .to_der()
        .map_err(|e| DecodeError::certificate(e.to_string()))?;
    Ok(encode_pem(CERTIFICATE_LABEL, &der))
}

fn decode_base64(body: &str) -> Result<Vec<u8>, DecodeError> {
    let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64
        .decode(compact.as_bytes())
        .map_err(|e| DecodeError::base64(e.to_string()))
}

// =============================================================================
// Tests
// =============================================================================
