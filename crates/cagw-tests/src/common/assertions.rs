// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Custom Assertions
//!
//! Assertion helpers for certificate records, enrollment requests and
//! pipeline errors.

use openssl::pkey::PKey;
use openssl::x509::X509;

use cagw_core::enrollment::EnrollmentRequest;
use cagw_core::error::CagwError;
use cagw_core::model::CertificateRecord;
use cagw_core::subject::SubjectAltName;
use cagw_core::types::OutputFormat;

use super::fixtures::KeyAlgorithm;

// =============================================================================
// PEM Assertions
// =============================================================================

/// Asserts that `text` starts with a PEM block labelled `label`.
pub fn assert_pem_block(text: &str, label: &str) {
    let header = format!("-----BEGIN {label}-----");
    let footer = format!("-----END {label}-----");
    assert!(
        text.starts_with(&header),
        "Expected PEM header '{header}', got: {}",
        text.lines().next().unwrap_or_default()
    );
    assert!(text.contains(&footer), "Missing PEM footer '{footer}'");
}

/// Asserts that `key_pem` is the private half of `cert_pem`.
pub fn assert_key_matches_certificate(cert_pem: &str, key_pem: &str) {
    let cert = X509::from_pem(cert_pem.as_bytes()).expect("certificate should parse");
    let key = PKey::private_key_from_pem(key_pem.as_bytes()).expect("key should parse");
    let public = cert.public_key().expect("certificate public key");
    assert!(public.public_eq(&key), "Private key does not match certificate");
}

// =============================================================================
// Record Assertions
// =============================================================================

/// Assertions over a stored certificate record.
pub trait CertificateRecordAssertions {
    /// Asserts the decimal serial number.
    fn assert_serial(&self, serial: u32);

    /// Asserts a single PEM certificate.
    fn assert_certificate_pem(&self);

    /// Asserts a private key of the given algorithm that matches the certificate.
    fn assert_private_key(&self, algorithm: KeyAlgorithm);

    /// Asserts the record carries no key material.
    fn assert_no_private_key(&self);

    /// Asserts the chain holds `count` PEM certificates.
    fn assert_chain_len(&self, count: usize);
}

impl CertificateRecordAssertions for CertificateRecord {
    fn assert_serial(&self, serial: u32) {
        assert_eq!(
            self.serial_number.as_str(),
            serial.to_string(),
            "Unexpected serial number"
        );
    }

    fn assert_certificate_pem(&self) {
        assert_ne!(self.format, OutputFormat::Der, "Record holds DER, not PEM");
        assert_pem_block(&self.certificate, "CERTIFICATE");
        assert_eq!(
            self.certificate.matches("-----BEGIN CERTIFICATE-----").count(),
            1,
            "Leaf must be a single PEM block"
        );
    }

    fn assert_private_key(&self, algorithm: KeyAlgorithm) {
        let key = self.private_key.as_deref().expect("record should carry a private key");
        assert_pem_block(key, algorithm.pem_label());
        assert_eq!(self.private_key_type.as_deref(), Some(algorithm.type_name()));
        assert_key_matches_certificate(&self.certificate, key);
    }

    fn assert_no_private_key(&self) {
        assert!(self.private_key.is_none(), "Unexpected private key");
        assert!(self.private_key_type.is_none(), "Unexpected private key type");
    }

    fn assert_chain_len(&self, count: usize) {
        let found = self
            .chain
            .as_deref()
            .map(|chain| chain.matches("-----BEGIN CERTIFICATE-----").count())
            .unwrap_or(0);
        assert_eq!(found, count, "Unexpected chain length");
    }
}

// =============================================================================
// Request Assertions
// =============================================================================

/// Asserts the requested validity period, e.g. `PT60M`.
pub fn assert_validity_period(request: &EnrollmentRequest, expected: &str) {
    assert_eq!(
        request.optional_certificate_request_details.validity_period, expected,
        "Unexpected validity period"
    );
}

/// Asserts the SAN list in request order.
pub fn assert_alt_names(request: &EnrollmentRequest, expected: &[(&str, &str)]) {
    let expected: Vec<SubjectAltName> = expected
        .iter()
        .map(|(kind, value)| SubjectAltName::new(*kind, *value))
        .collect();
    assert_eq!(request.subject_alt_names, expected, "Unexpected subject alt names");
}

// =============================================================================
// Error Assertions
// =============================================================================

/// Asserts the pipeline stage of an error.
pub fn assert_stage(err: &CagwError, stage: &str) {
    assert_eq!(err.stage(), stage, "Unexpected error stage for: {err}");
}

/// Asserts the stage and that the message contains `needle`.
pub fn assert_error_contains(err: &CagwError, stage: &str, needle: &str) {
    assert_stage(err, stage);
    let message = err.to_string();
    assert!(
        message.contains(needle),
        "Expected '{needle}' in error message: {message}"
    );
}
