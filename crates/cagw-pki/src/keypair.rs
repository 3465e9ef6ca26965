// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client credential checks.

use openssl::pkey::PKey;
use openssl::x509::X509;

use cagw_core::error::TlsConfigError;

/// Checks that `cert_pem` holds a certificate whose public key matches the
/// private key in `key_pem`.
///
/// Both arguments may be the same combined bundle; each parser skips blocks
/// with other labels.
pub fn validate_key_pair(cert_pem: &str, key_pem: &str) -> Result<(), TlsConfigError> {
    let cert = X509::from_pem(cert_pem.as_bytes()).map_err(|e| {
        TlsConfigError::invalid_key_pair(format!("client certificate could not be parsed: {}", e))
    })?;
    let key = PKey::private_key_from_pem(key_pem.as_bytes()).map_err(|e| {
        TlsConfigError::invalid_key_pair(format!("client private key could not be parsed: {}", e))
    })?;
    let public = cert.public_key().map_err(|e| {
        TlsConfigError::invalid_key_pair(format!("client certificate has no usable key: {}", e))
    })?;

    if !public.public_eq(&key) {
        return Err(TlsConfigError::invalid_key_pair(
            "private key does not match certificate",
        ));
    }
    Ok(())
}

/// Returns the subject of the first certificate in `pem`, one-line form.
pub fn certificate_subject(pem: &str) -> Option<String> {
    let cert = X509::from_pem(pem.as_bytes()).ok()?;
    let parts: Vec<String> = cert
        .subject_name()
        .entries()
        .filter_map(|entry| {
            let name = entry.object().nid().short_name().ok()?;
            let value = entry.data().as_utf8().ok()?;
            Some(format!("{}={}", name, value))
        })
        .collect();
    Some(parts.join(", "))
}
