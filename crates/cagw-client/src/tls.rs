// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Mutual-TLS client construction.
//!
//! A fresh [`reqwest::Client`] is built for every gateway call from the
//! role's credentials. The trust store is the platform roots plus the role's
//! CA bundle. Proxy environment variables are honored.

use std::time::Duration;

use reqwest::{Certificate, Client, Identity};
use tracing::debug;

use cagw_core::error::TlsConfigError;
use cagw_core::model::RoleConfig;
use cagw_pki::validate_key_pair;

/// Default total request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds per-call mutual-TLS HTTP clients.
#[derive(Debug, Clone, Copy)]
pub struct TlsClientFactory {
    request_timeout: Duration,
    connect_timeout: Duration,
}

impl Default for TlsClientFactory {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }
}

impl TlsClientFactory {
    /// Creates a factory with the given timeouts.
    pub fn new(request_timeout: Duration, connect_timeout: Duration) -> Self {
        Self {
            request_timeout,
            connect_timeout,
        }
    }

    /// Returns the total request timeout.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Builds a client authenticated with the role's credentials.
    pub fn build(&self, role: &RoleConfig) -> Result<Client, TlsConfigError> {
        let roots = validate_credentials(role)?;

        let identity = Identity::from_pem(role.identity_pem().as_bytes())
            .map_err(|e| TlsConfigError::invalid_key_pair(e.to_string()))?;

        debug!(roots = roots.len(), "Appending gateway CA certificates");

        let mut builder = Client::builder()
            .use_rustls_tls()
            .https_only(true)
            .identity(identity)
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout);
        for root in roots {
            builder = builder.add_root_certificate(root);
        }

        builder
            .build()
            .map_err(|e| TlsConfigError::client_build(e.to_string()))
    }
}

/// Checks the role's key pair and CA bundle without building a client.
///
/// Returns the decoded gateway roots.
pub fn validate_credentials(role: &RoleConfig) -> Result<Vec<Certificate>, TlsConfigError> {
    validate_key_pair(&role.pem_bundle, role.key_pem())?;
    gateway_roots(&role.ca_certs)
}

/// Decodes the gateway CA bundle. At least one certificate is required.
pub fn gateway_roots(ca_certs: &str) -> Result<Vec<Certificate>, TlsConfigError> {
    let roots = Certificate::from_pem_bundle(ca_certs.as_bytes())
        .map_err(|e| TlsConfigError::invalid_ca_bundle(e.to_string()))?;
    if roots.is_empty() {
        return Err(TlsConfigError::invalid_ca_bundle(
            "no certificates found in the CA bundle",
        ));
    }
    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use openssl::asn1::Asn1Time;
    use openssl::bn::BigNum;
    use openssl::hash::MessageDigest;
    use openssl::nid::Nid;
    use openssl::pkey::PKey;
    use openssl::rsa::Rsa;
    use openssl::x509::{X509, X509NameBuilder};

    fn credentials() -> (String, String) {
        let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();
        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_nid(Nid::COMMONNAME, "client").unwrap();
        let name = name.build();

        let mut builder = X509::builder().unwrap();
        builder.set_version(2).unwrap();
        builder
            .set_serial_number(&BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap())
            .unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder.set_pubkey(&key).unwrap();
        builder.set_not_before(&Asn1Time::days_from_now(0).unwrap()).unwrap();
        builder.set_not_after(&Asn1Time::days_from_now(1).unwrap()).unwrap();
        builder.sign(&key, MessageDigest::sha256()).unwrap();

        (
            String::from_utf8(builder.build().to_pem().unwrap()).unwrap(),
            String::from_utf8(key.private_key_to_pem_pkcs8().unwrap()).unwrap(),
        )
    }

    fn role(cert: &str, key: Option<&str>, ca: &str) -> RoleConfig {
        RoleConfig {
            pem_bundle: cert.to_string(),
            private_key: key.map(str::to_string),
            url: "https://gw.example.com".to_string(),
            ca_certs: ca.to_string(),
            ca_id: None,
            profile_id: None,
            profiles: Vec::new(),
        }
    }

    #[test]
    fn test_build_with_separate_key() {
        let (cert, key) = credentials();
        let factory = TlsClientFactory::default();
        assert!(factory.build(&role(&cert, Some(&key), &cert)).is_ok());
    }

    #[test]
    fn test_build_with_combined_bundle() {
        let (cert, key) = credentials();
        let bundle = format!("{}{}", key, cert);
        assert!(TlsClientFactory::default().build(&role(&bundle, None, &cert)).is_ok());
    }

    #[test]
    fn test_empty_ca_bundle_rejected() {
        let (cert, key) = credentials();
        let err = TlsClientFactory::default()
            .build(&role(&cert, Some(&key), "no certificates here"))
            .unwrap_err();
        assert!(matches!(err, TlsConfigError::InvalidCaBundle { .. }));
    }

    #[test]
    fn test_validate_credentials_returns_roots() {
        let (cert, key) = credentials();
        let bundle = format!("{}{}", cert, cert);
        let roots = validate_credentials(&role(&cert, Some(&key), &bundle)).unwrap();
        assert_eq!(roots.len(), 2);
    }

    #[test]
    fn test_bad_key_pair_rejected() {
        let (cert, _) = credentials();
        let (_, other_key) = credentials();
        let err = TlsClientFactory::default()
            .build(&role(&cert, Some(&other_key), &cert))
            .unwrap_err();
        assert!(matches!(err, TlsConfigError::InvalidKeyPair { .. }));
    }
}
