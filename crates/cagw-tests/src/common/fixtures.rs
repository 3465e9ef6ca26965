// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! A throwaway PKI generated with OpenSSL, plus canned gateway documents.
//!
//! - [`TestPki`]: gateway CA, mTLS client identity, leaf and CSR factories
//! - [`GatewayFixtures`]: profile listings and profile documents
//! - Constants shared by the integration suites

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::stack::Stack;
use openssl::x509::extension::{
    BasicConstraints, ExtendedKeyUsage, KeyUsage, SubjectAlternativeName,
};
use openssl::x509::{
    X509, X509Builder, X509Name, X509NameBuilder, X509NameRef, X509Ref, X509Req, X509ReqBuilder,
};

use cagw_core::wire::{
    GatewayProfile, ProfileSummary, SubjectAltNameRequirement, SubjectVariableRequirement,
};

// =============================================================================
// Constants
// =============================================================================

/// Role used throughout the suites.
pub const TEST_ROLE: &str = "web";

/// Gateway base URL recorded in role configurations.
pub const GATEWAY_URL: &str = "https://cagw.test.invalid:8443";

/// CA identifier on the mock gateway.
pub const TEST_CA_ID: &str = "CA-1001";

/// Profile for TLS server certificates.
pub const TLS_PROFILE: &str = "prof-tls";

/// Profile for S/MIME certificates.
pub const SMIME_PROFILE: &str = "prof-smime";

/// Serial number of the first issued leaf.
pub const ISSUE_SERIAL: u32 = 123456;

/// Serial number of the first signed leaf.
pub const SIGN_SERIAL: u32 = 98765;

/// One hour.
pub const HOUR: Duration = Duration::from_secs(3600);

// =============================================================================
// Key Generation
// =============================================================================

/// Key algorithm for generated keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyAlgorithm {
    /// RSA 2048.
    Rsa,
    /// ECDSA P-256.
    #[default]
    Ec,
}

impl KeyAlgorithm {
    /// Returns the PEM label the decoder emits for this algorithm.
    pub fn pem_label(&self) -> &'static str {
        match self {
            Self::Rsa => "RSA PRIVATE KEY",
            Self::Ec => "EC PRIVATE KEY",
        }
    }

    /// Returns the `private_key_type` recorded for this algorithm.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Rsa => "rsa",
            Self::Ec => "ec",
        }
    }
}

/// Generates a private key.
pub fn generate_key(alg: KeyAlgorithm) -> PKey<Private> {
    match alg {
        KeyAlgorithm::Rsa => {
            PKey::from_rsa(Rsa::generate(2048).expect("RSA keygen")).expect("RSA pkey")
        }
        KeyAlgorithm::Ec => {
            let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).expect("P-256 group");
            PKey::from_ec_key(EcKey::generate(&group).expect("EC keygen")).expect("EC pkey")
        }
    }
}

fn common_name(cn: &str) -> X509Name {
    let mut name = X509NameBuilder::new().expect("name builder");
    name.append_entry_by_nid(Nid::COMMONNAME, cn).expect("CN entry");
    name.build()
}

/// Extensions stamped on a generated certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Usage {
    /// Gateway root: `CA:TRUE`, certificate signing.
    Authority,
    /// mTLS client identity.
    Client,
    /// TLS server for `127.0.0.1` and `localhost`.
    Server,
    /// Enrolled leaf, no extensions.
    Leaf,
}

fn add_extensions(builder: &mut X509Builder, usage: Usage, issuer: Option<&X509Ref>) {
    match usage {
        Usage::Authority => {
            let constraints = BasicConstraints::new().critical().ca().build().expect("constraints");
            builder.append_extension(constraints).expect("constraints");
            let key_usage = KeyUsage::new()
                .critical()
                .key_cert_sign()
                .crl_sign()
                .build()
                .expect("key usage");
            builder.append_extension(key_usage).expect("key usage");
        }
        Usage::Client => {
            let eku = ExtendedKeyUsage::new().client_auth().build().expect("eku");
            builder.append_extension(eku).expect("eku");
        }
        Usage::Server => {
            let eku = ExtendedKeyUsage::new().server_auth().build().expect("eku");
            builder.append_extension(eku).expect("eku");
            let san = {
                let context = builder.x509v3_context(issuer, None);
                SubjectAlternativeName::new()
                    .ip("127.0.0.1")
                    .dns("localhost")
                    .build(&context)
            }
            .expect("san");
            builder.append_extension(san).expect("san");
        }
        Usage::Leaf => {}
    }
}

fn certificate(
    serial: u32,
    subject: &X509NameRef,
    public_key: &PKey<impl openssl::pkey::HasPublic>,
    issuer: Option<(&X509, &PKey<Private>)>,
    self_key: Option<&PKey<Private>>,
) -> X509 {
    certificate_with_usage(serial, subject, public_key, issuer, self_key, Usage::Leaf)
}

fn certificate_with_usage(
    serial: u32,
    subject: &X509NameRef,
    public_key: &PKey<impl openssl::pkey::HasPublic>,
    issuer: Option<(&X509, &PKey<Private>)>,
    self_key: Option<&PKey<Private>>,
    usage: Usage,
) -> X509 {
    let mut builder = X509::builder().expect("x509 builder");
    builder.set_version(2).expect("version");
    let serial = BigNum::from_u32(serial)
        .and_then(|bn| bn.to_asn1_integer())
        .expect("serial");
    builder.set_serial_number(&serial).expect("serial");
    builder.set_subject_name(subject).expect("subject");
    builder.set_pubkey(public_key).expect("pubkey");
    builder
        .set_not_before(&Asn1Time::days_from_now(0).expect("not before"))
        .expect("not before");
    builder
        .set_not_after(&Asn1Time::days_from_now(30).expect("not after"))
        .expect("not after");
    add_extensions(&mut builder, usage, issuer.map(|(cert, _)| &**cert));

    match (issuer, self_key) {
        (Some((issuer_cert, issuer_key)), _) => {
            builder.set_issuer_name(issuer_cert.subject_name()).expect("issuer");
            builder.sign(issuer_key, MessageDigest::sha256()).expect("sign");
        }
        (None, Some(key)) => {
            builder.set_issuer_name(subject).expect("issuer");
            builder.sign(key, MessageDigest::sha256()).expect("self-sign");
        }
        (None, None) => panic!("certificate needs an issuer or its own key"),
    }

    builder.build()
}

/// Encodes a certificate as PEM text.
pub fn cert_pem(cert: &X509) -> String {
    String::from_utf8(cert.to_pem().expect("cert pem")).expect("utf8")
}

/// Encodes a private key as PKCS#8 PEM text.
pub fn key_pem(key: &PKey<Private>) -> String {
    String::from_utf8(key.private_key_to_pem_pkcs8().expect("key pem")).expect("utf8")
}

// =============================================================================
// TestPki
// =============================================================================

/// A gateway CA plus an mTLS client identity issued by it.
pub struct TestPki {
    /// Gateway CA certificate.
    pub ca_cert: X509,
    /// Gateway CA key.
    pub ca_key: PKey<Private>,
    /// Client certificate.
    pub client_cert: X509,
    /// Client key.
    pub client_key: PKey<Private>,
}

impl std::fmt::Debug for TestPki {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestPki").finish_non_exhaustive()
    }
}

impl TestPki {
    /// Generates a fresh CA and client identity.
    pub fn generate() -> Self {
        let ca_key = generate_key(KeyAlgorithm::Ec);
        let ca_cert = certificate_with_usage(
            1,
            &common_name("CAGW Test Root"),
            &ca_key,
            None,
            Some(&ca_key),
            Usage::Authority,
        );

        let client_key = generate_key(KeyAlgorithm::Ec);
        let client_cert = certificate_with_usage(
            2,
            &common_name("cagw-client"),
            &client_key,
            Some((&ca_cert, &ca_key)),
            None,
            Usage::Client,
        );

        Self {
            ca_cert,
            ca_key,
            client_cert,
            client_key,
        }
    }

    /// Gateway CA bundle as PEM.
    pub fn ca_pem(&self) -> String {
        cert_pem(&self.ca_cert)
    }

    /// Client certificate as PEM.
    pub fn client_cert_pem(&self) -> String {
        cert_pem(&self.client_cert)
    }

    /// Client key as PEM.
    pub fn client_key_pem(&self) -> String {
        key_pem(&self.client_key)
    }

    /// Client certificate and key in one bundle.
    pub fn client_bundle_pem(&self) -> String {
        format!("{}{}", self.client_cert_pem(), self.client_key_pem())
    }

    /// Issues a TLS server identity for `127.0.0.1`, chaining to the gateway CA.
    pub fn server_identity(&self) -> (X509, PKey<Private>) {
        let key = generate_key(KeyAlgorithm::Ec);
        let cert = certificate_with_usage(
            3,
            &common_name("cagw.test.invalid"),
            &key,
            Some((&self.ca_cert, &self.ca_key)),
            None,
            Usage::Server,
        );
        (cert, key)
    }

    /// Issues a leaf certificate with a fresh key of `alg`.
    pub fn issue_leaf(&self, alg: KeyAlgorithm, serial: u32, cn: &str) -> (X509, PKey<Private>) {
        let key = generate_key(alg);
        let cert = certificate(
            serial,
            &common_name(cn),
            &key,
            Some((&self.ca_cert, &self.ca_key)),
            None,
        );
        (cert, key)
    }

    /// Signs a PKCS#10 request, copying its subject and public key.
    pub fn sign_csr(&self, csr: &X509Req, serial: u32) -> X509 {
        let public_key = csr.public_key().expect("csr public key");
        certificate(
            serial,
            csr.subject_name(),
            &public_key,
            Some((&self.ca_cert, &self.ca_key)),
            None,
        )
    }

    /// Builds the base64 PKCS#12 body the gateway returns for an issue.
    pub fn pkcs12_body(&self, leaf: &X509, key: &PKey<Private>, password: &str) -> String {
        pkcs12_base64(leaf, key, std::slice::from_ref(&self.ca_cert), password)
    }
}

// =============================================================================
// Encodings
// =============================================================================

/// Packs `leaf`, `key` and `chain` into a base64 PKCS#12 body.
pub fn pkcs12_base64(leaf: &X509, key: &PKey<Private>, chain: &[X509], password: &str) -> String {
    let mut builder = Pkcs12::builder();
    builder.name("enrollment").cert(leaf).pkey(key);
    if !chain.is_empty() {
        let mut stack = Stack::new().expect("stack");
        for cert in chain {
            stack.push(cert.clone()).expect("push");
        }
        builder.ca(stack);
    }
    let der = builder
        .build2(password)
        .and_then(|p12| p12.to_der())
        .expect("pkcs12");
    BASE64.encode(der)
}

/// Base64 DER body the gateway returns for a sign.
pub fn x509_body(cert: &X509) -> String {
    BASE64.encode(cert.to_der().expect("cert der"))
}

/// A CSR for `cn` with a fresh key, as PEM.
pub fn csr_pem(alg: KeyAlgorithm, cn: &str) -> String {
    let key = generate_key(alg);
    let mut req = X509ReqBuilder::new().expect("req builder");
    req.set_subject_name(&common_name(cn)).expect("subject");
    req.set_pubkey(&key).expect("pubkey");
    req.sign(&key, MessageDigest::sha256()).expect("sign");
    String::from_utf8(req.build().to_pem().expect("csr pem")).expect("utf8")
}

// =============================================================================
// Gateway Documents
// =============================================================================

/// Canned gateway profile documents.
pub struct GatewayFixtures;

impl GatewayFixtures {
    /// Profiles offered by the mock CA.
    pub fn profile_summaries() -> Vec<ProfileSummary> {
        vec![
            ProfileSummary {
                id: TLS_PROFILE.to_string(),
                name: "TLS Server".to_string(),
            },
            ProfileSummary {
                id: SMIME_PROFILE.to_string(),
                name: "S/MIME".to_string(),
            },
        ]
    }

    /// Full profile documents matching [`profile_summaries`](Self::profile_summaries).
    pub fn profiles() -> Vec<GatewayProfile> {
        vec![
            GatewayProfile {
                id: TLS_PROFILE.to_string(),
                name: "TLS Server".to_string(),
                subject_variable_requirements: vec![
                    SubjectVariableRequirement {
                        name: "cn".to_string(),
                        required: true,
                    },
                    SubjectVariableRequirement {
                        name: "o".to_string(),
                        required: false,
                    },
                ],
                subject_alt_name_requirements: vec![SubjectAltNameRequirement {
                    kind: "dNSName".to_string(),
                    required: false,
                }],
            },
            GatewayProfile {
                id: SMIME_PROFILE.to_string(),
                name: "S/MIME".to_string(),
                subject_variable_requirements: vec![SubjectVariableRequirement {
                    name: "cn".to_string(),
                    required: true,
                }],
                subject_alt_name_requirements: vec![SubjectAltNameRequirement {
                    kind: "rfc822Name".to_string(),
                    required: true,
                }],
            },
        ]
    }

    /// Structured gateway error body.
    pub fn error_body(message: &str, code: &str) -> String {
        serde_json::json!({ "error": { "message": message, "code": code } }).to_string()
    }
}
