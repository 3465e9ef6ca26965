// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Certificate generation for unit tests.

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
use openssl::x509::{X509, X509NameBuilder};

#[derive(Debug, Clone, Copy)]
pub enum KeyAlgorithm {
    Rsa,
    Ec,
}

pub fn generate_key(alg: KeyAlgorithm) -> PKey<Private> {
    match alg {
        KeyAlgorithm::Rsa => PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap(),
        KeyAlgorithm::Ec => {
            let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
            PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
        }
    }
}

/// Builds a certificate with `serial`, signed by `issuer` or by itself.
pub fn self_signed(
    alg: KeyAlgorithm,
    serial: u32,
    common_name: &str,
    issuer: Option<(&X509, &PKey<Private>)>,
) -> (X509, PKey<Private>) {
    let key = generate_key(alg);

    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_nid(Nid::COMMONNAME, common_name).unwrap();
    let name = name.build();

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(serial).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_pubkey(&key).unwrap();
    builder.set_not_before(&Asn1Time::days_from_now(0).unwrap()).unwrap();
    builder.set_not_after(&Asn1Time::days_from_now(30).unwrap()).unwrap();

    match issuer {
        Some((issuer_cert, issuer_key)) => {
            builder.set_issuer_name(issuer_cert.subject_name()).unwrap();
            builder.sign(issuer_key, MessageDigest::sha256()).unwrap();
        }
        None => {
            builder.set_issuer_name(&name).unwrap();
            builder.sign(&key, MessageDigest::sha256()).unwrap();
        }
    }

    (builder.build(), key)
}

/// Packs `leaf`, `key` and `chain` into a base64 PKCS#12 body.
pub fn pkcs12_base64(leaf: &X509, key: &PKey<Private>, chain: &[X509], password: &str) -> String {
    let mut builder = Pkcs12::builder();
    builder.name("enrollment").cert(leaf).pkey(key);
    if !chain.is_empty() {
        let mut stack = Stack::new().unwrap();
        for cert in chain {
            stack.push(cert.clone()).unwrap();
        }
        builder.ca(stack);
    }
    BASE64.encode(builder.build2(password).unwrap().to_der().unwrap())
}
