// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Private keys returned inside PKCS#12 bundles.
//!
//! Only RSA and elliptic-curve keys are accepted. Each variant has exactly
//! one PEM encoding:
//!
//! | Variant | Encoding | PEM label |
//! |---------|----------|-----------|
//! | `Rsa`   | PKCS#1   | `RSA PRIVATE KEY` |
//! | `Ec`    | SEC1     | `EC PRIVATE KEY` |

use openssl::pkey::{Id, PKey, Private};

use cagw_core::error::DecodeError;

/// A private key of a supported algorithm.
pub enum PrivateKeyMaterial {
    /// RSA key.
    Rsa(PKey<Private>),
    /// Elliptic-curve key.
    Ec(PKey<Private>),
}

impl PrivateKeyMaterial {
    /// Classifies a key by algorithm, rejecting anything but RSA and EC.
    pub fn from_pkey(key: PKey<Private>) -> Result<Self, DecodeError> {
        match key.id() {
            Id::RSA => Ok(Self::Rsa(key)),
            Id::EC => Ok(Self::Ec(key)),
            other => Err(DecodeError::unsupported_key_type(key_type_name(other))),
        }
    }

    /// Returns `rsa` or `ec`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Rsa(_) => "rsa",
            Self::Ec(_) => "ec",
        }
    }

    /// Encodes the key in its algorithm-specific PEM form.
    pub fn to_pem(&self) -> Result<String, DecodeError> {
        let pem = match self {
            Self::Rsa(key) => key
                .rsa()
                .and_then(|rsa| rsa.private_key_to_pem())
                .map_err(|e| DecodeError::pkcs12(format!("RSA key could not be encoded: {}", e)))?,
            Self::Ec(key) => key
                .ec_key()
                .and_then(|ec| ec.private_key_to_pem())
                .map_err(|e| DecodeError::pkcs12(format!("EC key could not be encoded: {}", e)))?,
        };
        String::from_utf8(pem).map_err(|e| DecodeError::pkcs12(e.to_string()))
    }
}

impl std::fmt::Debug for PrivateKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrivateKeyMaterial::{}(..)", self.kind_name())
    }
}

fn key_type_name(id: Id) -> String {
    match id {
        Id::DSA => "dsa".to_string(),
        Id::DH => "dh".to_string(),
        Id::ED25519 => "ed25519".to_string(),
        Id::X25519 => "x25519".to_string(),
        other => format!("nid {}", other.as_raw()),
    }
}
