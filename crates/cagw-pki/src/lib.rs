// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # cagw-pki
//!
//! Client-side certificate handling for the CAGW enrollment engine.
//!
//! - **Decoder**: unwraps PKCS#12 enrollment bodies and parses X.509 bodies
//! - **Key**: the closed set of accepted private key algorithms
//! - **Key pair**: client certificate/key consistency checks
//! - **PEM**: block framing and CSR extraction
//!
//! No CA key material is held here; all signing happens on the gateway.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod csr;
pub mod decoder;
pub mod key;
pub mod keypair;
pub mod pem;

#[cfg(test)]
pub(crate) mod test_support;

pub use csr::decode_csr;
pub use decoder::{decode_pkcs12, decode_x509, DecodedCertificate};
pub use key::PrivateKeyMaterial;
pub use keypair::{certificate_subject, validate_key_pair};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
