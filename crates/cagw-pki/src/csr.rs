// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Certificate signing request input.

use openssl::x509::X509Req;

use cagw_core::error::ParseError;

use crate::pem::first_block;

/// Extracts the DER of the first PEM block in `pem` and checks that it is a
/// PKCS#10 request.
///
/// Both `CERTIFICATE REQUEST` and the legacy `NEW CERTIFICATE REQUEST` labels
/// are accepted; the contents decide.
pub fn decode_csr(pem: &str) -> Result<Vec<u8>, ParseError> {
    let block = first_block(pem)
        .map_err(|e| ParseError::invalid_csr(format!("no PEM block found: {}", e)))?;
    let der = block.into_contents();
    X509Req::from_der(&der).map_err(|e| ParseError::invalid_csr(e.to_string()))?;
    Ok(der)
}
