// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! PEM framing over the `pem` crate.

use ::pem::{EncodeConfig, LineEnding, Pem, PemError};

/// PEM label for certificates.
pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// Wraps DER bytes in a PEM block with LF line endings and 64-column lines.
pub fn encode_pem(label: &str, der: &[u8]) -> String {
    let block = Pem::new(label, der.to_vec());
    ::pem::encode_config(&block, EncodeConfig::new().set_line_ending(LineEnding::LF))
}

/// Parses the first PEM block in `input`, whatever its label. Text before the
/// block and any blocks after it are ignored.
pub fn first_block(input: &str) -> Result<Pem, PemError> {
    ::pem::parse(input)
}
