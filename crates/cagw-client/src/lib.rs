// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # cagw-client
//!
//! Talks to the Certificate-Authority Gateway over mutual TLS.
//!
//! - **TLS**: per-call client construction from a role's credentials
//! - **Transport**: the [`GatewayTransport`] seam and its HTTPS implementation
//! - **Gateway**: enrollment and profile discovery calls, outcome classification

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod gateway;
pub mod tls;
pub mod transport;

pub use gateway::{classify, GatewayClient};
pub use tls::{validate_credentials, TlsClientFactory};
pub use transport::{GatewayRequest, GatewayTransport, HttpMethod, HttpsTransport, RawResponse};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
