// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # CAGW Integration Tests
//!
//! Test utilities and integration suites for the CAGW enrollment engine.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: A throwaway PKI (gateway CA, client identity, leaves, CSRs)
//!   - `builders`: Request builders and a wired-up [`TestEngine`](common::builders::TestEngine)
//!   - `assertions`: PEM and record assertions
//!   - `mocks`: [`MockGateway`](common::mocks::MockGateway), a scripted gateway transport
//!   - `tls_gateway`: [`TlsGateway`](common::tls_gateway::TlsGateway), a local mutual-TLS server
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cagw-tests
//! cargo test -p cagw-tests --test integration_engine
//! cargo test -p cagw-tests -- --nocapture
//! ```
//!
//! ## Test Categories
//!
//! - `integration_core.rs`: TTL resolution, subject and SAN parsing, request building
//! - `integration_store.rs`: storage backends, configuration policy, certificate records
//! - `integration_pki.rs`: PKCS#12 and X.509 decoding, CSR input, key-pair checks
//! - `integration_client.rs`: error classification, TLS credentials, gateway calls
//! - `integration_engine.rs`: end-to-end issue and sign against the mock gateway
//! - `integration_api.rs`: the HTTP surface over the same pipeline
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use cagw_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let engine = TestEngine::builder().build();
//!     engine.configure_role("web", Some("prof-tls")).await;
//!     engine.configure_profile("web", "prof-tls", HOUR, Duration::ZERO).await;
//!
//!     let record = engine
//!         .service
//!         .issue(&"web".into(), IssueRequestBuilder::new("cn=a.example.com").build())
//!         .await
//!         .unwrap();
//!     record.assert_certificate_pem();
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::assertions::*;
    pub use crate::common::builders::*;
    pub use crate::common::fixtures::*;
    pub use crate::common::mocks::*;
    pub use crate::common::tls_gateway::TlsGateway;
    pub use crate::common::{init_test_logging, temp_test_dir};
}
