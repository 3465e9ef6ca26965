// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Common Test Utilities
//!
//! - `fixtures`: Generated certificates and canned gateway documents
//! - `builders`: Request builders and the [`TestEngine`](builders::TestEngine) harness
//! - `assertions`: Custom assertion helpers
//! - `mocks`: Mock gateway transport
//! - `tls_gateway`: Local HTTPS server that demands client certificates

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod mocks;
pub mod tls_gateway;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use mocks::*;
pub use tls_gateway::TlsGateway;

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize test logging. Call this at the start of a test.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("warn,cagw=debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Create a temporary directory for test data.
pub fn temp_test_dir(prefix: &str) -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("Failed to create temp directory")
}
