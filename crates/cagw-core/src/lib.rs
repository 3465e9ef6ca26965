// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # cagw-core
//!
//! Core types and pure algorithms for the CAGW certificate enrollment engine.
//!
//! - **Types**: `RoleId`, `ProfileId`, `SerialNumber`, `OutputFormat`, engine policies
//! - **Error**: The error taxonomy shared by every stage of the pipeline
//! - **Model**: Stored role, profile and certificate records
//! - **Subject**: Subject variable strategies and SAN processing
//! - **TTL**: Validity resolution and rendering
//! - **Enrollment**: Enrollment request construction and one-time passwords
//! - **Wire**: Gateway response documents
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use cagw_core::prelude::*;
//!
//! let vars = parse_subject_variables(SubjectSyntax::Simple, "cn=test.example.com").unwrap();
//! let profile = ProfileConfig::legacy_default();
//! let ttl = profile.resolve_ttl(Duration::ZERO);
//!
//! let password = EnrollmentPassword::generate();
//! let request = EnrollmentRequest::builder("prof-tls")
//!     .subject_variables(vars)
//!     .ttl(ttl)
//!     .build(RequestedFormat::pkcs12(&password));
//! assert_eq!(request.optional_certificate_request_details.validity_period, "PT129600M");
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod enrollment;
pub mod error;
pub mod model;
pub mod subject;
pub mod ttl;
pub mod types;
pub mod wire;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use error::*;
pub use types::*;

pub use enrollment::{EnrollmentPassword, EnrollmentRequest, EnrollmentRequestBuilder, RequestedFormat};
pub use model::{CertificateRecord, ProfileConfig, RoleConfig};
pub use subject::{
    AltNameSet, DistinguishedNameStrategy, SimpleListStrategy, SubjectAltName,
    SubjectParseStrategy, SubjectVariable,
};
pub use wire::{EnrollmentResponse, ErrorResponse, GatewayProfile, ProfileSummary};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// =============================================================================
// Prelude
// =============================================================================

/// Convenience re-exports for common use cases.
pub mod prelude {
    pub use crate::enrollment::{EnrollmentPassword, EnrollmentRequest, RequestedFormat};
    pub use crate::error::{CagwError, CagwResult};
    pub use crate::model::{CertificateRecord, ProfileConfig, RoleConfig};
    pub use crate::subject::{parse_subject_alt_names, parse_subject_variables, SubjectAltName, SubjectVariable};
    pub use crate::types::{OutputFormat, ProfileId, ProfilePolicy, RecordKind, RoleId, SerialNumber, SubjectSyntax};
}
