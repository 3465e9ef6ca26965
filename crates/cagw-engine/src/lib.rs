// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # cagw-engine
//!
//! The enrollment service object and the typed requests it accepts.
//!
//! - **Requests**: one typed body per administrative operation, validated in a
//!   single pass before any storage or network access
//! - **Alt names**: ordered, de-duplicated SAN assembly
//! - **Service**: [`EnrollmentService`], built once from injected collaborators
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cagw_engine::prelude::*;
//!
//! let service = EnrollmentService::new(storage, Arc::new(HttpsTransport::default()), EngineSettings::default());
//! let record = service.issue(&RoleId::new("web"), request).await?;
//! println!("issued {}", record.serial_number);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod alt_names;
pub mod requests;
pub mod service;

pub use requests::{
    IssueCommand, IssueRequest, ProfileCommand, SanInputs, SignCommand, SignRequest, TtlInput,
    WriteProfileRequest, WriteRoleRequest,
};
pub use service::{EngineSettings, EnrollmentService, RoleView};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convenience re-exports for common use cases.
pub mod prelude {
    pub use crate::requests::{IssueRequest, SignRequest, WriteProfileRequest, WriteRoleRequest};
    pub use crate::service::{EngineSettings, EnrollmentService, RoleView};
    pub use cagw_core::types::{ProfileId, RoleId, SerialNumber};
}
