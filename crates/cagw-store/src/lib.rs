// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # cagw-store
//!
//! Storage for the CAGW enrollment engine.
//!
//! - **Backend**: the byte-blob key/value collaborator, in memory or on disk
//! - **ConfigStore**: role and profile records with missing-profile policy
//! - **CertificateRecordStore**: issued and signed certificate records

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod backend;
pub mod config_store;
pub mod records;

pub use backend::{FileSystemStorage, MemoryStorage, StorageBackend, StorageResult};
pub use config_store::ConfigStore;
pub use records::CertificateRecordStore;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
