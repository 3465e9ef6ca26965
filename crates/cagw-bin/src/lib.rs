// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # cagw-bin
//!
//! CLI binary for the CAGW enrollment engine.
//!
//! This crate provides the `cagw` entry point:
//!
//! - CLI argument parsing with clap
//! - Service runtime assembly (storage, transport, engine, API)
//! - Graceful shutdown handling
//! - Logging initialization
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         main.rs                              │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │
//!                    ┌──────▼──────┐
//!                    │    cli.rs   │
//!                    └──────┬──────┘
//!                           │
//!               ┌───────────┼───────────┐
//!               ▼           ▼           ▼
//!        ┌──────────┐ ┌──────────┐ ┌──────────┐
//!        │ commands │ │ runtime  │ │ logging  │
//!        └──────────┘ └────┬─────┘ └──────────┘
//!                          │
//!        ┌─────────────────┼──────────────────┐
//!        ▼                 ▼                  ▼
//!  ┌───────────┐   ┌──────────────┐   ┌─────────────┐
//!  │ cagw-store│   │ cagw-engine  │   │  cagw-api   │
//!  │ (backend) │   │  (service)   │   │  (router)   │
//!  └───────────┘   └──────┬───────┘   └──────┬──────┘
//!                         │                  │
//!                  ┌──────▼───────┐   ┌──────▼──────┐
//!                  │ cagw-client  │   │  shutdown   │
//!                  │ (mTLS HTTPS) │   │             │
//!                  └──────────────┘   └─────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Serve the API (default command)
//! cagw
//!
//! # Serve with a custom config
//! cagw -c /etc/cagw/cagw.yaml serve
//!
//! # Validate configuration
//! cagw validate --format json
//!
//! # Show version
//! cagw version
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{RuntimeBuilder, ServiceRuntime};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal, ShutdownToken};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
