// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # cagw-config
//!
//! Service configuration for the CAGW enrollment engine.
//!
//! ## Features
//!
//! - **Schema Definition**: Engine, storage, API and logging sections with validation
//! - **Multi-Format Support**: YAML, TOML, and JSON configuration files
//! - **Environment Overrides**: `CAGW_*` variables override file values
//!
//! ## Quick Start
//!
//! ```no_run
//! use cagw_config::loader::load_config;
//!
//! let config = load_config("cagw.yaml").unwrap();
//! println!("Profile policy: {}", config.engine.profile_policy);
//! println!("API: {}", config.api.socket_addr());
//! ```
//!
//! ## Environment Variables
//!
//! ```text
//! CAGW_API_PORT=9200
//! CAGW_LOG_LEVEL=debug
//! CAGW_STORAGE_PATH=/var/lib/cagw
//! CAGW_SUBJECT_SYNTAX=simple
//! ```
//!
//! Values in config files can reference environment variables:
//!
//! ```yaml
//! storage:
//!   path: "${CAGW_DATA_DIR:/var/lib/cagw}"
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod loader;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_config_str, ConfigFormat, ConfigLoader, ConfigLoaderBuilder};
pub use schema::{
    ApiConfig, CagwConfig, EngineConfig, LogFormat, LogLevel, LoggingConfig, StorageBackendKind,
    StorageConfig,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// =============================================================================
// Prelude
// =============================================================================

/// Convenience re-exports for common use cases.
pub mod prelude {
    pub use crate::error::{ConfigError, ConfigResult};
    pub use crate::loader::{load_config, load_config_str, ConfigFormat, ConfigLoader};
    pub use crate::schema::{CagwConfig, EngineConfig, StorageBackendKind};
}
