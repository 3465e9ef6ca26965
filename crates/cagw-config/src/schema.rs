// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema.
//!
//! ```yaml
//! engine:
//!   profile_policy: strict          # or legacy_default
//!   subject_syntax: distinguished_name   # or simple
//!   request_timeout: 30s
//!   connect_timeout: 10s
//! storage:
//!   backend: filesystem             # or memory
//!   path: ./data
//! api:
//!   bind_address: 127.0.0.1
//!   port: 8200
//!   request_timeout: 60s
//! logging:
//!   level: info
//!   format: text
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use cagw_core::types::{ProfilePolicy, SubjectSyntax};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Default API port.
pub const DEFAULT_API_PORT: u16 = 8200;

/// Default gateway request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// CagwConfig
// =============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CagwConfig {
    /// Enrollment engine behavior.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Storage backend.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Administrative HTTP API.
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CagwConfig {
    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.engine.validate()?;
        self.storage.validate()?;
        self.api.validate()?;
        Ok(())
    }
}

// =============================================================================
// EngineConfig
// =============================================================================

/// Enrollment engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Behavior when a profile record is missing.
    #[serde(default)]
    pub profile_policy: ProfilePolicy,

    /// Grammar for `subject_variables`.
    #[serde(default)]
    pub subject_syntax: SubjectSyntax,

    /// Total timeout for one gateway request.
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Connection establishment timeout.
    #[serde(default = "default_connect_timeout", with = "humantime_serde")]
    pub connect_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            profile_policy: ProfilePolicy::default(),
            subject_syntax: SubjectSyntax::default(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl EngineConfig {
    /// Validates the engine configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.request_timeout.is_zero() {
            return Err(ConfigError::validation(
                "engine.request_timeout",
                "must be greater than zero",
            ));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::validation(
                "engine.connect_timeout",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

// =============================================================================
// StorageConfig
// =============================================================================

/// Storage backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackendKind {
    /// Process-local, lost on restart.
    Memory,
    /// One file per key under `path`.
    #[default]
    Filesystem,
}

/// Storage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend kind.
    #[serde(default)]
    pub backend: StorageBackendKind,

    /// Root directory for the filesystem backend.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::default(),
            path: default_storage_path(),
        }
    }
}

impl StorageConfig {
    /// Validates the storage configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.backend == StorageBackendKind::Filesystem && self.path.as_os_str().is_empty() {
            return Err(ConfigError::validation(
                "storage.path",
                "required for the filesystem backend",
            ));
        }
        Ok(())
    }
}

/// Returns the default storage path.
pub fn default_storage_path() -> PathBuf {
    PathBuf::from("./data")
}

// =============================================================================
// ApiConfig
// =============================================================================

/// Administrative API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Whether the API is served.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    /// Listen port.
    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Per-request timeout at the HTTP layer.
    #[serde(default = "default_api_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: default_bind_address(),
            port: DEFAULT_API_PORT,
            request_timeout: default_api_timeout(),
        }
    }
}

impl ApiConfig {
    /// Returns the socket address to bind.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    /// Validates the API configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.enabled && self.port == 0 {
            return Err(ConfigError::validation("api.port", "must not be zero"));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::validation(
                "api.request_timeout",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_enabled() -> bool {
    true
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_api_port() -> u16 {
    DEFAULT_API_PORT
}

fn default_api_timeout() -> Duration {
    Duration::from_secs(60)
}

// =============================================================================
// LoggingConfig
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level as a filter directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable.
    #[default]
    Text,
    /// JSON lines for log aggregation.
    Json,
    /// Minimal output.
    Compact,
}

// =============================================================================
// Tests
// =============================================================================
