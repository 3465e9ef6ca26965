// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading and processing.
//!
//! # Loading Pipeline
//!
//! 1. Resolve `${VAR}` / `${VAR:default}` placeholders in the raw text
//! 2. Parse YAML/TOML/JSON into [`CagwConfig`]
//! 3. Apply `CAGW_*` environment overrides
//! 4. Resolve a relative storage path against the config file directory
//! 5. Validate
//!
//! # Environment Variable Override
//!
//! ```text
//! CAGW_API_PORT=9200
//! CAGW_PROFILE_POLICY=legacy_default
//! CAGW_REQUEST_TIMEOUT=45s
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{CagwConfig, LogLevel, StorageBackendKind};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "CAGW";

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader.
///
/// # Examples
///
/// ```no_run
/// use cagw_config::loader::ConfigLoader;
///
/// let loader = ConfigLoader::new();
/// let config = loader.load("cagw.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Base directory for resolving relative paths.
    base_path: Option<PathBuf>,

    /// Environment variable prefix.
    env_prefix: String,

    /// Whether to resolve environment variables.
    resolve_env_vars: bool,

    /// Whether to resolve relative paths.
    resolve_paths: bool,
}

impl ConfigLoader {
    /// Creates a new configuration loader with default settings.
    pub fn new() -> Self {
        Self {
            base_path: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            resolve_env_vars: true,
            resolve_paths: true,
        }
    }

    /// Creates a builder for configuring the loader.
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder::new()
    }

    /// Sets the base path for resolving relative paths.
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Loads configuration from a file.
    ///
    /// The format follows the extension: `.yaml`/`.yml`, `.toml` or `.json`.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<CagwConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let base_path = self.base_path.clone().unwrap_or_else(|| {
            path.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        });

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;
        let mut config = self.parse_content(&content, format, path)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        if self.resolve_paths {
            resolve_relative_paths(&mut config, &base_path);
        }

        config.validate()?;

        info!("Configuration loaded successfully");
        debug!(
            profile_policy = %config.engine.profile_policy,
            subject_syntax = %config.engine.subject_syntax,
            storage = ?config.storage.backend,
            "Engine settings"
        );

        Ok(config)
    }

    /// Loads configuration from a string.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<CagwConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)
        } else {
            content.to_string()
        };
        let mut config: CagwConfig = parse_str(&content, format)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        config.validate()?;

        Ok(config)
    }

    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    fn parse_content(
        &self,
        content: &str,
        format: ConfigFormat,
        path: &Path,
    ) -> ConfigResult<CagwConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)
        } else {
            content.to_string()
        };

        parse_str(&content, format).map_err(|e| match e {
            ConfigError::Serialization { message } => ConfigError::parse(path, message),
            other => other,
        })
    }

    /// Resolves `${VAR_NAME}` and `${VAR_NAME:default}` placeholders.
    fn resolve_env_placeholders(&self, content: &str) -> String {
        let mut result = String::with_capacity(content.len());
        let mut chars = content.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' || chars.peek() != Some(&'{') {
                result.push(c);
                continue;
            }
            chars.next();

            let mut var_content = String::new();
            let mut found_close = false;
            for c in chars.by_ref() {
                if c == '}' {
                    found_close = true;
                    break;
                }
                var_content.push(c);
            }

            if !found_close {
                result.push_str("${");
                result.push_str(&var_content);
                continue;
            }

            let (var_name, default_value) = match var_content.split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (var_content.as_str(), None),
            };

            match (env::var(var_name), default_value) {
                (Ok(value), _) => result.push_str(&value),
                (Err(_), Some(default)) => result.push_str(default),
                (Err(_), None) => {
                    warn!("Environment variable '{}' not found", var_name);
                    result.push_str(&format!("${{{}}}", var_name));
                }
            }
        }

        result
    }

    /// Applies `<PREFIX>_*` overrides from the process environment.
    fn apply_env_overrides(&self, config: &mut CagwConfig) -> ConfigResult<()> {
        apply_overrides(config, &self.env_prefix, |name| env::var(name).ok())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigLoaderBuilder
// =============================================================================

/// Builder for ConfigLoader.
#[derive(Debug, Default)]
pub struct ConfigLoaderBuilder {
    base_path: Option<PathBuf>,
    env_prefix: Option<String>,
    resolve_env_vars: Option<bool>,
    resolve_paths: Option<bool>,
}

impl ConfigLoaderBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base path.
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Sets the environment prefix.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn resolve_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = Some(enabled);
        self
    }

    /// Enables or disables path resolution.
    pub fn resolve_paths(mut self, enabled: bool) -> Self {
        self.resolve_paths = Some(enabled);
        self
    }

    /// Builds the ConfigLoader.
    pub fn build(self) -> ConfigLoader {
        let mut loader = ConfigLoader::new();

        if let Some(base_path) = self.base_path {
            loader.base_path = Some(base_path);
        }
        if let Some(prefix) = self.env_prefix {
            loader.env_prefix = prefix;
        }
        if let Some(resolve_env_vars) = self.resolve_env_vars {
            loader.resolve_env_vars = resolve_env_vars;
        }
        if let Some(resolve_paths) = self.resolve_paths {
            loader.resolve_paths = resolve_paths;
        }

        loader
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Applies overrides using `lookup` to read variables.
///
/// Split out from [`ConfigLoader`] so overrides can be exercised without
/// mutating the process environment.
pub fn apply_overrides<F>(config: &mut CagwConfig, prefix: &str, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |suffix: &str| {
        let name = format!("{}_{}", prefix, suffix);
        lookup(&name).map(|value| (name, value))
    };

    if let Some((name, value)) = var("API_PORT") {
        config.api.port = value
            .parse()
            .map_err(|_| ConfigError::invalid_env_var(name, "expected valid port number"))?;
    }
    if let Some((name, value)) = var("API_BIND_ADDRESS") {
        config.api.bind_address = value
            .parse()
            .map_err(|_| ConfigError::invalid_env_var(name, "expected an IP address"))?;
    }
    if let Some((_, value)) = var("API_ENABLED") {
        config.api.enabled = parse_bool(&value);
    }

    if let Some((name, value)) = var("LOG_LEVEL") {
        match parse_log_level(&value) {
            Some(level) => config.logging.level = level,
            None => warn!("Ignoring {}: unknown level '{}'", name, value),
        }
    }

    if let Some((_, value)) = var("STORAGE_PATH") {
        config.storage.path = PathBuf::from(value);
    }
    if let Some((name, value)) = var("STORAGE_BACKEND") {
        config.storage.backend = match value.to_lowercase().as_str() {
            "memory" => StorageBackendKind::Memory,
            "filesystem" | "file" => StorageBackendKind::Filesystem,
            _ => {
                return Err(ConfigError::invalid_env_var(
                    name,
                    "expected 'memory' or 'filesystem'",
                ));
            }
        };
    }

    if let Some((name, value)) = var("PROFILE_POLICY") {
        config.engine.profile_policy = value
            .parse()
            .map_err(|e: String| ConfigError::invalid_env_var(name, e))?;
    }
    if let Some((name, value)) = var("SUBJECT_SYNTAX") {
        config.engine.subject_syntax = value
            .parse()
            .map_err(|e: String| ConfigError::invalid_env_var(name, e))?;
    }
    if let Some((name, value)) = var("REQUEST_TIMEOUT") {
        config.engine.request_timeout = humantime_serde::re::humantime::parse_duration(&value)
            .map_err(|e| ConfigError::invalid_env_var(name, e.to_string()))?;
    }

    Ok(())
}

fn resolve_relative_paths(config: &mut CagwConfig, base_path: &Path) {
    if config.storage.backend == StorageBackendKind::Filesystem && config.storage.path.is_relative()
    {
        config.storage.path = base_path.join(&config.storage.path);
    }
}

fn parse_str<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> ConfigResult<T> {
    match format {
        ConfigFormat::Yaml => yaml_parse(content),
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
    }
}

/// Parses a string to bool.
fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "true" | "1" | "yes" | "on" | "enabled"
    )
}

/// Parses a log level string.
fn parse_log_level(value: &str) -> Option<LogLevel> {
    match value.to_lowercase().as_str() {
        "trace" => Some(LogLevel::Trace),
        "debug" => Some(LogLevel::Debug),
        "info" => Some(LogLevel::Info),
        "warn" | "warning" => Some(LogLevel::Warn),
        "error" => Some(LogLevel::Error),
        _ => None,
    }
}

/// YAML parsing through the `config` crate.
fn yaml_parse<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Yaml))
        .build()
        .map_err(|e| ConfigError::serialization(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::serialization(e.to_string()))
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads configuration from a file with default settings.
///
/// ```no_run
/// use cagw_config::loader::load_config;
///
/// let config = load_config("cagw.yaml").unwrap();
/// ```
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<CagwConfig> {
    ConfigLoader::new().load(path)
}

/// Loads configuration from a string with the specified format.
pub fn load_config_str(content: &str, format: ConfigFormat) -> ConfigResult<CagwConfig> {
    ConfigLoader::new().load_from_str(content, format)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cagw_core::types::{ProfilePolicy, SubjectSyntax};
    use std::collections::HashMap;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn create_test_yaml() -> String {
        r#"
engine:
  profile_policy: legacy_default
  subject_syntax: simple
  request_timeout: 45s
storage:
  backend: filesystem
  path: ./state
api:
  enabled: true
  port: 9200
logging:
  level: debug
  format: json
"#
        .to_string()
    }

    #[test]
    fn test_load_yaml() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(create_test_yaml().as_bytes()).unwrap();

        let config = ConfigLoader::new().with_env_vars(false).load(file.path()).unwrap();

        assert_eq!(config.engine.profile_policy, ProfilePolicy::LegacyDefault);
        assert_eq!(config.engine.subject_syntax, SubjectSyntax::Simple);
        assert_eq!(config.engine.request_timeout, Duration::from_secs(45));
        assert_eq!(config.api.port, 9200);
        assert_eq!(config.logging.level, LogLevel::Debug);

        let parent = file.path().parent().unwrap();
        assert_eq!(config.storage.path, parent.join("./state"));
    }

    #[test]
    fn test_load_toml() {
        let toml = r#"
[engine]
profile_policy = "strict"
request_timeout = "5s"

[storage]
backend = "memory"
"#;
        let config = ConfigLoader::new()
            .with_env_vars(false)
            .load_from_str(toml, ConfigFormat::Toml)
            .unwrap();
        assert_eq!(config.engine.request_timeout, Duration::from_secs(5));
        assert_eq!(config.storage.backend, StorageBackendKind::Memory);
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = ConfigLoader::new()
            .with_env_vars(false)
            .load_from_str("", ConfigFormat::Yaml)
            .unwrap();
        assert_eq!(config, CagwConfig::default());
    }

    #[test]
    fn test_missing_file() {
        let err = load_config("/nonexistent/cagw.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = ConfigLoader::new()
            .with_env_vars(false)
            .load_from_str("engine:\n  request_timeout: 0s\n", ConfigFormat::Yaml);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("cagw.yaml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("cagw.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("cagw.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("cagw.json")).unwrap(),
            ConfigFormat::Json
        );
        assert!(ConfigFormat::from_path(Path::new("cagw.txt")).is_err());
    }

    #[test]
    fn test_env_placeholder_with_default() {
        let loader = ConfigLoader::new();
        let result = loader.resolve_env_placeholders("port: ${CAGW_TEST_NONEXISTENT_VAR:8300}");
        assert_eq!(result, "port: 8300");
    }

    #[test]
    fn test_env_placeholder_unterminated() {
        let loader = ConfigLoader::new();
        assert_eq!(loader.resolve_env_placeholders("a: ${OPEN"), "a: ${OPEN");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CAGW_API_PORT", "9443"),
            ("CAGW_PROFILE_POLICY", "legacy_default"),
            ("CAGW_SUBJECT_SYNTAX", "simple"),
            ("CAGW_REQUEST_TIMEOUT", "2m"),
            ("CAGW_STORAGE_BACKEND", "memory"),
        ]
        .into_iter()
        .collect();

        let mut config = CagwConfig::default();
        apply_overrides(&mut config, "CAGW", |name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.api.port, 9443);
        assert_eq!(config.engine.profile_policy, ProfilePolicy::LegacyDefault);
        assert_eq!(config.engine.subject_syntax, SubjectSyntax::Simple);
        assert_eq!(config.engine.request_timeout, Duration::from_secs(120));
        assert_eq!(config.storage.backend, StorageBackendKind::Memory);
    }

    #[test]
    fn test_override_invalid_port() {
        let mut config = CagwConfig::default();
        let err = apply_overrides(&mut config, "CAGW", |name| {
            (name == "CAGW_API_PORT").then(|| "not-a-port".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar { ref name, .. } if name == "CAGW_API_PORT"));
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("1"));
        assert!(parse_bool("on"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("no"));
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("warning"), Some(LogLevel::Warn));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("invalid"), None);
    }

    #[test]
    fn test_loader_builder() {
        let loader = ConfigLoader::builder()
            .env_prefix("MYCAGW")
            .resolve_env_vars(false)
            .build();
        assert_eq!(loader.env_prefix, "MYCAGW");
        assert!(!loader.resolve_env_vars);
    }
}
