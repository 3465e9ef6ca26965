// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use std::path::Path;

use serde_json::json;

use cagw_config::{CagwConfig, StorageBackendKind};
use cagw_core::ProfilePolicy;

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Parses and validates the configuration file, then prints a summary.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    if !config_path.exists() {
        return Err(BinError::config(format!(
            "Configuration file not found: {}",
            config_path.display()
        )));
    }

    let config = cagw_config::load_config(config_path)
        .map_err(|e| BinError::config(format!("Configuration validation failed: {}", e)))?;

    let warnings = validation_report(&config);

    match args.format {
        OutputFormat::Text => print_text(config_path, &config, &warnings, args.show_config),
        OutputFormat::Json => print_json(config_path, &config, &warnings, args.show_config)?,
    }

    if args.strict && !warnings.is_empty() {
        return Err(BinError::config(format!(
            "Strict mode: {} warning(s) found",
            warnings.len()
        )));
    }

    Ok(())
}

/// Returns operator warnings for a configuration that already passed validation.
pub fn validation_report(config: &CagwConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.storage.backend == StorageBackendKind::Memory {
        warnings.push("Memory storage loses roles and certificates on restart".to_string());
    }

    if config.engine.profile_policy == ProfilePolicy::LegacyDefault {
        warnings.push(
            "profile_policy is legacy_default: unconfigured profiles fall back to the built-in default"
                .to_string(),
        );
    }

    if !config.api.enabled {
        warnings.push("API is disabled".to_string());
    } else if config.api.bind_address.is_unspecified() {
        warnings.push(format!(
            "API binds to {} and has no authentication of its own",
            config.api.bind_address
        ));
    }

    if config.api.request_timeout < config.engine.request_timeout {
        warnings.push(format!(
            "api.request_timeout ({:?}) is shorter than engine.request_timeout ({:?})",
            config.api.request_timeout, config.engine.request_timeout
        ));
    }

    warnings
}

fn print_text(path: &Path, config: &CagwConfig, warnings: &[String], show_config: bool) {
    println!("✓ Configuration is valid: {}", path.display());
    println!();
    println!("Summary:");
    println!("  Profile policy: {}", config.engine.profile_policy);
    println!("  Subject syntax: {}", config.engine.subject_syntax);
    println!(
        "  Gateway timeouts: {:?} request, {:?} connect",
        config.engine.request_timeout, config.engine.connect_timeout
    );
    println!(
        "  Storage: {:?} ({})",
        config.storage.backend,
        config.storage.path.display()
    );
    println!(
        "  API: {}",
        if config.api.enabled {
            config.api.socket_addr().to_string()
        } else {
            "disabled".to_string()
        }
    );

    if !warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in warnings {
            println!("  ⚠ {}", warning);
        }
    }

    if show_config {
        println!();
        println!("Parsed configuration:");
        println!(
            "{}",
            serde_json::to_string_pretty(config).unwrap_or_else(|_| "(serialization error)".to_string())
        );
    }
}

fn print_json(
    path: &Path,
    config: &CagwConfig,
    warnings: &[String],
    show_config: bool,
) -> BinResult<()> {
    let output = json!({
        "valid": true,
        "config_path": path.display().to_string(),
        "summary": {
            "profile_policy": config.engine.profile_policy,
            "subject_syntax": config.engine.subject_syntax,
            "storage_backend": config.storage.backend,
            "storage_path": config.storage.path.display().to_string(),
            "api_enabled": config.api.enabled,
            "api_address": config.api.socket_addr().to_string(),
        },
        "warnings": warnings,
        "config": if show_config { Some(config) } else { None },
    });

    let text = serde_json::to_string_pretty(&output)
        .map_err(|e| BinError::runtime(format!("Failed to render report: {}", e)))?;
    println!("{}", text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli_for(path: &Path, extra: &[&str]) -> (Cli, ValidateArgs) {
        let mut argv = vec!["cagw", "-c", path.to_str().unwrap(), "validate"];
        argv.extend_from_slice(extra);
        let cli = Cli::parse_from(argv);
        let args = match cli.effective_command() {
            crate::cli::Commands::Validate(args) => args,
            other => panic!("unexpected command {:?}", other),
        };
        (cli, args)
    }

    #[test]
    fn test_default_config_has_no_warnings() {
        assert!(validation_report(&CagwConfig::default()).is_empty());
    }

    #[test]
    fn test_warnings() {
        let mut config = CagwConfig::default();
        config.storage.backend = StorageBackendKind::Memory;
        config.engine.profile_policy = ProfilePolicy::LegacyDefault;
        config.api.bind_address = "0.0.0.0".parse().unwrap();

        let warnings = validation_report(&config);
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("Memory storage"));
        assert!(warnings[2].contains("0.0.0.0"));
    }

    #[test]
    fn test_missing_file() {
        let (cli, args) = cli_for(Path::new("/nonexistent/cagw.yaml"), &[]);
        let err = validate(&cli, args).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_valid_file_and_strict_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cagw.json");
        std::fs::write(&path, r#"{"storage":{"backend":"memory"}}"#).unwrap();

        let (cli, args) = cli_for(&path, &["-f", "json"]);
        assert!(validate(&cli, args).is_ok());

        let (cli, args) = cli_for(&path, &["--strict"]);
        let err = validate(&cli, args).unwrap_err();
        assert!(err.to_string().contains("1 warning"));
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cagw.toml");
        std::fs::write(&path, "[api]\nport = 0\n").unwrap();

        let (cli, args) = cli_for(&path, &[]);
        let err = validate(&cli, args).unwrap_err();
        assert!(matches!(err, BinError::Configuration(_)));
    }
}
