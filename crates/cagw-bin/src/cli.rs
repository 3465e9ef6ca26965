// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `serve`: Start the administrative API (default)
//! - `validate`: Validate configuration file
//! - `version`: Show version information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// CAGW - Certificate-Authority Gateway enrollment engine
///
/// Obtains X.509 certificates from an Entrust CA Gateway over mutual TLS,
/// either by generating a key pair (issue) or by signing a CSR (sign).
#[derive(Parser, Debug)]
#[command(
    name = "cagw",
    author = "Sylvex <contact@sylvex.io>",
    version = cagw_core::VERSION,
    about = "Certificate-Authority Gateway enrollment engine",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "cagw.yaml",
        env = "CAGW_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        default_value = "info",
        env = "CAGW_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json, compact)
    #[arg(long, default_value = "text", env = "CAGW_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Enable quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the CAGW CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the administrative API
    ///
    /// This is the default command when no subcommand is specified.
    /// Runs until SIGINT or SIGTERM.
    Serve(ServeArgs),

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration file without starting the service.
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `serve` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// Use in-memory storage regardless of the configured backend
    #[arg(long)]
    pub memory: bool,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Strict mode: treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Serve` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Serve(ServeArgs::default()))
    }

    /// Check if verbose logging is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose && !self.quiet
    }

    /// Get the effective log level based on flags.
    pub fn effective_log_level(&self) -> &str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            &self.log_level
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command() {
        let cli = Cli::parse_from(["cagw"]);
        assert!(cli.command.is_none());
        assert!(matches!(cli.effective_command(), Commands::Serve(_)));
        assert_eq!(cli.config, PathBuf::from("cagw.yaml"));
    }

    #[test]
    fn test_serve_command() {
        let cli = Cli::parse_from(["cagw", "serve", "--memory"]);
        match cli.command {
            Some(Commands::Serve(args)) => assert!(args.memory),
            other => panic!("Expected Serve command, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_command() {
        let cli = Cli::parse_from(["cagw", "validate", "--show-config", "-f", "json"]);
        if let Some(Commands::Validate(args)) = cli.command {
            assert!(args.show_config);
            assert_eq!(args.format, OutputFormat::Json);
            assert!(!args.strict);
        } else {
            panic!("Expected Validate command");
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::parse_from(["cagw", "validate", "-c", "/etc/cagw/cagw.toml"]);
        assert_eq!(cli.config, PathBuf::from("/etc/cagw/cagw.toml"));
    }

    #[test]
    fn test_log_flags() {
        let cli = Cli::parse_from(["cagw", "-l", "trace", "--log-format", "json"]);
        assert_eq!(cli.effective_log_level(), "trace");
        assert_eq!(cli.log_format, LogFormat::Json);

        let cli = Cli::parse_from(["cagw", "-q"]);
        assert_eq!(cli.effective_log_level(), "warn");
        assert!(!cli.is_verbose());

        let cli = Cli::parse_from(["cagw", "-v"]);
        assert_eq!(cli.effective_log_level(), "debug");
        assert!(cli.is_verbose());
    }

    #[test]
    fn test_quiet_wins_over_verbose() {
        let cli = Cli::parse_from(["cagw", "-q", "-v"]);
        assert_eq!(cli.effective_log_level(), "warn");
        assert!(!cli.is_verbose());
    }
}
