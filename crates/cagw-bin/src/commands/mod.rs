// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.
//!
//! - `serve`: Run the administrative API
//! - `validate`: Validate configuration file
//! - `version`: Show version information

mod serve;
mod validate;
mod version;

pub use serve::serve;
pub use validate::{validate, validation_report};
pub use version::version;

use crate::cli::{Cli, Commands};
use crate::error::BinResult;

/// Executes the command selected on the command line.
pub async fn execute(cli: Cli) -> BinResult<()> {
    match cli.effective_command() {
        Commands::Serve(args) => serve::serve(&cli, args).await,
        Commands::Validate(args) => validate::validate(&cli, args),
        Commands::Version => version::version(&cli),
    }
}
