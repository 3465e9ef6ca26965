// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::cli::Cli;
use crate::error::BinResult;

/// Prints component versions and build information.
pub fn version(_cli: &Cli) -> BinResult<()> {
    println!("CAGW - Certificate-Authority Gateway enrollment engine");
    println!();
    println!("Version Information:");
    println!("  cagw-bin:    {}", crate::VERSION);
    println!("  cagw-core:   {}", cagw_core::VERSION);
    println!("  cagw-config: {}", cagw_config::VERSION);
    println!("  cagw-client: {}", cagw_client::VERSION);
    println!("  cagw-engine: {}", cagw_engine::VERSION);
    println!("  cagw-api:    {}", cagw_api::VERSION);
    println!();
    println!("Build Information:");
    println!("  Target:       {}", std::env::consts::ARCH);
    println!("  OS:           {}", std::env::consts::OS);
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");

    Ok(())
}
