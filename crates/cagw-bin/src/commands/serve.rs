// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `serve` command.

use tracing::info;

use crate::cli::{Cli, ServeArgs};
use crate::error::BinResult;
use crate::runtime::RuntimeBuilder;

/// Loads the configuration and serves until shutdown.
pub async fn serve(cli: &Cli, args: ServeArgs) -> BinResult<()> {
    info!(config = %cli.config.display(), "Loading configuration");

    let runtime = RuntimeBuilder::new()
        .config_path(&cli.config)
        .memory_storage(args.memory)
        .build()?;

    runtime.run().await
}
