// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CAGW - Certificate-Authority Gateway enrollment engine
//!
//! Main binary entry point.

use cagw_bin::cli::Cli;
use cagw_bin::commands;
use cagw_bin::error::report_error_and_exit;
use cagw_bin::logging::init_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    init_logging(cli.effective_log_level(), cli.log_format);

    if let Err(err) = commands::execute(cli).await {
        report_error_and_exit(err);
    }
}
