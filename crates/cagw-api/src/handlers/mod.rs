// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`health`]: liveness
//! - [`config`]: role and profile configuration
//! - [`certs`]: issue, sign and certificate reads

mod certs;
mod config;
mod health;

pub use certs::*;
pub use config::*;
pub use health::*;
