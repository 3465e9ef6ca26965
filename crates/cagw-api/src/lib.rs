// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # cagw-api
//!
//! Administrative HTTP API for the CAGW enrollment engine.
//!
//! Every route answers `{"success":true,"data":...}` on success or
//! `{"error":{"code","message","details"}}` on failure.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET | `/health` | liveness |
//! | GET | `/v1/config` | list roles |
//! | POST / GET / DELETE | `/v1/config/{role}` | write / read / delete role |
//! | GET | `/v1/config/{role}/profiles` | list profiles |
//! | POST / GET | `/v1/config/{role}/profiles/{profile_id}` | write / read profile |
//! | POST / GET | `/v1/issue/{role}` | issue / list issued |
//! | GET | `/v1/issue/{role}/{serial}` | read issued |
//! | POST / GET | `/v1/sign/{role}` | sign / list signed |
//! | GET | `/v1/sign/{role}/{serial}` | read signed |

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use response::ApiResponse;
pub use server::ApiServer;
pub use state::AppState;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
