// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Health check handler.

use axum::{extract::State, response::IntoResponse, Json};

use crate::response::HealthResponse;
use crate::state::AppState;

/// GET /health
///
/// Liveness check. Returns 200 OK while the service is running.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let settings = state.service().settings();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        profile_policy: settings.profile_policy.to_string(),
        subject_syntax: settings.subject_syntax.to_string(),
    })
}
