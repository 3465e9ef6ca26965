// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Enrollment and certificate read handlers.

use axum::{extract::State, Json};

use cagw_core::model::CertificateRecord;
use cagw_engine::{IssueRequest, SignRequest};

use crate::error::ApiResult;
use crate::extractors::{RolePath, SerialPath, ValidatedJson};
use crate::response::{ApiResponse, KeysResponse};
use crate::state::AppState;

// =============================================================================
// Issue
// =============================================================================

/// POST /v1/issue/{role}
///
/// Issues a new key pair and certificate through the gateway.
pub async fn issue(
    State(state): State<AppState>,
    RolePath(role): RolePath,
    ValidatedJson(request): ValidatedJson<IssueRequest>,
) -> ApiResult<Json<ApiResponse<CertificateRecord>>> {
    let record = state.service().issue(&role, request).await?;
    Ok(Json(ApiResponse::success(record)))
}

/// GET /v1/issue/{role}
pub async fn list_issued(
    State(state): State<AppState>,
    RolePath(role): RolePath,
) -> ApiResult<Json<ApiResponse<KeysResponse>>> {
    let serials = state.service().list_issued(&role).await?;
    Ok(Json(ApiResponse::success(KeysResponse::new(serials))))
}

/// GET /v1/issue/{role}/{serial}
pub async fn read_issued(
    State(state): State<AppState>,
    SerialPath(role, serial): SerialPath,
) -> ApiResult<Json<ApiResponse<CertificateRecord>>> {
    let record = state.service().read_issued(&role, &serial).await?;
    Ok(Json(ApiResponse::success(record)))
}

// =============================================================================
// Sign
// =============================================================================

/// POST /v1/sign/{role}
///
/// Has the gateway sign the supplied CSR.
pub async fn sign(
    State(state): State<AppState>,
    RolePath(role): RolePath,
    ValidatedJson(request): ValidatedJson<SignRequest>,
) -> ApiResult<Json<ApiResponse<CertificateRecord>>> {
    let record = state.service().sign(&role, request).await?;
    Ok(Json(ApiResponse::success(record)))
}

/// GET /v1/sign/{role}
pub async fn list_signed(
    State(state): State<AppState>,
    RolePath(role): RolePath,
) -> ApiResult<Json<ApiResponse<KeysResponse>>> {
    let serials = state.service().list_signed(&role).await?;
    Ok(Json(ApiResponse::success(KeysResponse::new(serials))))
}

/// GET /v1/sign/{role}/{serial}
pub async fn read_signed(
    State(state): State<AppState>,
    SerialPath(role, serial): SerialPath,
) -> ApiResult<Json<ApiResponse<CertificateRecord>>> {
    let record = state.service().read_signed(&role, &serial).await?;
    Ok(Json(ApiResponse::success(record)))
}
