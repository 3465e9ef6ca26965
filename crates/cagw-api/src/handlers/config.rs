// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role and profile configuration handlers.

use axum::{extract::State, Json};

use cagw_core::model::ProfileConfig;
use cagw_engine::{RoleView, WriteProfileRequest, WriteRoleRequest};

use crate::error::ApiResult;
use crate::extractors::{ProfilePath, RolePath, ValidatedJson};
use crate::response::{ApiResponse, DeletedResponse, KeysResponse};
use crate::state::AppState;

// =============================================================================
// Roles
// =============================================================================

/// GET /v1/config
///
/// Lists configured roles.
pub async fn list_roles(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<KeysResponse>>> {
    let roles = state.service().list_roles().await?;
    Ok(Json(ApiResponse::success(KeysResponse::new(roles))))
}

/// POST /v1/config/{role}
///
/// Validates the credentials, discovers the gateway's profiles and stores
/// the role.
pub async fn write_role(
    State(state): State<AppState>,
    RolePath(role): RolePath,
    ValidatedJson(request): ValidatedJson<WriteRoleRequest>,
) -> ApiResult<Json<ApiResponse<RoleView>>> {
    let view = state.service().write_role(&role, request).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// GET /v1/config/{role}
pub async fn read_role(
    State(state): State<AppState>,
    RolePath(role): RolePath,
) -> ApiResult<Json<ApiResponse<RoleView>>> {
    let view = state.service().read_role(&role).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// DELETE /v1/config/{role}
pub async fn delete_role(
    State(state): State<AppState>,
    RolePath(role): RolePath,
) -> ApiResult<Json<ApiResponse<DeletedResponse>>> {
    state.service().delete_role(&role).await?;
    Ok(Json(ApiResponse::success(DeletedResponse {
        deleted: role.into_inner(),
    })))
}

// =============================================================================
// Profiles
// =============================================================================

/// GET /v1/config/{role}/profiles
pub async fn list_profiles(
    State(state): State<AppState>,
    RolePath(role): RolePath,
) -> ApiResult<Json<ApiResponse<KeysResponse>>> {
    let profiles = state.service().list_profiles(&role).await?;
    Ok(Json(ApiResponse::success(KeysResponse::new(profiles))))
}

/// POST /v1/config/{role}/profiles/{profile_id}
///
/// The path's profile id overrides any id in the body.
pub async fn write_profile(
    State(state): State<AppState>,
    ProfilePath(role, profile_id): ProfilePath,
    ValidatedJson(mut request): ValidatedJson<WriteProfileRequest>,
) -> ApiResult<Json<ApiResponse<ProfileConfig>>> {
    request.profile_id = Some(profile_id.into_inner());
    let profile = state.service().write_profile(&role, request).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// GET /v1/config/{role}/profiles/{profile_id}
pub async fn read_profile(
    State(state): State<AppState>,
    ProfilePath(role, profile_id): ProfilePath,
) -> ApiResult<Json<ApiResponse<ProfileConfig>>> {
    let profile = state.service().read_profile(&role, &profile_id).await?;
    Ok(Json(ApiResponse::success(profile)))
}
