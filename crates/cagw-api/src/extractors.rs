// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use axum::{
    extract::{rejection::PathRejection, FromRequestParts, Path},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use cagw_core::error::{CagwError, ValidationError};
use cagw_core::types::{ProfileId, RoleId, SerialNumber};

use crate::error::ApiError;

// =============================================================================
// Validated JSON Extractor
// =============================================================================

/// Extractor for JSON payloads.
///
/// Malformed JSON becomes a 400 in the API's error format rather than axum's
/// plain-text rejection.
pub struct ValidatedJson<T>(pub T);

impl<S, T> axum::extract::FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(
        req: axum::http::Request<axum::body::Body>,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e.body_text())))?;

        Ok(ValidatedJson(value))
    }
}

// =============================================================================
// Path Extractors
// =============================================================================

fn path_rejection(e: PathRejection) -> ApiError {
    ApiError::bad_request(format!("Invalid path: {}", e.body_text()))
}

fn invalid(e: ValidationError) -> ApiError {
    ApiError::from(CagwError::from(e))
}

/// Extractor for the leading `{role}` path segment.
///
/// Axum percent-decodes segments, so `web%2Fprofiles%2Fx` arrives as a single
/// value containing `/`; [`RoleId::parse`] rejects it with a 400.
pub struct RolePath(pub RoleId);

impl<S> FromRequestParts<S> for RolePath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(role) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(path_rejection)?;

        RoleId::parse(role).map(RolePath).map_err(invalid)
    }
}

/// Extractor for `{role}/profiles/{profile_id}` paths.
pub struct ProfilePath(pub RoleId, pub ProfileId);

impl<S> FromRequestParts<S> for ProfilePath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((role, profile)) = Path::<(String, String)>::from_request_parts(parts, state)
            .await
            .map_err(path_rejection)?;

        let role = RoleId::parse(role).map_err(invalid)?;
        let profile = ProfileId::parse(profile).map_err(invalid)?;
        Ok(ProfilePath(role, profile))
    }
}

/// Extractor for `{role}/{serial}` certificate paths.
pub struct SerialPath(pub RoleId, pub SerialNumber);

impl<S> FromRequestParts<S> for SerialPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((role, serial)) = Path::<(String, String)>::from_request_parts(parts, state)
            .await
            .map_err(path_rejection)?;

        let role = RoleId::parse(role).map_err(invalid)?;
        let serial = SerialNumber::parse(serial).map_err(invalid)?;
        Ok(SerialPath(role, serial))
    }
}
