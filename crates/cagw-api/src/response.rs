// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// ApiResponse
// =============================================================================

/// Generic API response wrapper.
///
/// Provides consistent response structure across all endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation was successful.
    pub success: bool,
    /// Response data (if successful).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Creates a successful response with data.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

// =============================================================================
// Typed Responses
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Version string.
    pub version: String,
    /// Missing-profile policy in effect.
    pub profile_policy: String,
    /// Subject syntax in effect.
    pub subject_syntax: String,
}

/// A list of keys, such as role names or serial numbers.
#[derive(Debug, Serialize, Deserialize)]
pub struct KeysResponse {
    /// The keys, in storage order.
    pub keys: Vec<String>,
}

impl KeysResponse {
    /// Wraps a list of keys.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self {
            keys: keys.into_iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Acknowledges a deletion.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    /// The deleted key.
    pub deleted: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_success() {
        let response = ApiResponse::success(42);
        assert!(response.success);
        assert_eq!(response.data, Some(42));
    }

    #[test]
    fn test_keys_response() {
        let keys = KeysResponse::new(["a", "b"]);
        assert_eq!(
            serde_json::to_string(&ApiResponse::success(keys)).unwrap(),
            r#"{"success":true,"data":{"keys":["a","b"]}}"#
        );
    }
}
