// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Abstract transport to the gateway.
//!
//! [`GatewayTransport`] carries one request to the gateway named by a role
//! and returns the raw status and body. Classification of the outcome is left
//! to [`GatewayClient`](crate::gateway::GatewayClient).
//!
//! # Implementors
//!
//! - [`HttpsTransport`]: mutual TLS over HTTPS, one client per call

use std::fmt;

use async_trait::async_trait;
use tracing::trace;

use cagw_core::error::{CagwResult, NetworkError};
use cagw_core::model::RoleConfig;

use crate::tls::TlsClientFactory;

// =============================================================================
// Request / Response
// =============================================================================

/// HTTP method used against the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET.
    Get,
    /// POST with a JSON body.
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// One gateway request, relative to the role's base URL.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayRequest {
    /// Method.
    pub method: HttpMethod,
    /// Path starting with `/`.
    pub path: String,
    /// JSON body for POST.
    pub body: Option<String>,
}

impl GatewayRequest {
    /// Creates a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            body: None,
        }
    }

    /// Creates a POST request with a JSON body.
    pub fn post(path: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            body: Some(body.into()),
        }
    }
}

// The body carries the enrollment password.
impl fmt::Debug for GatewayRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("body_len", &self.body.as_ref().map(String::len))
            .finish()
    }
}

/// Raw gateway response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body text.
    pub body: String,
}

impl RawResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

// =============================================================================
// GatewayTransport Trait
// =============================================================================

/// Carries requests to a role's gateway.
#[async_trait]
pub trait GatewayTransport: Send + Sync + fmt::Debug {
    /// Returns the transport name for logging.
    fn name(&self) -> &'static str;

    /// Sends `request` to the gateway configured in `role`.
    ///
    /// Non-200 statuses are returned as `Ok`; only transport failures and
    /// TLS setup failures are errors.
    async fn execute(&self, role: &RoleConfig, request: GatewayRequest) -> CagwResult<RawResponse>;
}

// =============================================================================
// HttpsTransport
// =============================================================================

/// Mutual-TLS HTTPS transport.
#[derive(Debug, Clone, Default)]
pub struct HttpsTransport {
    factory: TlsClientFactory,
}

impl HttpsTransport {
    /// Creates a transport using `factory` for client construction.
    pub fn new(factory: TlsClientFactory) -> Self {
        Self { factory }
    }
}

#[async_trait]
impl GatewayTransport for HttpsTransport {
    fn name(&self) -> &'static str {
        "https"
    }

    async fn execute(&self, role: &RoleConfig, request: GatewayRequest) -> CagwResult<RawResponse> {
        let client = self.factory.build(role)?;
        let url = role.endpoint(&request.path);

        let builder = match request.method {
            HttpMethod::Get => client.get(&url),
            HttpMethod::Post => client
                .post(&url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(request.body.unwrap_or_default()),
        };

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                NetworkError::timeout(&url)
            } else {
                NetworkError::request(&url, e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                NetworkError::timeout(&url)
            } else {
                NetworkError::body(e.to_string())
            }
        })?;

        trace!(method = %request.method, url = %url, status, body = %body, "Gateway response");
        Ok(RawResponse { status, body })
    }
}
