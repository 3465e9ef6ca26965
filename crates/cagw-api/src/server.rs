// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use cagw_config::ApiConfig;
use cagw_engine::EnrollmentService;

use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::state::AppState;

// =============================================================================
// ApiServer
// =============================================================================

/// The administrative API server.
#[derive(Debug)]
pub struct ApiServer {
    state: AppState,
    config: Arc<ApiConfig>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Creates a server for `service` with the given configuration.
    pub fn from_service(service: EnrollmentService, config: ApiConfig) -> Self {
        Self::new(AppState::new(service, config))
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.config.request_timeout,
            ));

        Router::new()
            .route("/health", get(handlers::health))
            // Configuration
            .route("/v1/config", get(handlers::list_roles))
            .route(
                "/v1/config/{role}",
                post(handlers::write_role)
                    .get(handlers::read_role)
                    .delete(handlers::delete_role),
            )
            .route("/v1/config/{role}/profiles", get(handlers::list_profiles))
            .route(
                "/v1/config/{role}/profiles/{profile_id}",
                post(handlers::write_profile).get(handlers::read_profile),
            )
            // Enrollment
            .route(
                "/v1/issue/{role}",
                post(handlers::issue).get(handlers::list_issued),
            )
            .route("/v1/issue/{role}/{serial}", get(handlers::read_issued))
            .route(
                "/v1/sign/{role}",
                post(handlers::sign).get(handlers::list_signed),
            )
            .route("/v1/sign/{role}/{serial}", get(handlers::read_signed))
            .fallback(fallback)
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Runs the server until `shutdown_signal` resolves.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.config.socket_addr();
        let router = self.router();

        info!("Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server shutdown complete");

        Ok(())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.socket_addr()
    }
}

async fn fallback() -> ApiError {
    ApiError::not_found("Route")
}

// =============================================================================
// Tests
// =============================================================================
