// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use cagw_config::ApiConfig;
use cagw_engine::EnrollmentService;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// The enrollment service.
    pub service: EnrollmentService,
}

impl AppState {
    /// Creates the state.
    pub fn new(service: EnrollmentService, config: ApiConfig) -> Self {
        Self {
            config: Arc::new(config),
            service,
        }
    }

    /// Returns the enrollment service.
    pub fn service(&self) -> &EnrollmentService {
        &self.service
    }
}
