// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Gateway API calls and outcome classification.
//!
//! | Call | Method | Path |
//! |------|--------|------|
//! | enroll | POST | `/v1/certificate-authorities/<caId>/enrollments` |
//! | list profiles | GET | `/v1/certificate-authorities/<caId>/profiles` |
//! | get profile | GET | `/v1/certificate-authorities/<caId>/profiles/<id>` |
//!
//! Status 200 is success. Anything else is parsed as the gateway's error
//! document and surfaced as a [`GatewayError`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use cagw_core::enrollment::EnrollmentRequest;
use cagw_core::error::{CagwResult, DecodeError, GatewayError};
use cagw_core::model::RoleConfig;
use cagw_core::types::{ProfileId, RoleId};
use cagw_core::wire::{
    Enrollment, EnrollmentResponse, ErrorResponse, GatewayProfile, ProfileResponse,
    ProfileSummary, ProfilesResponse,
};

use crate::transport::{GatewayRequest, GatewayTransport, RawResponse};

/// Returns the enrollments path for a CA.
pub fn enrollments_path(ca_id: &str) -> String {
    format!("/v1/certificate-authorities/{}/enrollments", ca_id)
}

/// Returns the profiles path for a CA.
pub fn profiles_path(ca_id: &str) -> String {
    format!("/v1/certificate-authorities/{}/profiles", ca_id)
}

/// Returns the path of one profile.
pub fn profile_path(ca_id: &str, profile: &ProfileId) -> String {
    format!("{}/{}", profiles_path(ca_id), profile)
}

// =============================================================================
// GatewayClient
// =============================================================================

/// Typed gateway operations over a [`GatewayTransport`].
#[derive(Debug, Clone)]
pub struct GatewayClient {
    transport: Arc<dyn GatewayTransport>,
}

impl GatewayClient {
    /// Creates a client over `transport`.
    pub fn new(transport: Arc<dyn GatewayTransport>) -> Self {
        Self { transport }
    }

    /// Submits an enrollment and returns the gateway's enrollment result.
    #[instrument(skip(self, config, request), fields(role = %role, profile = %request.profile_id))]
    pub async fn enroll(
        &self,
        role: &RoleId,
        config: &RoleConfig,
        request: &EnrollmentRequest,
    ) -> CagwResult<Enrollment> {
        let ca_id = config.effective_ca_id(role);
        let body = serde_json::to_string(request)
            .map_err(|e| DecodeError::envelope(format!("request could not be encoded: {}", e)))?;
        debug!(ca_id, request = %request.to_redacted_json(), "Submitting enrollment");

        let response = self
            .transport
            .execute(config, GatewayRequest::post(enrollments_path(ca_id), body))
            .await?;

        let envelope: EnrollmentResponse = parse_success(response)?;
        debug!(
            enrollment_id = %envelope.enrollment.id,
            status = %envelope.enrollment.status,
            "Enrollment accepted"
        );
        if envelope.enrollment.body.is_empty() {
            return Err(DecodeError::missing("an enrollment body").into());
        }
        Ok(envelope.enrollment)
    }

    /// Lists the profiles the gateway offers for the role's CA.
    #[instrument(skip(self, config), fields(role = %role))]
    pub async fn list_profiles(
        &self,
        role: &RoleId,
        config: &RoleConfig,
    ) -> CagwResult<Vec<ProfileSummary>> {
        let ca_id = config.effective_ca_id(role);
        let response = self
            .transport
            .execute(config, GatewayRequest::get(profiles_path(ca_id)))
            .await?;
        let profiles: ProfilesResponse = parse_success(response)?;
        debug!(count = profiles.profiles.len(), "Discovered gateway profiles");
        Ok(profiles.profiles)
    }

    /// Fetches one profile's requirements.
    #[instrument(skip(self, config), fields(role = %role, profile = %profile))]
    pub async fn get_profile(
        &self,
        role: &RoleId,
        config: &RoleConfig,
        profile: &ProfileId,
    ) -> CagwResult<GatewayProfile> {
        let ca_id = config.effective_ca_id(role);
        let response = self
            .transport
            .execute(config, GatewayRequest::get(profile_path(ca_id, profile)))
            .await?;
        let document: ProfileResponse = parse_success(response)?;
        Ok(document.profile)
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Returns the body of a 200 response, or the gateway error it carries.
pub fn classify(response: RawResponse) -> Result<String, GatewayError> {
    if response.status == 200 {
        return Ok(response.body);
    }

    match serde_json::from_str::<ErrorResponse>(&response.body) {
        Ok(document) => {
            warn!(
                status = response.status,
                code = %document.error.code,
                "Gateway returned an error"
            );
            Err(GatewayError::Structured {
                message: document.error.message,
                code: (!document.error.code.is_empty()).then_some(document.error.code),
                status: response.status,
            })
        }
        Err(e) => {
            warn!(status = response.status, "Gateway returned an unparsable error");
            Err(GatewayError::unparsable(response.status, e.to_string()))
        }
    }
}

fn parse_success<T: DeserializeOwned>(response: RawResponse) -> CagwResult<T> {
    let body = classify(response)?;
    serde_json::from_str(&body).map_err(|e| DecodeError::envelope(e.to_string()).into())
}

// =============================================================================
// Tests
// =============================================================================
