// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! [`MockGateway`] stands in for the CA Gateway behind the
//! [`GatewayTransport`] seam.
//!
//! - Enrollments are answered from the request itself: PKCS12 bodies are
//!   sealed with the request's own password, X509 bodies sign the request's CSR
//! - Profile discovery is answered from canned documents
//! - Responses can be scripted ahead of time to inject failures
//! - Every request is recorded for verification

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use openssl::x509::X509Req;
use parking_lot::Mutex;

use cagw_client::{GatewayRequest, GatewayTransport, HttpMethod, RawResponse};
use cagw_core::enrollment::EnrollmentRequest;
use cagw_core::error::{CagwResult, NetworkError};
use cagw_core::model::RoleConfig;
use cagw_core::wire::{GatewayProfile, ProfileSummary};

use super::fixtures::{GatewayFixtures, KeyAlgorithm, TestPki, ISSUE_SERIAL, SIGN_SERIAL};

// =============================================================================
// Recorded Requests
// =============================================================================

/// One request seen by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Gateway URL from the role the request was sent for.
    pub url: String,
    /// The request.
    pub request: GatewayRequest,
}

impl RecordedRequest {
    /// Parses the body as an enrollment request.
    pub fn enrollment(&self) -> Option<EnrollmentRequest> {
        self.request
            .body
            .as_deref()
            .and_then(|body| serde_json::from_str(body).ok())
    }
}

/// A pre-programmed outcome, consumed in order.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Answer with this status and body.
    Respond(RawResponse),
    /// Fail at the transport level.
    Unreachable,
    /// Fail with a timeout.
    Timeout,
}

// =============================================================================
// MockGateway
// =============================================================================

/// A scripted, recording gateway transport.
#[derive(Debug)]
pub struct MockGateway {
    pki: Arc<TestPki>,
    profiles: Vec<GatewayProfile>,
    summaries: Vec<ProfileSummary>,
    key_algorithm: Mutex<KeyAlgorithm>,
    next_issue_serial: AtomicU32,
    next_sign_serial: AtomicU32,
    script: Mutex<VecDeque<ScriptedOutcome>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockGateway {
    /// Creates a gateway backed by `pki`, serving the canned profiles.
    pub fn new(pki: Arc<TestPki>) -> Self {
        Self {
            pki,
            profiles: GatewayFixtures::profiles(),
            summaries: GatewayFixtures::profile_summaries(),
            key_algorithm: Mutex::new(KeyAlgorithm::Ec),
            next_issue_serial: AtomicU32::new(ISSUE_SERIAL),
            next_sign_serial: AtomicU32::new(SIGN_SERIAL),
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns the PKI the mock signs with.
    pub fn pki(&self) -> &TestPki {
        &self.pki
    }

    /// Sets the key algorithm for issued key pairs.
    pub fn set_key_algorithm(&self, alg: KeyAlgorithm) {
        *self.key_algorithm.lock() = alg;
    }

    /// Queues a response for the next request.
    pub fn respond_next(&self, status: u16, body: impl Into<String>) {
        self.script
            .lock()
            .push_back(ScriptedOutcome::Respond(RawResponse::new(status, body)));
    }

    /// Queues a structured gateway error for the next request.
    pub fn fail_next(&self, status: u16, message: &str) {
        self.respond_next(status, GatewayFixtures::error_body(message, "E1"));
    }

    /// Queues an arbitrary outcome.
    pub fn push_outcome(&self, outcome: ScriptedOutcome) {
        self.script.lock().push_back(outcome);
    }

    /// All requests seen so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests seen so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Enrollment requests seen so far, in order.
    pub fn enrollments(&self) -> Vec<EnrollmentRequest> {
        self.requests
            .lock()
            .iter()
            .filter_map(RecordedRequest::enrollment)
            .collect()
    }

    /// The most recent enrollment request.
    pub fn last_enrollment(&self) -> Option<EnrollmentRequest> {
        self.enrollments().pop()
    }

    fn answer(&self, request: &GatewayRequest) -> RawResponse {
        let path = request.path.as_str();
        match request.method {
            HttpMethod::Post if path.ends_with("/enrollments") => self.enroll(request),
            HttpMethod::Get if path.ends_with("/profiles") => {
                let body = serde_json::json!({ "profiles": self.summaries });
                RawResponse::new(200, body.to_string())
            }
            HttpMethod::Get if path.contains("/profiles/") => {
                let id = path.rsplit('/').next().unwrap_or_default();
                match self.profiles.iter().find(|p| p.id == id) {
                    Some(profile) => {
                        RawResponse::new(200, serde_json::json!({ "profile": profile }).to_string())
                    }
                    None => RawResponse::new(
                        404,
                        GatewayFixtures::error_body(&format!("profile {} not found", id), "E404"),
                    ),
                }
            }
            _ => RawResponse::new(404, "no route"),
        }
    }

    fn enroll(&self, request: &GatewayRequest) -> RawResponse {
        let Some(enrollment) = request
            .body
            .as_deref()
            .and_then(|body| serde_json::from_str::<EnrollmentRequest>(body).ok())
        else {
            return RawResponse::new(400, GatewayFixtures::error_body("malformed request", "E400"));
        };

        let body = match enrollment.password() {
            Some(password) => {
                let serial = self.next_issue_serial.fetch_add(1, Ordering::SeqCst);
                let cn = first_common_name(&enrollment).unwrap_or("issued.example.com");
                let (leaf, key) = self.pki.issue_leaf(*self.key_algorithm.lock(), serial, cn);
                self.pki.pkcs12_body(&leaf, &key, password.expose())
            }
            None => {
                let csr = BASE64
                    .decode(&enrollment.csr)
                    .ok()
                    .and_then(|der| X509Req::from_der(&der).ok());
                let Some(csr) = csr else {
                    return RawResponse::new(400, GatewayFixtures::error_body("invalid csr", "E400"));
                };
                let serial = self.next_sign_serial.fetch_add(1, Ordering::SeqCst);
                super::fixtures::x509_body(&self.pki.sign_csr(&csr, serial))
            }
        };

        let envelope = serde_json::json!({
            "enrollment": { "id": "enr-1", "status": "GENERATED", "body": body },
            "message": { "message": "enrollment accepted" },
        });
        RawResponse::new(200, envelope.to_string())
    }
}

fn first_common_name(request: &EnrollmentRequest) -> Option<&str> {
    request
        .subject_variables
        .iter()
        .find(|v| v.kind.eq_ignore_ascii_case("cn"))
        .map(|v| v.value.as_str())
}

#[async_trait]
impl GatewayTransport for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn execute(&self, role: &RoleConfig, request: GatewayRequest) -> CagwResult<RawResponse> {
        self.requests.lock().push(RecordedRequest {
            url: role.url.clone(),
            request: request.clone(),
        });

        let scripted = self.script.lock().pop_front();
        match scripted {
            Some(ScriptedOutcome::Respond(response)) => Ok(response),
            Some(ScriptedOutcome::Unreachable) => {
                Err(NetworkError::request(role.endpoint(&request.path), "connection refused").into())
            }
            Some(ScriptedOutcome::Timeout) => {
                Err(NetworkError::timeout(role.endpoint(&request.path)).into())
            }
            None => Ok(self.answer(&request)),
        }
    }
}
