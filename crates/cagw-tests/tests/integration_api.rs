// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # API Integration Tests
//!
//! Drives the administrative router in-process over the mock gateway:
//!
//! - Role and profile configuration endpoints
//! - Issue and sign endpoints, including list-valued fields
//! - Error mapping to status codes and error codes
//!
//! ## Test Categories
//!
//! - `test_config_*`: Configuration endpoints
//! - `test_enroll_*`: Enrollment endpoints
//! - `test_error_*`: Error responses

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use cagw_api::ApiServer;
use cagw_config::ApiConfig;
use cagw_core::subject::{SAN_DNS, SAN_IP};
use cagw_tests::prelude::*;

// =============================================================================
// Test Helpers
// =============================================================================

struct TestApi {
    router: Router,
    engine: TestEngine,
}

impl TestApi {
    fn new() -> Self {
        init_test_logging();
        let engine = TestEngine::builder().build();
        let router = ApiServer::from_service(engine.service.clone(), ApiConfig::default()).router();
        Self { router, engine }
    }

    fn pki(&self) -> &Arc<TestPki> {
        &self.engine.pki
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Configures the role and TLS profile through the API.
    async fn configured() -> Self {
        let api = Self::new();
        let role = RoleRequestBuilder::new(api.pki()).profile_id(TLS_PROFILE).to_json();
        let (status, _) = api.post("/v1/config/web", role).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = api
            .post(
                "/v1/config/web/profiles/prof-tls",
                json!({ "ttl": "1h", "max_ttl": 86400, "common_name_variable": "cn" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        api
    }
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[tokio::test]
async fn test_config_role_lifecycle() {
    let api = TestApi::new();
    let role = RoleRequestBuilder::new(api.pki()).profile_id(TLS_PROFILE).to_json();

    let (status, body) = api.post("/v1/config/web", role).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["ca_id"], TEST_CA_ID);
    assert_eq!(body["data"]["profiles"][1]["id"], SMIME_PROFILE);
    assert!(body["data"].get("pem_bundle").is_none());

    let (_, body) = api.get("/v1/config").await;
    assert_eq!(body["data"]["keys"], json!(["web"]));

    let (status, body) = api.get("/v1/config/web").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["profile_id"], TLS_PROFILE);

    let request = Request::delete("/v1/config/web").body(Body::empty()).unwrap();
    let (status, body) = api.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], "web");

    let (status, _) = api.get("/v1/config/web").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_config_profile_path_wins() {
    let api = TestApi::configured().await;

    let (status, body) = api
        .post(
            "/v1/config/web/profiles/prof-smime",
            json!({ "profile_id": "prof-tls", "ttl": 7200 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], SMIME_PROFILE);

    let (_, body) = api.get("/v1/config/web/profiles").await;
    assert_eq!(body["data"]["keys"], json!([SMIME_PROFILE, TLS_PROFILE]));

    let (status, body) = api.get("/v1/config/web/profiles/prof-tls").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["common_name_variable"], "cn");
}

#[tokio::test]
async fn test_config_invalid_credentials() {
    let api = TestApi::new();
    let mut role = RoleRequestBuilder::new(api.pki()).to_json();
    role["pem_bundle"] = json!(api.pki().client_cert_pem());
    role["private_key"] = json!(TestPki::generate().client_key_pem());

    let (status, body) = api.post("/v1/config/web", role).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "TLS_CONFIG_ERROR");
    assert_eq!(api.engine.gateway.request_count(), 0);
}

#[tokio::test]
async fn test_config_encoded_slash_cannot_reach_profile_record() {
    let api = TestApi::configured().await;
    let (_, before) = api.get("/v1/config/web/profiles/prof-tls").await;
    let requests = api.engine.gateway.request_count();

    let role = RoleRequestBuilder::new(api.pki()).to_json();
    let (status, body) = api.post("/v1/config/web%2Fprofiles%2Fprof-tls", role).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(api.engine.gateway.request_count(), requests);

    let (status, after) = api.get("/v1/config/web/profiles/prof-tls").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["data"], before["data"]);

    api.post("/v1/issue/web", json!({ "subject_variables": "cn=host.example.com" }))
        .await;
    let request = api.engine.gateway.last_enrollment().unwrap();
    assert_eq!(
        request.optional_certificate_request_details.validity_period,
        "PT60M"
    );
}

#[tokio::test]
async fn test_config_role_names_rejected() {
    let api = TestApi::configured().await;

    for uri in [
        "/v1/config/..",
        "/v1/config/.%2E",
        "/v1/config/web%2F",
        "/v1/config/%2Fweb",
        "/v1/config/web%2F%2Fapi",
        "/v1/config/web%2F..%2Fapi",
        "/v1/config/web%20servers",
    ] {
        let role = RoleRequestBuilder::new(api.pki()).to_json();
        let (status, body) = api.post(uri, role).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR", "{uri}");
    }

    let (_, body) = api.get("/v1/config").await;
    assert_eq!(body["data"]["keys"], json!(["web"]));
}

#[tokio::test]
async fn test_config_profile_and_serial_segments_rejected() {
    let api = TestApi::configured().await;

    let (status, body) = api
        .post("/v1/config/web/profiles/prof-tls%2F..%2Fx", json!({ "ttl": 60 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = api.get("/v1/config/web%2Fprofiles/profiles/prof-tls").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = api.get("/v1/issue/web/12%2F..%2F34").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = api.get("/v1/sign/web%2F/98765").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Enrollment Tests
// =============================================================================

#[tokio::test]
async fn test_enroll_issue_and_read_back() {
    let api = TestApi::configured().await;

    let (status, body) = api
        .post(
            "/v1/issue/web",
            json!({
                "subject_variables": "cn=host.example.com,o=Entrust",
                "ip_sans": "10.0.0.1, 10.0.0.2",
                "ttl": "2h",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["serial_number"], ISSUE_SERIAL.to_string());
    assert_eq!(body["data"]["private_key_type"], "ec");
    assert_pem_block(body["data"]["private_key"].as_str().unwrap(), "EC PRIVATE KEY");

    let request = api.engine.gateway.last_enrollment().unwrap();
    assert_validity_period(&request, "PT120M");
    assert_alt_names(
        &request,
        &[
            (SAN_DNS, "host.example.com"),
            (SAN_IP, "10.0.0.1"),
            (SAN_IP, "10.0.0.2"),
        ],
    );

    let (_, listing) = api.get("/v1/issue/web").await;
    assert_eq!(listing["data"]["keys"], json!(["123456"]));

    let (status, stored) = api.get("/v1/issue/web/123456").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["data"]["certificate"], body["data"]["certificate"]);
}

#[tokio::test]
async fn test_enroll_sign_der() {
    let api = TestApi::configured().await;
    let csr = csr_pem(KeyAlgorithm::Ec, "signed.example.com");

    let (status, body) = api
        .post("/v1/sign/web", json!({ "csr": csr, "format": "der" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["serial_number"], SIGN_SERIAL.to_string());
    assert_eq!(body["data"]["format"], "der");
    assert!(body["data"].get("private_key").is_none());

    let (status, _) = api.get("/v1/sign/web/98765").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = api.get("/v1/issue/web/98765").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Error Tests
// =============================================================================

#[tokio::test]
async fn test_error_gateway_failure() {
    let api = TestApi::configured().await;
    api.engine.gateway.fail_next(400, "invalid profile");

    let (status, body) = api
        .post("/v1/issue/web", json!({ "subject_variables": "cn=host.example.com" }))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "GATEWAY_ERROR");
    assert_eq!(body["error"]["message"], "Error from gateway: invalid profile (400)");

    let (_, listing) = api.get("/v1/issue/web").await;
    assert_eq!(listing["data"]["keys"], json!([]));
}

#[tokio::test]
async fn test_error_missing_subject() {
    let api = TestApi::configured().await;
    let (status, body) = api.post("/v1/issue/web", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_error_issue_without_role() {
    let api = TestApi::new();
    let (status, body) = api
        .post("/v1/issue/web", json!({ "subject_variables": "cn=host.example.com" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_error_network_timeout() {
    let api = TestApi::configured().await;
    api.engine.gateway.push_outcome(ScriptedOutcome::Timeout);

    let (status, body) = api
        .post("/v1/issue/web", json!({ "subject_variables": "cn=host.example.com" }))
        .await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"]["code"], "NETWORK_ERROR");
}
