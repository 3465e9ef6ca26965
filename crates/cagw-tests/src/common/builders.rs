// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Builders
//!
//! Fluent builders for administrative requests, and [`TestEngine`], an
//! enrollment service wired to in-memory storage and a [`MockGateway`].

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use cagw_core::types::{ProfileId, ProfilePolicy, RoleId, SubjectSyntax};
use cagw_engine::{
    EngineSettings, EnrollmentService, IssueRequest, SignRequest, TtlInput, WriteProfileRequest,
    WriteRoleRequest,
};
use cagw_store::{FileSystemStorage, MemoryStorage, StorageBackend};

use super::fixtures::{TestPki, GATEWAY_URL, TEST_CA_ID};
use super::mocks::MockGateway;

// =============================================================================
// WriteRoleRequest Builder
// =============================================================================

/// Builds role writes from a [`TestPki`].
#[derive(Debug, Clone)]
pub struct RoleRequestBuilder {
    request: WriteRoleRequest,
}

impl RoleRequestBuilder {
    /// Combined certificate+key bundle, the mock CA as trust root.
    pub fn new(pki: &TestPki) -> Self {
        Self {
            request: WriteRoleRequest {
                pem_bundle: Some(pki.client_bundle_pem()),
                private_key: None,
                url: Some(GATEWAY_URL.to_string()),
                ca_certs: Some(pki.ca_pem()),
                ca_id: Some(TEST_CA_ID.to_string()),
                profile_id: None,
            },
        }
    }

    /// Supplies the key separately from the certificate.
    pub fn separate_key(mut self, pki: &TestPki) -> Self {
        self.request.pem_bundle = Some(pki.client_cert_pem());
        self.request.private_key = Some(pki.client_key_pem());
        self
    }

    /// Sets the default profile.
    pub fn profile_id(mut self, profile: &str) -> Self {
        self.request.profile_id = Some(profile.to_string());
        self
    }

    /// Sets the CA id; `None` falls back to the role name.
    pub fn ca_id(mut self, ca_id: Option<&str>) -> Self {
        self.request.ca_id = ca_id.map(str::to_string);
        self
    }

    /// Overrides the gateway URL.
    pub fn url(mut self, url: &str) -> Self {
        self.request.url = Some(url.to_string());
        self
    }

    /// Overrides the CA bundle.
    pub fn ca_certs(mut self, pem: &str) -> Self {
        self.request.ca_certs = Some(pem.to_string());
        self
    }

    /// Returns the request.
    pub fn build(self) -> WriteRoleRequest {
        self.request
    }

    /// Returns the request as a JSON body.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "pem_bundle": self.request.pem_bundle,
            "private_key": self.request.private_key,
            "url": self.request.url,
            "cacerts": self.request.ca_certs,
            "ca_id": self.request.ca_id,
            "profile_id": self.request.profile_id,
        })
    }
}

// =============================================================================
// Enrollment Request Builders
// =============================================================================

/// Builds issue requests.
#[derive(Debug, Clone, Default)]
pub struct IssueRequestBuilder {
    request: IssueRequest,
}

impl IssueRequestBuilder {
    /// Starts an issue request for `subject`.
    pub fn new(subject: &str) -> Self {
        Self {
            request: IssueRequest {
                subject_variables: Some(subject.to_string()),
                ..Default::default()
            },
        }
    }

    /// Names the profile explicitly.
    pub fn profile(mut self, profile: &str) -> Self {
        self.request.profile = Some(profile.to_string());
        self
    }

    /// Requests a TTL in seconds.
    pub fn ttl_secs(mut self, secs: u64) -> Self {
        self.request.ttl = Some(TtlInput::Seconds(secs));
        self
    }

    /// Requests a TTL as a duration string.
    pub fn ttl(mut self, text: &str) -> Self {
        self.request.ttl = Some(TtlInput::Text(text.to_string()));
        self
    }

    /// Adds an explicit `type=value` SAN token.
    pub fn alt_name(mut self, token: &str) -> Self {
        self.request.alt_names.push(token.to_string());
        self
    }

    /// Adds an untyped supplementary name.
    pub fn other_name(mut self, name: &str) -> Self {
        self.request.other_names.push(name.to_string());
        self
    }

    /// Adds an IP SAN.
    pub fn ip_san(mut self, ip: &str) -> Self {
        self.request.ip_sans.push(ip.to_string());
        self
    }

    /// Adds a URI SAN.
    pub fn uri_san(mut self, uri: &str) -> Self {
        self.request.uri_sans.push(uri.to_string());
        self
    }

    /// Skips common-name derived SANs.
    pub fn exclude_cn(mut self) -> Self {
        self.request.exclude_cn_from_sans = true;
        self
    }

    /// Sets the output format.
    pub fn format(mut self, format: &str) -> Self {
        self.request.format = Some(format.to_string());
        self
    }

    /// Returns the request.
    pub fn build(self) -> IssueRequest {
        self.request
    }
}

/// Builds sign requests.
#[derive(Debug, Clone, Default)]
pub struct SignRequestBuilder {
    request: SignRequest,
}

impl SignRequestBuilder {
    /// Starts a sign request for `csr_pem`.
    pub fn new(csr_pem: &str) -> Self {
        Self {
            request: SignRequest {
                csr: Some(csr_pem.to_string()),
                ..Default::default()
            },
        }
    }

    /// Sets the subject override.
    pub fn subject(mut self, subject: &str) -> Self {
        self.request.subject_variables = Some(subject.to_string());
        self
    }

    /// Names the profile explicitly.
    pub fn profile(mut self, profile: &str) -> Self {
        self.request.profile = Some(profile.to_string());
        self
    }

    /// Sets the output format.
    pub fn format(mut self, format: &str) -> Self {
        self.request.format = Some(format.to_string());
        self
    }

    /// Requests a TTL in seconds.
    pub fn ttl_secs(mut self, secs: u64) -> Self {
        self.request.ttl = Some(TtlInput::Seconds(secs));
        self
    }

    /// Adds an IP SAN.
    pub fn ip_san(mut self, ip: &str) -> Self {
        self.request.ip_sans.push(ip.to_string());
        self
    }

    /// Returns the request.
    pub fn build(self) -> SignRequest {
        self.request
    }
}

// =============================================================================
// TestEngine
// =============================================================================

/// An enrollment service over a mock gateway.
#[derive(Debug, Clone)]
pub struct TestEngine {
    /// The service under test.
    pub service: EnrollmentService,
    /// The mock gateway behind the service.
    pub gateway: Arc<MockGateway>,
    /// The storage backend behind the service.
    pub storage: Arc<dyn StorageBackend>,
    /// The PKI the gateway signs with.
    pub pki: Arc<TestPki>,
}

impl TestEngine {
    /// Starts a builder.
    pub fn builder() -> TestEngineBuilder {
        TestEngineBuilder::default()
    }

    /// Writes a role through the service, with an optional default profile.
    pub async fn configure_role(&self, role: &str, profile: Option<&str>) {
        let mut builder = RoleRequestBuilder::new(&self.pki);
        if let Some(profile) = profile {
            builder = builder.profile_id(profile);
        }
        self.service
            .write_role(&RoleId::new(role), builder.build())
            .await
            .expect("role write should succeed");
    }

    /// Writes a profile through the service.
    pub async fn configure_profile(&self, role: &str, profile: &str, ttl: Duration, max_ttl: Duration) {
        let request = WriteProfileRequest {
            profile_id: Some(profile.to_string()),
            ttl: Some(TtlInput::Seconds(ttl.as_secs())),
            max_ttl: Some(TtlInput::Seconds(max_ttl.as_secs())),
            common_name_variable: Some("cn".to_string()),
        };
        self.service
            .write_profile(&RoleId::new(role), request)
            .await
            .expect("profile write should succeed");
    }

    /// Returns the stored bytes under `key`.
    pub async fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.storage.get(key).await.expect("storage read")
    }
}

/// Builder for [`TestEngine`].
#[derive(Debug, Default)]
pub struct TestEngineBuilder {
    settings: EngineSettings,
    storage: Option<Arc<dyn StorageBackend>>,
    pki: Option<Arc<TestPki>>,
}

impl TestEngineBuilder {
    /// Sets the missing-profile policy.
    pub fn profile_policy(mut self, policy: ProfilePolicy) -> Self {
        self.settings.profile_policy = policy;
        self
    }

    /// Sets the subject grammar.
    pub fn subject_syntax(mut self, syntax: SubjectSyntax) -> Self {
        self.settings.subject_syntax = syntax;
        self
    }

    /// Uses filesystem storage rooted at `root`.
    pub fn filesystem(mut self, root: &Path) -> Self {
        self.storage = Some(Arc::new(FileSystemStorage::new(root)));
        self
    }

    /// Reuses an existing PKI.
    pub fn pki(mut self, pki: Arc<TestPki>) -> Self {
        self.pki = Some(pki);
        self
    }

    /// Builds the engine.
    pub fn build(self) -> TestEngine {
        let pki = self.pki.unwrap_or_else(|| Arc::new(TestPki::generate()));
        let storage: Arc<dyn StorageBackend> = match self.storage {
            Some(storage) => storage,
            None => Arc::new(MemoryStorage::new()),
        };
        let gateway = Arc::new(MockGateway::new(Arc::clone(&pki)));
        let transport: Arc<dyn cagw_client::GatewayTransport> = gateway.clone();
        let service = EnrollmentService::new(Arc::clone(&storage), transport, self.settings);

        TestEngine {
            service,
            gateway,
            storage,
            pki,
        }
    }
}

/// Shorthand for a role id.
pub fn role(name: &str) -> RoleId {
    RoleId::new(name)
}

/// Shorthand for a profile id.
pub fn profile(name: &str) -> ProfileId {
    ProfileId::new(name)
}
