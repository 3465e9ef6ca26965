// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The enrollment service.
//!
//! [`EnrollmentService`] is built once per process from its collaborators and
//! passed to whatever surface exposes it. It holds no mutable state; every
//! operation reads what it needs from storage, talks to the gateway through
//! the injected transport, and writes its result back.
//!
//! # Issue pipeline
//!
//! ```text
//! IssueRequest ── validate ──► resolve role ──► select profile ──► resolve profile
//!                                                                      │
//!   store record ◄── decode PKCS#12 ◄── enroll ◄── build request ◄── subject + SANs + TTL
//! ```
//!
//! Signing follows the same path with an X.509 request built from the CSR.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use cagw_client::{validate_credentials, GatewayClient, GatewayTransport};
use cagw_core::enrollment::{EnrollmentPassword, EnrollmentRequest, RequestedFormat};
use cagw_core::error::{CagwResult, ConfigurationError, DecodeError, ValidationError};
use cagw_core::model::{CertificateRecord, ProfileConfig, RoleConfig};
use cagw_core::subject::{parse_subject_variables, SubjectVariable};
use cagw_core::types::{
    OutputFormat, ProfileId, ProfilePolicy, RecordKind, RoleId, SerialNumber, SubjectSyntax,
};
use cagw_core::wire::ProfileSummary;
use cagw_pki::{certificate_subject, decode_pkcs12, decode_x509, DecodedCertificate};
use cagw_store::{CertificateRecordStore, ConfigStore, StorageBackend};

use crate::alt_names::assemble_alt_names;
use crate::requests::{IssueRequest, SignRequest, WriteProfileRequest, WriteRoleRequest};

// =============================================================================
// Settings
// =============================================================================

/// Engine behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineSettings {
    /// What to do when a profile record is missing.
    pub profile_policy: ProfilePolicy,
    /// Grammar for `subject_variables`.
    pub subject_syntax: SubjectSyntax,
}

// =============================================================================
// Views
// =============================================================================

/// A role record as shown to operators. Key material is never included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleView {
    /// Role name.
    pub role: RoleId,
    /// Effective CA identifier.
    pub ca_id: String,
    /// Gateway base URL.
    pub url: String,
    /// Subject of the client certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Default profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<ProfileId>,
    /// Profiles the gateway offered when the role was written.
    pub profiles: Vec<ProfileSummary>,
}

impl RoleView {
    fn new(role: &RoleId, config: &RoleConfig) -> Self {
        Self {
            role: role.clone(),
            ca_id: config.effective_ca_id(role).to_string(),
            url: config.url.clone(),
            subject: certificate_subject(&config.pem_bundle),
            profile_id: config.profile_id.clone(),
            profiles: config.profiles.clone(),
        }
    }
}

// =============================================================================
// EnrollmentService
// =============================================================================

/// Configuration writes, enrollments and certificate reads.
#[derive(Debug, Clone)]
pub struct EnrollmentService {
    config: ConfigStore,
    records: CertificateRecordStore,
    gateway: GatewayClient,
    settings: EngineSettings,
}

impl EnrollmentService {
    /// Creates a service over a storage backend and a gateway transport.
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        transport: Arc<dyn GatewayTransport>,
        settings: EngineSettings,
    ) -> Self {
        info!(
            storage = storage.name(),
            transport = transport.name(),
            profile_policy = %settings.profile_policy,
            subject_syntax = %settings.subject_syntax,
            "Enrollment service created"
        );
        Self {
            config: ConfigStore::new(Arc::clone(&storage), settings.profile_policy),
            records: CertificateRecordStore::new(storage),
            gateway: GatewayClient::new(transport),
            settings,
        }
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    // -------------------------------------------------------------------------
    // Role configuration
    // -------------------------------------------------------------------------

    /// Validates credentials, discovers gateway profiles and stores the role.
    #[instrument(skip(self, request), fields(role = %role))]
    pub async fn write_role(&self, role: &RoleId, request: WriteRoleRequest) -> CagwResult<RoleView> {
        let mut config = request.validate(role)?;
        validate_credentials(&config)?;

        let profiles = self.gateway.list_profiles(role, &config).await?;
        config.profiles = profiles;

        if let Some(profile) = &config.profile_id {
            if !config.has_profile(profile) {
                return Err(ConfigurationError::unknown_profile(
                    profile.as_str(),
                    config.effective_ca_id(role),
                )
                .into());
            }
        }

        self.config.put_role(role, &config).await?;
        info!(
            ca_id = config.effective_ca_id(role),
            profiles = config.profiles.len(),
            "Role configuration written"
        );
        Ok(RoleView::new(role, &config))
    }

    /// Reads a role with its key material redacted.
    pub async fn read_role(&self, role: &RoleId) -> CagwResult<RoleView> {
        role.validate()?;
        let config = self.config.resolve_role(role).await?;
        Ok(RoleView::new(role, &config))
    }

    /// Deletes a role record.
    #[instrument(skip(self), fields(role = %role))]
    pub async fn delete_role(&self, role: &RoleId) -> CagwResult<()> {
        role.validate()?;
        self.config.delete_role(role).await?;
        info!("Role configuration deleted");
        Ok(())
    }

    /// Lists configured roles.
    pub async fn list_roles(&self) -> CagwResult<Vec<String>> {
        self.config.list_roles().await
    }

    // -------------------------------------------------------------------------
    // Profile configuration
    // -------------------------------------------------------------------------

    /// Fetches a profile's requirements from the gateway and stores them with
    /// the requested TTLs.
    #[instrument(skip(self, request), fields(role = %role))]
    pub async fn write_profile(
        &self,
        role: &RoleId,
        request: WriteProfileRequest,
    ) -> CagwResult<ProfileConfig> {
        let command = request.validate(role)?;
        let role_config = self.config.resolve_role(role).await?;

        let profile_id = command
            .profile_id
            .or_else(|| role_config.profile_id.clone())
            .ok_or_else(|| ValidationError::missing("profile_id"))?;

        let document = self
            .gateway
            .get_profile(role, &role_config, &profile_id)
            .await?;

        let mut config = ProfileConfig::from_gateway(document, command.ttl, command.max_ttl);
        if config.id.is_empty() {
            config.id = profile_id.to_string();
        }
        if let Some(variable) = command.common_name_variable {
            config = config.with_common_name_variable(variable);
        }

        self.config.put_profile(role, &config).await?;
        info!(
            profile = %profile_id,
            ttl = ?config.ttl,
            max_ttl = ?config.max_ttl,
            "Profile configuration written"
        );
        Ok(config)
    }

    /// Reads a profile, applying the missing-profile policy.
    pub async fn read_profile(&self, role: &RoleId, profile: &ProfileId) -> CagwResult<ProfileConfig> {
        role.validate()?;
        profile.validate()?;
        self.config.resolve_profile(role, profile).await
    }

    /// Lists profile ids configured for a role.
    pub async fn list_profiles(&self, role: &RoleId) -> CagwResult<Vec<String>> {
        role.validate()?;
        self.config.list_profiles(role).await
    }

    // -------------------------------------------------------------------------
    // Enrollment
    // -------------------------------------------------------------------------

    /// Issues a new key pair and certificate.
    #[instrument(skip(self, request), fields(role = %role))]
    pub async fn issue(&self, role: &RoleId, request: IssueRequest) -> CagwResult<CertificateRecord> {
        self.issue_inner(role, request)
            .await
            .inspect_err(|e| warn!(stage = e.stage(), error = %e, "Issue failed"))
    }

    async fn issue_inner(&self, role: &RoleId, request: IssueRequest) -> CagwResult<CertificateRecord> {
        let command = request.validate(role)?;
        let role_config = self.config.resolve_role(role).await?;
        let profile_id = select_profile(role, command.profile, &role_config)?;
        let profile = self.config.resolve_profile(role, &profile_id).await?;

        let subject = self.parse_subject(&command.subject_variables)?;
        if subject.is_empty() {
            return Err(ValidationError::invalid(
                "subject_variables",
                "no subject variables could be parsed",
            )
            .into());
        }
        let alt_names = assemble_alt_names(&command.sans, &profile, &subject)?;
        let ttl = profile.resolve_ttl(command.ttl);

        let password = EnrollmentPassword::generate();
        let enrollment_request = EnrollmentRequest::builder(profile_id.as_str())
            .subject_variables(subject)
            .subject_alt_names(alt_names)
            .ttl(ttl)
            .build(RequestedFormat::pkcs12(&password));

        let enrollment = self
            .gateway
            .enroll(role, &role_config, &enrollment_request)
            .await?;
        let decoded = decode_enrollment(&enrollment.body, &enrollment_request, command.format)?;

        let record = into_record(decoded, command.format, RecordKind::Issue);
        self.records.put(role, &record).await?;
        info!(
            profile = %profile_id,
            serial = %record.serial_number,
            key_type = record.private_key_type.as_deref().unwrap_or_default(),
            "Certificate issued"
        );
        Ok(record)
    }

    /// Has the gateway sign a caller-supplied CSR.
    #[instrument(skip(self, request), fields(role = %role))]
    pub async fn sign(&self, role: &RoleId, request: SignRequest) -> CagwResult<CertificateRecord> {
        self.sign_inner(role, request)
            .await
            .inspect_err(|e| warn!(stage = e.stage(), error = %e, "Sign failed"))
    }

    async fn sign_inner(&self, role: &RoleId, request: SignRequest) -> CagwResult<CertificateRecord> {
        let command = request.validate(role)?;
        let role_config = self.config.resolve_role(role).await?;
        let profile_id = select_profile(role, command.profile, &role_config)?;
        let profile = self.config.resolve_profile(role, &profile_id).await?;

        let subject = match command.subject_variables.as_deref() {
            Some(input) => self.parse_subject(input)?,
            None => Vec::new(),
        };
        let alt_names = assemble_alt_names(&command.sans, &profile, &subject)?;
        let ttl = profile.resolve_ttl(command.ttl);

        let enrollment_request = EnrollmentRequest::builder(profile_id.as_str())
            .subject_variables(subject)
            .subject_alt_names(alt_names)
            .ttl(ttl)
            .build(RequestedFormat::x509(command.csr_der));

        let enrollment = self
            .gateway
            .enroll(role, &role_config, &enrollment_request)
            .await?;
        let decoded = decode_enrollment(&enrollment.body, &enrollment_request, command.format)?;

        let record = into_record(decoded, command.format, RecordKind::Sign);
        self.records.put(role, &record).await?;
        info!(
            profile = %profile_id,
            serial = %record.serial_number,
            format = %record.format,
            "CSR signed"
        );
        Ok(record)
    }

    fn parse_subject(&self, input: &str) -> CagwResult<Vec<SubjectVariable>> {
        Ok(parse_subject_variables(self.settings.subject_syntax, input)?)
    }

    // -------------------------------------------------------------------------
    // Certificate reads
    // -------------------------------------------------------------------------

    /// Reads an issued certificate.
    pub async fn read_issued(&self, role: &RoleId, serial: &SerialNumber) -> CagwResult<CertificateRecord> {
        role.validate()?;
        SerialNumber::parse(serial.as_str())?;
        self.records.get(RecordKind::Issue, role, serial).await
    }

    /// Lists serial numbers of issued certificates.
    pub async fn list_issued(&self, role: &RoleId) -> CagwResult<Vec<SerialNumber>> {
        role.validate()?;
        self.records.list(RecordKind::Issue, role).await
    }

    /// Reads a signed certificate.
    pub async fn read_signed(&self, role: &RoleId, serial: &SerialNumber) -> CagwResult<CertificateRecord> {
        role.validate()?;
        SerialNumber::parse(serial.as_str())?;
        self.records.get(RecordKind::Sign, role, serial).await
    }

    /// Lists serial numbers of signed certificates.
    pub async fn list_signed(&self, role: &RoleId) -> CagwResult<Vec<SerialNumber>> {
        role.validate()?;
        self.records.list(RecordKind::Sign, role).await
    }
}

/// Picks the role's pinned profile, else the request's.
///
/// A role configured with a profile always enrolls against it; the request's
/// `profile` only applies to roles without one.
pub fn select_profile(
    role: &RoleId,
    requested: Option<ProfileId>,
    config: &RoleConfig,
) -> CagwResult<ProfileId> {
    match (config.profile_id.clone(), requested) {
        (Some(pinned), requested) => {
            if let Some(ignored) = requested.filter(|r| *r != pinned) {
                debug!(profile = %pinned, ignored = %ignored, "Role profile takes precedence");
            }
            Ok(pinned)
        }
        (None, Some(profile)) => {
            debug!(profile = %profile, "Selected requested profile");
            Ok(profile)
        }
        (None, None) => Err(ConfigurationError::profile_required(role.as_str()).into()),
    }
}

/// Decodes an enrollment body in the format the request asked the gateway for.
fn decode_enrollment(
    body: &str,
    request: &EnrollmentRequest,
    format: OutputFormat,
) -> Result<DecodedCertificate, DecodeError> {
    if !request.is_pkcs12() {
        return decode_x509(body, format);
    }
    let password = request
        .password()
        .ok_or_else(|| DecodeError::missing("a PKCS#12 password"))?;
    decode_pkcs12(body, &password)
}

fn into_record(decoded: DecodedCertificate, format: OutputFormat, kind: RecordKind) -> CertificateRecord {
    CertificateRecord {
        serial_number: decoded.serial_number,
        certificate: decoded.certificate,
        private_key: decoded.private_key,
        private_key_type: decoded.private_key_type,
        chain: decoded.chain,
        format,
        kind,
        created_at: Utc::now(),
    }
}

// =============================================================================
// Tests
// =============================================================================
