// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Stored records: role configuration, profile configuration and issued
//! certificates.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{OutputFormat, ProfileId, RecordKind, RoleId, SerialNumber};
use crate::ttl::resolve_ttl;
use crate::wire::{GatewayProfile, ProfileSummary, SubjectAltNameRequirement, SubjectVariableRequirement};

/// Common-name variable of the legacy default profile.
pub const LEGACY_COMMON_NAME_VARIABLE: &str = "cn";

/// TTL of the legacy default profile (90 days).
pub const LEGACY_DEFAULT_TTL: Duration = Duration::from_secs(2160 * 3600);

// =============================================================================
// RoleConfig
// =============================================================================

/// Connection settings for one CA role.
///
/// Always written as a whole; there are no partial updates.
#[derive(Clone, Serialize, Deserialize)]
pub struct RoleConfig {
    /// Client certificate PEM. May also contain the private key.
    pub pem_bundle: String,
    /// Separate client private key PEM, when not part of `pem_bundle`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    /// Gateway base URL.
    pub url: String,
    /// PEM bundle of CA certificates trusted for the gateway.
    pub ca_certs: String,
    /// CA identifier on the gateway. Defaults to the role name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_id: Option<String>,
    /// Profile used when a request names none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<ProfileId>,
    /// Profiles discovered on the gateway when the role was written.
    #[serde(default)]
    pub profiles: Vec<ProfileSummary>,
}

impl RoleConfig {
    /// Returns the CA identifier, falling back to the role name.
    pub fn effective_ca_id<'a>(&'a self, role: &'a RoleId) -> &'a str {
        match self.ca_id.as_deref().map(str::trim) {
            Some(ca_id) if !ca_id.is_empty() => ca_id,
            _ => role.as_str(),
        }
    }

    /// Returns the PEM holding both client certificate and private key.
    pub fn identity_pem(&self) -> String {
        match &self.private_key {
            Some(key) if !key.trim().is_empty() => format!("{}\n{}", key.trim_end(), self.pem_bundle),
            _ => self.pem_bundle.clone(),
        }
    }

    /// Returns the PEM holding the private key.
    pub fn key_pem(&self) -> &str {
        match &self.private_key {
            Some(key) if !key.trim().is_empty() => key,
            _ => &self.pem_bundle,
        }
    }

    /// Joins a gateway API path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.url.trim_end_matches('/'), path)
    }

    /// Returns `true` if the gateway reported this profile for the CA.
    pub fn has_profile(&self, profile: &ProfileId) -> bool {
        self.profiles.iter().any(|p| p.id == profile.as_str())
    }
}

impl std::fmt::Debug for RoleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleConfig")
            .field("url", &self.url)
            .field("ca_id", &self.ca_id)
            .field("profile_id", &self.profile_id)
            .field("profiles", &self.profiles.len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// ProfileConfig
// =============================================================================

/// Per-role, per-profile enrollment defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Profile id.
    #[serde(default)]
    pub id: String,
    /// Profile display name.
    #[serde(default)]
    pub name: String,
    /// Subject attribute holding the common name, used for derived SANs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_name_variable: Option<String>,
    /// Default TTL.
    #[serde(with = "humantime_serde", default)]
    pub ttl: Duration,
    /// Maximum TTL; zero means no maximum.
    #[serde(with = "humantime_serde", default)]
    pub max_ttl: Duration,
    /// Subject attributes the profile accepts.
    #[serde(default)]
    pub subject_variable_requirements: Vec<SubjectVariableRequirement>,
    /// SAN types the profile accepts.
    #[serde(default)]
    pub subject_alt_name_requirements: Vec<SubjectAltNameRequirement>,
}

impl ProfileConfig {
    /// The profile substituted for a missing record in legacy mode.
    pub fn legacy_default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            common_name_variable: Some(LEGACY_COMMON_NAME_VARIABLE.to_string()),
            ttl: LEGACY_DEFAULT_TTL,
            max_ttl: Duration::ZERO,
            subject_variable_requirements: Vec::new(),
            subject_alt_name_requirements: Vec::new(),
        }
    }

    /// Builds a profile record from a gateway profile document.
    pub fn from_gateway(profile: GatewayProfile, ttl: Duration, max_ttl: Duration) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            common_name_variable: None,
            ttl,
            max_ttl,
            subject_variable_requirements: profile.subject_variable_requirements,
            subject_alt_name_requirements: profile.subject_alt_name_requirements,
        }
    }

    /// Sets the common-name variable.
    pub fn with_common_name_variable(mut self, variable: impl Into<String>) -> Self {
        self.common_name_variable = Some(variable.into());
        self
    }

    /// Resolves the effective TTL for a request against this profile.
    pub fn resolve_ttl(&self, requested: Duration) -> Duration {
        resolve_ttl(requested, self.ttl, self.max_ttl)
    }
}

// =============================================================================
// CertificateRecord
// =============================================================================

/// A decoded certificate as stored after a successful enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    /// Serial number in decimal.
    pub serial_number: SerialNumber,
    /// Certificate as PEM, or raw base64 DER for the `der` format.
    pub certificate: String,
    /// Private key PEM, present for issued certificates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    /// `rsa` or `ec`, present with `private_key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_type: Option<String>,
    /// Newline-joined chain PEM blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
    /// Output format of `certificate`.
    #[serde(default)]
    pub format: OutputFormat,
    /// Which flow produced the record.
    pub kind: RecordKind,
    /// When the record was written.
    pub created_at: DateTime<Utc>,
}

impl CertificateRecord {
    /// Returns the storage key for a record.
    pub fn storage_key(kind: RecordKind, role: &RoleId, serial: &SerialNumber) -> String {
        format!("{}/{}/{}", kind.prefix(), role, serial)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn role(ca_id: Option<&str>) -> RoleConfig {
        RoleConfig {
            pem_bundle: "CERT".to_string(),
            private_key: None,
            url: "https://gw.example.com/".to_string(),
            ca_certs: "CA".to_string(),
            ca_id: ca_id.map(str::to_string),
            profile_id: None,
            profiles: vec![ProfileSummary {
                id: "prof-1".to_string(),
                name: "One".to_string(),
            }],
        }
    }

    #[test]
    fn test_effective_ca_id_falls_back_to_role() {
        let name = RoleId::new("web");
        assert_eq!(role(None).effective_ca_id(&name), "web");
        assert_eq!(role(Some("")).effective_ca_id(&name), "web");
        assert_eq!(role(Some("ca-9")).effective_ca_id(&name), "ca-9");
    }

    #[test]
    fn test_endpoint_and_identity() {
        let mut config = role(None);
        assert_eq!(
            config.endpoint("/v1/certificate-authorities/web/enrollments"),
            "https://gw.example.com/v1/certificate-authorities/web/enrollments"
        );
        assert_eq!(config.identity_pem(), "CERT");
        assert_eq!(config.key_pem(), "CERT");

        config.private_key = Some("KEY\n".to_string());
        assert_eq!(config.identity_pem(), "KEY\nCERT");
        assert_eq!(config.key_pem(), "KEY\n");
        assert!(config.has_profile(&ProfileId::new("prof-1")));
    }

    #[test]
    fn test_debug_hides_key_material() {
        let mut config = role(None);
        config.private_key = Some("SECRET-KEY".to_string());
        assert!(!format!("{:?}", config).contains("SECRET-KEY"));
    }

    #[test]
    fn test_legacy_default_profile() {
        let profile = ProfileConfig::legacy_default();
        assert_eq!(profile.common_name_variable.as_deref(), Some("cn"));
        assert_eq!(profile.ttl, Duration::from_secs(2160 * 3600));
        assert!(profile.max_ttl.is_zero());
    }

    #[test]
    fn test_profile_serde_humantime() {
        let json = r#"{"id":"p","ttl":"1h","max_ttl":"2h"}"#;
        let profile: ProfileConfig = serde_json::from_str(json).unwrap();
        assert_eq!(profile.ttl, Duration::from_secs(3600));
        assert_eq!(profile.resolve_ttl(Duration::from_secs(3 * 3600)), Duration::from_secs(7200));
    }

    #[test]
    fn test_storage_key() {
        let key = CertificateRecord::storage_key(
            RecordKind::Sign,
            &RoleId::new("web"),
            &SerialNumber::new("98765"),
        );
        assert_eq!(key, "sign/web/98765");
    }
}
