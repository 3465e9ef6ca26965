// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Typed administrative requests.
//!
//! Each request type mirrors the JSON body accepted by the administrative
//! surface. Every field is optional at the serde level so that a missing
//! field surfaces as a [`ValidationError`] naming it, not as a generic JSON
//! error. `validate` runs the single validation pass and yields a command
//! the service can act on without further checks.
//!
//! List fields accept either a JSON array or a comma-separated string:
//!
//! ```
//! use cagw_engine::requests::IssueRequest;
//!
//! let request: IssueRequest = serde_json::from_str(
//!     r#"{"subject_variables":"cn=a.example.com","alt_names":"dNSName=a,dNSName=b"}"#,
//! ).unwrap();
//! assert_eq!(request.alt_names, vec!["dNSName=a", "dNSName=b"]);
//! ```

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use cagw_core::error::{CagwResult, ValidationError};
use cagw_core::model::RoleConfig;
use cagw_core::types::{is_valid_name, OutputFormat, ProfileId, RoleId};

// =============================================================================
// Field Helpers
// =============================================================================

/// A duration given either as whole seconds or as a humantime string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TtlInput {
    /// Whole seconds.
    Seconds(u64),
    /// `"90d"`, `"1h 30m"` or a digit string.
    Text(String),
}

impl TtlInput {
    /// Converts the input into a duration, naming `field` on failure.
    pub fn to_duration(&self, field: &str) -> Result<Duration, ValidationError> {
        match self {
            Self::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            Self::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Ok(Duration::ZERO);
                }
                if let Ok(secs) = text.parse::<u64>() {
                    return Ok(Duration::from_secs(secs));
                }
                humantime_serde::re::humantime::parse_duration(text)
                    .map_err(|e| ValidationError::invalid(field, e.to_string()))
            }
        }
    }
}

fn optional_ttl(input: &Option<TtlInput>, field: &str) -> Result<Duration, ValidationError> {
    input
        .as_ref()
        .map_or(Ok(Duration::ZERO), |ttl| ttl.to_duration(field))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<String>),
}

/// Deserializes a comma-separated string or a string array into a list.
/// Blank entries are dropped.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Option::<StringOrList>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(StringOrList::One(joined)) => joined.split(',').map(str::to_string).collect(),
        Some(StringOrList::Many(items)) => items,
    };
    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

fn required(value: Option<String>, field: &str) -> Result<String, ValidationError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ValidationError::missing(field)),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require_role(role: &RoleId) -> Result<(), ValidationError> {
    role.validate()
}

fn optional_profile(value: Option<String>, field: &str) -> Result<Option<ProfileId>, ValidationError> {
    match non_blank(value) {
        Some(id) if !is_valid_name(&id) => Err(ValidationError::invalid(
            field,
            format!("'{}' is not a valid profile name", id),
        )),
        other => Ok(other.map(ProfileId::new)),
    }
}

// =============================================================================
// Role Configuration
// =============================================================================

/// Body of a role configuration write.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WriteRoleRequest {
    /// Client certificate PEM, optionally followed by its key.
    pub pem_bundle: Option<String>,
    /// Separate client key PEM.
    pub private_key: Option<String>,
    /// Gateway base URL.
    pub url: Option<String>,
    /// Gateway CA bundle.
    #[serde(rename = "cacerts", alias = "ca_certs")]
    pub ca_certs: Option<String>,
    /// CA identifier on the gateway.
    pub ca_id: Option<String>,
    /// Default profile.
    pub profile_id: Option<String>,
}

impl WriteRoleRequest {
    /// Validates the request into a role record without discovered profiles.
    pub fn validate(self, role: &RoleId) -> Result<RoleConfig, ValidationError> {
        require_role(role)?;
        let pem_bundle = required(self.pem_bundle, "pem_bundle")?;
        let url = required(self.url, "url")?.trim().to_string();
        let ca_certs = required(self.ca_certs, "cacerts")?;

        // Credentials are only ever presented over TLS.
        if !url.starts_with("https://") {
            return Err(ValidationError::invalid("url", "must be an https URL"));
        }

        Ok(RoleConfig {
            pem_bundle,
            private_key: non_blank(self.private_key),
            url,
            ca_certs,
            ca_id: non_blank(self.ca_id),
            profile_id: optional_profile(self.profile_id, "profile_id")?,
            profiles: Vec::new(),
        })
    }
}

// =============================================================================
// Profile Configuration
// =============================================================================

/// Body of a profile configuration write.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WriteProfileRequest {
    /// Profile id; defaults to the role's default profile.
    pub profile_id: Option<String>,
    /// Default TTL.
    pub ttl: Option<TtlInput>,
    /// Maximum TTL; zero or absent means no maximum.
    pub max_ttl: Option<TtlInput>,
    /// Subject attribute holding the common name.
    pub common_name_variable: Option<String>,
}

/// A validated profile write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCommand {
    /// Explicit profile id, if any.
    pub profile_id: Option<ProfileId>,
    /// Default TTL.
    pub ttl: Duration,
    /// Maximum TTL.
    pub max_ttl: Duration,
    /// Common-name variable.
    pub common_name_variable: Option<String>,
}

impl WriteProfileRequest {
    /// Validates the request.
    pub fn validate(self, role: &RoleId) -> Result<ProfileCommand, ValidationError> {
        require_role(role)?;
        Ok(ProfileCommand {
            profile_id: optional_profile(self.profile_id, "profile_id")?,
            ttl: optional_ttl(&self.ttl, "ttl")?,
            max_ttl: optional_ttl(&self.max_ttl, "max_ttl")?,
            common_name_variable: non_blank(self.common_name_variable),
        })
    }
}

// =============================================================================
// Enrollment
// =============================================================================

/// Subject alternative name inputs shared by issue and sign.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanInputs {
    /// Explicit `type=value` tokens.
    pub alt_names: Vec<String>,
    /// Untyped names classified by the heuristic.
    pub other_names: Vec<String>,
    /// IP address SANs.
    pub ip_sans: Vec<String>,
    /// URI SANs.
    pub uri_sans: Vec<String>,
    /// Skip deriving SANs from the common name.
    pub exclude_cn_from_sans: bool,
}

/// Body of an issue request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IssueRequest {
    /// Subject, in the configured syntax.
    pub subject_variables: Option<String>,
    /// Explicit `type=value` SAN tokens.
    #[serde(deserialize_with = "string_or_list")]
    pub alt_names: Vec<String>,
    /// Untyped supplementary names.
    #[serde(deserialize_with = "string_or_list")]
    pub other_names: Vec<String>,
    /// IP SANs.
    #[serde(deserialize_with = "string_or_list")]
    pub ip_sans: Vec<String>,
    /// URI SANs.
    #[serde(deserialize_with = "string_or_list")]
    pub uri_sans: Vec<String>,
    /// Skip common-name derived SANs.
    pub exclude_cn_from_sans: bool,
    /// Requested TTL.
    pub ttl: Option<TtlInput>,
    /// Profile, overriding the role default.
    pub profile: Option<String>,
    /// Output format.
    pub format: Option<String>,
}

/// A validated issue request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueCommand {
    /// Raw subject input.
    pub subject_variables: String,
    /// SAN inputs.
    pub sans: SanInputs,
    /// Requested TTL; zero selects the profile default.
    pub ttl: Duration,
    /// Explicit profile.
    pub profile: Option<ProfileId>,
    /// Output format.
    pub format: OutputFormat,
}

impl IssueRequest {
    /// Validates the request. The format is checked first.
    pub fn validate(self, role: &RoleId) -> CagwResult<IssueCommand> {
        let format: OutputFormat = self.format.as_deref().unwrap_or_default().trim().parse()?;
        if format == OutputFormat::Der {
            return Err(ValidationError::invalid(
                "format",
                "der is not available for issued certificates",
            )
            .into());
        }

        require_role(role)?;
        let subject_variables = required(self.subject_variables, "subject_variables")?;

        Ok(IssueCommand {
            subject_variables,
            sans: SanInputs {
                alt_names: self.alt_names,
                other_names: self.other_names,
                ip_sans: self.ip_sans,
                uri_sans: self.uri_sans,
                exclude_cn_from_sans: self.exclude_cn_from_sans,
            },
            ttl: optional_ttl(&self.ttl, "ttl")?,
            profile: optional_profile(self.profile, "profile")?,
            format,
        })
    }
}

/// Body of a sign request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignRequest {
    /// PEM certificate signing request. Only the first block is used.
    pub csr: Option<String>,
    /// Subject override, in the configured syntax.
    pub subject_variables: Option<String>,
    /// Explicit `type=value` SAN tokens.
    #[serde(deserialize_with = "string_or_list")]
    pub alt_names: Vec<String>,
    /// Untyped supplementary names.
    #[serde(deserialize_with = "string_or_list")]
    pub other_names: Vec<String>,
    /// IP SANs.
    #[serde(deserialize_with = "string_or_list")]
    pub ip_sans: Vec<String>,
    /// URI SANs.
    #[serde(deserialize_with = "string_or_list")]
    pub uri_sans: Vec<String>,
    /// Skip common-name derived SANs.
    pub exclude_cn_from_sans: bool,
    /// Requested TTL.
    pub ttl: Option<TtlInput>,
    /// Profile, overriding the role default.
    pub profile: Option<String>,
    /// Output format.
    pub format: Option<String>,
}

/// A validated sign request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignCommand {
    /// DER of the first CSR block.
    pub csr_der: Vec<u8>,
    /// Raw subject input, if any.
    pub subject_variables: Option<String>,
    /// SAN inputs.
    pub sans: SanInputs,
    /// Requested TTL; zero selects the profile default.
    pub ttl: Duration,
    /// Explicit profile.
    pub profile: Option<ProfileId>,
    /// Output format.
    pub format: OutputFormat,
}

impl SignRequest {
    /// Validates the request and decodes the CSR. The format is checked first.
    pub fn validate(self, role: &RoleId) -> CagwResult<SignCommand> {
        let format: OutputFormat = self.format.as_deref().unwrap_or_default().trim().parse()?;

        require_role(role)?;
        let csr = required(self.csr, "csr")?;
        let csr_der = cagw_pki::decode_csr(&csr)?;

        Ok(SignCommand {
            csr_der,
            subject_variables: non_blank(self.subject_variables),
            sans: SanInputs {
                alt_names: self.alt_names,
                other_names: self.other_names,
                ip_sans: self.ip_sans,
                uri_sans: self.uri_sans,
                exclude_cn_from_sans: self.exclude_cn_from_sans,
            },
            ttl: optional_ttl(&self.ttl, "ttl")?,
            profile: optional_profile(self.profile, "profile")?,
            format,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
