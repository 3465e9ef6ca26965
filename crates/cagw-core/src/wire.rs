// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Gateway response documents.
//!
//! Field names follow the gateway's camelCase JSON. Every field is defaulted so
//! that partial documents still deserialize; the caller decides what is
//! required.

use serde::{Deserialize, Serialize};

// =============================================================================
// Enrollment
// =============================================================================

/// Envelope of a successful enrollment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrollmentResponse {
    /// The enrollment result.
    #[serde(default)]
    pub enrollment: Enrollment,
    /// Informational message document, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<serde_json::Value>,
}

/// One enrollment result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Enrollment {
    /// Gateway-assigned enrollment id.
    #[serde(default)]
    pub id: String,
    /// Enrollment status.
    #[serde(default)]
    pub status: String,
    /// Base64 payload; PKCS#12 or DER depending on the requested format.
    #[serde(default)]
    pub body: String,
}

// =============================================================================
// Errors
// =============================================================================

/// Structured error document returned with non-200 statuses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Informational message document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<serde_json::Value>,
    /// Error detail.
    #[serde(default)]
    pub error: ErrorDetail,
}

/// Error detail within [`ErrorResponse`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Error code.
    #[serde(default)]
    pub code: String,
    /// Human readable message.
    #[serde(default)]
    pub message: String,
    /// Field the error refers to.
    #[serde(default)]
    pub target: String,
    /// Offending value.
    #[serde(default)]
    pub value: String,
}

// =============================================================================
// Profiles
// =============================================================================

/// Response to `GET .../profiles`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilesResponse {
    /// Profiles available on the CA.
    #[serde(default)]
    pub profiles: Vec<ProfileSummary>,
}

/// Id and display name of one gateway profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// Profile id.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// Response to `GET .../profiles/<id>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileResponse {
    /// The profile document.
    #[serde(default)]
    pub profile: GatewayProfile,
}

/// A gateway profile with its subject requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayProfile {
    /// Profile id.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Subject attributes the profile accepts.
    #[serde(default)]
    pub subject_variable_requirements: Vec<SubjectVariableRequirement>,
    /// SAN types the profile accepts.
    #[serde(default)]
    pub subject_alt_name_requirements: Vec<SubjectAltNameRequirement>,
}

/// One subject attribute requirement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectVariableRequirement {
    /// Attribute type.
    #[serde(default)]
    pub name: String,
    /// Whether the attribute is mandatory.
    #[serde(default)]
    pub required: bool,
}

/// One SAN type requirement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectAltNameRequirement {
    /// SAN type.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Whether the SAN is mandatory.
    #[serde(default)]
    pub required: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_partial() {
        let body = r#"{"error":{"message":"invalid profile","code":"E1"}}"#;
        let parsed: ErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message, "invalid profile");
        assert_eq!(parsed.error.code, "E1");
        assert!(parsed.error.target.is_empty());
    }

    #[test]
    fn test_profile_response() {
        let body = r#"{
            "profile": {
                "id": "prof-tls",
                "name": "TLS Server",
                "subjectVariableRequirements": [{"name": "cn", "required": true}],
                "subjectAltNameRequirements": [{"type": "dNSName", "required": false}]
            }
        }"#;
        let parsed: ProfileResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.profile.id, "prof-tls");
        assert!(parsed.profile.subject_variable_requirements[0].required);
        assert_eq!(parsed.profile.subject_alt_name_requirements[0].kind, "dNSName");
    }
}
