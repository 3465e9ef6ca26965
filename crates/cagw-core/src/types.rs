// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Identifier newtypes and small closed enums shared across the engine.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ValidationError};

// =============================================================================
// Identifiers
// =============================================================================

/// Word characters at both ends, word characters, `-` or `.` in between.
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_](?:[A-Za-z0-9_.-]*[A-Za-z0-9_])?$").expect("name pattern is valid")
});

/// Returns `true` if `name` may be used as a role or profile name.
///
/// Names become storage key segments, so `/`, whitespace and names made only
/// of dots are rejected.
///
/// ```
/// use cagw_core::types::is_valid_name;
///
/// assert!(is_valid_name("web-servers.v2"));
/// assert!(!is_valid_name("web/profiles/prof-tls"));
/// assert!(!is_valid_name(".."));
/// ```
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

fn check_name(name: &str, field: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::missing(field));
    }
    if !is_valid_name(name) {
        return Err(ValidationError::invalid(
            field,
            "must contain only letters, digits, '_', '-' or '.', and start and end with a letter, digit or '_'",
        ));
    }
    Ok(())
}

/// The name of a configured CA role.
///
/// Role names key every stored record: `config/<role>`, `issue/<role>/<serial>`
/// and `sign/<role>/<serial>`.
///
/// # Examples
///
/// ```
/// use cagw_core::types::RoleId;
///
/// let id = RoleId::new("web-servers");
/// assert_eq!(id.as_str(), "web-servers");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(String);

impl RoleId {
    /// Creates a new role ID.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the ID and returns the inner string.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Creates a role ID from untrusted input.
    pub fn parse(name: impl Into<String>) -> Result<Self, ValidationError> {
        let id = Self(name.into());
        id.validate()?;
        Ok(id)
    }

    /// Checks the name against [`is_valid_name`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_name(&self.0, "role")
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RoleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RoleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for RoleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A gateway profile identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    /// Creates a new profile ID.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the ID and returns the inner string.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl ProfileId {
    /// Creates a profile ID from untrusted input.
    pub fn parse(name: impl Into<String>) -> Result<Self, ValidationError> {
        let id = Self(name.into());
        id.validate()?;
        Ok(id)
    }

    /// Checks the id against [`is_valid_name`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_name(&self.0, "profile_id")
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProfileId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProfileId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProfileId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A certificate serial number rendered as an unsigned decimal string.
///
/// Serials are assigned by the gateway and may exceed 64 bits, so they are
/// never converted to a machine integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerialNumber(String);

impl SerialNumber {
    /// Creates a new serial number.
    #[inline]
    pub fn new(serial: impl Into<String>) -> Self {
        Self(serial.into())
    }

    /// Returns the serial as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creates a serial from untrusted input; only decimal digits are accepted.
    pub fn parse(serial: impl Into<String>) -> Result<Self, ValidationError> {
        let serial = serial.into();
        if serial.is_empty() {
            return Err(ValidationError::missing("serial"));
        }
        if !serial.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::invalid("serial", "must be a decimal number"));
        }
        Ok(Self(serial))
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SerialNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SerialNumber {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// =============================================================================
// OutputFormat
// =============================================================================

/// The certificate encoding returned to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// A single PEM `CERTIFICATE` block.
    #[default]
    Pem,
    /// The raw base64 DER body as returned by the gateway.
    Der,
    /// Treated the same as [`OutputFormat::Pem`].
    PemBundle,
}

impl OutputFormat {
    /// Returns the wire name of the format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pem => "pem",
            Self::Der => "der",
            Self::PemBundle => "pem_bundle",
        }
    }

    /// Returns `true` for the PEM-encoded variants.
    pub fn is_pem(&self) -> bool {
        matches!(self, Self::Pem | Self::PemBundle)
    }
}

impl FromStr for OutputFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "pem" => Ok(Self::Pem),
            "der" => Ok(Self::Der),
            "pem_bundle" => Ok(Self::PemBundle),
            other => Err(ParseError::invalid_format(other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// RecordKind
// =============================================================================

/// Distinguishes records produced by the issue and sign flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// New key pair plus certificate.
    Issue,
    /// Certificate for a caller-supplied CSR.
    Sign,
}

impl RecordKind {
    /// Returns the storage prefix for this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::Sign => "sign",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

// =============================================================================
// Engine Policies
// =============================================================================

/// Behavior when a profile configuration record is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfilePolicy {
    /// A missing profile record is an error.
    #[default]
    Strict,
    /// A missing profile record resolves to the built-in default profile.
    LegacyDefault,
}

impl FromStr for ProfilePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "legacy_default" | "legacy-default" | "legacy" => Ok(Self::LegacyDefault),
            other => Err(format!("unknown profile policy '{}'", other)),
        }
    }
}

impl fmt::Display for ProfilePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::LegacyDefault => write!(f, "legacy_default"),
        }
    }
}

/// Grammar used to parse the `subject_variables` input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectSyntax {
    /// Full distinguished-name grammar; malformed input is rejected.
    #[default]
    DistinguishedName,
    /// Comma-split `type=value` list; malformed tokens are skipped.
    Simple,
}

impl FromStr for SubjectSyntax {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "distinguished_name" | "distinguished-name" | "dn" => Ok(Self::DistinguishedName),
            "simple" => Ok(Self::Simple),
            other => Err(format!("unknown subject syntax '{}'", other)),
        }
    }
}

impl fmt::Display for SubjectSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DistinguishedName => write!(f, "distinguished_name"),
            Self::Simple => write!(f, "simple"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
