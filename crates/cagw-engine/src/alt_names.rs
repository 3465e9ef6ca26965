// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Subject alternative name assembly.
//!
//! Sources are applied in a fixed order and exact duplicates are dropped:
//!
//! 1. explicit `type=value` tokens
//! 2. the common-name value plus untyped names, classified by heuristic
//! 3. IP SANs
//! 4. URI SANs

use tracing::debug;

use cagw_core::error::ParseError;
use cagw_core::model::ProfileConfig;
use cagw_core::subject::{
    heuristic_alt_names, parse_subject_alt_names, typed_alt_names, AltNameSet, SubjectAltName,
    SubjectVariable, SAN_IP, SAN_URI,
};

use crate::requests::SanInputs;

/// Returns the value of the profile's common-name variable, if the subject
/// carries it. Attribute types compare case-insensitively.
pub fn common_name<'a>(profile: &ProfileConfig, subject: &'a [SubjectVariable]) -> Option<&'a str> {
    let variable = profile.common_name_variable.as_deref()?;
    subject
        .iter()
        .find(|v| v.kind.eq_ignore_ascii_case(variable))
        .map(|v| v.value.as_str())
        .filter(|value| !value.is_empty())
}

/// Builds the SAN list for one enrollment.
pub fn assemble_alt_names(
    inputs: &SanInputs,
    profile: &ProfileConfig,
    subject: &[SubjectVariable],
) -> Result<Vec<SubjectAltName>, ParseError> {
    let mut names = AltNameSet::new();
    names.extend(parse_subject_alt_names(&inputs.alt_names)?);

    if !inputs.exclude_cn_from_sans {
        if let Some(cn) = common_name(profile, subject) {
            names.extend(heuristic_alt_names(cn, &inputs.other_names));
        }
    }

    names
        .extend(typed_alt_names(&inputs.ip_sans, SAN_IP))
        .extend(typed_alt_names(&inputs.uri_sans, SAN_URI));

    debug!(count = names.len(), "Assembled subject alt names");
    Ok(names.into_vec())
}
