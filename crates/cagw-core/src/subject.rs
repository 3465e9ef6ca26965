// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Subject variable and subject alternative name processing.
//!
//! Subject input is accepted in two grammars, each a named strategy:
//!
//! - [`DistinguishedNameStrategy`]: full RFC 4514 style distinguished names,
//!   including multi-valued RDNs (`cn=a+uid=b`), escapes and quoted values.
//!   Any malformed component rejects the whole input.
//! - [`SimpleListStrategy`]: `type=value,type=value`. Tokens without `=` are
//!   logged and skipped.
//!
//! The strategy in effect is chosen by [`SubjectSyntax`], never inferred from
//! the input.
//!
//! Alt names come from two paths: explicitly typed `type=value` tokens, and
//! untyped names classified by [`heuristic_alt_names`].
//!
//! # Examples
//!
//! ```
//! use cagw_core::subject::parse_subject_variables;
//! use cagw_core::types::SubjectSyntax;
//!
//! let vars = parse_subject_variables(SubjectSyntax::DistinguishedName, "cn=Test,o=Entrust,c=CA").unwrap();
//! let types: Vec<_> = vars.iter().map(|v| v.kind.as_str()).collect();
//! assert_eq!(types, ["cn", "o", "c"]);
//! ```

use std::iter::Peekable;
use std::str::Chars;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::types::SubjectSyntax;

/// SAN type for email addresses.
pub const SAN_RFC822: &str = "rfc822Name";
/// SAN type for DNS names.
pub const SAN_DNS: &str = "dNSName";
/// SAN type for IP addresses.
pub const SAN_IP: &str = "iPAddress";
/// SAN type for URIs.
pub const SAN_URI: &str = "uniformResourceIdentifier";

// =============================================================================
// Wire Types
// =============================================================================

/// One attribute of the certificate subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectVariable {
    /// Attribute type, e.g. `cn` or `o`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Attribute value.
    pub value: String,
}

impl SubjectVariable {
    /// Creates a new subject variable.
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

/// One subject alternative name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectAltName {
    /// SAN type in gateway notation, e.g. `dNSName`.
    #[serde(rename = "type")]
    pub kind: String,
    /// SAN value.
    pub value: String,
}

impl SubjectAltName {
    /// Creates a new alt name.
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

// =============================================================================
// Subject Strategies
// =============================================================================

/// A grammar for the `subject_variables` input.
pub trait SubjectParseStrategy: Send + Sync {
    /// Returns the strategy name for logging.
    fn name(&self) -> &'static str;

    /// Parses the input into subject variables, in input order.
    fn parse(&self, input: &str) -> Result<Vec<SubjectVariable>, ParseError>;
}

/// Strict distinguished-name grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistinguishedNameStrategy;

impl SubjectParseStrategy for DistinguishedNameStrategy {
    fn name(&self) -> &'static str {
        "distinguished_name"
    }

    fn parse(&self, input: &str) -> Result<Vec<SubjectVariable>, ParseError> {
        DnParser::new(input).parse()
    }
}

/// Permissive comma-separated `type=value` list.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleListStrategy;

impl SubjectParseStrategy for SimpleListStrategy {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn parse(&self, input: &str) -> Result<Vec<SubjectVariable>, ParseError> {
        let mut vars = Vec::new();
        for token in input.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            match token.split_once('=') {
                Some((kind, value)) => vars.push(SubjectVariable::new(kind.trim(), value.trim())),
                None => warn!(token = %token, "Skipping subject variable without '='"),
            }
        }
        Ok(vars)
    }
}

/// Returns the strategy for a configured syntax.
pub fn strategy_for(syntax: SubjectSyntax) -> &'static dyn SubjectParseStrategy {
    match syntax {
        SubjectSyntax::DistinguishedName => &DistinguishedNameStrategy,
        SubjectSyntax::Simple => &SimpleListStrategy,
    }
}

/// Parses subject variables with the strategy selected by `syntax`.
pub fn parse_subject_variables(
    syntax: SubjectSyntax,
    input: &str,
) -> Result<Vec<SubjectVariable>, ParseError> {
    let strategy = strategy_for(syntax);
    let vars = strategy.parse(input)?;
    debug!(strategy = strategy.name(), count = vars.len(), "Parsed subject variables");
    Ok(vars)
}

// =============================================================================
// Distinguished Name Parser
// =============================================================================

const INCOMPLETE: &str = "DN ended with incomplete type, value pair";

struct DnParser<'a> {
    input: &'a str,
    chars: Peekable<Chars<'a>>,
}

impl<'a> DnParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::invalid_dn(self.input, message)
    }

    fn parse(mut self) -> Result<Vec<SubjectVariable>, ParseError> {
        let mut vars = Vec::new();
        if self.input.trim().is_empty() {
            return Ok(vars);
        }

        loop {
            let kind = self.parse_type()?;
            let (value, separator) = self.parse_value()?;
            vars.push(SubjectVariable::new(kind, value));

            if separator.is_none() {
                break;
            }
            if self.chars.peek().is_none() {
                return Err(self.error(INCOMPLETE));
            }
        }

        Ok(vars)
    }

    fn parse_type(&mut self) -> Result<String, ParseError> {
        let mut kind = String::new();
        loop {
            match self.chars.next() {
                Some('=') => break,
                Some(c @ (',' | ';' | '+')) => {
                    return Err(self.error(format!("unexpected '{}' in attribute type", c)));
                }
                Some(c) => kind.push(c),
                None => return Err(self.error(INCOMPLETE)),
            }
        }

        let kind = kind.trim();
        if kind.is_empty() {
            return Err(self.error("empty attribute type"));
        }
        Ok(kind.to_string())
    }

    /// Reads one attribute value. Returns the separator that ended it, if any.
    fn parse_value(&mut self) -> Result<(String, Option<char>), ParseError> {
        while self.chars.peek() == Some(&' ') {
            self.chars.next();
        }

        let mut bytes: Vec<u8> = Vec::new();
        let mut trailing_spaces = 0usize;
        let mut quoted = false;
        let mut separator = None;

        if self.chars.peek() == Some(&'"') {
            self.chars.next();
            quoted = true;
        }

        while let Some(c) = self.chars.next() {
            match c {
                '\\' => {
                    let escaped = self.parse_escape()?;
                    bytes.extend_from_slice(&escaped);
                    trailing_spaces = 0;
                }
                '"' if quoted => {
                    quoted = false;
                    trailing_spaces = 0;
                }
                ',' | ';' | '+' if !quoted => {
                    separator = Some(c);
                    break;
                }
                ' ' if !quoted => {
                    bytes.push(b' ');
                    trailing_spaces += 1;
                }
                _ => {
                    let mut buf = [0u8; 4];
                    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                    trailing_spaces = 0;
                }
            }
        }

        if quoted {
            return Err(self.error("unterminated quoted value"));
        }

        bytes.truncate(bytes.len() - trailing_spaces);
        let value =
            String::from_utf8(bytes).map_err(|_| self.error("value is not valid UTF-8"))?;
        Ok((value, separator))
    }

    fn parse_escape(&mut self) -> Result<Vec<u8>, ParseError> {
        let first = self
            .chars
            .next()
            .ok_or_else(|| self.error("got corrupted escaped character"))?;

        if first.is_ascii_hexdigit() {
            let second = self
                .chars
                .next()
                .filter(|c| c.is_ascii_hexdigit())
                .ok_or_else(|| self.error("failed to decode escaped character"))?;
            let hex = format!("{}{}", first, second);
            let byte = u8::from_str_radix(&hex, 16)
                .map_err(|_| self.error("failed to decode escaped character"))?;
            return Ok(vec![byte]);
        }

        let mut buf = [0u8; 4];
        Ok(first.encode_utf8(&mut buf).as_bytes().to_vec())
    }
}

// =============================================================================
// Subject Alternative Names
// =============================================================================

/// Parses explicitly typed `type=value` alt-name tokens.
///
/// Every token must split into exactly two parts on the first `=`.
pub fn parse_subject_alt_names<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<SubjectAltName>, ParseError> {
    tokens
        .iter()
        .map(|token| {
            let token = token.as_ref();
            match token.split_once('=') {
                Some((kind, value)) if !kind.trim().is_empty() => {
                    Ok(SubjectAltName::new(kind.trim(), value.trim()))
                }
                _ => Err(ParseError::invalid_alt_name(token)),
            }
        })
        .collect()
}

/// Classifies a name as `rfc822Name` when it contains `@`, else `dNSName`.
pub fn classify_name(name: &str) -> &'static str {
    if name.contains('@') { SAN_RFC822 } else { SAN_DNS }
}

/// Derives alt names from a primary name and untyped supplementary names.
///
/// ```
/// use cagw_core::subject::{heuristic_alt_names, SAN_RFC822};
///
/// let sans = heuristic_alt_names("user@example.com", &[] as &[String]);
/// assert_eq!(sans.len(), 1);
/// assert_eq!(sans[0].kind, SAN_RFC822);
/// ```
pub fn heuristic_alt_names<S: AsRef<str>>(primary: &str, names: &[S]) -> Vec<SubjectAltName> {
    std::iter::once(primary)
        .chain(names.iter().map(AsRef::as_ref))
        .map(|name| SubjectAltName::new(classify_name(name), name))
        .collect()
}

/// Wraps every name in an alt name of a fixed type.
pub fn typed_alt_names<S: AsRef<str>>(names: &[S], kind: &str) -> Vec<SubjectAltName> {
    names
        .iter()
        .map(|name| SubjectAltName::new(kind, name.as_ref()))
        .collect()
}

/// Accumulates alt names from several sources, dropping exact duplicates.
#[derive(Debug, Default, Clone)]
pub struct AltNameSet {
    names: Vec<SubjectAltName>,
}

impl AltNameSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds names, keeping the first occurrence of each (type, value).
    pub fn extend(&mut self, names: impl IntoIterator<Item = SubjectAltName>) -> &mut Self {
        for name in names {
            if !self.names.contains(&name) {
                self.names.push(name);
            }
        }
        self
    }

    /// Returns the number of names collected.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no names were collected.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Consumes the set.
    pub fn into_vec(self) -> Vec<SubjectAltName> {
        self.names
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dn(input: &str) -> Result<Vec<SubjectVariable>, ParseError> {
        parse_subject_variables(SubjectSyntax::DistinguishedName, input)
    }

    fn simple(input: &str) -> Vec<SubjectVariable> {
        parse_subject_variables(SubjectSyntax::Simple, input).unwrap()
    }

    #[test]
    fn test_dn_order_preserved() {
        let vars = dn("cn=Test,o=Entrust,c=CA").unwrap();
        assert_eq!(
            vars,
            vec![
                SubjectVariable::new("cn", "Test"),
                SubjectVariable::new("o", "Entrust"),
                SubjectVariable::new("c", "CA"),
            ]
        );
    }

    #[test]
    fn test_dn_multi_valued_rdn() {
        let vars = dn("cn=host+uid=42, o=Acme").unwrap();
        assert_eq!(vars.len(), 3);
        assert_eq!(vars[1], SubjectVariable::new("uid", "42"));
        assert_eq!(vars[2], SubjectVariable::new("o", "Acme"));
    }

    #[test]
    fn test_dn_escapes_and_quotes() {
        let vars = dn(r#"cn=Smith\, John,o="Acme, Inc",ou=R\26D"#).unwrap();
        assert_eq!(vars[0].value, "Smith, John");
        assert_eq!(vars[1].value, "Acme, Inc");
        assert_eq!(vars[2].value, "R&D");
    }

    #[test]
    fn test_dn_trims_unescaped_whitespace() {
        let vars = dn("cn = padded ,o=x\\ ").unwrap();
        assert_eq!(vars[0], SubjectVariable::new("cn", "padded"));
        assert_eq!(vars[1].value, "x ");
    }

    #[test]
    fn test_dn_rejects_malformed() {
        assert!(dn("cn").is_err());
        assert!(dn("cn=a,").is_err());
        assert!(dn("cn=a,,o=b").is_err());
        assert!(dn("=value").is_err());
        assert!(dn("cn=bad\\").is_err());
        assert!(dn("cn=bad\\4").is_err());
        assert!(dn("cn=\"open").is_err());
    }

    #[test]
    fn test_dn_empty_input() {
        assert!(dn("").unwrap().is_empty());
    }

    #[test]
    fn test_simple_skips_bad_tokens() {
        let vars = simple("cn=Test,garbage,o=Entrust");
        assert_eq!(
            vars,
            vec![
                SubjectVariable::new("cn", "Test"),
                SubjectVariable::new("o", "Entrust"),
            ]
        );
    }

    #[test]
    fn test_strategies_diverge_on_same_input() {
        assert!(dn("cn=Test,garbage").is_err());
        assert_eq!(simple("cn=Test,garbage").len(), 1);
    }

    #[test]
    fn test_simple_splits_on_first_equals() {
        let vars = simple("cn=a=b");
        assert_eq!(vars[0], SubjectVariable::new("cn", "a=b"));
    }

    #[test]
    fn test_explicit_alt_names() {
        let sans = parse_subject_alt_names(&["dNSName=www.example.com", "iPAddress=10.0.0.1"]).unwrap();
        assert_eq!(sans[0], SubjectAltName::new(SAN_DNS, "www.example.com"));
        assert_eq!(sans[1], SubjectAltName::new(SAN_IP, "10.0.0.1"));

        let err = parse_subject_alt_names(&["www.example.com"]).unwrap_err();
        assert!(matches!(err, ParseError::InvalidAltName { .. }));
    }

    #[test]
    fn test_heuristic_classification() {
        let sans = heuristic_alt_names("user@example.com", &[] as &[&str]);
        assert_eq!(sans, vec![SubjectAltName::new(SAN_RFC822, "user@example.com")]);

        let sans = heuristic_alt_names("host.example.com", &["ops@example.com"]);
        assert_eq!(sans[0], SubjectAltName::new(SAN_DNS, "host.example.com"));
        assert_eq!(sans[1], SubjectAltName::new(SAN_RFC822, "ops@example.com"));
    }

    #[test]
    fn test_alt_name_set_dedup() {
        let mut set = AltNameSet::new();
        set.extend(heuristic_alt_names("a.example.com", &["a.example.com"]))
            .extend(typed_alt_names(&["10.0.0.1"], SAN_IP))
            .extend(typed_alt_names(&["10.0.0.1"], SAN_IP));
        assert_eq!(set.len(), 2);
    }
}
