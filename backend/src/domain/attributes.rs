//! Declarative attribute validation.
//!
//! Write payloads are checked against a list of [`AttributeRule`]s before a
//! service sees them. A rule pairs a dotted field path such as
//! `name.vorname` or `kontexte[0].rolleId` with a [`Constraint`]. The first
//! failing rule produces an [`AttributeViolation`] naming the path, which
//! the HTTP adapter turns into a SchulConnex validation code.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use uuid::Uuid;

/// Letters (any script), spaces, apostrophes, dots and hyphens; must start
/// and end with a non-space character.
static NAME_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[\p{L}.'\-](?:[\p{L} .'\-]*[\p{L}.'\-])?$").ok());

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Parsed nested field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Parse `a.b[0].c`. Malformed index brackets are kept as plain keys.
    pub fn parse(raw: &str) -> Self {
        let mut segments = Vec::new();
        for part in raw.split('.').filter(|part| !part.is_empty()) {
            let (key, rest) = part.split_once('[').unwrap_or((part, ""));
            if !key.is_empty() {
                segments.push(PathSegment::Key(key.to_owned()));
            }
            for index in rest.split('[') {
                let digits = index.trim_end_matches(']');
                if digits.is_empty() {
                    continue;
                }
                match digits.parse() {
                    Ok(position) => segments.push(PathSegment::Index(position)),
                    Err(_) => segments.push(PathSegment::Key(digits.to_owned())),
                }
            }
        }
        Self {
            raw: raw.to_owned(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// First segment, used to pick the error code family.
    pub fn root(&self) -> Option<&str> {
        match self.segments.first() {
            Some(PathSegment::Key(key)) => Some(key),
            _ => None,
        }
    }

    /// Resolve the path inside `document`; `None` when any step is absent.
    pub fn lookup<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(document, |current, segment| match segment {
                PathSegment::Key(key) => current.get(key),
                PathSegment::Index(position) => current.get(*position),
            })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Check applied to the value found at a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Present and not null.
    Required,
    /// String length in characters, inclusive.
    Length { min: usize, max: usize },
    /// Person or organisation name characters.
    NameCharacters,
    /// Canonical UUID string.
    Uuid,
    /// One of the listed strings.
    OneOf(&'static [&'static str]),
}

/// Why an attribute was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeReason {
    Missing,
    InvalidLength,
    InvalidCharacters,
    InvalidUuid,
    InvalidValue,
}

impl AttributeReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::InvalidLength => "invalid length",
            Self::InvalidCharacters => "invalid characters",
            Self::InvalidUuid => "invalid uuid",
            Self::InvalidValue => "invalid value",
        }
    }
}

/// The failing path and reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}: {}", .reason.as_str())]
pub struct AttributeViolation {
    pub path: FieldPath,
    pub reason: AttributeReason,
}

impl AttributeViolation {
    pub fn new(path: &str, reason: AttributeReason) -> Self {
        Self {
            path: FieldPath::parse(path),
            reason,
        }
    }
}

/// A path plus the constraint its value must meet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRule {
    path: FieldPath,
    constraint: Constraint,
}

impl AttributeRule {
    pub fn new(path: &str, constraint: Constraint) -> Self {
        Self {
            path: FieldPath::parse(path),
            constraint,
        }
    }

    /// Check `document`. Only [`Constraint::Required`] rejects an absent
    /// value; other constraints skip absent or null values.
    pub fn check(&self, document: &Value) -> Result<(), AttributeViolation> {
        let value = self.path.lookup(document).filter(|value| !value.is_null());
        let Some(value) = value else {
            return match self.constraint {
                Constraint::Required => Err(self.violation(AttributeReason::Missing)),
                _ => Ok(()),
            };
        };
        let accepted = match &self.constraint {
            Constraint::Required => Ok(()),
            Constraint::Length { min, max } => value
                .as_str()
                .map(|text| text.chars().count())
                .filter(|length| (*min..=*max).contains(length))
                .map(drop)
                .ok_or(AttributeReason::InvalidLength),
            Constraint::NameCharacters => value
                .as_str()
                .filter(|text| is_valid_name(text))
                .map(drop)
                .ok_or(AttributeReason::InvalidCharacters),
            Constraint::Uuid => value
                .as_str()
                .and_then(|text| Uuid::parse_str(text).ok())
                .map(drop)
                .ok_or(AttributeReason::InvalidUuid),
            Constraint::OneOf(allowed) => value
                .as_str()
                .filter(|text| allowed.iter().any(|candidate| candidate == text))
                .map(drop)
                .ok_or(AttributeReason::InvalidValue),
        };
        accepted.map_err(|reason| self.violation(reason))
    }

    fn violation(&self, reason: AttributeReason) -> AttributeViolation {
        AttributeViolation {
            path: self.path.clone(),
            reason,
        }
    }
}

fn is_valid_name(text: &str) -> bool {
    NAME_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(text))
}

/// Apply `rules` in order and return the first violation.
pub fn validate_attributes(
    document: &Value,
    rules: &[AttributeRule],
) -> Result<(), AttributeViolation> {
    rules.iter().try_for_each(|rule| rule.check(document))
}
