//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request bodies arrive as raw JSON, pass the declarative attribute rules
//! of their endpoint, and only then deserialize into a typed DTO. Every
//! failure becomes an `InvalidAttribute` naming the field path.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    AttributeReason, AttributeRule, AttributeViolation, DomainError, EntityKind, ServiceError,
    validate_attributes,
};

fn invalid(entity: EntityKind, field: &str, reason: AttributeReason) -> ServiceError {
    DomainError::invalid_attribute(entity, AttributeViolation::new(field, reason)).into()
}

/// Check `body` against `rules`, then deserialize it.
pub(crate) fn validated<T: DeserializeOwned>(
    body: Value,
    rules: &[AttributeRule],
    entity: EntityKind,
) -> Result<T, ServiceError> {
    validate_attributes(&body, rules)
        .map_err(|violation| ServiceError::from(DomainError::invalid_attribute(entity, violation)))?;
    serde_json::from_value(body).map_err(|error| {
        debug!(%error, "validated body did not match its DTO");
        invalid(entity, "body", AttributeReason::InvalidValue)
    })
}

/// Parse a UUID from a path segment or query parameter.
pub(crate) fn parse_uuid(raw: &str, entity: EntityKind, field: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw).map_err(|_| invalid(entity, field, AttributeReason::InvalidUuid))
}

/// Parse an optional UUID filter.
pub(crate) fn parse_optional_uuid(
    raw: Option<&str>,
    entity: EntityKind,
    field: &str,
) -> Result<Option<Uuid>, ServiceError> {
    raw.map(|value| parse_uuid(value, entity, field)).transpose()
}

/// Parse an optional enumerated code.
pub(crate) fn parse_optional_code<K: std::str::FromStr>(
    raw: Option<&str>,
    entity: EntityKind,
    field: &str,
) -> Result<Option<K>, ServiceError> {
    raw.map(|value| {
        value
            .parse()
            .map_err(|_| invalid(entity, field, AttributeReason::InvalidValue))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Constraint, DomainErrorKind, OrganisationKind};
    use rstest::rstest;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Named {
        name: String,
    }

    fn violation_of(error: &ServiceError) -> Option<&AttributeViolation> {
        match error.domain().map(DomainError::kind) {
            Some(DomainErrorKind::InvalidAttribute(violation)) => Some(violation),
            _ => None,
        }
    }

    #[rstest]
    fn rules_run_before_deserialisation() {
        let rules = [AttributeRule::new("name", Constraint::Required)];

        let error = validated::<Named>(json!({}), &rules, EntityKind::Role).expect_err("missing");

        let violation = violation_of(&error).expect("attribute violation");
        assert_eq!(violation.path.as_str(), "name");
        assert_eq!(violation.reason, AttributeReason::Missing);
    }

    #[rstest]
    fn shape_mismatch_after_rules_is_invalid_value() {
        let error = validated::<Named>(json!({ "name": 7 }), &[], EntityKind::Role)
            .expect_err("wrong type");

        assert_eq!(
            violation_of(&error).map(|violation| violation.reason),
            Some(AttributeReason::InvalidValue)
        );
    }

    #[rstest]
    fn valid_body_deserialises() {
        let named: Named = validated(json!({ "name": "Lehrkraft" }), &[], EntityKind::Role)
            .expect("valid");

        assert_eq!(named.name, "Lehrkraft");
    }

    #[rstest]
    fn bad_uuid_names_the_field() {
        let error = parse_uuid("nope", EntityKind::Person, "personId").expect_err("invalid");

        let violation = violation_of(&error).expect("attribute violation");
        assert_eq!(violation.path.as_str(), "personId");
        assert_eq!(violation.reason, AttributeReason::InvalidUuid);
    }

    #[rstest]
    #[case(None, Ok(None))]
    #[case(Some("KLASSE"), Ok(Some(OrganisationKind::Class)))]
    #[case(Some("UNI"), Err(()))]
    fn optional_codes(
        #[case] raw: Option<&str>,
        #[case] expected: Result<Option<OrganisationKind>, ()>,
    ) {
        let parsed = parse_optional_code::<OrganisationKind>(raw, EntityKind::Organisation, "typ")
            .map_err(drop);
        assert_eq!(parsed, expected);
    }
}
