//! Tests for domain error construction and write error translation.

use super::*;
use crate::domain::attributes::{AttributeReason, AttributeViolation};
use rstest::rstest;

#[rstest]
fn specification_violation_takes_entity_from_rule() {
    let err = DomainError::specification_violated(Violation::SameRoleAtParentSchool);

    assert_eq!(err.entity(), EntityKind::RoleAssignment);
    assert_eq!(
        err.kind(),
        &DomainErrorKind::SpecificationViolated(Violation::SameRoleAtParentSchool)
    );
}

#[rstest]
fn mismatched_revision_carries_both_revisions() {
    let err = DomainError::mismatched_revision(EntityKind::Person, 2, 3);

    assert_eq!(
        err.details(),
        Some(&json!({ "expectedRevision": 2, "actualRevision": 3 }))
    );
}

#[rstest]
fn display_mentions_entity_and_id() {
    let err = DomainError::not_found(EntityKind::Organisation, "abc");

    assert_eq!(err.to_string(), "Organisation not found (abc)");
}

#[rstest]
fn invalid_attribute_display_includes_path() {
    let err = DomainError::invalid_attribute(
        EntityKind::Person,
        AttributeViolation::new("name.vorname", AttributeReason::InvalidLength),
    );

    assert!(err.to_string().contains("name.vorname"));
}

#[rstest]
#[case(PersistenceError::duplicate("referrer"), WriteOperation::Create, DomainErrorKind::AlreadyExists)]
#[case(PersistenceError::query("boom"), WriteOperation::Create, DomainErrorKind::CouldNotBeCreated)]
#[case(PersistenceError::query("boom"), WriteOperation::Update, DomainErrorKind::CouldNotBeUpdated)]
#[case(PersistenceError::query("boom"), WriteOperation::Delete, DomainErrorKind::CouldNotBeDeleted)]
#[case(
    PersistenceError::revision_mismatch(1_u32, 2_u32),
    WriteOperation::Update,
    DomainErrorKind::MismatchedRevision
)]
fn write_errors_map_to_domain_kinds(
    #[case] error: PersistenceError,
    #[case] operation: WriteOperation,
    #[case] expected: DomainErrorKind,
) {
    let mapped = ServiceError::from_write(error, operation, EntityKind::Person, "p-1");

    let domain = mapped.domain().expect("domain error");
    assert_eq!(domain.kind(), &expected);
    assert_eq!(domain.entity_id(), Some("p-1"));
}

#[rstest]
fn connection_failures_stay_infrastructure_errors() {
    let error = PersistenceError::connection("refused");

    let mapped = ServiceError::from_write(
        error.clone(),
        WriteOperation::Create,
        EntityKind::Role,
        "r-1",
    );

    assert_eq!(mapped, ServiceError::Persistence(error));
}
