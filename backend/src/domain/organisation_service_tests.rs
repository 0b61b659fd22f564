//! Tests for the organisation service.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::error::DomainErrorKind;
use crate::domain::organisation::{OrganisationKind, OrganisationSearch};
use crate::domain::ports::{MockOrganisationRepository, OrganisationFilter};
use crate::domain::rules::Violation;

fn make_service(
    repo: MockOrganisationRepository,
) -> OrganisationService<MockOrganisationRepository> {
    OrganisationService::new(Arc::new(repo))
}

fn class_request(name: Option<&str>, school: OrganisationId) -> CreateOrganisationRequest {
    CreateOrganisationRequest {
        kind: OrganisationKind::Class,
        name: name.map(str::to_owned),
        identifier: None,
        administered_by: Some(school),
        belongs_to: None,
    }
}

fn kind_of(error: &ServiceError) -> Option<&DomainErrorKind> {
    error.domain().map(DomainError::kind)
}

#[rstest]
#[tokio::test]
async fn creates_a_class_under_a_school() {
    let school = Organisation::new(OrganisationKind::School, Some("Nordschule".to_owned()));
    let school_id = school.id;
    let mut repo = MockOrganisationRepository::new();
    repo.expect_find_by_id()
        .returning(move |_| Ok(Some(school.clone())));
    repo.expect_find_by()
        .times(1)
        .returning(|scope| Ok(Page::new(Vec::new(), 0, scope.page())));
    repo.expect_save()
        .times(1)
        .returning(|organisation, _| Ok(organisation.clone()));

    let class = make_service(repo)
        .create_organisation(class_request(Some("1a"), school_id))
        .await
        .expect("created");

    assert_eq!(class.administered_by, Some(school_id));
    assert!(class.is_class());
}

#[rstest]
#[tokio::test]
async fn missing_parent_is_not_found() {
    let mut repo = MockOrganisationRepository::new();
    repo.expect_find_by_id().times(1).returning(|_| Ok(None));
    repo.expect_save().times(0);

    let error = make_service(repo)
        .create_organisation(class_request(Some("1a"), OrganisationId::random()))
        .await
        .expect_err("parent missing");

    assert_eq!(kind_of(&error), Some(&DomainErrorKind::NotFound));
    assert_eq!(error.domain().map(DomainError::entity), Some(EntityKind::Organisation));
}

#[rstest]
#[tokio::test]
async fn unnamed_class_stops_at_the_first_rule() {
    let school = Organisation::new(OrganisationKind::School, None);
    let school_id = school.id;
    let mut repo = MockOrganisationRepository::new();
    // Only the parent existence check; later rules never look anything up.
    repo.expect_find_by_id()
        .times(1)
        .returning(move |_| Ok(Some(school.clone())));
    repo.expect_find_by().times(0);
    repo.expect_save().times(0);

    let error = make_service(repo)
        .create_organisation(class_request(None, school_id))
        .await
        .expect_err("name required");

    assert_eq!(
        kind_of(&error),
        Some(&DomainErrorKind::SpecificationViolated(
            Violation::ClassNameRequired
        ))
    );
}

#[rstest]
#[tokio::test]
async fn list_adds_search_as_an_or_group() {
    let mut repo = MockOrganisationRepository::new();
    repo.expect_find_by()
        .times(1)
        .withf(|scope| {
            let groups = scope.groups();
            groups.len() == 2
                && groups[0].combinator == Combinator::And
                && groups[1].combinator == Combinator::Or
                && groups[1].predicates.len() == 2
        })
        .returning(|scope| Ok(Page::new(Vec::new(), 0, scope.page())));

    let request = ListOrganisationsRequest::new(OrganisationFilter {
        criteria: crate::domain::OrganisationCriteria {
            kind: Some(OrganisationKind::School),
            ..Default::default()
        },
        search: OrganisationSearch {
            term: Some("Nord".to_owned()),
        },
    });

    let page = make_service(repo)
        .list_organisations(request)
        .await
        .expect("listed");

    assert_eq!(page.total(), 0);
}

#[rstest]
#[tokio::test]
async fn rename_checks_revision() {
    let school = Organisation::new(OrganisationKind::School, Some("Alt".to_owned()));
    let id = school.id;
    let mut repo = MockOrganisationRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(school)));
    repo.expect_save().times(0);

    let error = make_service(repo)
        .rename_organisation(
            &id,
            RenameOrganisationRequest {
                name: "Neu".to_owned(),
                revision: 4,
            },
        )
        .await
        .expect_err("stale revision");

    assert_eq!(kind_of(&error), Some(&DomainErrorKind::MismatchedRevision));
}

#[rstest]
#[tokio::test]
async fn rename_saves_next_revision() {
    let school = Organisation::new(OrganisationKind::School, Some("Alt".to_owned()));
    let id = school.id;
    let mut repo = MockOrganisationRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(school)));
    repo.expect_save()
        .times(1)
        .withf(|organisation, expected| organisation.revision == 2 && *expected == Some(1))
        .returning(|organisation, _| Ok(organisation.clone()));

    let renamed = make_service(repo)
        .rename_organisation(
            &id,
            RenameOrganisationRequest {
                name: "Neu".to_owned(),
                revision: 1,
            },
        )
        .await
        .expect("renamed");

    assert_eq!(renamed.name.as_deref(), Some("Neu"));
}
