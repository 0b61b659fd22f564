//! Tests for the person service.

use std::sync::Arc;

use pagination::PageRequest;
use rstest::rstest;

use super::*;
use crate::domain::error::DomainErrorKind;
use crate::domain::person::PersonField;
use crate::domain::ports::{MockPersonRepository, PersistenceError};
use crate::domain::query_scope::SortKey;

fn make_service(repo: MockPersonRepository) -> PersonService<MockPersonRepository> {
    PersonService::new(Arc::new(repo))
}

fn kind_of(error: &ServiceError) -> Option<&DomainErrorKind> {
    error.domain().map(DomainError::kind)
}

fn create_request(referrer: Option<&str>) -> CreatePersonRequest {
    CreatePersonRequest {
        referrer: referrer.map(str::to_owned),
        given_name: "Ada".to_owned(),
        family_name: "Lovelace".to_owned(),
    }
}

#[rstest]
#[tokio::test]
async fn create_saves_new_person_at_revision_one() {
    let mut repo = MockPersonRepository::new();
    repo.expect_find_by()
        .times(1)
        .returning(|scope| Ok(Page::new(Vec::new(), 0, scope.page())));
    repo.expect_save()
        .times(1)
        .withf(|person, expected| person.revision == 1 && expected.is_none())
        .returning(|person, _| Ok(person.clone()));

    let person = make_service(repo)
        .create_person(create_request(Some("ada")))
        .await
        .expect("created");

    assert_eq!(person.referrer.as_deref(), Some("ada"));
    assert_eq!(person.revision, 1);
}

#[rstest]
#[tokio::test]
async fn create_without_referrer_skips_uniqueness_lookup() {
    let mut repo = MockPersonRepository::new();
    repo.expect_find_by().times(0);
    repo.expect_save()
        .times(1)
        .returning(|person, _| Ok(person.clone()));

    let result = make_service(repo).create_person(create_request(None)).await;

    assert!(result.is_ok());
}

#[rstest]
#[tokio::test]
async fn taken_referrer_is_already_exists_not_a_failed_create() {
    let mut repo = MockPersonRepository::new();
    repo.expect_find_by()
        .times(1)
        .returning(|scope| Ok(Page::new(Vec::new(), 1, scope.page())));
    repo.expect_save().times(0);

    let error = make_service(repo)
        .create_person(create_request(Some("ada")))
        .await
        .expect_err("duplicate referrer");

    assert_eq!(kind_of(&error), Some(&DomainErrorKind::AlreadyExists));
}

#[rstest]
#[tokio::test]
async fn failed_insert_is_could_not_be_created() {
    let mut repo = MockPersonRepository::new();
    repo.expect_save()
        .times(1)
        .returning(|_, _| Err(PersistenceError::query("insert failed")));

    let error = make_service(repo)
        .create_person(create_request(None))
        .await
        .expect_err("insert fails");

    assert_eq!(kind_of(&error), Some(&DomainErrorKind::CouldNotBeCreated));
}

#[rstest]
#[tokio::test]
async fn get_missing_person_is_not_found() {
    let id = PersonId::random();
    let mut repo = MockPersonRepository::new();
    repo.expect_find_by_id().times(1).returning(|_| Ok(None));

    let error = make_service(repo).get_person(&id).await.expect_err("missing");

    assert_eq!(kind_of(&error), Some(&DomainErrorKind::NotFound));
    assert_eq!(error.domain().and_then(DomainError::entity_id), Some(id.to_string().as_str()));
}

#[rstest]
#[tokio::test]
async fn list_passes_sort_and_page_to_the_repository() {
    let mut repo = MockPersonRepository::new();
    repo.expect_find_by()
        .times(1)
        .withf(|scope| {
            scope.sort_keys() == [SortKey::asc(PersonField::FamilyName)]
                && scope.page() == PageRequest::new(Some(5), Some(5))
                && scope.groups().is_empty()
        })
        .returning(|scope| Ok(Page::new(Vec::new(), 12, scope.page())));

    let page = make_service(repo)
        .list_persons(
            ListPersonsRequest::default()
                .with_sort(vec![SortKey::asc(PersonField::FamilyName)])
                .with_page(PageRequest::new(Some(5), Some(5))),
        )
        .await
        .expect("listed");

    assert_eq!(page.total(), 12);
}

#[rstest]
#[tokio::test]
async fn update_with_stale_revision_is_rejected_before_saving() {
    let stored = Person::new(None, "Ada", "Lovelace").renamed("Ada", "Byron");
    let id = stored.id;
    let mut repo = MockPersonRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(stored)));
    repo.expect_save().times(0);

    let error = make_service(repo)
        .update_person(
            &id,
            UpdatePersonRequest {
                given_name: "Augusta".to_owned(),
                family_name: "King".to_owned(),
                revision: 1,
            },
        )
        .await
        .expect_err("stale");

    assert_eq!(kind_of(&error), Some(&DomainErrorKind::MismatchedRevision));
}

#[rstest]
#[tokio::test]
async fn update_bumps_revision_and_checks_the_old_one() {
    let stored = Person::new(None, "Ada", "Lovelace");
    let id = stored.id;
    let mut repo = MockPersonRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(stored)));
    repo.expect_save()
        .times(1)
        .withf(|person, expected| person.revision == 2 && *expected == Some(1))
        .returning(|person, _| Ok(person.clone()));

    let updated = make_service(repo)
        .update_person(
            &id,
            UpdatePersonRequest {
                given_name: "Augusta".to_owned(),
                family_name: "King".to_owned(),
                revision: 1,
            },
        )
        .await
        .expect("updated");

    assert_eq!(updated.given_name, "Augusta");
}

#[rstest]
#[tokio::test]
async fn concurrent_update_surfaces_as_mismatched_revision() {
    let stored = Person::new(None, "Ada", "Lovelace");
    let id = stored.id;
    let mut repo = MockPersonRepository::new();
    repo.expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));
    repo.expect_save()
        .returning(|_, _| Err(PersistenceError::revision_mismatch(1_u32, 2_u32)));

    let error = make_service(repo)
        .update_person(
            &id,
            UpdatePersonRequest {
                given_name: "Augusta".to_owned(),
                family_name: "King".to_owned(),
                revision: 1,
            },
        )
        .await
        .expect_err("lost race");

    assert_eq!(kind_of(&error), Some(&DomainErrorKind::MismatchedRevision));
}

#[rstest]
#[case(true, None)]
#[case(false, Some(DomainErrorKind::NotFound))]
#[tokio::test]
async fn delete_reports_missing_rows(
    #[case] deleted: bool,
    #[case] expected: Option<DomainErrorKind>,
) {
    let mut repo = MockPersonRepository::new();
    repo.expect_delete().times(1).returning(move |_| Ok(deleted));

    let result = make_service(repo).delete_person(&PersonId::random()).await;

    assert_eq!(result.err().as_ref().and_then(kind_of), expected.as_ref());
}
