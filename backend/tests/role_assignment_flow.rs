//! Role assignment replacement flows against in-memory storage.
//!
//! Exercises the service stack end to end: the class rules read
//! assignments written earlier in the same replacement, and rejected
//! replacements leave the stored set untouched.

use std::sync::Arc;

use iam_backend::domain::ports::{
    CreateOrganisationRequest, CreatePersonRequest, CreateRoleRequest, OrganisationCommand,
    PersonCommand, RoleAssignmentCommand, RoleAssignmentQuery, RoleCommand,
};
use iam_backend::domain::rules::Violation;
use iam_backend::domain::{
    AssignmentTarget, AssignmentUpdate, DomainErrorKind, Organisation, OrganisationKind,
    OrganisationService, Person, PersonService, Role, RoleAssignment, RoleAssignmentService,
    RoleKind, RoleService, ServiceError,
};
use iam_backend::outbound::memory::InMemoryRepository;
use rstest::{fixture, rstest};

type Store<E> = InMemoryRepository<E>;

struct World {
    persons: PersonService<Store<Person>>,
    organisations: OrganisationService<Store<Organisation>>,
    roles: RoleService<Store<Role>, Store<Organisation>>,
    assignments: RoleAssignmentService<
        Store<Person>,
        Store<Organisation>,
        Store<Role>,
        Store<RoleAssignment>,
    >,
}

#[fixture]
fn world() -> World {
    let persons = Arc::new(Store::<Person>::new());
    let organisations = Arc::new(Store::<Organisation>::new());
    let roles = Arc::new(Store::<Role>::new());
    let assignments = Arc::new(Store::<RoleAssignment>::new());
    World {
        persons: PersonService::new(Arc::clone(&persons)),
        organisations: OrganisationService::new(Arc::clone(&organisations)),
        roles: RoleService::new(Arc::clone(&roles), Arc::clone(&organisations)),
        assignments: RoleAssignmentService::new(persons, organisations, roles, assignments),
    }
}

struct Seeded {
    person: Person,
    school: Organisation,
    class: Organisation,
    teacher: Role,
    admin: Role,
}

async fn seed(world: &World) -> Seeded {
    let person = world
        .persons
        .create_person(CreatePersonRequest {
            referrer: None,
            given_name: "Ada".to_owned(),
            family_name: "Lovelace".to_owned(),
        })
        .await
        .expect("person");
    let school = world
        .organisations
        .create_organisation(CreateOrganisationRequest {
            kind: OrganisationKind::School,
            name: Some("Nordschule".to_owned()),
            identifier: None,
            administered_by: None,
            belongs_to: None,
        })
        .await
        .expect("school");
    let class = world
        .organisations
        .create_organisation(CreateOrganisationRequest {
            kind: OrganisationKind::Class,
            name: Some("5a".to_owned()),
            identifier: None,
            administered_by: Some(school.id),
            belongs_to: Some(school.id),
        })
        .await
        .expect("class");
    let teacher = create_role(world, &school, "Lehrkraft", RoleKind::Teacher).await;
    let admin = create_role(world, &school, "Schuladmin", RoleKind::OrgAdmin).await;
    Seeded {
        person,
        school,
        class,
        teacher,
        admin,
    }
}

async fn create_role(world: &World, school: &Organisation, name: &str, kind: RoleKind) -> Role {
    world
        .roles
        .create_role(CreateRoleRequest {
            name: name.to_owned(),
            administered_by: school.id,
            kind,
        })
        .await
        .expect("role")
}

fn target(organisation: &Organisation, role: &Role) -> AssignmentTarget {
    AssignmentTarget {
        organisation_id: organisation.id,
        role_id: role.id,
    }
}

fn violation_of(error: &ServiceError) -> Option<Violation> {
    match error.domain().map(|domain| domain.kind()) {
        Some(DomainErrorKind::SpecificationViolated(violation)) => Some(*violation),
        _ => None,
    }
}

#[rstest]
#[tokio::test]
async fn school_then_class_replaces_in_one_request(world: World) {
    let seeded = seed(&world).await;

    let saved = world
        .assignments
        .replace_for_person(AssignmentUpdate {
            person_id: seeded.person.id,
            expected_count: 0,
            targets: vec![
                target(&seeded.school, &seeded.teacher),
                target(&seeded.class, &seeded.teacher),
            ],
        })
        .await
        .expect("replacement succeeds");

    let targets: Vec<AssignmentTarget> = saved.iter().map(RoleAssignment::target).collect();
    assert_eq!(
        targets,
        vec![
            target(&seeded.school, &seeded.teacher),
            target(&seeded.class, &seeded.teacher),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn class_before_school_is_rejected(world: World) {
    let seeded = seed(&world).await;

    let error = world
        .assignments
        .replace_for_person(AssignmentUpdate {
            person_id: seeded.person.id,
            expected_count: 0,
            targets: vec![target(&seeded.class, &seeded.teacher)],
        })
        .await
        .expect_err("class needs the school assignment");

    assert_eq!(violation_of(&error), Some(Violation::SameRoleAtParentSchool));
}

#[rstest]
#[tokio::test]
async fn rejected_replacement_rolls_back_earlier_inserts(world: World) {
    let seeded = seed(&world).await;

    let error = world
        .assignments
        .replace_for_person(AssignmentUpdate {
            person_id: seeded.person.id,
            expected_count: 0,
            targets: vec![
                target(&seeded.school, &seeded.teacher),
                target(&seeded.school, &seeded.admin),
                target(&seeded.class, &seeded.admin),
            ],
        })
        .await
        .expect_err("admin role is not allowed at a class");

    assert_eq!(
        violation_of(&error),
        Some(Violation::OnlyLearnersAndTeachersAtClass)
    );
    let stored = world
        .assignments
        .list_for_person(&seeded.person.id)
        .await
        .expect("list");
    assert!(stored.is_empty(), "inserts were rolled back: {stored:?}");
}

#[rstest]
#[tokio::test]
async fn replacement_drops_targets_no_longer_wanted(world: World) {
    let seeded = seed(&world).await;
    world
        .assignments
        .replace_for_person(AssignmentUpdate {
            person_id: seeded.person.id,
            expected_count: 0,
            targets: vec![
                target(&seeded.school, &seeded.teacher),
                target(&seeded.school, &seeded.admin),
            ],
        })
        .await
        .expect("first replacement");

    let saved = world
        .assignments
        .replace_for_person(AssignmentUpdate {
            person_id: seeded.person.id,
            expected_count: 2,
            targets: vec![target(&seeded.school, &seeded.admin)],
        })
        .await
        .expect("second replacement");

    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].target(), target(&seeded.school, &seeded.admin));
}

#[rstest]
#[case::too_low(0)]
#[case::too_high(2)]
#[tokio::test]
async fn stale_count_is_rejected_without_changes(world: World, #[case] expected_count: u64) {
    let seeded = seed(&world).await;
    world
        .assignments
        .replace_for_person(AssignmentUpdate {
            person_id: seeded.person.id,
            expected_count: 0,
            targets: vec![target(&seeded.school, &seeded.teacher)],
        })
        .await
        .expect("seed assignment");

    let error = world
        .assignments
        .replace_for_person(AssignmentUpdate {
            person_id: seeded.person.id,
            expected_count,
            targets: Vec::new(),
        })
        .await
        .expect_err("count does not match");

    assert_eq!(violation_of(&error), Some(Violation::ExpectedAssignmentCount));
    let stored = world
        .assignments
        .list_for_person(&seeded.person.id)
        .await
        .expect("list");
    assert_eq!(stored.len(), 1);
}

async fn assign_school_and_class(world: &World, seeded: &Seeded) -> Vec<RoleAssignment> {
    world
        .assignments
        .replace_for_person(AssignmentUpdate {
            person_id: seeded.person.id,
            expected_count: 0,
            targets: vec![
                target(&seeded.school, &seeded.teacher),
                target(&seeded.class, &seeded.teacher),
            ],
        })
        .await
        .expect("school and class")
}

async fn stored_targets(world: &World, seeded: &Seeded) -> Vec<AssignmentTarget> {
    world
        .assignments
        .list_for_person(&seeded.person.id)
        .await
        .expect("list")
        .iter()
        .map(RoleAssignment::target)
        .collect()
}

#[rstest]
#[tokio::test]
async fn keeping_the_class_while_dropping_its_school_is_rejected(world: World) {
    let seeded = seed(&world).await;
    assign_school_and_class(&world, &seeded).await;

    let error = world
        .assignments
        .replace_for_person(AssignmentUpdate {
            person_id: seeded.person.id,
            expected_count: 2,
            targets: vec![target(&seeded.class, &seeded.teacher)],
        })
        .await
        .expect_err("class would lose its school");

    assert_eq!(violation_of(&error), Some(Violation::SameRoleAtParentSchool));
    assert_eq!(
        stored_targets(&world, &seeded).await,
        vec![
            target(&seeded.school, &seeded.teacher),
            target(&seeded.class, &seeded.teacher),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn moving_from_school_to_class_only_is_rejected(world: World) {
    let seeded = seed(&world).await;
    world
        .assignments
        .replace_for_person(AssignmentUpdate {
            person_id: seeded.person.id,
            expected_count: 0,
            targets: vec![target(&seeded.school, &seeded.teacher)],
        })
        .await
        .expect("school only");

    let error = world
        .assignments
        .replace_for_person(AssignmentUpdate {
            person_id: seeded.person.id,
            expected_count: 1,
            targets: vec![target(&seeded.class, &seeded.teacher)],
        })
        .await
        .expect_err("school would be dropped");

    assert_eq!(violation_of(&error), Some(Violation::SameRoleAtParentSchool));
    assert_eq!(
        stored_targets(&world, &seeded).await,
        vec![target(&seeded.school, &seeded.teacher)]
    );
}

#[rstest]
#[tokio::test]
async fn school_assignment_backing_a_class_cannot_be_deleted(world: World) {
    let seeded = seed(&world).await;
    let saved = assign_school_and_class(&world, &seeded).await;
    let at_school = saved
        .iter()
        .find(|assignment| assignment.organisation_id == seeded.school.id)
        .expect("school assignment");
    let at_class = saved
        .iter()
        .find(|assignment| assignment.organisation_id == seeded.class.id)
        .expect("class assignment");

    let error = world
        .assignments
        .delete_assignment(&at_school.id)
        .await
        .expect_err("class depends on it");
    assert_eq!(violation_of(&error), Some(Violation::SameRoleAtParentSchool));

    world
        .assignments
        .delete_assignment(&at_class.id)
        .await
        .expect("class goes first");
    world
        .assignments
        .delete_assignment(&at_school.id)
        .await
        .expect("then the school");
    assert!(stored_targets(&world, &seeded).await.is_empty());
}
