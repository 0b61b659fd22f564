//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::domain::ports::{CreateOrganisationRequest, CreatePersonRequest, CreateRoleRequest};
use crate::domain::{Organisation, OrganisationKind, Person, Role, RoleKind};
use crate::inbound::http::error::{json_error_handler, query_error_handler};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::configure_api;
use crate::outbound::memory::InMemoryRepository;

/// Services wired over fresh in-memory repositories.
pub fn memory_state() -> HttpState {
    HttpState::from_repositories(
        Arc::new(InMemoryRepository::new()),
        Arc::new(InMemoryRepository::new()),
        Arc::new(InMemoryRepository::new()),
        Arc::new(InMemoryRepository::new()),
    )
}

/// Application with the full `/api` surface and the production error
/// handlers.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .configure(configure_api)
}

pub async fn seed_person(state: &HttpState, given: &str, family: &str) -> Person {
    state
        .person_commands
        .create_person(CreatePersonRequest {
            referrer: None,
            given_name: given.to_owned(),
            family_name: family.to_owned(),
        })
        .await
        .expect("seed person")
}

pub async fn seed_school(state: &HttpState, name: &str) -> Organisation {
    state
        .organisation_commands
        .create_organisation(CreateOrganisationRequest {
            kind: OrganisationKind::School,
            name: Some(name.to_owned()),
            identifier: None,
            administered_by: None,
            belongs_to: None,
        })
        .await
        .expect("seed school")
}

pub async fn seed_class(state: &HttpState, school: &Organisation, name: &str) -> Organisation {
    state
        .organisation_commands
        .create_organisation(CreateOrganisationRequest {
            kind: OrganisationKind::Class,
            name: Some(name.to_owned()),
            identifier: None,
            administered_by: Some(school.id),
            belongs_to: Some(school.id),
        })
        .await
        .expect("seed class")
}

pub async fn seed_role(
    state: &HttpState,
    school: &Organisation,
    name: &str,
    kind: RoleKind,
) -> Role {
    state
        .role_commands
        .create_role(CreateRoleRequest {
            name: name.to_owned(),
            administered_by: school.id,
            kind,
        })
        .await
        .expect("seed role")
}
