//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven side: [`Repository`] is the one storage contract every entity
//! uses. Driving side: the `*Query` and `*Command` traits are what inbound
//! adapters call; services implement them.

mod macros;
pub(crate) use macros::define_port_error;

mod list_request;
#[cfg(test)]
mod mocks;
mod organisation_ports;
mod person_ports;
mod repository;
mod role_assignment_ports;
mod role_ports;

pub use list_request::ListRequest;
#[cfg(test)]
pub use mocks::{
    MockOrganisationRepository, MockPersonRepository, MockRoleAssignmentRepository,
    MockRoleRepository,
};
#[cfg(test)]
pub use organisation_ports::{MockOrganisationCommand, MockOrganisationQuery};
pub use organisation_ports::{
    CreateOrganisationRequest, ListOrganisationsRequest, OrganisationCommand, OrganisationFilter,
    OrganisationQuery, RenameOrganisationRequest,
};
#[cfg(test)]
pub use person_ports::{MockPersonCommand, MockPersonQuery};
pub use person_ports::{
    CreatePersonRequest, ListPersonsRequest, PersonCommand, PersonQuery, UpdatePersonRequest,
};
pub use repository::{Entity, PersistenceError, Repository};
#[cfg(test)]
pub use role_assignment_ports::{MockRoleAssignmentCommand, MockRoleAssignmentQuery};
pub use role_assignment_ports::{
    CreateRoleAssignmentRequest, ListRoleAssignmentsRequest, RoleAssignmentCommand,
    RoleAssignmentQuery,
};
#[cfg(test)]
pub use role_ports::{MockRoleCommand, MockRoleQuery};
pub use role_ports::{CreateRoleRequest, ListRolesRequest, RoleCommand, RoleQuery};
