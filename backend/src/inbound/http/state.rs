//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and depend only on the driving
//! ports, so they can be exercised with mocks or in-memory services.

use std::sync::Arc;

use crate::domain::ports::{
    OrganisationCommand, OrganisationQuery, PersonCommand, PersonQuery, Repository,
    RoleAssignmentCommand, RoleAssignmentQuery, RoleCommand, RoleQuery,
};
use crate::domain::{
    Organisation, OrganisationService, Person, PersonService, Role, RoleAssignment,
    RoleAssignmentService, RoleService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub persons: Arc<dyn PersonQuery>,
    pub person_commands: Arc<dyn PersonCommand>,
    pub organisations: Arc<dyn OrganisationQuery>,
    pub organisation_commands: Arc<dyn OrganisationCommand>,
    pub roles: Arc<dyn RoleQuery>,
    pub role_commands: Arc<dyn RoleCommand>,
    pub assignments: Arc<dyn RoleAssignmentQuery>,
    pub assignment_commands: Arc<dyn RoleAssignmentCommand>,
}

impl HttpState {
    /// Wire the domain services over one repository per entity.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use iam_backend::inbound::http::state::HttpState;
    /// use iam_backend::outbound::memory::InMemoryRepository;
    ///
    /// let state = HttpState::from_repositories(
    ///     Arc::new(InMemoryRepository::new()),
    ///     Arc::new(InMemoryRepository::new()),
    ///     Arc::new(InMemoryRepository::new()),
    ///     Arc::new(InMemoryRepository::new()),
    /// );
    /// let _persons = state.persons.clone();
    /// ```
    pub fn from_repositories<P, O, R, A>(
        persons: Arc<P>,
        organisations: Arc<O>,
        roles: Arc<R>,
        assignments: Arc<A>,
    ) -> Self
    where
        P: Repository<Person> + 'static,
        O: Repository<Organisation> + 'static,
        R: Repository<Role> + 'static,
        A: Repository<RoleAssignment> + 'static,
    {
        let person_service = Arc::new(PersonService::new(Arc::clone(&persons)));
        let organisation_service = Arc::new(OrganisationService::new(Arc::clone(&organisations)));
        let role_service = Arc::new(RoleService::new(roles.clone(), organisations.clone()));
        let assignment_service = Arc::new(RoleAssignmentService::new(
            persons,
            organisations,
            roles,
            assignments,
        ));
        Self {
            persons: person_service.clone(),
            person_commands: person_service,
            organisations: organisation_service.clone(),
            organisation_commands: organisation_service,
            roles: role_service.clone(),
            role_commands: role_service,
            assignments: assignment_service.clone(),
            assignment_commands: assignment_service,
        }
    }
}
