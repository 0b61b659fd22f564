//! Driving ports for role assignment (Personenkontext) use cases.

use async_trait::async_trait;
use pagination::Page;

use super::ListRequest;
use crate::domain::error::ServiceError;
use crate::domain::ids::{OrganisationId, PersonId, RoleAssignmentId, RoleId};
use crate::domain::role_assignment::{
    AssignmentUpdate, RoleAssignment, RoleAssignmentCriteria, RoleAssignmentField,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateRoleAssignmentRequest {
    pub person_id: PersonId,
    pub organisation_id: OrganisationId,
    pub role_id: RoleId,
}

pub type ListRoleAssignmentsRequest = ListRequest<RoleAssignmentField, RoleAssignmentCriteria>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleAssignmentQuery: Send + Sync {
    async fn list_assignments(
        &self,
        request: ListRoleAssignmentsRequest,
    ) -> Result<Page<RoleAssignment>, ServiceError>;

    /// Every assignment of a person, oldest first.
    async fn list_for_person(&self, person_id: &PersonId)
    -> Result<Vec<RoleAssignment>, ServiceError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleAssignmentCommand: Send + Sync {
    async fn create_assignment(
        &self,
        request: CreateRoleAssignmentRequest,
    ) -> Result<RoleAssignment, ServiceError>;

    /// Replace every assignment of `update.person_id` with `update.targets`.
    async fn replace_for_person(
        &self,
        update: AssignmentUpdate,
    ) -> Result<Vec<RoleAssignment>, ServiceError>;

    async fn delete_assignment(&self, id: &RoleAssignmentId) -> Result<(), ServiceError>;
}
