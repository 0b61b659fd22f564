//! Driving ports for role use cases.

use async_trait::async_trait;
use pagination::Page;

use super::ListRequest;
use crate::domain::error::ServiceError;
use crate::domain::ids::{OrganisationId, RoleId};
use crate::domain::role::{Role, RoleCriteria, RoleField, RoleKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleRequest {
    pub name: String,
    pub administered_by: OrganisationId,
    pub kind: RoleKind,
}

pub type ListRolesRequest = ListRequest<RoleField, RoleCriteria>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleQuery: Send + Sync {
    async fn get_role(&self, id: &RoleId) -> Result<Role, ServiceError>;

    async fn list_roles(&self, request: ListRolesRequest) -> Result<Page<Role>, ServiceError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleCommand: Send + Sync {
    /// Create a role; the administering organisation must exist.
    async fn create_role(&self, request: CreateRoleRequest) -> Result<Role, ServiceError>;
}
