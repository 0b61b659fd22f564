//! Driving ports for organisation use cases.

use async_trait::async_trait;
use pagination::Page;

use super::ListRequest;
use crate::domain::error::ServiceError;
use crate::domain::ids::OrganisationId;
use crate::domain::organisation::{
    Organisation, OrganisationCriteria, OrganisationField, OrganisationKind, OrganisationSearch,
};
use crate::domain::query_scope::FilterValue;

/// Data for a new organisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrganisationRequest {
    pub kind: OrganisationKind,
    pub name: Option<String>,
    pub identifier: Option<String>,
    pub administered_by: Option<OrganisationId>,
    pub belongs_to: Option<OrganisationId>,
}

/// Revision-checked rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOrganisationRequest {
    pub name: String,
    pub revision: u32,
}

/// Equality criteria plus an optional free-text search term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganisationFilter {
    pub criteria: OrganisationCriteria,
    pub search: OrganisationSearch,
}

impl IntoIterator for OrganisationFilter {
    type Item = (OrganisationField, Option<FilterValue>);
    type IntoIter = std::array::IntoIter<Self::Item, 5>;

    /// Only the equality criteria; the search needs its own OR group.
    fn into_iter(self) -> Self::IntoIter {
        self.criteria.into_iter()
    }
}

pub type ListOrganisationsRequest = ListRequest<OrganisationField, OrganisationFilter>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrganisationQuery: Send + Sync {
    async fn get_organisation(&self, id: &OrganisationId) -> Result<Organisation, ServiceError>;

    async fn list_organisations(
        &self,
        request: ListOrganisationsRequest,
    ) -> Result<Page<Organisation>, ServiceError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrganisationCommand: Send + Sync {
    async fn create_organisation(
        &self,
        request: CreateOrganisationRequest,
    ) -> Result<Organisation, ServiceError>;

    async fn rename_organisation(
        &self,
        id: &OrganisationId,
        request: RenameOrganisationRequest,
    ) -> Result<Organisation, ServiceError>;
}
