//! Organisation management service.
//!
//! Every write runs the organisation rules in this order: a class needs a
//! name, a class is administered by a school, and class names are unique
//! per school.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::Page;
use tracing::instrument;

use crate::domain::error::{DomainError, EntityKind, ServiceError, WriteOperation};
use crate::domain::ids::OrganisationId;
use crate::domain::organisation::Organisation;
use crate::domain::ports::{
    CreateOrganisationRequest, ListOrganisationsRequest, OrganisationCommand, OrganisationQuery,
    RenameOrganisationRequest, Repository,
};
use crate::domain::query_scope::Combinator;
use crate::domain::rules::{ClassAdministeredBySchool, ClassNameRequired, ClassNameUniqueAtSchool};
use crate::domain::validation::ValidationPipeline;

/// Organisation service implementing the driving ports.
pub struct OrganisationService<O: ?Sized> {
    organisations: Arc<O>,
    rules: ValidationPipeline<Organisation>,
}

impl<O> OrganisationService<O>
where
    O: Repository<Organisation> + ?Sized + 'static,
{
    pub fn new(organisations: Arc<O>) -> Self {
        let rules = ValidationPipeline::new()
            .with_rule(ClassNameRequired)
            .with_rule(ClassAdministeredBySchool::new(Arc::clone(&organisations)))
            .with_rule(ClassNameUniqueAtSchool::new(Arc::clone(&organisations)));
        Self {
            organisations,
            rules,
        }
    }

    async fn load(&self, id: &OrganisationId) -> Result<Organisation, ServiceError> {
        self.organisations
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Organisation, id).into())
    }

    async fn ensure_exists(&self, id: Option<OrganisationId>) -> Result<(), ServiceError> {
        if let Some(id) = id {
            self.load(&id).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl<O> OrganisationQuery for OrganisationService<O>
where
    O: Repository<Organisation> + ?Sized + 'static,
{
    #[instrument(skip(self), fields(organisation_id = %id))]
    async fn get_organisation(&self, id: &OrganisationId) -> Result<Organisation, ServiceError> {
        self.load(id).await
    }

    #[instrument(skip_all)]
    async fn list_organisations(
        &self,
        request: ListOrganisationsRequest,
    ) -> Result<Page<Organisation>, ServiceError> {
        let search = request.criteria.search.clone();
        let scope = request
            .into_scope::<Organisation>()
            .find_by(search, Combinator::Or);
        Ok(scope.execute(self.organisations.as_ref()).await?)
    }
}

#[async_trait]
impl<O> OrganisationCommand for OrganisationService<O>
where
    O: Repository<Organisation> + ?Sized + 'static,
{
    #[instrument(skip_all, fields(kind = %request.kind))]
    async fn create_organisation(
        &self,
        request: CreateOrganisationRequest,
    ) -> Result<Organisation, ServiceError> {
        self.ensure_exists(request.administered_by).await?;
        self.ensure_exists(request.belongs_to).await?;

        let mut organisation = Organisation::new(request.kind, request.name);
        organisation.identifier = request.identifier;
        organisation.administered_by = request.administered_by;
        organisation.belongs_to = request.belongs_to;

        self.rules.validate(&organisation).await?;
        self.organisations
            .save(&organisation, None)
            .await
            .map_err(|error| {
                ServiceError::from_write(
                    error,
                    WriteOperation::Create,
                    EntityKind::Organisation,
                    organisation.id,
                )
            })
    }

    #[instrument(skip(self, request), fields(organisation_id = %id))]
    async fn rename_organisation(
        &self,
        id: &OrganisationId,
        request: RenameOrganisationRequest,
    ) -> Result<Organisation, ServiceError> {
        let current = self.load(id).await?;
        if current.revision != request.revision {
            return Err(DomainError::mismatched_revision(
                EntityKind::Organisation,
                request.revision,
                current.revision,
            )
            .with_entity_id(id)
            .into());
        }
        let renamed = current.renamed(request.name);
        self.rules.validate(&renamed).await?;
        self.organisations
            .save(&renamed, Some(request.revision))
            .await
            .map_err(|error| {
                ServiceError::from_write(error, WriteOperation::Update, EntityKind::Organisation, id)
            })
    }
}

#[cfg(test)]
#[path = "organisation_service_tests.rs"]
mod tests;
