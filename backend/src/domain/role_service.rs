//! Role management service.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::Page;
use tracing::instrument;

use crate::domain::error::{DomainError, EntityKind, ServiceError, WriteOperation};
use crate::domain::ids::RoleId;
use crate::domain::organisation::Organisation;
use crate::domain::ports::{CreateRoleRequest, ListRolesRequest, Repository, RoleCommand, RoleQuery};
use crate::domain::role::Role;

/// Role service implementing the driving ports.
pub struct RoleService<R: ?Sized, O: ?Sized> {
    roles: Arc<R>,
    organisations: Arc<O>,
}

impl<R: ?Sized, O: ?Sized> RoleService<R, O> {
    pub fn new(roles: Arc<R>, organisations: Arc<O>) -> Self {
        Self {
            roles,
            organisations,
        }
    }
}

#[async_trait]
impl<R, O> RoleQuery for RoleService<R, O>
where
    R: Repository<Role> + ?Sized,
    O: Repository<Organisation> + ?Sized,
{
    #[instrument(skip(self), fields(role_id = %id))]
    async fn get_role(&self, id: &RoleId) -> Result<Role, ServiceError> {
        self.roles
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Role, id).into())
    }

    #[instrument(skip_all)]
    async fn list_roles(&self, request: ListRolesRequest) -> Result<Page<Role>, ServiceError> {
        Ok(request
            .into_scope::<Role>()
            .execute(self.roles.as_ref())
            .await?)
    }
}

#[async_trait]
impl<R, O> RoleCommand for RoleService<R, O>
where
    R: Repository<Role> + ?Sized,
    O: Repository<Organisation> + ?Sized,
{
    #[instrument(skip_all, fields(kind = %request.kind))]
    async fn create_role(&self, request: CreateRoleRequest) -> Result<Role, ServiceError> {
        if self
            .organisations
            .find_by_id(&request.administered_by)
            .await?
            .is_none()
        {
            return Err(
                DomainError::not_found(EntityKind::Organisation, request.administered_by).into(),
            );
        }
        let role = Role::new(request.name, request.administered_by, request.kind);
        self.roles.save(&role, None).await.map_err(|error| {
            ServiceError::from_write(error, WriteOperation::Create, EntityKind::Role, role.id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DomainErrorKind;
    use crate::domain::ids::OrganisationId;
    use crate::domain::organisation::OrganisationKind;
    use crate::domain::ports::{MockOrganisationRepository, MockRoleRepository};
    use crate::domain::role::RoleKind;
    use rstest::rstest;

    fn request(administered_by: OrganisationId) -> CreateRoleRequest {
        CreateRoleRequest {
            name: "Lehrkraft".to_owned(),
            administered_by,
            kind: RoleKind::Teacher,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn create_requires_the_administering_organisation() {
        let mut roles = MockRoleRepository::new();
        roles.expect_save().times(0);
        let mut organisations = MockOrganisationRepository::new();
        organisations
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));
        let service = RoleService::new(Arc::new(roles), Arc::new(organisations));

        let error = service
            .create_role(request(OrganisationId::random()))
            .await
            .expect_err("organisation missing");

        assert_eq!(
            error.domain().map(DomainError::kind),
            Some(&DomainErrorKind::NotFound)
        );
        assert_eq!(
            error.domain().map(DomainError::entity),
            Some(EntityKind::Organisation)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn create_saves_role() {
        let school = Organisation::new(OrganisationKind::School, Some("Nordschule".to_owned()));
        let school_id = school.id;
        let mut organisations = MockOrganisationRepository::new();
        organisations
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(school)));
        let mut roles = MockRoleRepository::new();
        roles
            .expect_save()
            .times(1)
            .returning(|role, _| Ok(role.clone()));
        let service = RoleService::new(Arc::new(roles), Arc::new(organisations));

        let role = service.create_role(request(school_id)).await.expect("created");

        assert_eq!(role.administered_by, school_id);
        assert_eq!(role.kind, RoleKind::Teacher);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_role_is_not_found() {
        let mut roles = MockRoleRepository::new();
        roles.expect_find_by_id().returning(|_| Ok(None));
        let service = RoleService::new(Arc::new(roles), Arc::new(MockOrganisationRepository::new()));

        let error = service.get_role(&RoleId::random()).await.expect_err("missing");

        assert_eq!(
            error.domain().map(DomainError::kind),
            Some(&DomainErrorKind::NotFound)
        );
    }
}
