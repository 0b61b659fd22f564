//! Mock repositories for unit tests.
//!
//! `Repository<E>` is generic, so each entity gets its own concrete double.

use async_trait::async_trait;
use mockall::mock;
use pagination::Page;

use super::{PersistenceError, Repository};
use crate::domain::ids::{OrganisationId, PersonId, RoleAssignmentId, RoleId};
use crate::domain::query_scope::QueryScope;
use crate::domain::{Organisation, Person, Role, RoleAssignment};

macro_rules! repository_mock {
    ($name:ident, $entity:ident, $id:ident) => {
        mock! {
            pub $name {}

            #[async_trait]
            impl Repository<$entity> for $name {
                async fn find_by_id(&self, id: &$id) -> Result<Option<$entity>, PersistenceError>;
                async fn find_by(
                    &self,
                    scope: &QueryScope<$entity>,
                ) -> Result<Page<$entity>, PersistenceError>;
                async fn save(
                    &self,
                    entity: &$entity,
                    expected_revision: Option<u32>,
                ) -> Result<$entity, PersistenceError>;
                async fn delete(&self, id: &$id) -> Result<bool, PersistenceError>;
            }
        }
    };
}

repository_mock!(PersonRepository, Person, PersonId);
repository_mock!(OrganisationRepository, Organisation, OrganisationId);
repository_mock!(RoleRepository, Role, RoleId);
repository_mock!(RoleAssignmentRepository, RoleAssignment, RoleAssignmentId);
