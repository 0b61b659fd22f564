//! PostgreSQL-backed `Repository<Role>`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::Page;
use uuid::Uuid;

use crate::domain::ports::{PersistenceError, Repository};
use crate::domain::query_scope::QueryScope;
use crate::domain::{OrganisationId, Role, RoleId, RoleKind};
use crate::query_and_disambiguate;
use crate::query_optional;
use crate::save_with_revision;

use super::diesel_helpers::{
    HasRevision, cast_revision, cast_revision_for_db, load_scope, map_diesel_error,
    map_pool_error,
};
use super::models::{NewRoleRow, RoleRow, RoleUpdate};
use super::pool::DbPool;
use super::schema::roles;

/// Diesel-backed role storage.
#[derive(Clone)]
pub struct DieselRoleRepository {
    pool: DbPool,
}

impl DieselRoleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_role(row: RoleRow) -> Result<Role, String> {
    let kind: RoleKind = row.kind.parse()?;
    Ok(Role {
        id: RoleId::from_uuid(row.id),
        name: row.name,
        administered_by: OrganisationId::from_uuid(row.administered_by),
        kind,
        revision: cast_revision(row.revision),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl HasRevision for RoleRow {
    fn revision(&self) -> u32 {
        cast_revision(self.revision)
    }
}

async fn handle_update_failure<C>(
    conn: &mut C,
    id: Uuid,
    expected_revision: u32,
) -> PersistenceError
where
    C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    query_and_disambiguate!(
        conn,
        roles::table,
        roles::id.eq(id),
        RoleRow,
        expected_revision,
        "role not found"
    )
}

#[async_trait]
impl Repository<Role> for DieselRoleRepository {
    async fn find_by_id(&self, id: &RoleId) -> Result<Option<Role>, PersistenceError> {
        query_optional!(
            self,
            roles::table,
            roles::id.eq(id.as_uuid()),
            RoleRow,
            row_to_role
        )
    }

    async fn find_by(&self, scope: &QueryScope<Role>) -> Result<Page<Role>, PersistenceError> {
        load_scope(&self.pool, "roles", scope, row_to_role).await
    }

    async fn save(&self, role: &Role, expected_revision: Option<u32>) -> Result<Role, PersistenceError> {
        let id = *role.id.as_uuid();
        save_with_revision!(
            self,
            expected_revision,
            insert: {
                table: roles::table,
                new_row: NewRoleRow {
                    id,
                    name: &role.name,
                    administered_by: *role.administered_by.as_uuid(),
                    kind: role.kind.as_str(),
                    revision: cast_revision_for_db(role.revision),
                    created_at: role.created_at,
                    updated_at: role.updated_at,
                }
            },
            update(expected): {
                table: roles::table,
                filter: roles::id
                    .eq(id)
                    .and(roles::revision.eq(cast_revision_for_db(expected))),
                changeset: RoleUpdate {
                    name: &role.name,
                    kind: role.kind.as_str(),
                    revision: cast_revision_for_db(role.revision),
                    updated_at: role.updated_at,
                },
                on_zero_rows: |conn, expected| handle_update_failure(conn, id, expected)
            }
        )?;
        Ok(role.clone())
    }

    async fn delete(&self, id: &RoleId) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(roles::table.filter(roles::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}
