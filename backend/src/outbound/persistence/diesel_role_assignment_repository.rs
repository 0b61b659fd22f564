//! PostgreSQL-backed `Repository<RoleAssignment>`.
//!
//! The `(person_id, organisation_id, role_id)` unique constraint backs the
//! duplicate check done by the service, so concurrent inserts of the same
//! triple still end in `Duplicate`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::Page;
use uuid::Uuid;

use crate::domain::ports::{PersistenceError, Repository};
use crate::domain::query_scope::QueryScope;
use crate::domain::{OrganisationId, PersonId, RoleAssignment, RoleAssignmentId, RoleId};
use crate::query_and_disambiguate;
use crate::query_optional;
use crate::save_with_revision;

use super::diesel_helpers::{
    HasRevision, cast_revision, cast_revision_for_db, load_scope, map_diesel_error,
    map_pool_error,
};
use super::models::{NewRoleAssignmentRow, RoleAssignmentRow, RoleAssignmentUpdate};
use super::pool::DbPool;
use super::schema::role_assignments;

/// Diesel-backed role assignment storage.
#[derive(Clone)]
pub struct DieselRoleAssignmentRepository {
    pool: DbPool,
}

impl DieselRoleAssignmentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_assignment(row: RoleAssignmentRow) -> Result<RoleAssignment, String> {
    Ok(RoleAssignment {
        id: RoleAssignmentId::from_uuid(row.id),
        person_id: PersonId::from_uuid(row.person_id),
        organisation_id: OrganisationId::from_uuid(row.organisation_id),
        role_id: RoleId::from_uuid(row.role_id),
        revision: cast_revision(row.revision),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl HasRevision for RoleAssignmentRow {
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
        role_assignments::table,
        role_assignments::id.eq(id),
        RoleAssignmentRow,
        expected_revision,
        "role assignment not found"
    )
}

#[async_trait]
impl Repository<RoleAssignment> for DieselRoleAssignmentRepository {
    async fn find_by_id(
        &self,
        id: &RoleAssignmentId,
    ) -> Result<Option<RoleAssignment>, PersistenceError> {
        query_optional!(
            self,
            role_assignments::table,
            role_assignments::id.eq(id.as_uuid()),
            RoleAssignmentRow,
            row_to_assignment
        )
    }

    async fn find_by(
        &self,
        scope: &QueryScope<RoleAssignment>,
    ) -> Result<Page<RoleAssignment>, PersistenceError> {
        load_scope(&self.pool, "role_assignments", scope, row_to_assignment).await
    }

    async fn save(
        &self,
        assignment: &RoleAssignment,
        expected_revision: Option<u32>,
    ) -> Result<RoleAssignment, PersistenceError> {
        let id = *assignment.id.as_uuid();
        save_with_revision!(
            self,
            expected_revision,
            insert: {
                table: role_assignments::table,
                new_row: NewRoleAssignmentRow {
                    id,
                    person_id: *assignment.person_id.as_uuid(),
                    organisation_id: *assignment.organisation_id.as_uuid(),
                    role_id: *assignment.role_id.as_uuid(),
                    revision: cast_revision_for_db(assignment.revision),
                    created_at: assignment.created_at,
                    updated_at: assignment.updated_at,
                }
            },
            update(expected): {
                table: role_assignments::table,
                filter: role_assignments::id
                    .eq(id)
                    .and(role_assignments::revision.eq(cast_revision_for_db(expected))),
                changeset: RoleAssignmentUpdate {
                    organisation_id: *assignment.organisation_id.as_uuid(),
                    role_id: *assignment.role_id.as_uuid(),
                    revision: cast_revision_for_db(assignment.revision),
                    updated_at: assignment.updated_at,
                },
                on_zero_rows: |conn, expected| handle_update_failure(conn, id, expected)
            }
        )?;
        Ok(assignment.clone())
    }

    async fn delete(&self, id: &RoleAssignmentId) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            role_assignments::table.filter(role_assignments::id.eq(id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}
