//! PostgreSQL-backed `Repository<Organisation>`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::Page;
use uuid::Uuid;

use crate::domain::ports::{PersistenceError, Repository};
use crate::domain::query_scope::QueryScope;
use crate::domain::{Organisation, OrganisationId, OrganisationKind};
use crate::query_and_disambiguate;
use crate::query_optional;
use crate::save_with_revision;

use super::diesel_helpers::{
    HasRevision, cast_revision, cast_revision_for_db, load_scope, map_diesel_error,
    map_pool_error,
};
use super::models::{NewOrganisationRow, OrganisationRow, OrganisationUpdate};
use super::pool::DbPool;
use super::schema::organisations;

/// Diesel-backed organisation storage.
#[derive(Clone)]
pub struct DieselOrganisationRepository {
    pool: DbPool,
}

impl DieselOrganisationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Fails on a kind code this build does not know.
fn row_to_organisation(row: OrganisationRow) -> Result<Organisation, String> {
    let kind: OrganisationKind = row.kind.parse()?;
    Ok(Organisation {
        id: OrganisationId::from_uuid(row.id),
        administered_by: row.administered_by.map(OrganisationId::from_uuid),
        belongs_to: row.belongs_to.map(OrganisationId::from_uuid),
        identifier: row.identifier,
        name: row.name,
        kind,
        revision: cast_revision(row.revision),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl HasRevision for OrganisationRow {
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
        organisations::table,
        organisations::id.eq(id),
        OrganisationRow,
        expected_revision,
        "organisation not found"
    )
}

#[async_trait]
impl Repository<Organisation> for DieselOrganisationRepository {
    async fn find_by_id(
        &self,
        id: &OrganisationId,
    ) -> Result<Option<Organisation>, PersistenceError> {
        query_optional!(
            self,
            organisations::table,
            organisations::id.eq(id.as_uuid()),
            OrganisationRow,
            row_to_organisation
        )
    }

    async fn find_by(
        &self,
        scope: &QueryScope<Organisation>,
    ) -> Result<Page<Organisation>, PersistenceError> {
        load_scope(&self.pool, "organisations", scope, row_to_organisation).await
    }

    async fn save(
        &self,
        organisation: &Organisation,
        expected_revision: Option<u32>,
    ) -> Result<Organisation, PersistenceError> {
        let id = *organisation.id.as_uuid();
        let administered_by = organisation.administered_by.map(|parent| *parent.as_uuid());
        let belongs_to = organisation.belongs_to.map(|parent| *parent.as_uuid());
        save_with_revision!(
            self,
            expected_revision,
            insert: {
                table: organisations::table,
                new_row: NewOrganisationRow {
                    id,
                    administered_by,
                    belongs_to,
                    identifier: organisation.identifier.as_deref(),
                    name: organisation.name.as_deref(),
                    kind: organisation.kind.as_str(),
                    revision: cast_revision_for_db(organisation.revision),
                    created_at: organisation.created_at,
                    updated_at: organisation.updated_at,
                }
            },
            update(expected): {
                table: organisations::table,
                filter: organisations::id
                    .eq(id)
                    .and(organisations::revision.eq(cast_revision_for_db(expected))),
                changeset: OrganisationUpdate {
                    administered_by,
                    belongs_to,
                    identifier: organisation.identifier.as_deref(),
                    name: organisation.name.as_deref(),
                    kind: organisation.kind.as_str(),
                    revision: cast_revision_for_db(organisation.revision),
                    updated_at: organisation.updated_at,
                },
                on_zero_rows: |conn, expected| handle_update_failure(conn, id, expected)
            }
        )?;
        Ok(organisation.clone())
    }

    async fn delete(&self, id: &OrganisationId) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted =
            diesel::delete(organisations::table.filter(organisations::id.eq(id.as_uuid())))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    fn row(kind: &str) -> OrganisationRow {
        OrganisationRow {
            id: Uuid::new_v4(),
            administered_by: None,
            belongs_to: None,
            identifier: Some("0815".to_owned()),
            name: Some("Nordschule".to_owned()),
            kind: kind.to_owned(),
            revision: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn stored_kind_codes_are_parsed() {
        let organisation = row_to_organisation(row("SCHULE")).expect("known kind");

        assert_eq!(organisation.kind, OrganisationKind::School);
        assert_eq!(organisation.revision, 3);
    }

    #[rstest]
    fn unknown_kind_code_is_an_error() {
        assert!(row_to_organisation(row("UNIVERSITAET")).is_err());
    }
}
