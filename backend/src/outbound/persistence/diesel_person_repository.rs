//! PostgreSQL-backed `Repository<Person>`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::Page;
use uuid::Uuid;

use crate::domain::ports::{PersistenceError, Repository};
use crate::domain::query_scope::QueryScope;
use crate::domain::{Person, PersonId};
use crate::query_and_disambiguate;
use crate::query_optional;
use crate::save_with_revision;

use super::diesel_helpers::{
    HasRevision, cast_revision, cast_revision_for_db, load_scope, map_diesel_error,
    map_pool_error,
};
use super::models::{NewPersonRow, PersonRow, PersonUpdate};
use super::pool::DbPool;
use super::schema::persons;

/// Diesel-backed person storage.
#[derive(Clone)]
pub struct DieselPersonRepository {
    pool: DbPool,
}

impl DieselPersonRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_person(row: PersonRow) -> Result<Person, String> {
    Ok(Person {
        id: PersonId::from_uuid(row.id),
        referrer: row.referrer,
        given_name: row.given_name,
        family_name: row.family_name,
        revision: cast_revision(row.revision),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl HasRevision for PersonRow {
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
        persons::table,
        persons::id.eq(id),
        PersonRow,
        expected_revision,
        "person not found"
    )
}

#[async_trait]
impl Repository<Person> for DieselPersonRepository {
    async fn find_by_id(&self, id: &PersonId) -> Result<Option<Person>, PersistenceError> {
        query_optional!(
            self,
            persons::table,
            persons::id.eq(id.as_uuid()),
            PersonRow,
            row_to_person
        )
    }

    async fn find_by(&self, scope: &QueryScope<Person>) -> Result<Page<Person>, PersistenceError> {
        load_scope(&self.pool, "persons", scope, row_to_person).await
    }

    async fn save(
        &self,
        person: &Person,
        expected_revision: Option<u32>,
    ) -> Result<Person, PersistenceError> {
        let id = *person.id.as_uuid();
        save_with_revision!(
            self,
            expected_revision,
            insert: {
                table: persons::table,
                new_row: NewPersonRow {
                    id,
                    referrer: person.referrer.as_deref(),
                    given_name: &person.given_name,
                    family_name: &person.family_name,
                    revision: cast_revision_for_db(person.revision),
                    created_at: person.created_at,
                    updated_at: person.updated_at,
                }
            },
            update(expected): {
                table: persons::table,
                filter: persons::id
                    .eq(id)
                    .and(persons::revision.eq(cast_revision_for_db(expected))),
                changeset: PersonUpdate {
                    given_name: &person.given_name,
                    family_name: &person.family_name,
                    revision: cast_revision_for_db(person.revision),
                    updated_at: person.updated_at,
                },
                on_zero_rows: |conn, expected| handle_update_failure(conn, id, expected)
            }
        )?;
        Ok(person.clone())
    }

    async fn delete(&self, id: &PersonId) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(persons::table.filter(persons::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}
