//! Shared helpers and macros for Diesel repository implementations.
//!
//! This module provides:
//! - Error mapping from pool and Diesel errors to [`PersistenceError`]
//! - Revision casting between database and domain types
//! - Scope execution over rendered SQL
//! - Declarative macros for lookup and revision-checked save patterns

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use pagination::Page;
use tracing::{debug, warn};

use crate::domain::ports::PersistenceError;
use crate::domain::query_scope::{QueryScope, Scoped};

use super::models::CountRow;
use super::pool::{DbPool, PoolError};
use super::scope_sql::{RenderedScope, bind_all, render};

/// Map pool errors to connection failures.
pub fn map_pool_error(error: PoolError) -> PersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            PersistenceError::connection(message)
        }
    }
}

/// Map Diesel errors to persistence errors.
///
/// Unique violations become [`PersistenceError::Duplicate`] carrying the
/// constraint name so services can answer with `AlreadyExists`.
pub fn map_diesel_error(error: DieselError) -> PersistenceError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => PersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => PersistenceError::query("database query error"),
        DieselError::DatabaseError(kind, info) => match kind {
            DatabaseErrorKind::UniqueViolation => PersistenceError::duplicate(
                info.constraint_name().unwrap_or("unique constraint"),
            ),
            DatabaseErrorKind::ForeignKeyViolation => {
                warn!(
                    constraint_name = ?info.constraint_name(),
                    "foreign key violation"
                );
                PersistenceError::query("foreign key violation")
            }
            DatabaseErrorKind::ClosedConnection => {
                PersistenceError::connection("database connection error")
            }
            _ => PersistenceError::query("database error"),
        },
        _ => PersistenceError::query("database error"),
    }
}

/// Cast database revision (i32) to domain revision (u32).
///
/// A check constraint keeps stored revisions positive.
#[expect(
    clippy::cast_sign_loss,
    reason = "revision is always positive in database"
)]
pub fn cast_revision(revision: i32) -> u32 {
    revision as u32
}

/// Cast domain revision (u32) to database revision (i32).
#[expect(
    clippy::cast_possible_wrap,
    reason = "revision values are always small positive integers"
)]
pub fn cast_revision_for_db(revision: u32) -> i32 {
    revision as i32
}

/// Database rows that carry a revision column.
pub trait HasRevision {
    fn revision(&self) -> u32;
}

/// Turn a failed revision-checked update into the error the caller sees.
///
/// A row that still exists means the revision moved on; a missing row is a
/// query failure because updates only target loaded entities.
pub fn disambiguate_update_failure<R>(
    current_result: Result<Option<R>, PersistenceError>,
    expected_revision: u32,
    not_found_message: &str,
) -> PersistenceError
where
    R: HasRevision,
{
    match current_result {
        Ok(Some(record)) => {
            PersistenceError::revision_mismatch(expected_revision, record.revision())
        }
        Ok(None) => PersistenceError::query(not_found_message),
        Err(error) => error,
    }
}

/// Execute a scope against `table`: one select for the window and one
/// count over the same filter.
///
/// Both statements run in a read-only `REPEATABLE READ` transaction so the
/// count observes the same snapshot as the items.
pub async fn load_scope<E, Row>(
    pool: &DbPool,
    table: &str,
    scope: &QueryScope<E>,
    convert: impl Fn(Row) -> Result<E, String>,
) -> Result<Page<E>, PersistenceError>
where
    E: Scoped,
    Row: diesel::QueryableByName<diesel::pg::Pg> + Send + 'static,
{
    let RenderedScope {
        select,
        count,
        binds,
    } = render(table, scope);
    let mut conn = pool.get().await.map_err(map_pool_error)?;

    let (rows, count) = conn
        .build_transaction()
        .read_only()
        .repeatable_read()
        .run(|conn| {
            async move {
                let rows: Vec<Row> = bind_all(diesel::sql_query(select).into_boxed(), &binds)
                    .load(conn)
                    .await?;
                let count: CountRow = bind_all(diesel::sql_query(count).into_boxed(), &binds)
                    .get_result(conn)
                    .await?;
                Ok::<_, DieselError>((rows, count))
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)?;

    let items = rows
        .into_iter()
        .map(convert)
        .collect::<Result<Vec<_>, _>>()
        .map_err(PersistenceError::query)?;
    let total = u64::try_from(count.total).unwrap_or_default();
    Ok(Page::new(items, total, scope.page()))
}

/// Macro for lookups returning `Option<T>` with a fallible row conversion.
#[macro_export]
macro_rules! query_optional {
    (
        $self:ident,
        $table:expr,
        $filter:expr,
        $row_type:ty,
        $converter:expr
    ) => {{
        use diesel::prelude::*;
        use diesel_async::RunQueryDsl;
        use $crate::domain::ports::PersistenceError;
        use $crate::outbound::persistence::diesel_helpers::map_diesel_error;
        use $crate::outbound::persistence::diesel_helpers::map_pool_error;

        let mut conn = $self.pool.get().await.map_err(map_pool_error)?;

        let result: Option<$row_type> = $table
            .filter($filter)
            .select(<$row_type>::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        result
            .map($converter)
            .transpose()
            .map_err(PersistenceError::query)
    }};
}

/// Macro for querying from an existing connection and disambiguating
/// update failures.
#[macro_export]
macro_rules! query_and_disambiguate {
    (
        $conn:expr,
        $table:expr,
        $filter:expr,
        $row_type:ty,
        $expected_revision:expr,
        $not_found_msg:expr
    ) => {{
        use diesel::prelude::*;
        use diesel_async::RunQueryDsl;
        use $crate::outbound::persistence::diesel_helpers::disambiguate_update_failure;
        use $crate::outbound::persistence::diesel_helpers::map_diesel_error;

        let current_result = $table
            .filter($filter)
            .select(<$row_type>::as_select())
            .first($conn)
            .await
            .optional()
            .map_err(map_diesel_error);

        disambiguate_update_failure(current_result, $expected_revision, $not_found_msg)
    }};
}

/// Macro for save operations with optimistic concurrency control.
///
/// Inserts when the expected revision is `None`, otherwise updates the row
/// whose stored revision matches and disambiguates zero-row updates.
#[macro_export]
macro_rules! save_with_revision {
    (
        $self:ident,
        $expected_revision:expr,
        insert: { $($insert_body:tt)* },
        update($expected:ident): { $($update_body:tt)* }
    ) => {{
        use $crate::outbound::persistence::diesel_helpers::map_pool_error;

        let mut conn = $self.pool.get().await.map_err(map_pool_error)?;

        match $expected_revision {
            None => {
                save_with_revision!(@insert conn, { $($insert_body)* })
            }
            Some($expected) => {
                save_with_revision!(@update conn, $expected, { $($update_body)* })
            }
        }
    }};

    (@insert $conn:ident, {
        table: $table:expr,
        new_row: $new_row:expr
    }) => {{
        // `#[allow]` because unused_imports fires inconsistently for glob
        // imports expanded from macros.
        #[allow(unused_imports, reason = "prelude may be imported at call site")]
        use diesel::prelude::*;
        use diesel_async::RunQueryDsl;
        use $crate::outbound::persistence::diesel_helpers::map_diesel_error;

        diesel::insert_into($table)
            .values(&$new_row)
            .execute(&mut $conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }};

    (@update $conn:ident, $expected:ident, {
        table: $table:expr,
        filter: $filter:expr,
        changeset: $changeset:expr,
        on_zero_rows: $handler:expr
    }) => {{
        #[allow(unused_imports, reason = "prelude may be imported at call site")]
        use diesel::prelude::*;
        use diesel_async::RunQueryDsl;
        use $crate::outbound::persistence::diesel_helpers::map_diesel_error;

        let changeset = $changeset;
        let updated_rows = diesel::update($table)
            .filter($filter)
            .set(&changeset)
            .execute(&mut $conn)
            .await
            .map_err(map_diesel_error)?;

        if updated_rows == 0 {
            return Err($handler(&mut $conn, $expected).await);
        }
        Ok(())
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Stored(u32);

    impl HasRevision for Stored {
        fn revision(&self) -> u32 {
            self.0
        }
    }

    #[rstest]
    fn pool_errors_are_connection_failures() {
        let error = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(error, PersistenceError::connection("timed out"));
    }

    #[rstest]
    fn not_found_maps_to_query_failure() {
        assert_eq!(
            map_diesel_error(DieselError::NotFound),
            PersistenceError::query("record not found")
        );
    }

    #[rstest]
    fn existing_row_means_revision_moved_on() {
        let error = disambiguate_update_failure(Ok(Some(Stored(4))), 2, "missing");
        assert_eq!(error, PersistenceError::revision_mismatch(2_u32, 4_u32));
    }

    #[rstest]
    fn missing_row_is_a_query_failure() {
        let error = disambiguate_update_failure::<Stored>(Ok(None), 2, "person not found");
        assert_eq!(error, PersistenceError::query("person not found"));
    }

    #[rstest]
    #[case(1, 1)]
    #[case(42, 42)]
    fn revisions_round_trip(#[case] domain: u32, #[case] stored: i32) {
        assert_eq!(cast_revision_for_db(domain), stored);
        assert_eq!(cast_revision(stored), domain);
    }
}
