//! In-memory repository adapter.
//!
//! Rows live in insertion order behind a mutex and scopes are evaluated
//! with [`QueryScope::apply`], so filtering, totals and the `id` tiebreak
//! match what the SQL renderer produces. Text ordering follows Unicode
//! scalar values rather than a database collation. The server uses this backend when no database
//! URL is configured; integration tests use it to run full service flows.
//!
//! Referential integrity between tables is not enforced here.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use pagination::Page;
use tracing::debug;

use crate::domain::ports::{Entity, PersistenceError, Repository};
use crate::domain::query_scope::QueryScope;

/// Repository keeping every row of one entity type in memory.
#[derive(Debug)]
pub struct InMemoryRepository<E> {
    rows: Mutex<Vec<E>>,
}

impl<E> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
        }
    }
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-filled with `rows`, bypassing revision checks.
    pub fn with_rows(rows: impl IntoIterator<Item = E>) -> Self {
        Self {
            rows: Mutex::new(rows.into_iter().collect()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<E>>, PersistenceError> {
        self.rows
            .lock()
            .map_err(|_| PersistenceError::query("in-memory store lock poisoned"))
    }
}

fn key_taken<E: Entity>(rows: &[E], candidate: &E) -> Option<String> {
    let key = candidate.unique_key()?;
    rows.iter()
        .filter(|row| row.id() != candidate.id())
        .any(|row| row.unique_key().as_ref() == Some(&key))
        .then_some(key)
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn find_by_id(&self, id: &E::Id) -> Result<Option<E>, PersistenceError> {
        let rows = self.lock()?;
        Ok(rows.iter().find(|row| row.id() == id).cloned())
    }

    async fn find_by(&self, scope: &QueryScope<E>) -> Result<Page<E>, PersistenceError> {
        let rows = self.lock()?;
        Ok(scope.apply(rows.iter().cloned()))
    }

    async fn save(&self, entity: &E, expected_revision: Option<u32>) -> Result<E, PersistenceError> {
        let mut rows = self.lock()?;
        if let Some(key) = key_taken(&rows, entity) {
            debug!(%key, "unique key already stored");
            return Err(PersistenceError::duplicate(key));
        }
        let position = rows.iter().position(|row| row.id() == entity.id());
        match (expected_revision, position) {
            (None, Some(_)) => Err(PersistenceError::duplicate(format!("id {}", entity.id()))),
            (None, None) => {
                rows.push(entity.clone());
                Ok(entity.clone())
            }
            (Some(_), None) => Err(PersistenceError::query(format!(
                "record {} not found",
                entity.id()
            ))),
            (Some(expected), Some(index)) => {
                let Some(stored) = rows.get_mut(index) else {
                    return Err(PersistenceError::query("record vanished during update"));
                };
                if stored.revision() != expected {
                    return Err(PersistenceError::revision_mismatch(
                        expected,
                        stored.revision(),
                    ));
                }
                *stored = entity.clone();
                Ok(entity.clone())
            }
        }
    }

    async fn delete(&self, id: &E::Id) -> Result<bool, PersistenceError> {
        let mut rows = self.lock()?;
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        Ok(rows.len() < before)
    }
}
