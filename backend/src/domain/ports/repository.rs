//! Generic repository port shared by every entity type.
//!
//! The domain never assumes a storage engine. Any adapter able to look up an
//! entity by identifier, execute a [`QueryScope`], and save with an optimistic
//! revision check satisfies this contract.

use std::fmt;
use std::hash::Hash;

use async_trait::async_trait;
use pagination::Page;

use crate::domain::query_scope::{QueryScope, Scoped};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by repository adapters.
    pub enum PersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "repository query failed: {message}",
        /// Optimistic concurrency check failed.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "revision mismatch: expected {expected}, found {actual}",
        /// A uniqueness constraint rejected the write.
        Duplicate { message: String } => "unique constraint violated: {message}",
    }
}

/// Domain record with identity and an optimistic-concurrency revision.
pub trait Entity: Scoped + Clone + fmt::Debug + Send + Sync + 'static {
    type Id: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;

    fn id(&self) -> &Self::Id;

    fn revision(&self) -> u32;

    /// Natural key that must be unique among stored rows, if any.
    fn unique_key(&self) -> Option<String> {
        None
    }
}

/// Storage contract consumed by services and specifications.
///
/// # Revision semantics
///
/// - `save(entity, None)` inserts; new records carry revision 1.
/// - `save(entity, Some(n))` updates only when the stored revision equals
///   `n`, otherwise [`PersistenceError::RevisionMismatch`] is returned. The
///   caller sets the new revision on `entity` before saving.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Fetch one entity; `Ok(None)` when it does not exist.
    async fn find_by_id(&self, id: &E::Id) -> Result<Option<E>, PersistenceError>;

    /// Execute a scope, returning the window and the unpaged total.
    async fn find_by(&self, scope: &QueryScope<E>) -> Result<Page<E>, PersistenceError>;

    /// Insert or revision-checked update.
    async fn save(&self, entity: &E, expected_revision: Option<u32>) -> Result<E, PersistenceError>;

    /// Delete by identifier; `Ok(false)` when nothing was deleted.
    async fn delete(&self, id: &E::Id) -> Result<bool, PersistenceError>;
}
