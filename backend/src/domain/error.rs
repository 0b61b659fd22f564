//! Domain-level error taxonomy.
//!
//! Services return [`ServiceError`]: either a [`DomainError`] describing a
//! business outcome, or a raw [`PersistenceError`] when storage itself
//! failed. These errors are transport agnostic; the HTTP adapter maps them
//! to SchulConnex codes.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::attributes::AttributeViolation;
use crate::domain::ports::PersistenceError;
use crate::domain::rules::Violation;

/// Entity type an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Person,
    Organisation,
    Role,
    RoleAssignment,
}

impl EntityKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Person => "Person",
            Self::Organisation => "Organisation",
            Self::Role => "Rolle",
            Self::RoleAssignment => "Personenkontext",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of domain failure kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainErrorKind {
    NotFound,
    AlreadyExists,
    CouldNotBeCreated,
    CouldNotBeUpdated,
    CouldNotBeDeleted,
    SpecificationViolated(Violation),
    MismatchedRevision,
    InvalidAttribute(AttributeViolation),
}

/// Why an operation on an entity failed.
///
/// # Examples
/// ```
/// use iam_backend::domain::{DomainError, DomainErrorKind, EntityKind};
///
/// let err = DomainError::not_found(EntityKind::Person, "42");
/// assert_eq!(err.kind(), &DomainErrorKind::NotFound);
/// assert_eq!(err.entity_id(), Some("42"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DomainError {
    kind: DomainErrorKind,
    entity: EntityKind,
    entity_id: Option<String>,
    details: Option<Value>,
}

impl DomainError {
    pub const fn new(kind: DomainErrorKind, entity: EntityKind) -> Self {
        Self {
            kind,
            entity,
            entity_id: None,
            details: None,
        }
    }

    pub fn not_found(entity: EntityKind, id: impl fmt::Display) -> Self {
        Self::new(DomainErrorKind::NotFound, entity).with_entity_id(id)
    }

    pub const fn already_exists(entity: EntityKind) -> Self {
        Self::new(DomainErrorKind::AlreadyExists, entity)
    }

    pub const fn could_not_be_created(entity: EntityKind) -> Self {
        Self::new(DomainErrorKind::CouldNotBeCreated, entity)
    }

    pub const fn could_not_be_updated(entity: EntityKind) -> Self {
        Self::new(DomainErrorKind::CouldNotBeUpdated, entity)
    }

    pub const fn could_not_be_deleted(entity: EntityKind) -> Self {
        Self::new(DomainErrorKind::CouldNotBeDeleted, entity)
    }

    /// Error for a failed rule; the entity comes from the rule itself.
    pub const fn specification_violated(violation: Violation) -> Self {
        Self::new(
            DomainErrorKind::SpecificationViolated(violation),
            violation.entity(),
        )
    }

    pub fn mismatched_revision(entity: EntityKind, expected: u32, actual: u32) -> Self {
        Self::new(DomainErrorKind::MismatchedRevision, entity).with_details(json!({
            "expectedRevision": expected,
            "actualRevision": actual,
        }))
    }

    pub const fn invalid_attribute(entity: EntityKind, violation: AttributeViolation) -> Self {
        Self::new(DomainErrorKind::InvalidAttribute(violation), entity)
    }

    #[must_use]
    pub fn with_entity_id(mut self, id: impl fmt::Display) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub const fn kind(&self) -> &DomainErrorKind {
        &self.kind
    }

    pub const fn entity(&self) -> EntityKind {
        self.entity
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub const fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entity = self.entity;
        match &self.kind {
            DomainErrorKind::NotFound => write!(f, "{entity} not found")?,
            DomainErrorKind::AlreadyExists => write!(f, "{entity} already exists")?,
            DomainErrorKind::CouldNotBeCreated => write!(f, "{entity} could not be created")?,
            DomainErrorKind::CouldNotBeUpdated => write!(f, "{entity} could not be updated")?,
            DomainErrorKind::CouldNotBeDeleted => write!(f, "{entity} could not be deleted")?,
            DomainErrorKind::SpecificationViolated(violation) => {
                write!(f, "{entity} violates {}", violation.code())?;
            }
            DomainErrorKind::MismatchedRevision => write!(f, "{entity} revision mismatch")?,
            DomainErrorKind::InvalidAttribute(violation) => {
                write!(f, "{entity} has an invalid attribute: {violation}")?;
            }
        }
        if let Some(id) = &self.entity_id {
            write!(f, " ({id})")?;
        }
        Ok(())
    }
}

impl std::error::Error for DomainError {}

/// Write operation that failed, used to pick the matching error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOperation {
    Create,
    Update,
    Delete,
}

/// Error returned by every service operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl ServiceError {
    /// Translate a failed write into the domain vocabulary.
    ///
    /// Connection failures stay infrastructure errors. Everything else
    /// becomes the domain outcome a client can act on.
    pub fn from_write(
        error: PersistenceError,
        operation: WriteOperation,
        entity: EntityKind,
        entity_id: impl fmt::Display,
    ) -> Self {
        let domain = match error {
            PersistenceError::Connection { .. } => return Self::Persistence(error),
            PersistenceError::Duplicate { .. } => DomainError::already_exists(entity),
            PersistenceError::RevisionMismatch { expected, actual } => {
                DomainError::mismatched_revision(entity, expected, actual)
            }
            PersistenceError::Query { .. } => match operation {
                WriteOperation::Create => DomainError::could_not_be_created(entity),
                WriteOperation::Update => DomainError::could_not_be_updated(entity),
                WriteOperation::Delete => DomainError::could_not_be_deleted(entity),
            },
        };
        Self::Domain(domain.with_entity_id(entity_id))
    }

    pub const fn domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(error) => Some(error),
            Self::Persistence(_) => None,
        }
    }
}

#[cfg(test)]
mod tests;
