//! Ordered rule evaluation for write operations.
//!
//! A pipeline evaluates its rules one after another and stops at the first
//! rule that is not satisfied. That rule's [`Violation`] becomes the single
//! [`DomainError`] returned to the caller. Rules after it are never
//! evaluated, so their repository lookups never happen.

use tracing::warn;

use crate::domain::error::{DomainError, ServiceError};
use crate::domain::rules::Violation;
use crate::domain::specification::Rule;

/// Rules checked in declaration order.
pub struct ValidationPipeline<T: ?Sized + Sync> {
    rules: Vec<Box<dyn Rule<T>>>,
}

impl<T: ?Sized + Sync> Default for ValidationPipeline<T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<T: ?Sized + Sync> ValidationPipeline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule after the existing ones.
    #[must_use]
    pub fn with_rule(mut self, rule: impl Rule<T> + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every rule until one fails.
    pub async fn validate(&self, candidate: &T) -> Result<(), ServiceError> {
        validate(candidate, &self.rules).await
    }
}

/// Evaluate `rules` in order against `candidate`.
///
/// Returns `SpecificationViolated` for the first unsatisfied rule, or the
/// storage error of the first rule whose lookup failed.
pub async fn validate<T, R>(candidate: &T, rules: &[R]) -> Result<(), ServiceError>
where
    T: ?Sized + Sync,
    R: Rule<T>,
{
    if let Some(violation) = first_violation(candidate, rules).await? {
        warn!(code = violation.code(), "rule rejected candidate");
        return Err(DomainError::specification_violated(violation).into());
    }
    Ok(())
}

async fn first_violation<T, R>(candidate: &T, rules: &[R]) -> Result<Option<Violation>, ServiceError>
where
    T: ?Sized + Sync,
    R: Rule<T>,
{
    for rule in rules {
        if !rule.is_satisfied_by(candidate).await? {
            return Ok(Some(rule.violation()));
        }
    }
    Ok(None)
}
