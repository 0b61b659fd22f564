//! Composable asynchronous business rules.
//!
//! A [`Specification`] answers whether a candidate satisfies one condition.
//! Conditions that need stored data hold their repositories and query them
//! while evaluating. [`And`], [`Or`] and [`Not`] compose specifications and
//! short-circuit: the right operand of `And` is never evaluated after a
//! false left operand, nor the right operand of `Or` after a true one.
//!
//! A [`Rule`] is a specification that knows which [`Violation`] to report
//! when it fails; the validation pipeline consumes rules.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::PersistenceError;
use crate::domain::rules::Violation;

/// Boolean predicate over a candidate, possibly backed by storage lookups.
///
/// Whether missing data counts as satisfied is decided by each rule.
/// `Err` is reserved for storage failures.
#[async_trait]
pub trait Specification<T: ?Sized + Sync>: Send + Sync {
    async fn is_satisfied_by(&self, candidate: &T) -> Result<bool, PersistenceError>;
}

/// Specification reporting a named violation when unsatisfied.
pub trait Rule<T: ?Sized + Sync>: Specification<T> {
    fn violation(&self) -> Violation;
}

#[async_trait]
impl<T, S> Specification<T> for Box<S>
where
    T: ?Sized + Sync,
    S: Specification<T> + ?Sized,
{
    async fn is_satisfied_by(&self, candidate: &T) -> Result<bool, PersistenceError> {
        (**self).is_satisfied_by(candidate).await
    }
}

#[async_trait]
impl<T, S> Specification<T> for Arc<S>
where
    T: ?Sized + Sync,
    S: Specification<T> + ?Sized,
{
    async fn is_satisfied_by(&self, candidate: &T) -> Result<bool, PersistenceError> {
        (**self).is_satisfied_by(candidate).await
    }
}

impl<T, S> Rule<T> for Box<S>
where
    T: ?Sized + Sync,
    S: Rule<T> + ?Sized,
{
    fn violation(&self) -> Violation {
        (**self).violation()
    }
}

/// Both operands must hold.
#[derive(Debug, Clone)]
pub struct And<L, R> {
    left: L,
    right: R,
}

impl<L, R> And<L, R> {
    pub const fn new(left: L, right: R) -> Self {
        Self { left, right }
    }
}

#[async_trait]
impl<T, L, R> Specification<T> for And<L, R>
where
    T: ?Sized + Sync,
    L: Specification<T>,
    R: Specification<T>,
{
    async fn is_satisfied_by(&self, candidate: &T) -> Result<bool, PersistenceError> {
        if !self.left.is_satisfied_by(candidate).await? {
            return Ok(false);
        }
        self.right.is_satisfied_by(candidate).await
    }
}

/// At least one operand must hold.
#[derive(Debug, Clone)]
pub struct Or<L, R> {
    left: L,
    right: R,
}

impl<L, R> Or<L, R> {
    pub const fn new(left: L, right: R) -> Self {
        Self { left, right }
    }
}

#[async_trait]
impl<T, L, R> Specification<T> for Or<L, R>
where
    T: ?Sized + Sync,
    L: Specification<T>,
    R: Specification<T>,
{
    async fn is_satisfied_by(&self, candidate: &T) -> Result<bool, PersistenceError> {
        if self.left.is_satisfied_by(candidate).await? {
            return Ok(true);
        }
        self.right.is_satisfied_by(candidate).await
    }
}

/// Negation. Storage errors pass through unchanged.
#[derive(Debug, Clone)]
pub struct Not<S> {
    inner: S,
}

impl<S> Not<S> {
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T, S> Specification<T> for Not<S>
where
    T: ?Sized + Sync,
    S: Specification<T>,
{
    async fn is_satisfied_by(&self, candidate: &T) -> Result<bool, PersistenceError> {
        self.inner.is_satisfied_by(candidate).await.map(|hit| !hit)
    }
}

/// Any specification labelled with the violation it reports.
#[derive(Debug, Clone)]
pub struct Named<S> {
    inner: S,
    violation: Violation,
}

impl<S> Named<S> {
    pub const fn new(inner: S, violation: Violation) -> Self {
        Self { inner, violation }
    }
}

#[async_trait]
impl<T, S> Specification<T> for Named<S>
where
    T: ?Sized + Sync,
    S: Specification<T>,
{
    async fn is_satisfied_by(&self, candidate: &T) -> Result<bool, PersistenceError> {
        self.inner.is_satisfied_by(candidate).await
    }
}

impl<T, S> Rule<T> for Named<S>
where
    T: ?Sized + Sync,
    S: Specification<T>,
{
    fn violation(&self) -> Violation {
        self.violation
    }
}

/// Fluent combinators for specifications.
///
/// ```
/// use iam_backend::domain::rules::{ClassNameRequired, Violation};
/// use iam_backend::domain::specification::SpecificationExt;
///
/// let rule = ClassNameRequired.not().not().named(Violation::ClassNameRequired);
/// # let _ = rule;
/// ```
pub trait SpecificationExt: Sized + Send + Sync {
    #[must_use]
    fn and<R>(self, right: R) -> And<Self, R> {
        And::new(self, right)
    }

    #[must_use]
    fn or<R>(self, right: R) -> Or<Self, R> {
        Or::new(self, right)
    }

    #[must_use]
    fn not(self) -> Not<Self> {
        Not::new(self)
    }

    #[must_use]
    fn named(self, violation: Violation) -> Named<Self> {
        Named::new(self, violation)
    }
}

impl<S: Sized + Send + Sync> SpecificationExt for S {}
