//! Rules guarding organisation writes.

use std::sync::Arc;

use async_trait::async_trait;

use super::Violation;
use crate::domain::organisation::{Organisation, OrganisationField, OrganisationKind};
use crate::domain::ports::{PersistenceError, Repository};
use crate::domain::query_scope::{Combinator, FilterValue, QueryScope};
use crate::domain::specification::{Rule, Specification};

/// A class must carry a non-blank name. Other kinds always pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassNameRequired;

#[async_trait]
impl Specification<Organisation> for ClassNameRequired {
    async fn is_satisfied_by(&self, candidate: &Organisation) -> Result<bool, PersistenceError> {
        Ok(!candidate.is_class()
            || candidate
                .name
                .as_deref()
                .is_some_and(|name| !name.trim().is_empty()))
    }
}

impl Rule<Organisation> for ClassNameRequired {
    fn violation(&self) -> Violation {
        Violation::ClassNameRequired
    }
}

/// A class must be administered by an existing school.
///
/// Unsatisfied when the class has no administering organisation or that
/// organisation cannot be found.
pub struct ClassAdministeredBySchool<O: ?Sized> {
    organisations: Arc<O>,
}

impl<O: ?Sized> ClassAdministeredBySchool<O> {
    pub fn new(organisations: Arc<O>) -> Self {
        Self { organisations }
    }
}

#[async_trait]
impl<O> Specification<Organisation> for ClassAdministeredBySchool<O>
where
    O: Repository<Organisation> + ?Sized,
{
    async fn is_satisfied_by(&self, candidate: &Organisation) -> Result<bool, PersistenceError> {
        if !candidate.is_class() {
            return Ok(true);
        }
        let Some(parent_id) = candidate.administered_by else {
            return Ok(false);
        };
        let parent = self.organisations.find_by_id(&parent_id).await?;
        Ok(parent.is_some_and(|parent| parent.kind == OrganisationKind::School))
    }
}

impl<O> Rule<Organisation> for ClassAdministeredBySchool<O>
where
    O: Repository<Organisation> + ?Sized,
{
    fn violation(&self) -> Violation {
        Violation::ClassAdministeredBySchool
    }
}

/// No other class of the same school may share the candidate's name.
///
/// Classes without a name or school pass; [`ClassNameRequired`] and
/// [`ClassAdministeredBySchool`] report those. The candidate's own stored
/// row is ignored so renaming a class to its current name passes.
pub struct ClassNameUniqueAtSchool<O: ?Sized> {
    organisations: Arc<O>,
}

impl<O: ?Sized> ClassNameUniqueAtSchool<O> {
    pub fn new(organisations: Arc<O>) -> Self {
        Self { organisations }
    }
}

#[async_trait]
impl<O> Specification<Organisation> for ClassNameUniqueAtSchool<O>
where
    O: Repository<Organisation> + ?Sized,
{
    async fn is_satisfied_by(&self, candidate: &Organisation) -> Result<bool, PersistenceError> {
        let (true, Some(school), Some(name)) = (
            candidate.is_class(),
            candidate.administered_by,
            candidate.name.clone(),
        ) else {
            return Ok(true);
        };
        // Two rows are enough to tell whether anything besides the
        // candidate matches.
        let page = QueryScope::<Organisation>::new()
            .find_by(
                [
                    (OrganisationField::AdministeredBy, Some(FilterValue::from(school))),
                    (OrganisationField::Kind, Some(OrganisationKind::Class.into())),
                    (OrganisationField::Name, Some(FilterValue::Text(name))),
                ],
                Combinator::And,
            )
            .paged(Some(0), Some(2))
            .execute(self.organisations.as_ref())
            .await?;
        Ok(page.items().iter().all(|other| other.id == candidate.id))
    }
}

impl<O> Rule<Organisation> for ClassNameUniqueAtSchool<O>
where
    O: Repository<Organisation> + ?Sized,
{
    fn violation(&self) -> Violation {
        Violation::ClassNameUniqueAtSchool
    }
}
