//! Person management service.
//!
//! Implements the person driving ports on top of any person repository.
//! A referrer that is already taken is reported as `AlreadyExists` before
//! the insert is attempted, so callers can tell a conflict from a failed
//! write.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::Page;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, EntityKind, ServiceError, WriteOperation};
use crate::domain::ids::PersonId;
use crate::domain::person::{Person, PersonCriteria};
use crate::domain::ports::{
    CreatePersonRequest, ListPersonsRequest, PersonCommand, PersonQuery, Repository,
    UpdatePersonRequest,
};
use crate::domain::query_scope::{Combinator, QueryScope};

/// Person service implementing the driving ports.
pub struct PersonService<P: ?Sized> {
    persons: Arc<P>,
}

impl<P: ?Sized> Clone for PersonService<P> {
    fn clone(&self) -> Self {
        Self {
            persons: Arc::clone(&self.persons),
        }
    }
}

impl<P: ?Sized> PersonService<P> {
    pub fn new(persons: Arc<P>) -> Self {
        Self { persons }
    }
}

impl<P> PersonService<P>
where
    P: Repository<Person> + ?Sized,
{
    async fn load(&self, id: &PersonId) -> Result<Person, ServiceError> {
        self.persons
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Person, id).into())
    }

    async fn referrer_taken(&self, referrer: &str) -> Result<bool, ServiceError> {
        let page = QueryScope::<Person>::new()
            .find_by(
                PersonCriteria {
                    referrer: Some(referrer.to_owned()),
                    ..PersonCriteria::default()
                },
                Combinator::And,
            )
            .paged(Some(0), Some(1))
            .execute(self.persons.as_ref())
            .await?;
        Ok(page.total() > 0)
    }
}

#[async_trait]
impl<P> PersonQuery for PersonService<P>
where
    P: Repository<Person> + ?Sized,
{
    #[instrument(skip(self), fields(person_id = %id))]
    async fn get_person(&self, id: &PersonId) -> Result<Person, ServiceError> {
        self.load(id).await
    }

    #[instrument(skip_all)]
    async fn list_persons(&self, request: ListPersonsRequest) -> Result<Page<Person>, ServiceError> {
        Ok(request
            .into_scope::<Person>()
            .execute(self.persons.as_ref())
            .await?)
    }
}

#[async_trait]
impl<P> PersonCommand for PersonService<P>
where
    P: Repository<Person> + ?Sized,
{
    #[instrument(skip_all)]
    async fn create_person(&self, request: CreatePersonRequest) -> Result<Person, ServiceError> {
        if let Some(referrer) = request.referrer.as_deref() {
            if self.referrer_taken(referrer).await? {
                debug!(referrer, "referrer already assigned");
                return Err(DomainError::already_exists(EntityKind::Person).into());
            }
        }
        let person = Person::new(request.referrer, request.given_name, request.family_name);
        self.persons.save(&person, None).await.map_err(|error| {
            ServiceError::from_write(error, WriteOperation::Create, EntityKind::Person, person.id)
        })
    }

    #[instrument(skip(self, request), fields(person_id = %id))]
    async fn update_person(
        &self,
        id: &PersonId,
        request: UpdatePersonRequest,
    ) -> Result<Person, ServiceError> {
        let current = self.load(id).await?;
        if current.revision != request.revision {
            return Err(DomainError::mismatched_revision(
                EntityKind::Person,
                request.revision,
                current.revision,
            )
            .with_entity_id(id)
            .into());
        }
        let updated = current.renamed(request.given_name, request.family_name);
        self.persons
            .save(&updated, Some(request.revision))
            .await
            .map_err(|error| {
                ServiceError::from_write(error, WriteOperation::Update, EntityKind::Person, id)
            })
    }

    #[instrument(skip(self), fields(person_id = %id))]
    async fn delete_person(&self, id: &PersonId) -> Result<(), ServiceError> {
        let deleted = self.persons.delete(id).await.map_err(|error| {
            ServiceError::from_write(error, WriteOperation::Delete, EntityKind::Person, id)
        })?;
        if deleted {
            Ok(())
        } else {
            Err(DomainError::not_found(EntityKind::Person, id).into())
        }
    }
}

#[cfg(test)]
#[path = "person_service_tests.rs"]
mod tests;
