//! Driving ports for person use cases.

use async_trait::async_trait;
use pagination::Page;

use super::ListRequest;
use crate::domain::error::ServiceError;
use crate::domain::ids::PersonId;
use crate::domain::person::{Person, PersonCriteria, PersonField};

/// Data for a new person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePersonRequest {
    pub referrer: Option<String>,
    pub given_name: String,
    pub family_name: String,
}

/// Revision-checked name change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePersonRequest {
    pub given_name: String,
    pub family_name: String,
    pub revision: u32,
}

pub type ListPersonsRequest = ListRequest<PersonField, PersonCriteria>;

/// Read side of person management.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersonQuery: Send + Sync {
    async fn get_person(&self, id: &PersonId) -> Result<Person, ServiceError>;

    async fn list_persons(&self, request: ListPersonsRequest) -> Result<Page<Person>, ServiceError>;
}

/// Write side of person management.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersonCommand: Send + Sync {
    /// Create a person; a taken referrer yields `AlreadyExists`.
    async fn create_person(&self, request: CreatePersonRequest) -> Result<Person, ServiceError>;

    async fn update_person(
        &self,
        id: &PersonId,
        request: UpdatePersonRequest,
    ) -> Result<Person, ServiceError>;

    async fn delete_person(&self, id: &PersonId) -> Result<(), ServiceError>;
}
