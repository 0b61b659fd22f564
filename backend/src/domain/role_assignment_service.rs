//! Role assignment (Personenkontext) service.
//!
//! Creating an assignment checks that person, organisation and role exist,
//! rejects a duplicate triple, then runs the assignment rules:
//! the role must be assignable at the organisation, only learners and
//! teachers may sit in a class, and a class assignment needs the same role
//! at the administering school.
//!
//! Replacing all assignments of a person first checks that the client saw
//! the current number of assignments and that every class target keeps the
//! same role at its school in the resulting set. New assignments are then
//! validated and inserted one by one in the requested order, so a school
//! assignment listed before a class assignment satisfies the class rule. If
//! any new assignment fails, the ones inserted by the same call are removed
//! again.
//!
//! Deleting a single assignment is refused while a class assignment of the
//! same person and role depends on it.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::Page;
use tracing::{debug, instrument, warn};

use crate::domain::error::{DomainError, EntityKind, ServiceError, WriteOperation};
use crate::domain::ids::{PersonId, RoleAssignmentId};
use crate::domain::organisation::Organisation;
use crate::domain::person::Person;
use crate::domain::ports::{
    CreateRoleAssignmentRequest, ListRoleAssignmentsRequest, Repository, RoleAssignmentCommand,
    RoleAssignmentQuery,
};
use crate::domain::query_scope::{Combinator, QueryScope, SortKey};
use crate::domain::role::Role;
use crate::domain::role_assignment::{
    AssignmentTarget, AssignmentUpdate, RoleAssignment, RoleAssignmentCriteria,
    RoleAssignmentField,
};
use crate::domain::rules::{
    ClassTargetsKeepParentSchool, ExpectedAssignmentCount, NoClassAssignmentDependsOn,
    OnlyLearnersAndTeachersAtClass, RoleAssignableAtOrganisation, SameRoleAtParentSchool,
};
use crate::domain::validation::ValidationPipeline;

/// Role assignment service implementing the driving ports.
pub struct RoleAssignmentService<P: ?Sized, O: ?Sized, R: ?Sized, A: ?Sized> {
    persons: Arc<P>,
    organisations: Arc<O>,
    roles: Arc<R>,
    assignments: Arc<A>,
    assignment_rules: ValidationPipeline<RoleAssignment>,
    update_rules: ValidationPipeline<AssignmentUpdate>,
    removal_rules: ValidationPipeline<RoleAssignment>,
}

impl<P, O, R, A> RoleAssignmentService<P, O, R, A>
where
    P: Repository<Person> + ?Sized + 'static,
    O: Repository<Organisation> + ?Sized + 'static,
    R: Repository<Role> + ?Sized + 'static,
    A: Repository<RoleAssignment> + ?Sized + 'static,
{
    pub fn new(persons: Arc<P>, organisations: Arc<O>, roles: Arc<R>, assignments: Arc<A>) -> Self {
        let assignment_rules = ValidationPipeline::new()
            .with_rule(RoleAssignableAtOrganisation::new(
                Arc::clone(&organisations),
                Arc::clone(&roles),
            ))
            .with_rule(OnlyLearnersAndTeachersAtClass::new(
                Arc::clone(&organisations),
                Arc::clone(&roles),
            ))
            .with_rule(SameRoleAtParentSchool::new(
                Arc::clone(&organisations),
                Arc::clone(&assignments),
            ));
        let update_rules = ValidationPipeline::new()
            .with_rule(ExpectedAssignmentCount::new(Arc::clone(&assignments)))
            .with_rule(ClassTargetsKeepParentSchool::new(Arc::clone(&organisations)));
        let removal_rules = ValidationPipeline::new().with_rule(NoClassAssignmentDependsOn::new(
            Arc::clone(&organisations),
            Arc::clone(&assignments),
        ));
        Self {
            persons,
            organisations,
            roles,
            assignments,
            assignment_rules,
            update_rules,
            removal_rules,
        }
    }

    async fn ensure_references(&self, candidate: &RoleAssignment) -> Result<(), ServiceError> {
        if self.persons.find_by_id(&candidate.person_id).await?.is_none() {
            return Err(DomainError::not_found(EntityKind::Person, candidate.person_id).into());
        }
        if self
            .organisations
            .find_by_id(&candidate.organisation_id)
            .await?
            .is_none()
        {
            return Err(
                DomainError::not_found(EntityKind::Organisation, candidate.organisation_id).into(),
            );
        }
        if self.roles.find_by_id(&candidate.role_id).await?.is_none() {
            return Err(DomainError::not_found(EntityKind::Role, candidate.role_id).into());
        }
        Ok(())
    }

    async fn ensure_unique(&self, candidate: &RoleAssignment) -> Result<(), ServiceError> {
        let existing = QueryScope::<RoleAssignment>::new()
            .find_by(
                RoleAssignmentCriteria {
                    person_id: Some(candidate.person_id),
                    organisation_id: Some(candidate.organisation_id),
                    role_id: Some(candidate.role_id),
                },
                Combinator::And,
            )
            .paged(Some(0), Some(1))
            .execute(self.assignments.as_ref())
            .await?;
        if existing.total() > 0 {
            return Err(DomainError::already_exists(EntityKind::RoleAssignment).into());
        }
        Ok(())
    }

    /// Check and store one new assignment.
    async fn insert(&self, candidate: RoleAssignment) -> Result<RoleAssignment, ServiceError> {
        self.ensure_references(&candidate).await?;
        self.ensure_unique(&candidate).await?;
        self.assignment_rules.validate(&candidate).await?;
        self.assignments
            .save(&candidate, None)
            .await
            .map_err(|error| {
                ServiceError::from_write(
                    error,
                    WriteOperation::Create,
                    EntityKind::RoleAssignment,
                    candidate.id,
                )
            })
    }

    async fn stored_for_person(
        &self,
        person_id: PersonId,
    ) -> Result<Vec<RoleAssignment>, ServiceError> {
        let page = QueryScope::<RoleAssignment>::new()
            .find_by(
                RoleAssignmentCriteria {
                    person_id: Some(person_id),
                    ..RoleAssignmentCriteria::default()
                },
                Combinator::And,
            )
            .sorted([
                SortKey::asc(RoleAssignmentField::CreatedAt),
                SortKey::asc(RoleAssignmentField::Id),
            ])
            .execute(self.assignments.as_ref())
            .await?;
        Ok(page.into_items())
    }

    async fn remove(&self, id: &RoleAssignmentId) -> Result<(), ServiceError> {
        let deleted = self.assignments.delete(id).await.map_err(|error| {
            ServiceError::from_write(error, WriteOperation::Delete, EntityKind::RoleAssignment, id)
        })?;
        if deleted {
            Ok(())
        } else {
            Err(DomainError::not_found(EntityKind::RoleAssignment, id).into())
        }
    }

    /// Undo inserts made by a failed replacement. Failures are logged only;
    /// the original error is what the caller needs to see.
    async fn roll_back(&self, inserted: &[RoleAssignment]) {
        for assignment in inserted {
            if let Err(error) = self.assignments.delete(&assignment.id).await {
                warn!(
                    assignment_id = %assignment.id,
                    error = error.label(),
                    "could not roll back assignment"
                );
            }
        }
    }
}

#[async_trait]
impl<P, O, R, A> RoleAssignmentQuery for RoleAssignmentService<P, O, R, A>
where
    P: Repository<Person> + ?Sized + 'static,
    O: Repository<Organisation> + ?Sized + 'static,
    R: Repository<Role> + ?Sized + 'static,
    A: Repository<RoleAssignment> + ?Sized + 'static,
{
    #[instrument(skip_all)]
    async fn list_assignments(
        &self,
        request: ListRoleAssignmentsRequest,
    ) -> Result<Page<RoleAssignment>, ServiceError> {
        Ok(request
            .into_scope::<RoleAssignment>()
            .execute(self.assignments.as_ref())
            .await?)
    }

    #[instrument(skip(self), fields(person_id = %person_id))]
    async fn list_for_person(
        &self,
        person_id: &PersonId,
    ) -> Result<Vec<RoleAssignment>, ServiceError> {
        self.stored_for_person(*person_id).await
    }
}

#[async_trait]
impl<P, O, R, A> RoleAssignmentCommand for RoleAssignmentService<P, O, R, A>
where
    P: Repository<Person> + ?Sized + 'static,
    O: Repository<Organisation> + ?Sized + 'static,
    R: Repository<Role> + ?Sized + 'static,
    A: Repository<RoleAssignment> + ?Sized + 'static,
{
    #[instrument(skip_all, fields(person_id = %request.person_id))]
    async fn create_assignment(
        &self,
        request: CreateRoleAssignmentRequest,
    ) -> Result<RoleAssignment, ServiceError> {
        self.insert(RoleAssignment::new(
            request.person_id,
            request.organisation_id,
            request.role_id,
        ))
        .await
    }

    #[instrument(skip_all, fields(person_id = %update.person_id))]
    async fn replace_for_person(
        &self,
        update: AssignmentUpdate,
    ) -> Result<Vec<RoleAssignment>, ServiceError> {
        if self.persons.find_by_id(&update.person_id).await?.is_none() {
            return Err(DomainError::not_found(EntityKind::Person, update.person_id).into());
        }
        self.update_rules.validate(&update).await?;

        let stored = self.stored_for_person(update.person_id).await?;
        let mut wanted: Vec<AssignmentTarget> = Vec::with_capacity(update.targets.len());
        for target in &update.targets {
            if !wanted.contains(target) {
                wanted.push(*target);
            }
        }

        let mut inserted = Vec::new();
        for target in &wanted {
            if stored.iter().any(|assignment| assignment.target() == *target) {
                continue;
            }
            let candidate =
                RoleAssignment::new(update.person_id, target.organisation_id, target.role_id);
            match self.insert(candidate).await {
                Ok(saved) => inserted.push(saved),
                Err(error) => {
                    debug!(inserted = inserted.len(), "replacement rejected, rolling back");
                    self.roll_back(&inserted).await;
                    return Err(error);
                }
            }
        }

        for obsolete in stored
            .iter()
            .filter(|assignment| !wanted.contains(&assignment.target()))
        {
            self.remove(&obsolete.id).await?;
        }

        self.stored_for_person(update.person_id).await
    }

    #[instrument(skip(self), fields(assignment_id = %id))]
    async fn delete_assignment(&self, id: &RoleAssignmentId) -> Result<(), ServiceError> {
        let Some(assignment) = self.assignments.find_by_id(id).await? else {
            return Err(DomainError::not_found(EntityKind::RoleAssignment, id).into());
        };
        self.removal_rules.validate(&assignment).await?;
        self.remove(id).await
    }
}

#[cfg(test)]
#[path = "role_assignment_service_tests.rs"]
mod tests;
