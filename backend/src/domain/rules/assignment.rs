//! Rules guarding role assignments (Personenkontexte).

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::Violation;
use crate::domain::ids::OrganisationId;
use crate::domain::organisation::Organisation;
use crate::domain::ports::{PersistenceError, Repository};
use crate::domain::query_scope::{Combinator, QueryScope};
use crate::domain::role::{Role, RoleKind};
use crate::domain::role_assignment::{
    AssignmentTarget, AssignmentUpdate, RoleAssignment, RoleAssignmentCriteria,
};
use crate::domain::specification::{Rule, Specification};

/// Longest administration chain walked before giving up.
const MAX_ANCESTOR_DEPTH: usize = 32;

/// A person may hold a role at a class only if they hold the same role at
/// the school administering that class.
///
/// Satisfied when the target organisation is not a class. Unsatisfied when
/// the target or its administering school cannot be resolved, when the
/// class has no administering organisation, or when no matching assignment
/// exists at the school.
pub struct SameRoleAtParentSchool<O: ?Sized, A: ?Sized> {
    organisations: Arc<O>,
    assignments: Arc<A>,
}

impl<O: ?Sized, A: ?Sized> SameRoleAtParentSchool<O, A> {
    pub fn new(organisations: Arc<O>, assignments: Arc<A>) -> Self {
        Self {
            organisations,
            assignments,
        }
    }
}

#[async_trait]
impl<O, A> Specification<RoleAssignment> for SameRoleAtParentSchool<O, A>
where
    O: Repository<Organisation> + ?Sized,
    A: Repository<RoleAssignment> + ?Sized,
{
    async fn is_satisfied_by(&self, candidate: &RoleAssignment) -> Result<bool, PersistenceError> {
        let Some(target) = self
            .organisations
            .find_by_id(&candidate.organisation_id)
            .await?
        else {
            return Ok(false);
        };
        if !target.is_class() {
            return Ok(true);
        }
        let Some(parent_id) = target.administered_by else {
            return Ok(false);
        };
        if self.organisations.find_by_id(&parent_id).await?.is_none() {
            return Ok(false);
        }
        let existing = QueryScope::<RoleAssignment>::new()
            .find_by(
                RoleAssignmentCriteria {
                    person_id: Some(candidate.person_id),
                    organisation_id: Some(parent_id),
                    role_id: Some(candidate.role_id),
                },
                Combinator::And,
            )
            .paged(Some(0), Some(1))
            .execute(self.assignments.as_ref())
            .await?;
        Ok(existing.total() > 0)
    }
}

impl<O, A> Rule<RoleAssignment> for SameRoleAtParentSchool<O, A>
where
    O: Repository<Organisation> + ?Sized,
    A: Repository<RoleAssignment> + ?Sized,
{
    fn violation(&self) -> Violation {
        Violation::SameRoleAtParentSchool
    }
}

/// At a class only learner and teacher roles may be assigned.
///
/// Unsatisfied when the organisation or the role cannot be found.
pub struct OnlyLearnersAndTeachersAtClass<O: ?Sized, R: ?Sized> {
    organisations: Arc<O>,
    roles: Arc<R>,
}

impl<O: ?Sized, R: ?Sized> OnlyLearnersAndTeachersAtClass<O, R> {
    pub fn new(organisations: Arc<O>, roles: Arc<R>) -> Self {
        Self {
            organisations,
            roles,
        }
    }
}

#[async_trait]
impl<O, R> Specification<RoleAssignment> for OnlyLearnersAndTeachersAtClass<O, R>
where
    O: Repository<Organisation> + ?Sized,
    R: Repository<Role> + ?Sized,
{
    async fn is_satisfied_by(&self, candidate: &RoleAssignment) -> Result<bool, PersistenceError> {
        let Some(target) = self
            .organisations
            .find_by_id(&candidate.organisation_id)
            .await?
        else {
            return Ok(false);
        };
        if !target.is_class() {
            return Ok(true);
        }
        let role = self.roles.find_by_id(&candidate.role_id).await?;
        Ok(role.is_some_and(|role| matches!(role.kind, RoleKind::Learner | RoleKind::Teacher)))
    }
}

impl<O, R> Rule<RoleAssignment> for OnlyLearnersAndTeachersAtClass<O, R>
where
    O: Repository<Organisation> + ?Sized,
    R: Repository<Role> + ?Sized,
{
    fn violation(&self) -> Violation {
        Violation::OnlyLearnersAndTeachersAtClass
    }
}

/// A role may only be assigned at the organisation administering it or at
/// an organisation beneath it.
///
/// The administration chain is walked upwards from the target. A missing
/// role, a missing organisation along the way, a cycle, or a chain deeper
/// than the walk limit all leave the rule unsatisfied.
pub struct RoleAssignableAtOrganisation<O: ?Sized, R: ?Sized> {
    organisations: Arc<O>,
    roles: Arc<R>,
}

impl<O: ?Sized, R: ?Sized> RoleAssignableAtOrganisation<O, R> {
    pub fn new(organisations: Arc<O>, roles: Arc<R>) -> Self {
        Self {
            organisations,
            roles,
        }
    }
}

#[async_trait]
impl<O, R> Specification<RoleAssignment> for RoleAssignableAtOrganisation<O, R>
where
    O: Repository<Organisation> + ?Sized,
    R: Repository<Role> + ?Sized,
{
    async fn is_satisfied_by(&self, candidate: &RoleAssignment) -> Result<bool, PersistenceError> {
        let Some(role) = self.roles.find_by_id(&candidate.role_id).await? else {
            return Ok(false);
        };
        let mut visited: HashSet<OrganisationId> = HashSet::new();
        let mut current = Some(candidate.organisation_id);
        while let Some(organisation_id) = current {
            if organisation_id == role.administered_by {
                return Ok(true);
            }
            if !visited.insert(organisation_id) || visited.len() > MAX_ANCESTOR_DEPTH {
                debug!(%organisation_id, "administration chain cycles or is too deep");
                return Ok(false);
            }
            current = self
                .organisations
                .find_by_id(&organisation_id)
                .await?
                .and_then(|organisation| organisation.administered_by);
        }
        Ok(false)
    }
}

impl<O, R> Rule<RoleAssignment> for RoleAssignableAtOrganisation<O, R>
where
    O: Repository<Organisation> + ?Sized,
    R: Repository<Role> + ?Sized,
{
    fn violation(&self) -> Violation {
        Violation::RoleAssignableAtOrganisation
    }
}

/// The stored number of assignments of a person must equal the count the
/// client saw before preparing its update.
pub struct ExpectedAssignmentCount<A: ?Sized> {
    assignments: Arc<A>,
}

impl<A: ?Sized> ExpectedAssignmentCount<A> {
    pub fn new(assignments: Arc<A>) -> Self {
        Self { assignments }
    }
}

#[async_trait]
impl<A> Specification<AssignmentUpdate> for ExpectedAssignmentCount<A>
where
    A: Repository<RoleAssignment> + ?Sized,
{
    async fn is_satisfied_by(&self, candidate: &AssignmentUpdate) -> Result<bool, PersistenceError> {
        let stored = QueryScope::<RoleAssignment>::new()
            .find_by(
                RoleAssignmentCriteria {
                    person_id: Some(candidate.person_id),
                    ..RoleAssignmentCriteria::default()
                },
                Combinator::And,
            )
            .paged(Some(0), Some(0))
            .execute(self.assignments.as_ref())
            .await?;
        Ok(stored.total() == candidate.expected_count)
    }
}

impl<A> Rule<AssignmentUpdate> for ExpectedAssignmentCount<A>
where
    A: Repository<RoleAssignment> + ?Sized,
{
    fn violation(&self) -> Violation {
        Violation::ExpectedAssignmentCount
    }
}

/// Every class target of an update must be accompanied by the same role at
/// the school administering the class, within the same target list.
///
/// This checks the state left behind after the update, so a school
/// assignment that is already stored but missing from the targets does not
/// count. Targets whose organisation cannot be found are left to the
/// per-assignment checks. A class without an administering organisation is
/// unsatisfied.
pub struct ClassTargetsKeepParentSchool<O: ?Sized> {
    organisations: Arc<O>,
}

impl<O: ?Sized> ClassTargetsKeepParentSchool<O> {
    pub fn new(organisations: Arc<O>) -> Self {
        Self { organisations }
    }
}

#[async_trait]
impl<O> Specification<AssignmentUpdate> for ClassTargetsKeepParentSchool<O>
where
    O: Repository<Organisation> + ?Sized,
{
    async fn is_satisfied_by(&self, candidate: &AssignmentUpdate) -> Result<bool, PersistenceError> {
        for target in &candidate.targets {
            let Some(organisation) = self.organisations.find_by_id(&target.organisation_id).await?
            else {
                continue;
            };
            if !organisation.is_class() {
                continue;
            }
            let Some(parent_id) = organisation.administered_by else {
                return Ok(false);
            };
            let backing = AssignmentTarget {
                organisation_id: parent_id,
                role_id: target.role_id,
            };
            if !candidate.targets.contains(&backing) {
                debug!(organisation_id = %target.organisation_id, "class target lacks its school");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<O> Rule<AssignmentUpdate> for ClassTargetsKeepParentSchool<O>
where
    O: Repository<Organisation> + ?Sized,
{
    fn violation(&self) -> Violation {
        Violation::SameRoleAtParentSchool
    }
}

/// An assignment may only be removed if no class assignment of the same
/// person and role depends on it.
///
/// Sibling assignments whose organisation cannot be found do not block the
/// removal.
pub struct NoClassAssignmentDependsOn<O: ?Sized, A: ?Sized> {
    organisations: Arc<O>,
    assignments: Arc<A>,
}

impl<O: ?Sized, A: ?Sized> NoClassAssignmentDependsOn<O, A> {
    pub fn new(organisations: Arc<O>, assignments: Arc<A>) -> Self {
        Self {
            organisations,
            assignments,
        }
    }
}

#[async_trait]
impl<O, A> Specification<RoleAssignment> for NoClassAssignmentDependsOn<O, A>
where
    O: Repository<Organisation> + ?Sized,
    A: Repository<RoleAssignment> + ?Sized,
{
    async fn is_satisfied_by(&self, candidate: &RoleAssignment) -> Result<bool, PersistenceError> {
        let siblings = QueryScope::<RoleAssignment>::new()
            .find_by(
                RoleAssignmentCriteria {
                    person_id: Some(candidate.person_id),
                    organisation_id: None,
                    role_id: Some(candidate.role_id),
                },
                Combinator::And,
            )
            .execute(self.assignments.as_ref())
            .await?;
        for sibling in siblings.items() {
            if sibling.id == candidate.id {
                continue;
            }
            let Some(organisation) = self.organisations.find_by_id(&sibling.organisation_id).await?
            else {
                continue;
            };
            if organisation.is_class() && organisation.administered_by == Some(candidate.organisation_id)
            {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<O, A> Rule<RoleAssignment> for NoClassAssignmentDependsOn<O, A>
where
    O: Repository<Organisation> + ?Sized,
    A: Repository<RoleAssignment> + ?Sized,
{
    fn violation(&self) -> Violation {
        Violation::SameRoleAtParentSchool
    }
}
