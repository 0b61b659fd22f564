//! Role assignments (Personenkontexte): a person holding a role at an
//! organisation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{OrganisationId, PersonId, RoleAssignmentId, RoleId};
use crate::domain::ports::Entity;
use crate::domain::query_scope::{FilterValue, ScopeField, Scoped};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    pub id: RoleAssignmentId,
    pub person_id: PersonId,
    pub organisation_id: OrganisationId,
    pub role_id: RoleId,
    pub revision: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoleAssignment {
    pub fn new(person_id: PersonId, organisation_id: OrganisationId, role_id: RoleId) -> Self {
        let now = Utc::now();
        Self {
            id: RoleAssignmentId::random(),
            person_id,
            organisation_id,
            role_id,
            revision: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn target(&self) -> AssignmentTarget {
        AssignmentTarget {
            organisation_id: self.organisation_id,
            role_id: self.role_id,
        }
    }
}

/// The organisation/role pair an assignment points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentTarget {
    pub organisation_id: OrganisationId,
    pub role_id: RoleId,
}

/// Candidate for replacing every assignment of one person.
///
/// `expected_count` is the number of assignments the client saw when it
/// prepared `targets`; a different stored count means the client is stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentUpdate {
    pub person_id: PersonId,
    pub expected_count: u64,
    pub targets: Vec<AssignmentTarget>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleAssignmentField {
    Id,
    PersonId,
    OrganisationId,
    RoleId,
    CreatedAt,
}

impl ScopeField for RoleAssignmentField {
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::PersonId,
        Self::OrganisationId,
        Self::RoleId,
        Self::CreatedAt,
    ];

    const ID: Self = Self::Id;

    fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::PersonId => "person_id",
            Self::OrganisationId => "organisation_id",
            Self::RoleId => "role_id",
            Self::CreatedAt => "created_at",
        }
    }

    fn wire_name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::PersonId => "personId",
            Self::OrganisationId => "organisationId",
            Self::RoleId => "rolleId",
            Self::CreatedAt => "createdAt",
        }
    }
}

impl Scoped for RoleAssignment {
    type Field = RoleAssignmentField;

    fn field_value(&self, field: RoleAssignmentField) -> Option<FilterValue> {
        match field {
            RoleAssignmentField::Id => Some(self.id.into()),
            RoleAssignmentField::PersonId => Some(self.person_id.into()),
            RoleAssignmentField::OrganisationId => Some(self.organisation_id.into()),
            RoleAssignmentField::RoleId => Some(self.role_id.into()),
            RoleAssignmentField::CreatedAt => Some(self.created_at.into()),
        }
    }
}

impl Entity for RoleAssignment {
    type Id = RoleAssignmentId;

    fn id(&self) -> &RoleAssignmentId {
        &self.id
    }

    fn revision(&self) -> u32 {
        self.revision
    }

    fn unique_key(&self) -> Option<String> {
        Some(format!(
            "assignment:{}:{}:{}",
            self.person_id, self.organisation_id, self.role_id
        ))
    }
}

/// Optional equality criteria for assignment lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleAssignmentCriteria {
    pub person_id: Option<PersonId>,
    pub organisation_id: Option<OrganisationId>,
    pub role_id: Option<RoleId>,
}

impl IntoIterator for RoleAssignmentCriteria {
    type Item = (RoleAssignmentField, Option<FilterValue>);
    type IntoIter = std::array::IntoIter<Self::Item, 3>;

    fn into_iter(self) -> Self::IntoIter {
        [
            (RoleAssignmentField::PersonId, self.person_id.map(Into::into)),
            (
                RoleAssignmentField::OrganisationId,
                self.organisation_id.map(Into::into),
            ),
            (RoleAssignmentField::RoleId, self.role_id.map(Into::into)),
        ]
        .into_iter()
    }
}
