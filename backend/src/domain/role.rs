//! Role aggregate.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{OrganisationId, RoleId};
use crate::domain::ports::Entity;
use crate::domain::query_scope::{FilterValue, ScopeField, Scoped};

/// Category of a role (Rollenart).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleKind {
    #[serde(rename = "LERN")]
    Learner,
    #[serde(rename = "LEHR")]
    Teacher,
    #[serde(rename = "EXTERN")]
    External,
    #[serde(rename = "ORGADMIN")]
    OrgAdmin,
    #[serde(rename = "LEIT")]
    Leader,
    #[serde(rename = "SYSADMIN")]
    SysAdmin,
}

impl RoleKind {
    pub const ALL: [Self; 6] = [
        Self::Learner,
        Self::Teacher,
        Self::External,
        Self::OrgAdmin,
        Self::Leader,
        Self::SysAdmin,
    ];

    /// Wire codes of [`Self::ALL`], in the same order.
    pub const CODES: [&'static str; 6] = [
        Self::Learner.as_str(),
        Self::Teacher.as_str(),
        Self::External.as_str(),
        Self::OrgAdmin.as_str(),
        Self::Leader.as_str(),
        Self::SysAdmin.as_str(),
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Learner => "LERN",
            Self::Teacher => "LEHR",
            Self::External => "EXTERN",
            Self::OrgAdmin => "ORGADMIN",
            Self::Leader => "LEIT",
            Self::SysAdmin => "SYSADMIN",
        }
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown role kind: {s}"))
    }
}

impl From<RoleKind> for FilterValue {
    fn from(value: RoleKind) -> Self {
        FilterValue::Text(value.as_str().to_owned())
    }
}

/// A role defined by, and assignable beneath, one organisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub administered_by: OrganisationId,
    pub kind: RoleKind,
    pub revision: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn new(name: impl Into<String>, administered_by: OrganisationId, kind: RoleKind) -> Self {
        let now = Utc::now();
        Self {
            id: RoleId::random(),
            name: name.into(),
            administered_by,
            kind,
            revision: 1,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleField {
    Id,
    Name,
    AdministeredBy,
    Kind,
}

impl ScopeField for RoleField {
    const ALL: &'static [Self] = &[Self::Id, Self::Name, Self::AdministeredBy, Self::Kind];

    const ID: Self = Self::Id;

    fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::AdministeredBy => "administered_by",
            Self::Kind => "kind",
        }
    }

    fn wire_name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::AdministeredBy => "administeredBySchulstrukturknoten",
            Self::Kind => "rollenart",
        }
    }
}

impl Scoped for Role {
    type Field = RoleField;

    fn field_value(&self, field: RoleField) -> Option<FilterValue> {
        match field {
            RoleField::Id => Some(self.id.into()),
            RoleField::Name => Some(FilterValue::Text(self.name.clone())),
            RoleField::AdministeredBy => Some(self.administered_by.into()),
            RoleField::Kind => Some(self.kind.into()),
        }
    }
}

impl Entity for Role {
    type Id = RoleId;

    fn id(&self) -> &RoleId {
        &self.id
    }

    fn revision(&self) -> u32 {
        self.revision
    }
}

/// Optional equality criteria for role lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleCriteria {
    pub name: Option<String>,
    pub administered_by: Option<OrganisationId>,
    pub kind: Option<RoleKind>,
}

impl IntoIterator for RoleCriteria {
    type Item = (RoleField, Option<FilterValue>);
    type IntoIter = std::array::IntoIter<Self::Item, 3>;

    fn into_iter(self) -> Self::IntoIter {
        [
            (RoleField::Name, self.name.map(FilterValue::Text)),
            (
                RoleField::AdministeredBy,
                self.administered_by.map(Into::into),
            ),
            (RoleField::Kind, self.kind.map(Into::into)),
        ]
        .into_iter()
    }
}
