//! Person aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::PersonId;
use crate::domain::ports::Entity;
use crate::domain::query_scope::{FilterValue, ScopeField, Scoped};

/// A natural person known to the identity system.
///
/// `referrer` is the account name in the identity provider and is unique
/// when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: PersonId,
    pub referrer: Option<String>,
    pub given_name: String,
    pub family_name: String,
    pub revision: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Person {
    /// Create a not yet persisted person at revision 1.
    pub fn new(
        referrer: Option<String>,
        given_name: impl Into<String>,
        family_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PersonId::random(),
            referrer,
            given_name: given_name.into(),
            family_name: family_name.into(),
            revision: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy with new names and the next revision.
    pub fn renamed(&self, given_name: impl Into<String>, family_name: impl Into<String>) -> Self {
        Self {
            given_name: given_name.into(),
            family_name: family_name.into(),
            revision: self.revision + 1,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }
}

/// Queryable person fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonField {
    Id,
    Referrer,
    GivenName,
    FamilyName,
    CreatedAt,
    UpdatedAt,
}

impl ScopeField for PersonField {
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::Referrer,
        Self::GivenName,
        Self::FamilyName,
        Self::CreatedAt,
        Self::UpdatedAt,
    ];

    const ID: Self = Self::Id;

    fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Referrer => "referrer",
            Self::GivenName => "given_name",
            Self::FamilyName => "family_name",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }

    fn wire_name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Referrer => "referrer",
            Self::GivenName => "vorname",
            Self::FamilyName => "familienname",
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
        }
    }
}

impl Scoped for Person {
    type Field = PersonField;

    fn field_value(&self, field: PersonField) -> Option<FilterValue> {
        match field {
            PersonField::Id => Some(self.id.into()),
            PersonField::Referrer => self.referrer.clone().map(FilterValue::Text),
            PersonField::GivenName => Some(FilterValue::Text(self.given_name.clone())),
            PersonField::FamilyName => Some(FilterValue::Text(self.family_name.clone())),
            PersonField::CreatedAt => Some(self.created_at.into()),
            PersonField::UpdatedAt => Some(self.updated_at.into()),
        }
    }
}

impl Entity for Person {
    type Id = PersonId;

    fn id(&self) -> &PersonId {
        &self.id
    }

    fn revision(&self) -> u32 {
        self.revision
    }

    fn unique_key(&self) -> Option<String> {
        self.referrer.as_ref().map(|referrer| format!("referrer:{referrer}"))
    }
}

/// Optional equality criteria for person lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonCriteria {
    pub referrer: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

impl IntoIterator for PersonCriteria {
    type Item = (PersonField, Option<FilterValue>);
    type IntoIter = std::array::IntoIter<Self::Item, 3>;

    fn into_iter(self) -> Self::IntoIter {
        [
            (PersonField::Referrer, self.referrer.map(FilterValue::Text)),
            (PersonField::GivenName, self.given_name.map(FilterValue::Text)),
            (PersonField::FamilyName, self.family_name.map(FilterValue::Text)),
        ]
        .into_iter()
    }
}
