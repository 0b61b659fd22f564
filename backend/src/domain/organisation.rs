//! Organisation aggregate: schools, classes and the bodies above them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::OrganisationId;
use crate::domain::ports::Entity;
use crate::domain::query_scope::{FilterValue, ScopeField, Scoped};

/// Structural kind of an organisation.
///
/// Wire and storage names follow the SchulConnex vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrganisationKind {
    #[serde(rename = "ROOT")]
    Root,
    #[serde(rename = "LAND")]
    State,
    #[serde(rename = "TRAEGER")]
    Carrier,
    #[serde(rename = "SCHULE")]
    School,
    #[serde(rename = "KLASSE")]
    Class,
    #[serde(rename = "ANBIETER")]
    Provider,
    #[serde(rename = "SONSTIGE ORGANISATION / EINRICHTUNG")]
    Other,
    #[serde(rename = "UNBESTAETIGT")]
    Unconfirmed,
}

impl OrganisationKind {
    pub const ALL: [Self; 8] = [
        Self::Root,
        Self::State,
        Self::Carrier,
        Self::School,
        Self::Class,
        Self::Provider,
        Self::Other,
        Self::Unconfirmed,
    ];

    /// Wire codes of [`Self::ALL`], in the same order.
    pub const CODES: [&'static str; 8] = [
        Self::Root.as_str(),
        Self::State.as_str(),
        Self::Carrier.as_str(),
        Self::School.as_str(),
        Self::Class.as_str(),
        Self::Provider.as_str(),
        Self::Other.as_str(),
        Self::Unconfirmed.as_str(),
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Root => "ROOT",
            Self::State => "LAND",
            Self::Carrier => "TRAEGER",
            Self::School => "SCHULE",
            Self::Class => "KLASSE",
            Self::Provider => "ANBIETER",
            Self::Other => "SONSTIGE ORGANISATION / EINRICHTUNG",
            Self::Unconfirmed => "UNBESTAETIGT",
        }
    }
}

impl fmt::Display for OrganisationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrganisationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown organisation kind: {s}"))
    }
}

impl From<OrganisationKind> for FilterValue {
    fn from(value: OrganisationKind) -> Self {
        FilterValue::Text(value.as_str().to_owned())
    }
}

/// An organisational unit in the administration tree.
///
/// `administered_by` points to the unit that manages this one (a class is
/// administered by its school); `belongs_to` records the carrier or state
/// it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organisation {
    pub id: OrganisationId,
    pub administered_by: Option<OrganisationId>,
    pub belongs_to: Option<OrganisationId>,
    pub identifier: Option<String>,
    pub name: Option<String>,
    pub kind: OrganisationKind,
    pub revision: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organisation {
    /// Create a not yet persisted organisation at revision 1.
    pub fn new(kind: OrganisationKind, name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: OrganisationId::random(),
            administered_by: None,
            belongs_to: None,
            identifier: None,
            name,
            kind,
            revision: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn administered_by(mut self, parent: OrganisationId) -> Self {
        self.administered_by = Some(parent);
        self
    }

    #[must_use]
    pub fn belongs_to(mut self, parent: OrganisationId) -> Self {
        self.belongs_to = Some(parent);
        self
    }

    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn is_class(&self) -> bool {
        self.kind == OrganisationKind::Class
    }

    /// Copy with a new name and the next revision.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            revision: self.revision + 1,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }
}

/// Queryable organisation fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrganisationField {
    Id,
    AdministeredBy,
    BelongsTo,
    Identifier,
    Name,
    Kind,
}

impl ScopeField for OrganisationField {
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::AdministeredBy,
        Self::BelongsTo,
        Self::Identifier,
        Self::Name,
        Self::Kind,
    ];

    const ID: Self = Self::Id;

    fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::AdministeredBy => "administered_by",
            Self::BelongsTo => "belongs_to",
            Self::Identifier => "identifier",
            Self::Name => "name",
            Self::Kind => "kind",
        }
    }

    fn wire_name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::AdministeredBy => "administriertVon",
            Self::BelongsTo => "zugehoerigZu",
            Self::Identifier => "kennung",
            Self::Name => "name",
            Self::Kind => "typ",
        }
    }
}

impl Scoped for Organisation {
    type Field = OrganisationField;

    fn field_value(&self, field: OrganisationField) -> Option<FilterValue> {
        match field {
            OrganisationField::Id => Some(self.id.into()),
            OrganisationField::AdministeredBy => self.administered_by.map(Into::into),
            OrganisationField::BelongsTo => self.belongs_to.map(Into::into),
            OrganisationField::Identifier => self.identifier.clone().map(FilterValue::Text),
            OrganisationField::Name => self.name.clone().map(FilterValue::Text),
            OrganisationField::Kind => Some(self.kind.into()),
        }
    }
}

impl Entity for Organisation {
    type Id = OrganisationId;

    fn id(&self) -> &OrganisationId {
        &self.id
    }

    fn revision(&self) -> u32 {
        self.revision
    }
}

/// Optional equality criteria for organisation lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganisationCriteria {
    pub administered_by: Option<OrganisationId>,
    pub belongs_to: Option<OrganisationId>,
    pub identifier: Option<String>,
    pub name: Option<String>,
    pub kind: Option<OrganisationKind>,
}

impl IntoIterator for OrganisationCriteria {
    type Item = (OrganisationField, Option<FilterValue>);
    type IntoIter = std::array::IntoIter<Self::Item, 5>;

    fn into_iter(self) -> Self::IntoIter {
        [
            (
                OrganisationField::AdministeredBy,
                self.administered_by.map(Into::into),
            ),
            (OrganisationField::BelongsTo, self.belongs_to.map(Into::into)),
            (
                OrganisationField::Identifier,
                self.identifier.map(FilterValue::Text),
            ),
            (OrganisationField::Name, self.name.map(FilterValue::Text)),
            (OrganisationField::Kind, self.kind.map(Into::into)),
        ]
        .into_iter()
    }
}

/// Free-text search matching either the name or the identifier exactly.
///
/// Used as an OR group next to [`OrganisationCriteria`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganisationSearch {
    pub term: Option<String>,
}

impl IntoIterator for OrganisationSearch {
    type Item = (OrganisationField, Option<FilterValue>);
    type IntoIter = std::array::IntoIter<Self::Item, 2>;

    fn into_iter(self) -> Self::IntoIter {
        let term = self.term.map(FilterValue::Text);
        [
            (OrganisationField::Name, term.clone()),
            (OrganisationField::Identifier, term),
        ]
        .into_iter()
    }
}
