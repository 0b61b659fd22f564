//! Scoped queries: filter groups, sort keys and a paging window.
//!
//! A [`QueryScope`] is a fluent builder owned by one operation. Each
//! [`QueryScope::find_by`] call appends one filter group whose predicates are
//! joined by an explicit [`Combinator`]; groups are joined with AND. Sort keys
//! apply in the order they were added. The scope never talks to storage
//! itself: [`QueryScope::execute`] hands it to a [`Repository`], which either
//! evaluates it in memory ([`QueryScope::apply`]) or renders it to SQL.
//!
//! # Examples
//!
//! ```
//! use iam_backend::domain::query_scope::{Combinator, QueryScope, SortOrder};
//! use iam_backend::domain::{Person, PersonCriteria, PersonField};
//!
//! let scope = QueryScope::<Person>::new()
//!     .find_by(
//!         PersonCriteria {
//!             family_name: Some("Lovelace".to_owned()),
//!             ..PersonCriteria::default()
//!         },
//!         Combinator::And,
//!     )
//!     .sort_by(PersonField::GivenName, SortOrder::Asc)
//!     .paged(Some(0), Some(10));
//!
//! assert_eq!(scope.groups().len(), 1);
//! assert_eq!(scope.page().limit(), Some(10));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::{PersistenceError, Repository};

/// Comparable scalar used in predicates and sort evaluation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterValue {
    Text(String),
    Uuid(Uuid),
    Integer(i64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Uuid> for FilterValue {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// Raised when a field name from outside the process matches no column.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field: {name}")]
pub struct UnknownField {
    pub name: String,
}

/// Closed set of queryable fields of one entity type.
///
/// Scopes only accept values of this type, so a predicate on a column the
/// entity does not have cannot be expressed.
pub trait ScopeField: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Every field, used to resolve wire names.
    const ALL: &'static [Self];

    /// Primary key field, the final tiebreak of every ordering.
    const ID: Self;

    /// Storage column name.
    fn column(self) -> &'static str;

    /// Name used by HTTP clients for filtering and sorting.
    fn wire_name(self) -> &'static str;

    /// Resolve a wire name.
    fn parse(name: &str) -> Result<Self, UnknownField> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.wire_name() == name)
            .ok_or_else(|| UnknownField {
                name: name.to_owned(),
            })
    }
}

/// Entity whose fields can be read for in-memory scope evaluation.
pub trait Scoped: Send + Sync {
    type Field: ScopeField;

    /// Current value of `field`; `None` stands for a NULL column.
    fn field_value(&self, field: Self::Field) -> Option<FilterValue>;
}

/// How predicates inside one filter group combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// One equality condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate<F> {
    pub field: F,
    pub value: FilterValue,
}

/// Predicates sharing one combinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterGroup<F> {
    pub combinator: Combinator,
    pub predicates: Vec<Predicate<F>>,
}

impl<F: ScopeField> FilterGroup<F> {
    fn matches<E: Scoped<Field = F>>(&self, entity: &E) -> bool {
        let mut hits = self
            .predicates
            .iter()
            .map(|predicate| entity.field_value(predicate.field).as_ref() == Some(&predicate.value));
        match self.combinator {
            Combinator::And => hits.all(|hit| hit),
            Combinator::Or => hits.any(|hit| hit),
        }
    }
}

/// One sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey<F> {
    pub field: F,
    pub order: SortOrder,
}

impl<F> SortKey<F> {
    pub const fn asc(field: F) -> Self {
        Self {
            field,
            order: SortOrder::Asc,
        }
    }

    pub const fn desc(field: F) -> Self {
        Self {
            field,
            order: SortOrder::Desc,
        }
    }
}

/// Filter, sort and paging criteria for one storage read.
pub struct QueryScope<E: Scoped> {
    groups: Vec<FilterGroup<E::Field>>,
    sort: Vec<SortKey<E::Field>>,
    page: PageRequest,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Scoped> Default for QueryScope<E> {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            sort: Vec::new(),
            page: PageRequest::unbounded(),
            _entity: PhantomData,
        }
    }
}

impl<E: Scoped> Clone for QueryScope<E> {
    fn clone(&self) -> Self {
        Self {
            groups: self.groups.clone(),
            sort: self.sort.clone(),
            page: self.page,
            _entity: PhantomData,
        }
    }
}

impl<E: Scoped> fmt::Debug for QueryScope<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryScope")
            .field("groups", &self.groups)
            .field("sort", &self.sort)
            .field("page", &self.page)
            .finish()
    }
}

impl<E: Scoped> QueryScope<E> {
    /// Scope matching every row, unsorted and unbounded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one filter group built from `criteria`.
    ///
    /// Entries whose value is `None` are dropped. A call whose entries are all
    /// `None` adds no group at all, so it behaves exactly like no call.
    #[must_use]
    pub fn find_by<I, V>(mut self, criteria: I, combinator: Combinator) -> Self
    where
        I: IntoIterator<Item = (E::Field, Option<V>)>,
        V: Into<FilterValue>,
    {
        let predicates: Vec<_> = criteria
            .into_iter()
            .filter_map(|(field, value)| {
                value.map(|value| Predicate {
                    field,
                    value: value.into(),
                })
            })
            .collect();
        if !predicates.is_empty() {
            self.groups.push(FilterGroup {
                combinator,
                predicates,
            });
        }
        self
    }

    /// Append a sort key. Earlier keys take priority.
    #[must_use]
    pub fn sort_by(mut self, field: E::Field, order: SortOrder) -> Self {
        self.sort.push(SortKey { field, order });
        self
    }

    /// Append several sort keys in order.
    #[must_use]
    pub fn sorted(mut self, keys: impl IntoIterator<Item = SortKey<E::Field>>) -> Self {
        self.sort.extend(keys);
        self
    }

    /// Set the paging window; `None` leaves that dimension unbounded.
    #[must_use]
    pub fn paged(mut self, offset: Option<u64>, limit: Option<u64>) -> Self {
        self.page = PageRequest::new(offset, limit);
        self
    }

    /// Set the paging window from a validated request.
    #[must_use]
    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }

    pub fn groups(&self) -> &[FilterGroup<E::Field>] {
        &self.groups
    }

    pub fn sort_keys(&self) -> &[SortKey<E::Field>] {
        &self.sort
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    /// Whether `entity` satisfies every filter group.
    pub fn matches(&self, entity: &E) -> bool {
        self.groups.iter().all(|group| group.matches(entity))
    }

    /// Order two entities by the scope's sort keys, then by id ascending.
    ///
    /// NULL values sort first in ascending order and last in descending
    /// order, matching the rendered SQL. Text compares by Unicode scalar
    /// value; PostgreSQL uses the database collation instead, so non-ASCII
    /// names may order differently between the two backends.
    pub fn compare(&self, left: &E, right: &E) -> Ordering {
        self.sort
            .iter()
            .map(|key| {
                let ordering = left
                    .field_value(key.field)
                    .cmp(&right.field_value(key.field));
                match key.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| {
                let id = <E::Field as ScopeField>::ID;
                left.field_value(id).cmp(&right.field_value(id))
            })
    }

    /// Evaluate the scope against already loaded rows.
    ///
    /// The total is taken after filtering and before the paging window.
    pub fn apply(&self, rows: impl IntoIterator<Item = E>) -> Page<E> {
        let mut matching: Vec<E> = rows.into_iter().filter(|row| self.matches(row)).collect();
        matching.sort_by(|left, right| self.compare(left, right));
        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        Page::new(self.page.apply(matching), total, self.page)
    }

    /// Run the scope through a repository.
    ///
    /// Adapters return the window and the filtered total from one
    /// consistent view of storage.
    pub async fn execute<R>(&self, repository: &R) -> Result<Page<E>, PersistenceError>
    where
        R: Repository<E> + ?Sized,
        E: crate::domain::ports::Entity,
    {
        repository.find_by(self).await
    }
}
