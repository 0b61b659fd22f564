//! Listing request shared by every query port.

use pagination::PageRequest;

use crate::domain::query_scope::{Combinator, FilterValue, QueryScope, SortKey, Scoped};

/// Criteria, sort keys and paging window for one list call.
///
/// `criteria` is any value yielding `(field, Option<value>)` pairs; unset
/// criteria are ignored. The criteria are combined with AND.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest<F, C> {
    pub criteria: C,
    pub sort: Vec<SortKey<F>>,
    pub page: PageRequest,
}

impl<F, C: Default> Default for ListRequest<F, C> {
    fn default() -> Self {
        Self {
            criteria: C::default(),
            sort: Vec::new(),
            page: PageRequest::unbounded(),
        }
    }
}

impl<F, C> ListRequest<F, C> {
    pub fn new(criteria: C) -> Self {
        Self {
            criteria,
            sort: Vec::new(),
            page: PageRequest::unbounded(),
        }
    }

    #[must_use]
    pub fn with_sort(mut self, sort: Vec<SortKey<F>>) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub const fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }

    /// Build the equivalent scope.
    pub fn into_scope<E>(self) -> QueryScope<E>
    where
        E: Scoped<Field = F>,
        C: IntoIterator<Item = (F, Option<FilterValue>)>,
    {
        QueryScope::new()
            .find_by(self.criteria, Combinator::And)
            .sorted(self.sort)
            .with_page(self.page)
    }
}
