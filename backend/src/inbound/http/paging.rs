//! Shared list parameters: `offset`, `limit` and `sort`.
//!
//! `sort` is a comma separated list of wire field names; a leading `-`
//! sorts that field descending. Unknown names and negative windows are
//! rejected as invalid attributes before any service runs.

use actix_web::HttpResponse;
use pagination::{Page, PageRequest};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::domain::query_scope::{ScopeField, SortKey};
use crate::domain::{AttributeReason, AttributeViolation, DomainError, EntityKind, ServiceError};

/// Query parameters accepted by every list endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Rows to skip.
    pub offset: Option<i64>,
    /// Maximum rows to return.
    pub limit: Option<i64>,
    /// Sort keys, e.g. `familienname,-vorname`.
    pub sort: Option<String>,
}

fn invalid(entity: EntityKind, field: &str) -> ServiceError {
    DomainError::invalid_attribute(
        entity,
        AttributeViolation::new(field, AttributeReason::InvalidValue),
    )
    .into()
}

impl ListParams {
    /// Validated paging window.
    pub fn page(&self, entity: EntityKind) -> Result<PageRequest, ServiceError> {
        PageRequest::try_from_raw(self.offset, self.limit).map_err(|error| match error {
            pagination::PageRequestError::NegativeOffset { .. } => invalid(entity, "offset"),
            pagination::PageRequestError::NegativeLimit { .. } => invalid(entity, "limit"),
        })
    }

    /// Parsed sort keys in priority order.
    pub fn sort<F: ScopeField>(&self, entity: EntityKind) -> Result<Vec<SortKey<F>>, ServiceError> {
        let Some(raw) = self.sort.as_deref() else {
            return Ok(Vec::new());
        };
        raw.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (name, descending) = match part.strip_prefix('-') {
                    Some(name) => (name, true),
                    None => (part, false),
                };
                let field = F::parse(name).map_err(|_| invalid(entity, "sort"))?;
                Ok(if descending {
                    SortKey::desc(field)
                } else {
                    SortKey::asc(field)
                })
            })
            .collect()
    }
}

/// `200 OK` with the page items as body and the paging headers.
pub fn paged_response<T: Serialize>(page: &Page<T>) -> HttpResponse {
    let mut response = HttpResponse::Ok();
    for header in page.headers() {
        response.insert_header(header);
    }
    response.json(page.items())
}
