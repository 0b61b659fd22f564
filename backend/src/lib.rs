//! Identity administration backend.
//!
//! Persons, organisations, roles and role assignments behind a hexagonal
//! boundary: the [`domain`] owns query scopes, business rules and
//! services; [`outbound`] stores entities in memory or PostgreSQL;
//! [`inbound`] exposes them over HTTP with SchulConnex error bodies.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
