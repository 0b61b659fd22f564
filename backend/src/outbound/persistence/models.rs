//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer. Row structs derive
//! `QueryableByName` as well so rendered scope statements can load them.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{organisations, persons, role_assignments, roles};

// ---------------------------------------------------------------------------
// Persons
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = persons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PersonRow {
    pub id: Uuid,
    pub referrer: Option<String>,
    pub given_name: String,
    pub family_name: String,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = persons)]
pub(crate) struct NewPersonRow<'a> {
    pub id: Uuid,
    pub referrer: Option<&'a str>,
    pub given_name: &'a str,
    pub family_name: &'a str,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Referrer is immutable after creation; only names change.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = persons)]
pub(crate) struct PersonUpdate<'a> {
    pub given_name: &'a str,
    pub family_name: &'a str,
    pub revision: i32,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Organisations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = organisations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrganisationRow {
    pub id: Uuid,
    pub administered_by: Option<Uuid>,
    pub belongs_to: Option<Uuid>,
    pub identifier: Option<String>,
    pub name: Option<String>,
    pub kind: String,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = organisations)]
pub(crate) struct NewOrganisationRow<'a> {
    pub id: Uuid,
    pub administered_by: Option<Uuid>,
    pub belongs_to: Option<Uuid>,
    pub identifier: Option<&'a str>,
    pub name: Option<&'a str>,
    pub kind: &'a str,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `treat_none_as_null` so clearing an optional column is written through.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = organisations, treat_none_as_null = true)]
pub(crate) struct OrganisationUpdate<'a> {
    pub administered_by: Option<Uuid>,
    pub belongs_to: Option<Uuid>,
    pub identifier: Option<&'a str>,
    pub name: Option<&'a str>,
    pub kind: &'a str,
    pub revision: i32,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RoleRow {
    pub id: Uuid,
    pub name: String,
    pub administered_by: Uuid,
    pub kind: String,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = roles)]
pub(crate) struct NewRoleRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub administered_by: Uuid,
    pub kind: &'a str,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = roles)]
pub(crate) struct RoleUpdate<'a> {
    pub name: &'a str,
    pub kind: &'a str,
    pub revision: i32,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Role assignments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = role_assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RoleAssignmentRow {
    pub id: Uuid,
    pub person_id: Uuid,
    pub organisation_id: Uuid,
    pub role_id: Uuid,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = role_assignments)]
pub(crate) struct NewRoleAssignmentRow {
    pub id: Uuid,
    pub person_id: Uuid,
    pub organisation_id: Uuid,
    pub role_id: Uuid,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = role_assignments)]
pub(crate) struct RoleAssignmentUpdate {
    pub organisation_id: Uuid,
    pub role_id: Uuid,
    pub revision: i32,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Scope counts
// ---------------------------------------------------------------------------

/// Result row of a rendered `COUNT(*) AS total` statement.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub(crate) struct CountRow {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub total: i64,
}
