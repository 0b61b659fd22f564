//! Diesel table definitions for the identity schema.
//!
//! These definitions must match `backend/migrations` exactly. Enumerated
//! kinds are stored as their SchulConnex text codes.

diesel::table! {
    /// Natural persons. `referrer` is unique when present.
    persons (id) {
        id -> Uuid,
        referrer -> Nullable<Varchar>,
        given_name -> Varchar,
        family_name -> Varchar,
        revision -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Organisation tree nodes (schools, classes, carriers, ...).
    organisations (id) {
        id -> Uuid,
        administered_by -> Nullable<Uuid>,
        belongs_to -> Nullable<Uuid>,
        identifier -> Nullable<Varchar>,
        name -> Nullable<Varchar>,
        kind -> Varchar,
        revision -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Roles offered by an administering organisation.
    roles (id) {
        id -> Uuid,
        name -> Varchar,
        administered_by -> Uuid,
        kind -> Varchar,
        revision -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Person/organisation/role triples (Personenkontexte).
    role_assignments (id) {
        id -> Uuid,
        person_id -> Uuid,
        organisation_id -> Uuid,
        role_id -> Uuid,
        revision -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(roles -> organisations (administered_by));
diesel::joinable!(role_assignments -> persons (person_id));
diesel::joinable!(role_assignments -> roles (role_id));

diesel::allow_tables_to_appear_in_same_query!(persons, organisations, roles, role_assignments);
