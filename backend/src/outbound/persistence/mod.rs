//! PostgreSQL persistence adapters using Diesel.
//!
//! Each repository implements the generic `Repository<E>` port for one
//! entity. Lookups and writes go through the Diesel DSL; scoped reads are
//! rendered to parameterised SQL by [`scope_sql`] so arbitrary filter groups
//! and sort keys run in one round trip plus a count.
//!
//! Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module.
//!
//! # Example
//!
//! ```ignore
//! use iam_backend::outbound::persistence::{DbPool, DieselPersonRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/iam")).await?;
//! let persons = DieselPersonRepository::new(pool);
//! ```

pub(crate) mod diesel_helpers;
mod diesel_organisation_repository;
mod diesel_person_repository;
mod diesel_role_assignment_repository;
mod diesel_role_repository;
mod migrations;
mod models;
mod pool;
mod schema;
mod scope_sql;

pub use diesel_organisation_repository::DieselOrganisationRepository;
pub use diesel_person_repository::DieselPersonRepository;
pub use diesel_role_assignment_repository::DieselRoleAssignmentRepository;
pub use diesel_role_repository::DieselRoleRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
