//! Domain primitives, rules and services.
//!
//! Purpose: define the identity administration entities, the scoped query
//! model used to read them, and the specification rules that guard their
//! writes. Nothing in here knows about HTTP or SQL.
//!
//! Public surface:
//! - Entities: [`Person`], [`Organisation`], [`Role`], [`RoleAssignment`].
//! - Queries: [`QueryScope`] with typed fields per entity.
//! - Rules: [`Specification`], [`Rule`], [`ValidationPipeline`].
//! - Errors: [`DomainError`] and [`ServiceError`].
//! - Services implementing the driving ports in [`ports`].

pub mod attributes;
pub mod error;
pub mod ids;
pub mod organisation;
pub mod organisation_service;
pub mod person;
pub mod person_service;
pub mod ports;
pub mod query_scope;
pub mod role;
pub mod role_assignment;
pub mod role_assignment_service;
pub mod role_service;
pub mod rules;
pub mod specification;
pub mod validation;

pub use self::attributes::{
    AttributeReason, AttributeRule, AttributeViolation, Constraint, FieldPath,
    validate_attributes,
};
pub use self::error::{DomainError, DomainErrorKind, EntityKind, ServiceError, WriteOperation};
pub use self::ids::{OrganisationId, PersonId, RoleAssignmentId, RoleId};
pub use self::organisation::{
    Organisation, OrganisationCriteria, OrganisationField, OrganisationKind, OrganisationSearch,
};
pub use self::organisation_service::OrganisationService;
pub use self::person::{Person, PersonCriteria, PersonField};
pub use self::person_service::PersonService;
pub use self::query_scope::{Combinator, FilterValue, QueryScope, SortKey, SortOrder};
pub use self::role::{Role, RoleCriteria, RoleField, RoleKind};
pub use self::role_assignment::{
    AssignmentTarget, AssignmentUpdate, RoleAssignment, RoleAssignmentCriteria,
    RoleAssignmentField,
};
pub use self::role_assignment_service::RoleAssignmentService;
pub use self::role_service::RoleService;
pub use self::specification::{Rule, Specification, SpecificationExt};
pub use self::validation::ValidationPipeline;
