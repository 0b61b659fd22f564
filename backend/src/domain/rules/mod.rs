//! Concrete business rules.
//!
//! Each rule documents what it treats as satisfied when the data it needs
//! is missing. Lookups that fail at the storage level are returned as
//! errors and never counted as a verdict.

mod assignment;
mod organisation;

pub use assignment::{
    ClassTargetsKeepParentSchool, ExpectedAssignmentCount, NoClassAssignmentDependsOn,
    OnlyLearnersAndTeachersAtClass, RoleAssignableAtOrganisation, SameRoleAtParentSchool,
};
pub use organisation::{ClassAdministeredBySchool, ClassNameRequired, ClassNameUniqueAtSchool};

use crate::domain::error::EntityKind;

/// Identifies which rule rejected a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Violation {
    ClassNameRequired,
    ClassAdministeredBySchool,
    ClassNameUniqueAtSchool,
    SameRoleAtParentSchool,
    OnlyLearnersAndTeachersAtClass,
    RoleAssignableAtOrganisation,
    ExpectedAssignmentCount,
}

impl Violation {
    /// Stable code used in logs and error details.
    pub const fn code(self) -> &'static str {
        match self {
            Self::ClassNameRequired => "CLASS_NAME_REQUIRED",
            Self::ClassAdministeredBySchool => "CLASS_ADMINISTERED_BY_SCHOOL",
            Self::ClassNameUniqueAtSchool => "CLASS_NAME_UNIQUE_AT_SCHOOL",
            Self::SameRoleAtParentSchool => "SAME_ROLE_AT_PARENT_SCHOOL",
            Self::OnlyLearnersAndTeachersAtClass => "ONLY_LEARNERS_AND_TEACHERS_AT_CLASS",
            Self::RoleAssignableAtOrganisation => "ROLE_ASSIGNABLE_AT_ORGANISATION",
            Self::ExpectedAssignmentCount => "EXPECTED_ASSIGNMENT_COUNT",
        }
    }

    /// Entity the rule guards.
    pub const fn entity(self) -> EntityKind {
        match self {
            Self::ClassNameRequired
            | Self::ClassAdministeredBySchool
            | Self::ClassNameUniqueAtSchool => EntityKind::Organisation,
            Self::SameRoleAtParentSchool
            | Self::OnlyLearnersAndTeachersAtClass
            | Self::RoleAssignableAtOrganisation
            | Self::ExpectedAssignmentCount => EntityKind::RoleAssignment,
        }
    }
}
