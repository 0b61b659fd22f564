//! Strongly typed entity identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::query_scope::FilterValue;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parse the canonical hyphenated form.
            pub fn parse(raw: &str) -> Result<Self, uuid::Error> {
                Uuid::parse_str(raw).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<$name> for FilterValue {
            fn from(value: $name) -> Self {
                FilterValue::Uuid(value.0)
            }
        }
    };
}

define_id!(
    /// Identifier of a [`crate::domain::Person`].
    PersonId
);
define_id!(
    /// Identifier of a [`crate::domain::Organisation`].
    OrganisationId
);
define_id!(
    /// Identifier of a [`crate::domain::Role`].
    RoleId
);
define_id!(
    /// Identifier of a [`crate::domain::RoleAssignment`].
    RoleAssignmentId
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parse_round_trips_display() {
        let id = PersonId::random();
        assert_eq!(PersonId::parse(&id.to_string()).ok(), Some(id));
    }

    #[rstest]
    fn parse_rejects_garbage() {
        assert!(OrganisationId::parse("not-a-uuid").is_err());
    }

    #[rstest]
    fn converts_into_uuid_filter_value() {
        let id = RoleId::random();
        assert_eq!(FilterValue::from(id), FilterValue::Uuid(*id.as_uuid()));
    }
}
