//! Identifier newtypes for the task domain.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a task record.
    ///
    /// Identifiers order lexicographically by their underlying UUID; that
    /// ordering is the deterministic tie-break used by search sorting and
    /// critical-path selection.
    TaskId
);

uuid_id!(
    /// Unique identifier for the project owning a set of tasks.
    ProjectId
);

uuid_id!(
    /// Unique identifier for a user principal.
    UserId
);

uuid_id!(
    /// Unique identifier for a precedence edge between two tasks.
    DependencyId
);

uuid_id!(
    /// Unique identifier for a task/user assignment record.
    AssignmentId
);
