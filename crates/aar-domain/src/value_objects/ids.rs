//! Stable opaque identifiers for domain entities.
//!
//! Each ID wraps a [`uuid::Uuid`] in a distinct newtype so the compiler
//! rejects accidentally passing a `ReportId` where a `ProjectId` is expected.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Identifies a `Project`.
    ProjectId
);
define_id!(
    /// Identifies a `FileRecord`'s owning project is implicit; this IDs the record itself.
    FileRecordId
);
define_id!(
    /// Identifies a `Chunk`.
    ChunkId
);
define_id!(
    /// Identifies a `Finding`.
    FindingId
);
define_id!(
    /// Identifies a `Report`.
    ReportId
);
define_id!(
    /// Identifies an `ApiKey`.
    ApiKeyId
);
define_id!(
    /// Identifies an owner/tenant (the entity a submission is attributed to).
    OwnerId
);
