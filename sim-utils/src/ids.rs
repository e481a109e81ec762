//! Stable id newtypes.
//!
//! All ids are opaque strings at the boundary (the entity source, the
//! repository, the event bus all pass ids across process/ffi-ish edges) but
//! are wrapped so a `SceneId` and a `PlayerId` can never be swapped by
//! accident at a call site.

use std::fmt;

macro_rules! string_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Borrows the id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }
    };
}

string_id!(EntityId, "Identifies any entity (player, monster, NPC, item, portal) within a scene.");
string_id!(SceneId, "Identifies a scene aggregate.");
string_id!(PlayerId, "Identifies a player, scoped to a scene or a ranking.");
string_id!(RankId, "Identifies a ranking aggregate.");
