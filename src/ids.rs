//! Typed entity identifiers, each wrapping a `Uuid` but newtyped so a
//! `LeagueId` and a `MemberId` can't be swapped by accident at a Store
//! Port call site.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub Uuid);

        impl $name {
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
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

id_newtype!(LeagueId);
id_newtype!(MemberId);
id_newtype!(MatchupId);
id_newtype!(WeeklyScoreId);
id_newtype!(PlayoffId);
id_newtype!(UserId);
