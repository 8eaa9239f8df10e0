//! Opaque identifiers for back-office records.
//!
//! Identifiers are string newtypes so they can carry whatever key the external
//! record store uses while still being distinct types at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from any string-like value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifies an artist (solo or group).
    ArtistId
);
string_id!(
    /// Identifies a creation.
    CreationId
);
string_id!(
    /// Identifies a party (utiliser, company, payee).
    PartyId
);
string_id!(
    /// Identifies a utilisation record.
    UtilisationId
);
string_id!(
    /// Identifies a ledger account.
    AccountId
);
string_id!(
    /// Identifies an accounting journal.
    JournalId
);
string_id!(
    /// Identifies an accounting period.
    PeriodId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = ArtistId::from("artist_001");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"artist_001\"");

        let back: ArtistId = serde_json::from_str("\"artist_001\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_ids_order_lexicographically() {
        let mut ids = vec![PartyId::from("b"), PartyId::from("a"), PartyId::from("c")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "a");
        assert_eq!(ids[2].to_string(), "c");
    }
}
