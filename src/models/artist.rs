//! Artist model.
//!
//! The engine only needs to know where an artist's royalties go: the artist's
//! "hat" account. Solo/group structure and payee validation stay with the
//! external record store.

use serde::{Deserialize, Serialize};

use super::{AccountId, ArtistId, PartyId};

/// An artist that may receive royalty shares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    /// Unique identifier for the artist.
    pub id: ArtistId,
    /// Display name.
    pub name: String,
    /// The party that receives payouts for this artist, if known.
    #[serde(default)]
    pub payee: Option<PartyId>,
    /// The account collecting distributed shares for this artist.
    #[serde(default)]
    pub hat_account: Option<AccountId>,
}

impl Artist {
    /// Creates an artist with a hat account.
    pub fn new(id: impl Into<ArtistId>, name: impl Into<String>, hat_account: AccountId) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            payee: None,
            hat_account: Some(hat_account),
        }
    }
}
