//! Utilisation model.
//!
//! A utilisation is one recorded use of a creation by a paying party. It moves
//! through `not_distributed` -> `processing` -> `distributed` and is linked to
//! exactly one allocation once it enters `processing`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CreationId, PartyId, UtilisationId};

/// Distribution state of a utilisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilisationState {
    /// Newly recorded, not yet part of any distribution.
    #[default]
    NotDistributed,
    /// Linked to an allocation of a distribution in progress.
    Processing,
    /// The distribution finished.
    Distributed,
}

/// One use of one creation by one paying party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utilisation {
    /// Unique identifier for the utilisation.
    pub id: UtilisationId,
    /// Sequential human-readable code.
    #[serde(default)]
    pub code: String,
    /// Point in time of the use.
    pub timestamp: NaiveDateTime,
    /// The party paying for the use.
    pub party: PartyId,
    /// The creation that was used.
    pub creation: CreationId,
    /// The allocation covering this utilisation, once processed.
    #[serde(default)]
    pub allocation: Option<Uuid>,
    /// Distribution state.
    #[serde(default)]
    pub state: UtilisationState,
}

impl Utilisation {
    /// Creates a utilisation in the `not_distributed` state.
    pub fn new(
        id: impl Into<UtilisationId>,
        timestamp: NaiveDateTime,
        party: impl Into<PartyId>,
        creation: impl Into<CreationId>,
    ) -> Self {
        Self {
            id: id.into(),
            code: String::new(),
            timestamp,
            party: party.into(),
            creation: creation.into(),
            allocation: None,
            state: UtilisationState::NotDistributed,
        }
    }

    /// Returns true if the utilisation can still be picked up by a run.
    pub fn is_distributable(&self) -> bool {
        self.state == UtilisationState::NotDistributed
    }
}
