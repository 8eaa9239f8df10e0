//! Contracts of the back-office services a distribution run reads from and
//! writes to.
//!
//! The orchestrator never talks to a database directly. Everything it needs is
//! expressed as one of the traits below, and [`BackOffice`] bundles them for
//! stores that provide all of them at once.

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::allocation::ContributionGraph;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AccountId, AccountMove, Allocation, ArtistId, Distribution, Journal, Party, PartyId, Period,
    Utilisation, UtilisationId,
};

/// Read access to recorded utilisations.
pub trait UtilisationLog {
    /// Utilisations in state `not_distributed` with a timestamp inside
    /// `from..=thru`.
    fn undistributed_between(&self, from: NaiveDateTime, thru: NaiveDateTime) -> Vec<Utilisation>;
}

/// Read access to party pockets, artist hats and the society's revenue account.
pub trait PartyLedger {
    /// Looks up a party.
    fn party(&self, id: &PartyId) -> Option<&Party>;

    /// The hat account of an artist, if one is set up.
    fn hat_account(&self, artist: &ArtistId) -> Option<&AccountId>;

    /// The society's revenue account.
    fn revenue_account(&self) -> Option<&AccountId>;

    /// The pocket account of `party`.
    ///
    /// # Errors
    ///
    /// [`EngineError::PartyNotFound`] for an unknown party,
    /// [`EngineError::MissingAccount`] if it has no pocket.
    fn pocket_account(&self, party: &PartyId) -> EngineResult<&AccountId> {
        let found = self.party(party).ok_or_else(|| EngineError::PartyNotFound {
            id: party.to_string(),
        })?;
        found
            .pocket_account
            .as_ref()
            .ok_or_else(|| EngineError::MissingAccount {
                kind: "pocket".to_string(),
                owner: party.to_string(),
            })
    }
}

/// Resolves the fiscal period enclosing a date.
pub trait AccountingPeriods {
    /// The period of `company` containing `date`.
    fn find_period(&self, company: &PartyId, date: NaiveDate) -> Option<&Period>;
}

/// Resolves journals by code.
pub trait JournalLookup {
    /// The journal with the given code.
    fn journal_by_code(&self, code: &str) -> Option<&Journal>;
}

/// Record kinds that receive a human-readable code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sequence {
    /// Distribution codes.
    Distribution,
    /// Allocation codes.
    Allocation,
}

/// Issues unique human-readable codes.
pub trait SequenceService {
    /// The next unused code of `sequence`.
    fn next_code(&mut self, sequence: Sequence) -> String;
}

/// Everything a successful run writes, handed over in one piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionRun {
    /// The new distribution.
    pub distribution: Distribution,
    /// Its allocations, one per processed party.
    pub allocations: Vec<Allocation>,
    /// One journal entry per allocation.
    pub moves: Vec<AccountMove>,
}

impl DistributionRun {
    /// Every utilisation covered by the run, paired with its allocation id.
    pub fn utilisation_links(&self) -> impl Iterator<Item = (&UtilisationId, Uuid)> {
        self.allocations
            .iter()
            .flat_map(|allocation| allocation.utilisations.iter().map(|u| (u, allocation.id)))
    }
}

/// Persistence of distribution runs.
pub trait DistributionStore {
    /// Previously committed distributions.
    fn distributions(&self) -> &[Distribution];

    /// Persists a run atomically.
    ///
    /// Implementations must either apply the whole run or nothing. Utilisations
    /// are first linked to their allocation in state `processing`; only after
    /// every link is written are they flipped to `distributed`.
    ///
    /// # Errors
    ///
    /// [`EngineError::CommitRejected`] if the run conflicts with stored data.
    fn commit(&mut self, run: DistributionRun) -> EngineResult<()>;
}

/// A store providing every collaborator a distribution run needs.
pub trait BackOffice:
    UtilisationLog
    + PartyLedger
    + AccountingPeriods
    + JournalLookup
    + SequenceService
    + DistributionStore
    + ContributionGraph
{
}

impl<T> BackOffice for T where
    T: UtilisationLog
        + PartyLedger
        + AccountingPeriods
        + JournalLookup
        + SequenceService
        + DistributionStore
        + ContributionGraph
{
}
