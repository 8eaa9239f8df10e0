//! Core data models for the royalty distribution engine.
//!
//! This module contains the read model the engine borrows from the back office
//! (artists, creations, parties, utilisations, ledger) and the records a
//! distribution run produces.

mod artist;
mod creation;
mod distribution;
mod distribution_report;
mod ids;
mod ledger;
mod party;
mod utilisation;

pub use artist::Artist;
pub use creation::{
    Contribution, ContributionType, Creation, DerivativeType, OriginalLink, PerformanceKind,
};
pub use distribution::{Allocation, AllocationType, Distribution};
pub use distribution_report::{
    AuditStep, AuditTrace, AuditWarning, DistributionReport, DistributionTotals,
};
pub use ids::{AccountId, ArtistId, CreationId, JournalId, PartyId, PeriodId, UtilisationId};
pub use ledger::{
    Account, AccountKind, AccountMove, Journal, MoveLine, MoveLineKind, MoveState, Period,
};
pub use party::{Company, Party};
pub use utilisation::{Utilisation, UtilisationState};
