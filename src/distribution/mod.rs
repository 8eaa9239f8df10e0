//! Distribution runs: pocket-to-hats allocation and its journal entries.
//!
//! - [`collaborators`]: the back-office contracts a run depends on
//! - [`orchestrator`]: the run itself
//! - [`posting`]: balanced journal entries per allocation
//! - [`back_office`]: an in-memory implementation of every collaborator

pub mod back_office;
pub mod collaborators;
pub mod orchestrator;
pub mod posting;

pub use back_office::{BackOfficeSnapshot, InMemoryBackOffice};
pub use collaborators::{
    AccountingPeriods, BackOffice, DistributionRun, DistributionStore, JournalLookup, PartyLedger,
    Sequence, SequenceService, UtilisationLog,
};
pub use orchestrator::{DistributionOutcome, DistributionRequest, Distributor};
pub use posting::{MoveHeader, PartyPosting, Posting, build_move, round_to_target};
