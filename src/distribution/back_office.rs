//! An in-memory back office implementing every collaborator.
//!
//! Used by the HTTP API and the tests. State can be seeded from a YAML
//! snapshot:
//!
//! ```text
//! fixtures/back_office.yaml
//! ├── artists        # ids, names, hat accounts
//! ├── creations      # contributions and originals
//! ├── parties        # pocket balances, budgets and accounts
//! ├── utilisations   # timestamped uses of creations
//! ├── accounts       # chart of accounts (one of kind revenue)
//! ├── journals       # must contain the transfer journal
//! └── periods        # fiscal periods per company
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::collaborators::{
    AccountingPeriods, DistributionRun, DistributionStore, JournalLookup, PartyLedger, Sequence,
    SequenceService, UtilisationLog,
};
use crate::allocation::ContributionGraph;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Account, AccountId, AccountKind, AccountMove, Allocation, Artist, ArtistId, Creation,
    CreationId, Distribution, Journal, Party, PartyId, Period, Utilisation, UtilisationId,
    UtilisationState,
};

/// Serialized form of an [`InMemoryBackOffice`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackOfficeSnapshot {
    /// Artists with their hat accounts.
    #[serde(default)]
    pub artists: Vec<Artist>,
    /// Creations with contributions.
    #[serde(default)]
    pub creations: Vec<Creation>,
    /// Paying parties.
    #[serde(default)]
    pub parties: Vec<Party>,
    /// Recorded utilisations.
    #[serde(default)]
    pub utilisations: Vec<Utilisation>,
    /// Chart of accounts.
    #[serde(default)]
    pub accounts: Vec<Account>,
    /// Journals.
    #[serde(default)]
    pub journals: Vec<Journal>,
    /// Fiscal periods.
    #[serde(default)]
    pub periods: Vec<Period>,
    /// Committed distributions.
    #[serde(default)]
    pub distributions: Vec<Distribution>,
    /// Committed allocations.
    #[serde(default)]
    pub allocations: Vec<Allocation>,
    /// Committed journal entries.
    #[serde(default)]
    pub moves: Vec<AccountMove>,
}

/// Back office state held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackOffice {
    artists: BTreeMap<ArtistId, Artist>,
    creations: BTreeMap<CreationId, Creation>,
    parties: BTreeMap<PartyId, Party>,
    utilisations: BTreeMap<UtilisationId, Utilisation>,
    accounts: Vec<Account>,
    journals: Vec<Journal>,
    periods: Vec<Period>,
    distributions: Vec<Distribution>,
    allocations: Vec<Allocation>,
    moves: Vec<AccountMove>,
    sequences: BTreeMap<&'static str, u64>,
}

impl InMemoryBackOffice {
    /// Creates an empty back office.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a snapshot from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;
        let snapshot: BackOfficeSnapshot =
            serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
                path: path_str,
                message: e.to_string(),
            })?;

        tracing::debug!(
            path = %path.display(),
            creations = snapshot.creations.len(),
            parties = snapshot.parties.len(),
            utilisations = snapshot.utilisations.len(),
            "Loaded back office snapshot"
        );

        Ok(Self::from(snapshot))
    }

    /// Returns the current state as a snapshot.
    pub fn snapshot(&self) -> BackOfficeSnapshot {
        BackOfficeSnapshot {
            artists: self.artists.values().cloned().collect(),
            creations: self.creations.values().cloned().collect(),
            parties: self.parties.values().cloned().collect(),
            utilisations: self.utilisations.values().cloned().collect(),
            accounts: self.accounts.clone(),
            journals: self.journals.clone(),
            periods: self.periods.clone(),
            distributions: self.distributions.clone(),
            allocations: self.allocations.clone(),
            moves: self.moves.clone(),
        }
    }

    /// Adds or replaces an artist.
    pub fn with_artist(mut self, artist: Artist) -> Self {
        self.artists.insert(artist.id.clone(), artist);
        self
    }

    /// Adds or replaces a creation.
    pub fn with_creation(mut self, creation: Creation) -> Self {
        self.creations.insert(creation.id.clone(), creation);
        self
    }

    /// Adds or replaces a party.
    pub fn with_party(mut self, party: Party) -> Self {
        self.parties.insert(party.id.clone(), party);
        self
    }

    /// Adds or replaces a utilisation.
    pub fn with_utilisation(mut self, utilisation: Utilisation) -> Self {
        self.utilisations.insert(utilisation.id.clone(), utilisation);
        self
    }

    /// Adds an account.
    pub fn with_account(mut self, account: Account) -> Self {
        self.accounts.push(account);
        self
    }

    /// Adds a journal.
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journals.push(journal);
        self
    }

    /// Adds a fiscal period.
    pub fn with_period(mut self, period: Period) -> Self {
        self.periods.push(period);
        self
    }

    /// Looks up a utilisation.
    pub fn utilisation(&self, id: &UtilisationId) -> Option<&Utilisation> {
        self.utilisations.get(id)
    }

    /// All utilisations in id order.
    pub fn utilisations(&self) -> impl Iterator<Item = &Utilisation> {
        self.utilisations.values()
    }

    /// Committed allocations.
    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    /// Committed journal entries.
    pub fn moves(&self) -> &[AccountMove] {
        &self.moves
    }

    /// Mutable access to a party, e.g. to update its pocket balance.
    pub fn party_mut(&mut self, id: &PartyId) -> Option<&mut Party> {
        self.parties.get_mut(id)
    }

    fn reject(message: impl Into<String>) -> EngineError {
        EngineError::CommitRejected {
            message: message.into(),
        }
    }

    fn check_run(&self, run: &DistributionRun) -> EngineResult<()> {
        if self
            .distributions
            .iter()
            .any(|d| d.id == run.distribution.id || d.code == run.distribution.code)
        {
            return Err(Self::reject(format!(
                "distribution '{}' already exists",
                run.distribution.code
            )));
        }

        let mut linked = HashSet::new();
        let mut drawn: BTreeMap<&PartyId, Decimal> = BTreeMap::new();
        for allocation in &run.allocations {
            if allocation.distribution != run.distribution.id {
                return Err(Self::reject(format!(
                    "allocation '{}' belongs to another distribution",
                    allocation.code
                )));
            }
            if !run.distribution.allocations.contains(&allocation.id) {
                return Err(Self::reject(format!(
                    "allocation '{}' is not listed on its distribution",
                    allocation.code
                )));
            }
            *drawn.entry(&allocation.party).or_insert(Decimal::ZERO) += allocation.amount;
        }

        for (party_id, amount) in drawn {
            let party = self
                .parties
                .get(party_id)
                .ok_or_else(|| Self::reject(format!("unknown party '{}'", party_id)))?;
            if amount > party.pocket_balance {
                return Err(Self::reject(format!(
                    "party '{}' would be drawn {} from a pocket holding {}",
                    party_id, amount, party.pocket_balance
                )));
            }
        }

        for (utilisation_id, _) in run.utilisation_links() {
            let utilisation = self.utilisations.get(utilisation_id).ok_or_else(|| {
                Self::reject(format!("unknown utilisation '{}'", utilisation_id))
            })?;
            if !utilisation.is_distributable() {
                return Err(Self::reject(format!(
                    "utilisation '{}' is already {:?}",
                    utilisation_id, utilisation.state
                )));
            }
            if !linked.insert(utilisation_id) {
                return Err(Self::reject(format!(
                    "utilisation '{}' is linked twice",
                    utilisation_id
                )));
            }
        }

        if let Some(unbalanced) = run.moves.iter().find(|m| !m.is_balanced()) {
            return Err(EngineError::UnbalancedMove {
                debit: unbalanced.total_debit(),
                credit: unbalanced.total_credit(),
            });
        }

        Ok(())
    }

    fn set_state(&mut self, id: &UtilisationId, state: UtilisationState) {
        if let Some(utilisation) = self.utilisations.get_mut(id) {
            utilisation.state = state;
        }
    }
}

/// Highest counter among `codes` carrying `prefix`, e.g. 12 for "D-0012".
fn highest_code<'a>(codes: impl Iterator<Item = &'a str>, prefix: &str) -> u64 {
    codes
        .filter_map(|code| code.strip_prefix(prefix)?.strip_prefix('-')?.parse().ok())
        .max()
        .unwrap_or(0)
}

fn sequence_key(sequence: Sequence) -> (&'static str, &'static str, usize) {
    match sequence {
        Sequence::Distribution => ("distribution", "D", 4),
        Sequence::Allocation => ("allocation", "A", 6),
    }
}

impl From<BackOfficeSnapshot> for InMemoryBackOffice {
    fn from(snapshot: BackOfficeSnapshot) -> Self {
        let mut sequences = BTreeMap::new();
        for (sequence, highest) in [
            (
                Sequence::Distribution,
                highest_code(snapshot.distributions.iter().map(|d| d.code.as_str()), "D"),
            ),
            (
                Sequence::Allocation,
                highest_code(snapshot.allocations.iter().map(|a| a.code.as_str()), "A"),
            ),
        ] {
            if highest > 0 {
                sequences.insert(sequence_key(sequence).0, highest);
            }
        }

        Self {
            artists: snapshot
                .artists
                .into_iter()
                .map(|a| (a.id.clone(), a))
                .collect(),
            creations: snapshot
                .creations
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect(),
            parties: snapshot
                .parties
                .into_iter()
                .map(|p| (p.id.clone(), p))
                .collect(),
            utilisations: snapshot
                .utilisations
                .into_iter()
                .map(|u| (u.id.clone(), u))
                .collect(),
            accounts: snapshot.accounts,
            journals: snapshot.journals,
            periods: snapshot.periods,
            distributions: snapshot.distributions,
            allocations: snapshot.allocations,
            moves: snapshot.moves,
            sequences,
        }
    }
}

impl ContributionGraph for InMemoryBackOffice {
    fn creation(&self, id: &CreationId) -> Option<&Creation> {
        self.creations.get(id)
    }
}

impl UtilisationLog for InMemoryBackOffice {
    fn undistributed_between(&self, from: NaiveDateTime, thru: NaiveDateTime) -> Vec<Utilisation> {
        self.utilisations
            .values()
            .filter(|u| u.is_distributable() && u.timestamp >= from && u.timestamp <= thru)
            .cloned()
            .collect()
    }
}

impl PartyLedger for InMemoryBackOffice {
    fn party(&self, id: &PartyId) -> Option<&Party> {
        self.parties.get(id)
    }

    fn hat_account(&self, artist: &ArtistId) -> Option<&AccountId> {
        self.artists
            .get(artist)
            .and_then(|a| a.hat_account.as_ref())
    }

    fn revenue_account(&self) -> Option<&AccountId> {
        self.accounts
            .iter()
            .find(|a| a.kind == AccountKind::Revenue)
            .map(|a| &a.id)
    }
}

impl AccountingPeriods for InMemoryBackOffice {
    fn find_period(&self, company: &PartyId, date: NaiveDate) -> Option<&Period> {
        self.periods
            .iter()
            .find(|p| &p.company == company && p.contains(date))
    }
}

impl JournalLookup for InMemoryBackOffice {
    fn journal_by_code(&self, code: &str) -> Option<&Journal> {
        self.journals.iter().find(|j| j.code == code)
    }
}

impl SequenceService for InMemoryBackOffice {
    fn next_code(&mut self, sequence: Sequence) -> String {
        let (key, prefix, width) = sequence_key(sequence);
        let counter = self.sequences.entry(key).or_insert(0);
        *counter += 1;
        format!("{}-{:0width$}", prefix, *counter, width = width)
    }
}

impl DistributionStore for InMemoryBackOffice {
    fn distributions(&self) -> &[Distribution] {
        &self.distributions
    }

    fn commit(&mut self, run: DistributionRun) -> EngineResult<()> {
        self.check_run(&run)?;

        let links: Vec<(UtilisationId, uuid::Uuid)> = run
            .utilisation_links()
            .map(|(id, allocation)| (id.clone(), allocation))
            .collect();

        for (id, allocation) in &links {
            if let Some(utilisation) = self.utilisations.get_mut(id) {
                utilisation.allocation = Some(*allocation);
                utilisation.state = UtilisationState::Processing;
            }
        }

        for allocation in &run.allocations {
            if let Some(party) = self.parties.get_mut(&allocation.party) {
                party.pocket_balance -= allocation.amount;
            }
        }

        self.distributions.push(run.distribution);
        self.allocations.extend(run.allocations);
        self.moves.extend(run.moves);

        for (id, _) in &links {
            self.set_state(id, UtilisationState::Distributed);
        }

        Ok(())
    }
}
