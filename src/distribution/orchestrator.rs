//! The distribution run.
//!
//! A run selects every `not_distributed` utilisation inside its window, groups
//! them by paying party, turns each party's payable pocket amount into one
//! pocket-to-hats allocation with a balanced journal entry, and hands the
//! result to the store as a single [`DistributionRun`].
//!
//! Nothing is written until every party has been planned. A failure anywhere
//! leaves the store's records untouched, so a failed run is simply re-invoked
//! once the cause is fixed. Codes are drawn from the sequences before the
//! commit, so a commit the store rejects leaves a gap in the numbering.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::collaborators::{BackOffice, DistributionRun, Sequence};
use super::posting::{MoveHeader, PartyPosting, build_move};
use crate::allocation::{Breakdown, allocate_in_graph};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AccountMove, Allocation, AllocationType, AuditStep, AuditTrace, AuditWarning, Distribution,
    DistributionReport, DistributionTotals, MoveLineKind, PartyId, Utilisation, UtilisationId,
};

/// Run date and inclusive window of a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionRequest {
    /// The run date; journal entries are dated and period-stamped with it.
    pub date: NaiveDate,
    /// First day of the window.
    pub from_date: NaiveDate,
    /// Last day of the window.
    pub thru_date: NaiveDate,
}

impl DistributionRequest {
    /// A run dated `today` covering the whole previous calendar month.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use royalty_engine::distribution::DistributionRequest;
    ///
    /// let today = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
    /// let request = DistributionRequest::for_previous_month(today).unwrap();
    /// assert_eq!(request.from_date, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
    /// assert_eq!(request.thru_date, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
    /// assert_eq!(request.date, today);
    /// ```
    pub fn for_previous_month(today: NaiveDate) -> EngineResult<Self> {
        let thru_date = today
            .with_day(1)
            .and_then(|first| first.pred_opt())
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("no previous month before {}", today),
            })?;
        let from_date = thru_date
            .with_day(1)
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("no first day for {}", thru_date),
            })?;

        Ok(Self {
            date: today,
            from_date,
            thru_date,
        })
    }

    /// Checks that the window is not inverted.
    pub fn validate(&self) -> EngineResult<()> {
        if self.from_date > self.thru_date {
            return Err(EngineError::InvalidWindow {
                from_date: self.from_date,
                thru_date: self.thru_date,
            });
        }
        Ok(())
    }

    /// The window as timestamps, from midnight of `from_date` through the last
    /// instant of `thru_date`.
    pub fn bounds(&self) -> EngineResult<(NaiveDateTime, NaiveDateTime)> {
        let end_of_day = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).ok_or_else(|| {
            EngineError::CalculationError {
                message: "invalid end-of-day time".to_string(),
            }
        })?;
        Ok((
            self.from_date.and_time(NaiveTime::MIN),
            self.thru_date.and_time(end_of_day),
        ))
    }
}

/// The result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistributionOutcome {
    /// No eligible utilisation in the window; nothing was written.
    NothingToDistribute,
    /// A distribution was committed.
    Distributed(Box<DistributionReport>),
}

/// One party's planned allocation, before codes are assigned.
struct PartyPlan {
    allocation_id: Uuid,
    party: PartyId,
    amount: Decimal,
    fee: Decimal,
    share_amount: Decimal,
    hat_total: Decimal,
    rounding: Decimal,
    utilisations: Vec<UtilisationId>,
    account_move: AccountMove,
}

/// Runs distributions against a back office.
///
/// # Example
///
/// ```no_run
/// use chrono::Utc;
/// use royalty_engine::config::ConfigLoader;
/// use royalty_engine::distribution::{
///     DistributionOutcome, DistributionRequest, Distributor, InMemoryBackOffice,
/// };
///
/// let config = ConfigLoader::load("./config/default")?;
/// let mut office = InMemoryBackOffice::load("./fixtures/back_office.yaml")?;
/// let request = DistributionRequest::for_previous_month(Utc::now().date_naive())?;
///
/// match Distributor::new(config.config()).run(&mut office, &request)? {
///     DistributionOutcome::NothingToDistribute => println!("nothing to do"),
///     DistributionOutcome::Distributed(report) => {
///         println!("{} allocations", report.allocations.len())
///     }
/// }
/// # Ok::<(), royalty_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Distributor<'a> {
    config: &'a EngineConfig,
}

impl<'a> Distributor<'a> {
    /// Creates a distributor using `config`.
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Performs one distribution run.
    ///
    /// Returns [`DistributionOutcome::NothingToDistribute`] without writing
    /// anything when the window holds no `not_distributed` utilisation.
    /// Parties whose payable amount is zero or negative are skipped with a
    /// warning and their utilisations stay `not_distributed`.
    ///
    /// # Errors
    ///
    /// Any error aborts the run before the store is touched:
    /// - [`EngineError::InvalidWindow`] for an inverted window
    /// - [`EngineError::OverlappingDistribution`] when overlap checks are on
    /// - [`EngineError::JournalNotFound`], [`EngineError::PeriodNotFound`] and
    ///   [`EngineError::MissingAccount`] for incomplete ledger setup
    /// - [`EngineError::PartyNotFound`] and [`EngineError::CreationNotFound`]
    ///   for dangling utilisation references
    /// - whatever the store's commit reports
    pub fn run<S: BackOffice + ?Sized>(
        &self,
        store: &mut S,
        request: &DistributionRequest,
    ) -> EngineResult<DistributionOutcome> {
        let start_time = Instant::now();
        request.validate()?;
        let society = self.config.society();
        let company = self.config.company();

        if society.reject_overlapping_windows {
            if let Some(existing) = store
                .distributions()
                .iter()
                .find(|d| d.overlaps(request.from_date, request.thru_date))
            {
                return Err(EngineError::OverlappingDistribution {
                    code: existing.code.clone(),
                    from_date: existing.from_date,
                    thru_date: existing.thru_date,
                });
            }
        }

        let (from, thru) = request.bounds()?;
        let selected = store.undistributed_between(from, thru);
        if selected.is_empty() {
            info!(
                from_date = %request.from_date,
                thru_date = %request.thru_date,
                "No utilisations to distribute"
            );
            return Ok(DistributionOutcome::NothingToDistribute);
        }

        let journal = store
            .journal_by_code(&society.transfer_journal)
            .ok_or_else(|| EngineError::JournalNotFound {
                code: society.transfer_journal.clone(),
            })?;
        let period = store
            .find_period(&company.party, request.date)
            .ok_or_else(|| EngineError::PeriodNotFound {
                company: company.party.to_string(),
                date: request.date,
            })?;
        let header = MoveHeader {
            journal: journal.id.clone(),
            period: period.id.clone(),
            date: request.date,
        };
        let revenue_account = store
            .revenue_account()
            .cloned()
            .ok_or_else(|| EngineError::MissingAccount {
                kind: "revenue".to_string(),
                owner: company.party.to_string(),
            })?;

        info!(
            from_date = %request.from_date,
            thru_date = %request.thru_date,
            utilisations = selected.len(),
            "Starting distribution run"
        );

        let mut by_party: BTreeMap<&PartyId, Vec<&Utilisation>> = BTreeMap::new();
        for utilisation in &selected {
            by_party
                .entry(&utilisation.party)
                .or_default()
                .push(utilisation);
        }

        let currency = &company.currency;
        let mut plans: Vec<PartyPlan> = Vec::with_capacity(by_party.len());
        let mut steps: Vec<AuditStep> = Vec::new();
        let mut warnings: Vec<AuditWarning> = Vec::new();
        let mut skipped: Vec<UtilisationId> = Vec::new();

        for (party_id, utilisations) in by_party {
            let party = store
                .party(party_id)
                .ok_or_else(|| EngineError::PartyNotFound {
                    id: party_id.to_string(),
                })?;

            let amount = currency.round(party.payable_amount());
            if amount <= Decimal::ZERO {
                warn!(
                    party = %party_id,
                    pocket_balance = %party.pocket_balance,
                    utilisations = utilisations.len(),
                    "Skipping party with nothing to pay"
                );
                warnings.push(AuditWarning {
                    code: "PARTY_SKIPPED".to_string(),
                    message: format!(
                        "Party '{}' has a payable amount of {}; {} utilisation(s) left for a later run",
                        party_id,
                        amount,
                        utilisations.len()
                    ),
                    severity: "low".to_string(),
                });
                skipped.extend(utilisations.iter().map(|u| u.id.clone()));
                continue;
            }

            let pocket_account = store.pocket_account(party_id)?;
            let fee = currency.round(amount * society.fee_percent / Decimal::ONE_HUNDRED);
            let count = Decimal::from(utilisations.len());
            let share_amount = currency.round((amount - fee) / count);

            let mut breakdowns: Vec<Breakdown> = Vec::with_capacity(utilisations.len());
            for utilisation in &utilisations {
                let creation = store.creation(&utilisation.creation).ok_or_else(|| {
                    EngineError::CreationNotFound {
                        id: utilisation.creation.to_string(),
                    }
                })?;
                breakdowns.push(allocate_in_graph(
                    &*store,
                    self.config.rules(),
                    creation,
                    share_amount,
                )?);
            }

            let allocation_id = Uuid::new_v4();
            let posting = build_move(
                &*store,
                currency,
                &header,
                &PartyPosting {
                    allocation: allocation_id,
                    party: party_id,
                    pocket_account,
                    revenue_account: &revenue_account,
                    amount,
                    fee,
                    breakdowns: &breakdowns,
                },
            )?;

            debug!(
                party = %party_id,
                amount = %amount,
                fee = %fee,
                share_amount = %share_amount,
                hat_total = %posting.hat_total,
                rounding = %posting.rounding,
                "Planned allocation"
            );

            steps.push(AuditStep {
                step_number: steps.len() as u32 + 1,
                rule_id: "pocket_to_hats".to_string(),
                rule_name: "Pocket to Hats Allocation".to_string(),
                input: serde_json::json!({
                    "party": party_id,
                    "pocket_balance": party.pocket_balance.to_string(),
                    "pocket_budget": party.pocket_budget.map(|b| b.to_string()),
                    "utilisations": utilisations.len(),
                    "fee_percent": society.fee_percent.to_string()
                }),
                output: serde_json::json!({
                    "amount": amount.to_string(),
                    "fee": fee.to_string(),
                    "share_amount": share_amount.to_string(),
                    "hat_total": posting.hat_total.to_string(),
                    "rounding": posting.rounding.to_string(),
                    "hat_lines": posting.account_move.lines_of(MoveLineKind::Hat).count()
                }),
                reasoning: format!(
                    "{} - {}% fee ({}) = {} over {} utilisation(s) = {} each",
                    amount,
                    society.fee_percent.normalize(),
                    fee,
                    amount - fee,
                    utilisations.len(),
                    share_amount
                ),
            });

            plans.push(PartyPlan {
                allocation_id,
                party: party_id.clone(),
                amount,
                fee,
                share_amount,
                hat_total: posting.hat_total,
                rounding: posting.rounding,
                utilisations: utilisations.iter().map(|u| u.id.clone()).collect(),
                account_move: posting.account_move,
            });
        }

        let distribution_id = Uuid::new_v4();
        let distribution_code = store.next_code(Sequence::Distribution);

        let mut totals = DistributionTotals {
            allocated: Decimal::ZERO,
            fees: Decimal::ZERO,
            distributed: Decimal::ZERO,
            rounding: Decimal::ZERO,
        };
        let mut allocations: Vec<Allocation> = Vec::with_capacity(plans.len());
        let mut moves: Vec<AccountMove> = Vec::with_capacity(plans.len());
        for plan in plans {
            totals.allocated += plan.amount;
            totals.fees += plan.fee;
            totals.distributed += plan.hat_total;
            totals.rounding += plan.rounding;

            allocations.push(Allocation {
                id: plan.allocation_id,
                code: store.next_code(Sequence::Allocation),
                distribution: distribution_id,
                allocation_type: AllocationType::PocketToHats,
                party: plan.party,
                amount: plan.amount,
                share_amount: plan.share_amount,
                utilisations: plan.utilisations,
            });
            moves.push(plan.account_move);
        }

        let distribution = Distribution {
            id: distribution_id,
            code: distribution_code,
            date: request.date,
            from_date: request.from_date,
            thru_date: request.thru_date,
            allocations: allocations.iter().map(|a| a.id).collect(),
        };

        store.commit(DistributionRun {
            distribution: distribution.clone(),
            allocations: allocations.clone(),
            moves: moves.clone(),
        })?;

        let duration = start_time.elapsed();
        let report = DistributionReport {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            distribution,
            allocations,
            moves,
            skipped_utilisations: skipped,
            totals,
            audit_trace: AuditTrace {
                steps,
                warnings,
                duration_us: duration.as_micros() as u64,
            },
        };

        info!(
            distribution = %report.distribution.code,
            allocations = report.allocations.len(),
            distributed = report.distributed_count(),
            skipped = report.skipped_utilisations.len(),
            allocated = %report.totals.allocated,
            fees = %report.totals.fees,
            duration_us = duration.as_micros(),
            "Distribution committed"
        );

        Ok(DistributionOutcome::Distributed(Box::new(report)))
    }
}
