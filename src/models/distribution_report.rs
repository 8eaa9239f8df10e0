//! Distribution report models.
//!
//! This module contains the [`DistributionReport`] type and its audit trace,
//! capturing everything a distribution run produced: the distribution record,
//! its allocations, the journal entries, and the reasoning behind each party's
//! numbers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountMove, Allocation, Distribution, UtilisationId};

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during a run.
///
/// Warnings flag conditions that don't abort the run but may need attention,
/// such as a party skipped because its pocket is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a run.
///
/// # Example
///
/// ```
/// use royalty_engine::models::AuditTrace;
///
/// let trace = AuditTrace {
///     steps: vec![],
///     warnings: vec![],
///     duration_us: 1234,
/// };
/// assert!(trace.steps.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during the run.
    pub warnings: Vec<AuditWarning>,
    /// The total run duration in microseconds.
    pub duration_us: u64,
}

/// Aggregated totals over all allocations of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionTotals {
    /// Total taken from pockets.
    pub allocated: Decimal,
    /// Total credited to the society as fees.
    pub fees: Decimal,
    /// Total credited to artists' hats.
    pub distributed: Decimal,
    /// Total booked as rounding difference (may be negative).
    pub rounding: Decimal,
}

/// The complete result of a distribution run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionReport {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// When the run was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the run.
    pub engine_version: String,
    /// The distribution record created by the run.
    pub distribution: Distribution,
    /// One allocation per processed party.
    pub allocations: Vec<Allocation>,
    /// One balanced journal entry per allocation.
    pub moves: Vec<AccountMove>,
    /// Utilisations left untouched because their party had nothing to pay.
    pub skipped_utilisations: Vec<UtilisationId>,
    /// Aggregated totals.
    pub totals: DistributionTotals,
    /// Complete audit trace of the run.
    pub audit_trace: AuditTrace,
}

impl DistributionReport {
    /// Number of utilisations linked to an allocation in this run.
    pub fn distributed_count(&self) -> usize {
        self.allocations.iter().map(|a| a.utilisations.len()).sum()
    }
}
