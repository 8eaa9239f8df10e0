//! Ledger models: accounts, journals, periods and journal entries.
//!
//! The engine never updates balances itself. It emits balanced
//! [`AccountMove`]s in `draft` state that the external accounting system
//! posts and derives balances from.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountId, ArtistId, JournalId, PartyId, PeriodId};

/// Classification of a ledger account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// Society revenue (fees, rounding differences).
    Revenue,
    /// A party's pocket.
    Pocket,
    /// An artist's hat.
    Hat,
    /// Anything else in the chart of accounts.
    Other,
}

/// A ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Account classification.
    pub kind: AccountKind,
}

/// An accounting journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    /// Unique identifier.
    pub id: JournalId,
    /// Lookup code (e.g. "TRANS").
    pub code: String,
    /// Display name.
    pub name: String,
}

/// A fiscal period of a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Unique identifier.
    pub id: PeriodId,
    /// The company party owning the period.
    pub company: PartyId,
    /// First day of the period (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the period (inclusive).
    pub end_date: NaiveDate,
}

impl Period {
    /// Returns true if `date` falls inside the period.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// Journal entry state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveState {
    /// Created, not yet posted by accounting.
    #[default]
    Draft,
    /// Posted by accounting.
    Posted,
}

/// What a journal line represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveLineKind {
    /// The society's fee, credited to revenue.
    Fee,
    /// The full amount, debited from the paying party's pocket.
    Pocket,
    /// An artist's share, credited to the artist's hat.
    Hat,
    /// Difference left by rounding shares to currency precision.
    Rounding,
}

/// A single debit or credit line of a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveLine {
    /// What the line represents.
    pub kind: MoveLineKind,
    /// The party the line refers to, if any.
    #[serde(default)]
    pub party: Option<PartyId>,
    /// The artist the line refers to, if any.
    #[serde(default)]
    pub artist: Option<ArtistId>,
    /// The account posted to.
    pub account: AccountId,
    /// Debit amount (zero for credit lines).
    pub debit: Decimal,
    /// Credit amount (zero for debit lines).
    pub credit: Decimal,
}

/// A journal entry: a set of lines whose debits equal their credits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMove {
    /// Unique identifier.
    pub id: Uuid,
    /// The journal the entry belongs to.
    pub journal: JournalId,
    /// The allocation this entry books.
    pub origin: Uuid,
    /// Posting date.
    pub date: NaiveDate,
    /// Accounting period containing `date`.
    pub period: PeriodId,
    /// Entry state.
    #[serde(default)]
    pub state: MoveState,
    /// The lines of the entry.
    pub lines: Vec<MoveLine>,
}

impl AccountMove {
    /// Sum of all debit lines.
    pub fn total_debit(&self) -> Decimal {
        self.lines.iter().map(|l| l.debit).sum()
    }

    /// Sum of all credit lines.
    pub fn total_credit(&self) -> Decimal {
        self.lines.iter().map(|l| l.credit).sum()
    }

    /// Returns true if debits equal credits exactly.
    pub fn is_balanced(&self) -> bool {
        self.total_debit() == self.total_credit()
    }

    /// Lines of the given kind.
    pub fn lines_of(&self, kind: MoveLineKind) -> impl Iterator<Item = &MoveLine> {
        self.lines.iter().filter(move |l| l.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(kind: MoveLineKind, debit: &str, credit: &str) -> MoveLine {
        MoveLine {
            kind,
            party: None,
            artist: None,
            account: AccountId::from("acc"),
            debit: dec(debit),
            credit: dec(credit),
        }
    }

    fn make_move(lines: Vec<MoveLine>) -> AccountMove {
        AccountMove {
            id: Uuid::new_v4(),
            journal: JournalId::from("trans"),
            origin: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2026, 2, 3).unwrap(),
            period: PeriodId::from("2026-02"),
            state: MoveState::Draft,
            lines,
        }
    }

    #[test]
    fn test_balanced_move() {
        let entry = make_move(vec![
            line(MoveLineKind::Pocket, "100.00", "0"),
            line(MoveLineKind::Fee, "0", "10.00"),
            line(MoveLineKind::Hat, "0", "90.00"),
        ]);
        assert_eq!(entry.total_debit(), dec("100.00"));
        assert_eq!(entry.total_credit(), dec("100.00"));
        assert!(entry.is_balanced());
    }

    #[test]
    fn test_unbalanced_move() {
        let entry = make_move(vec![
            line(MoveLineKind::Pocket, "100.00", "0"),
            line(MoveLineKind::Hat, "0", "99.99"),
        ]);
        assert!(!entry.is_balanced());
    }

    #[test]
    fn test_lines_of_filters_by_kind() {
        let entry = make_move(vec![
            line(MoveLineKind::Pocket, "100.00", "0"),
            line(MoveLineKind::Hat, "0", "45.00"),
            line(MoveLineKind::Hat, "0", "55.00"),
        ]);
        assert_eq!(entry.lines_of(MoveLineKind::Hat).count(), 2);
        assert_eq!(entry.lines_of(MoveLineKind::Fee).count(), 0);
    }

    #[test]
    fn test_period_contains_bounds() {
        let period = Period {
            id: PeriodId::from("2026-02"),
            company: PartyId::from("society"),
            start_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
        };
        assert!(period.contains(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()));
        assert!(period.contains(NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()));
        assert!(!period.contains(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()));
    }
}
