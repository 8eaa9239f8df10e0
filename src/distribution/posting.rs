//! Journal entries for pocket-to-hats allocations.
//!
//! One balanced entry is built per allocation:
//!
//! | line     | account          | debit    | credit          |
//! |----------|------------------|----------|-----------------|
//! | pocket   | party's pocket   | `amount` |                 |
//! | fee      | society revenue  |          | `fee`           |
//! | hat      | each artist's hat|          | rounded share   |
//! | rounding | society revenue  | residual if negative | residual if positive |
//!
//! Hat credits are merged per artist across all of the party's utilisations
//! before rounding, and the rounding pass keeps their sum at exactly the
//! rounded breakdown total.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::collaborators::PartyLedger;
use crate::allocation::Breakdown;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AccountId, AccountMove, ArtistId, JournalId, MoveLine, MoveLineKind, MoveState, PartyId,
    PeriodId,
};
use crate::rounding::Currency;

/// Where and when an entry is posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveHeader {
    /// The transfer journal.
    pub journal: JournalId,
    /// The accounting period containing `date`.
    pub period: PeriodId,
    /// Posting date (the run date).
    pub date: NaiveDate,
}

/// The amounts of one party's allocation.
#[derive(Debug, Clone)]
pub struct PartyPosting<'a> {
    /// The allocation the entry originates from.
    pub allocation: Uuid,
    /// The paying party.
    pub party: &'a PartyId,
    /// The party's pocket account.
    pub pocket_account: &'a AccountId,
    /// The society's revenue account.
    pub revenue_account: &'a AccountId,
    /// Full amount taken from the pocket.
    pub amount: Decimal,
    /// The society's fee.
    pub fee: Decimal,
    /// One breakdown per utilisation, each over the share amount.
    pub breakdowns: &'a [Breakdown],
}

/// A built entry and the figures derived while building it.
#[derive(Debug, Clone)]
pub struct Posting {
    /// The balanced journal entry.
    pub account_move: AccountMove,
    /// Sum of all hat credits.
    pub hat_total: Decimal,
    /// `amount - fee - hat_total`, booked on the revenue account.
    pub rounding: Decimal,
}

/// Builds the journal entry for one party's allocation.
///
/// # Errors
///
/// - [`EngineError::MissingAccount`] if an artist in the breakdowns has no hat
/// - [`EngineError::UnbalancedMove`] if debits and credits differ
pub fn build_move<L: PartyLedger + ?Sized>(
    ledger: &L,
    currency: &Currency,
    header: &MoveHeader,
    entry: &PartyPosting<'_>,
) -> EngineResult<Posting> {
    let mut merged = Breakdown::new();
    for breakdown in entry.breakdowns {
        merged.merge(breakdown);
    }
    let target = currency.round(merged.total());
    let hats = round_to_target(&merged, target, currency);

    let mut lines = Vec::with_capacity(hats.len() + 3);
    lines.push(MoveLine {
        kind: MoveLineKind::Pocket,
        party: Some(entry.party.clone()),
        artist: None,
        account: entry.pocket_account.clone(),
        debit: entry.amount,
        credit: Decimal::ZERO,
    });
    lines.push(MoveLine {
        kind: MoveLineKind::Fee,
        party: None,
        artist: None,
        account: entry.revenue_account.clone(),
        debit: Decimal::ZERO,
        credit: entry.fee,
    });

    let mut hat_total = Decimal::ZERO;
    for (artist, amount) in hats {
        let account = ledger
            .hat_account(&artist)
            .ok_or_else(|| EngineError::MissingAccount {
                kind: "hat".to_string(),
                owner: artist.to_string(),
            })?;
        if amount.is_zero() {
            continue;
        }
        hat_total += amount;
        lines.push(MoveLine {
            kind: MoveLineKind::Hat,
            party: None,
            artist: Some(artist),
            account: account.clone(),
            debit: Decimal::ZERO,
            credit: amount,
        });
    }

    let rounding = entry.amount - entry.fee - hat_total;
    if !rounding.is_zero() {
        let (debit, credit) = if rounding.is_sign_positive() {
            (Decimal::ZERO, rounding)
        } else {
            (-rounding, Decimal::ZERO)
        };
        lines.push(MoveLine {
            kind: MoveLineKind::Rounding,
            party: None,
            artist: None,
            account: entry.revenue_account.clone(),
            debit,
            credit,
        });
    }

    let account_move = AccountMove {
        id: Uuid::new_v4(),
        journal: header.journal.clone(),
        origin: entry.allocation,
        date: header.date,
        period: header.period.clone(),
        state: MoveState::Draft,
        lines,
    };

    if !account_move.is_balanced() {
        return Err(EngineError::UnbalancedMove {
            debit: account_move.total_debit(),
            credit: account_move.total_credit(),
        });
    }

    Ok(Posting {
        account_move,
        hat_total,
        rounding,
    })
}

/// Rounds every amount of `breakdown` to currency precision so that the
/// rounded amounts add up to `target`.
///
/// Amounts are first truncated; the missing minor units then go one each to
/// the artists with the largest truncated-off remainders, ties broken by
/// artist order.
pub fn round_to_target(
    breakdown: &Breakdown,
    target: Decimal,
    currency: &Currency,
) -> Vec<(ArtistId, Decimal)> {
    let unit = currency.minor_unit();
    let mut rounded: Vec<(ArtistId, Decimal, Decimal)> = breakdown
        .iter()
        .map(|(artist, amount)| {
            let floor = currency.truncate(*amount);
            (artist.clone(), floor, *amount - floor)
        })
        .collect();

    let mut assigned: Decimal = rounded.iter().map(|(_, floor, _)| *floor).sum();
    let mut order: Vec<usize> = (0..rounded.len()).collect();
    order.sort_by(|&a, &b| rounded[b].2.cmp(&rounded[a].2));

    for index in order {
        if assigned >= target {
            break;
        }
        rounded[index].1 += unit;
        assigned += unit;
    }

    rounded
        .into_iter()
        .map(|(artist, amount, _)| (artist, amount))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Party;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    struct Hats(HashMap<ArtistId, AccountId>);

    impl PartyLedger for Hats {
        fn party(&self, _id: &PartyId) -> Option<&Party> {
            None
        }

        fn hat_account(&self, artist: &ArtistId) -> Option<&AccountId> {
            self.0.get(artist)
        }

        fn revenue_account(&self) -> Option<&AccountId> {
            None
        }
    }

    fn hats(artists: &[&str]) -> Hats {
        Hats(
            artists
                .iter()
                .map(|a| (ArtistId::from(*a), AccountId::from(format!("hat_{}", a))))
                .collect(),
        )
    }

    fn header() -> MoveHeader {
        MoveHeader {
            journal: JournalId::from("trans"),
            period: PeriodId::from("2026-02"),
            date: NaiveDate::from_ymd_opt(2026, 2, 3).unwrap(),
        }
    }

    fn eur() -> Currency {
        Currency::new("EUR", 2)
    }

    fn breakdown(entries: &[(&str, &str)]) -> Breakdown {
        entries
            .iter()
            .map(|(a, v)| (ArtistId::from(*a), dec(v)))
            .collect()
    }

    fn post(
        ledger: &Hats,
        amount: &str,
        fee: &str,
        breakdowns: &[Breakdown],
    ) -> EngineResult<Posting> {
        let party = PartyId::from("club");
        let pocket = AccountId::from("pocket_club");
        let revenue = AccountId::from("revenue");
        build_move(
            ledger,
            &eur(),
            &header(),
            &PartyPosting {
                allocation: Uuid::new_v4(),
                party: &party,
                pocket_account: &pocket,
                revenue_account: &revenue,
                amount: dec(amount),
                fee: dec(fee),
                breakdowns,
            },
        )
    }

    /// PO-001: one utilisation, composer and texter
    #[test]
    fn test_simple_entry_balances() {
        let posting = post(
            &hats(&["comp", "text"]),
            "100.00",
            "10.00",
            &[breakdown(&[("comp", "58.5"), ("text", "31.5")])],
        )
        .unwrap();

        let entry = &posting.account_move;
        assert!(entry.is_balanced());
        assert_eq!(entry.total_debit(), dec("100.00"));
        assert_eq!(posting.hat_total, dec("90.00"));
        assert_eq!(posting.rounding, Decimal::ZERO);
        assert_eq!(entry.lines_of(MoveLineKind::Hat).count(), 2);
        assert_eq!(entry.lines_of(MoveLineKind::Rounding).count(), 0);
        assert_eq!(entry.state, MoveState::Draft);
    }

    /// PO-002: same artist across utilisations gets one line
    #[test]
    fn test_hats_merged_per_artist() {
        let posting = post(
            &hats(&["comp"]),
            "20.00",
            "2.00",
            &[breakdown(&[("comp", "9")]), breakdown(&[("comp", "9")])],
        )
        .unwrap();

        let hat_lines: Vec<_> = posting.account_move.lines_of(MoveLineKind::Hat).collect();
        assert_eq!(hat_lines.len(), 1);
        assert_eq!(hat_lines[0].credit, dec("18.00"));
    }

    /// PO-003: thirds are rounded to exactly the share total
    #[test]
    fn test_largest_remainder_keeps_target() {
        let shares = breakdown(&[
            ("p1", "3.333333333333"),
            ("p2", "3.333333333333"),
            ("p3", "3.333333333334"),
        ]);
        let rounded = round_to_target(&shares, dec("10.00"), &eur());

        let total: Decimal = rounded.iter().map(|(_, v)| *v).sum();
        assert_eq!(total, dec("10.00"));
        assert_eq!(rounded[0].1, dec("3.33"));
        assert_eq!(rounded[2].1, dec("3.34"));
    }

    /// PO-004: residual from the share rounding goes to revenue
    #[test]
    fn test_rounding_line_credits_revenue() {
        // 10.00 - 1.00 fee = 9.00 over 7 utilisations -> 1.29 each, 9.03 total
        let per_use = breakdown(&[("perf", "1.29")]);
        let breakdowns = vec![per_use; 7];
        let posting = post(&hats(&["perf"]), "10.00", "1.00", &breakdowns).unwrap();

        assert_eq!(posting.hat_total, dec("9.03"));
        assert_eq!(posting.rounding, dec("-0.03"));
        let rounding: Vec<_> = posting
            .account_move
            .lines_of(MoveLineKind::Rounding)
            .collect();
        assert_eq!(rounding.len(), 1);
        assert_eq!(rounding[0].debit, dec("0.03"));
        assert!(posting.account_move.is_balanced());
    }

    #[test]
    fn test_missing_hat_account_is_fatal() {
        let result = post(
            &hats(&["comp"]),
            "100.00",
            "10.00",
            &[breakdown(&[("comp", "45"), ("ghost", "45")])],
        );

        match result {
            Err(EngineError::MissingAccount { kind, owner }) => {
                assert_eq!(kind, "hat");
                assert_eq!(owner, "ghost");
            }
            other => panic!("Expected MissingAccount, got {:?}", other),
        }
    }

    #[test]
    fn test_entry_references_allocation_and_period() {
        let posting = post(
            &hats(&["comp"]),
            "5.00",
            "0.50",
            &[breakdown(&[("comp", "4.5")])],
        )
        .unwrap();

        let entry = &posting.account_move;
        assert_eq!(entry.journal, JournalId::from("trans"));
        assert_eq!(entry.period, PeriodId::from("2026-02"));
        let pocket: Vec<_> = entry.lines_of(MoveLineKind::Pocket).collect();
        assert_eq!(pocket[0].party, Some(PartyId::from("club")));
        assert_eq!(pocket[0].debit, dec("5.00"));
    }

    proptest! {
        /// Every entry balances and the residual stays within one cent per use.
        #[test]
        fn prop_entries_balance(
            cents in 1i64..10_000_000,
            uses in 1usize..20,
            performers in 1usize..5,
        ) {
            let currency = eur();
            let amount = Decimal::new(cents, 2);
            let fee = currency.round(amount * Decimal::TEN / Decimal::ONE_HUNDRED);
            let share = currency.round((amount - fee) / Decimal::from(uses));

            let names: Vec<String> = (0..performers).map(|i| format!("p{}", i)).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let mut creation = crate::models::Creation::new("c", "Work", "p0");
            for name in &refs {
                creation = creation
                    .with_contribution(crate::models::Contribution::performance(*name));
            }
            let breakdowns: Vec<Breakdown> = (0..uses)
                .map(|_| crate::allocation::allocate(&creation, share))
                .collect();

            let posting = post(&hats(&refs), &amount.to_string(), &fee.to_string(), &breakdowns)
                .unwrap();

            prop_assert!(posting.account_move.is_balanced());
            prop_assert_eq!(posting.hat_total, share * Decimal::from(uses));
            prop_assert!(posting.rounding.abs() <= currency.minor_unit() * Decimal::from(uses));
        }
    }
}
