//! Distribution and allocation records.
//!
//! A [`Distribution`] is created fresh for every run of the orchestrator and
//! owns the [`Allocation`]s computed in that run, one per paying party.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PartyId, UtilisationId};

/// Direction of an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationType {
    /// Allocates an amount from a party's pocket to many artists' hats.
    #[default]
    PocketToHats,
    /// Allocates an amount from an artist's hat to many pockets. Reserved.
    HatToPockets,
}

/// The amount taken from one party's pocket in one distribution run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Unique identifier.
    pub id: Uuid,
    /// Sequential human-readable code.
    pub code: String,
    /// The owning distribution.
    pub distribution: Uuid,
    /// The allocation direction.
    #[serde(rename = "type", default)]
    pub allocation_type: AllocationType,
    /// The paying party.
    pub party: PartyId,
    /// Total amount taken from the pocket, rounded to currency precision.
    pub amount: Decimal,
    /// Amount allotted to each utilisation, rounded to currency precision.
    pub share_amount: Decimal,
    /// The utilisations covered by this allocation.
    #[serde(default)]
    pub utilisations: Vec<UtilisationId>,
}

/// One batch run of the distribution engine over a date window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    /// Unique identifier.
    pub id: Uuid,
    /// Sequential human-readable code.
    pub code: String,
    /// The distribution date, also used as posting date.
    pub date: NaiveDate,
    /// First day of the utilisation window (inclusive).
    pub from_date: NaiveDate,
    /// Last day of the utilisation window (inclusive).
    pub thru_date: NaiveDate,
    /// Allocations created in this run, in creation order.
    #[serde(default)]
    pub allocations: Vec<Uuid>,
}

impl Distribution {
    /// Returns true if this distribution's window shares at least one day
    /// with `from_date..=thru_date`.
    ///
    /// # Example
    ///
    /// ```
    /// use royalty_engine::models::Distribution;
    /// use chrono::NaiveDate;
    /// use uuid::Uuid;
    ///
    /// let d = |m, day| NaiveDate::from_ymd_opt(2026, m, day).unwrap();
    /// let distribution = Distribution {
    ///     id: Uuid::new_v4(),
    ///     code: "D-1".to_string(),
    ///     date: d(2, 5),
    ///     from_date: d(1, 1),
    ///     thru_date: d(1, 31),
    ///     allocations: vec![],
    /// };
    /// assert!(distribution.overlaps(d(1, 31), d(2, 28)));
    /// assert!(!distribution.overlaps(d(2, 1), d(2, 28)));
    /// ```
    pub fn overlaps(&self, from_date: NaiveDate, thru_date: NaiveDate) -> bool {
        self.from_date <= thru_date && from_date <= self.thru_date
    }
}
