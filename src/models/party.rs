//! Party and company models.
//!
//! Parties are the users paying licence fees. Each one has a "pocket" account
//! holding collected fees not yet distributed, and optionally a budget that
//! caps how much of the pocket a single distribution may take.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AccountId, PartyId};
use crate::rounding::Currency;

/// A party whose utilisations are paid for from its pocket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Unique identifier for the party.
    pub id: PartyId,
    /// Display name.
    pub name: String,
    /// Current pocket balance, as derived by the accounting system.
    #[serde(default)]
    pub pocket_balance: Decimal,
    /// Upper bound for a single distribution, if any.
    #[serde(default)]
    pub pocket_budget: Option<Decimal>,
    /// The party's pocket account.
    #[serde(default)]
    pub pocket_account: Option<AccountId>,
}

impl Party {
    /// The amount that may be taken from the pocket in one run.
    ///
    /// This is the balance, capped by the budget when a smaller budget is set.
    ///
    /// # Example
    ///
    /// ```
    /// use royalty_engine::models::{Party, PartyId};
    /// use rust_decimal::Decimal;
    ///
    /// let party = Party {
    ///     id: PartyId::from("radio_one"),
    ///     name: "Radio One".to_string(),
    ///     pocket_balance: Decimal::new(50000, 2),
    ///     pocket_budget: Some(Decimal::new(20000, 2)),
    ///     pocket_account: None,
    /// };
    /// assert_eq!(party.payable_amount(), Decimal::new(20000, 2));
    /// ```
    pub fn payable_amount(&self) -> Decimal {
        match self.pocket_budget {
            Some(budget) if budget < self.pocket_balance => budget,
            _ => self.pocket_balance,
        }
    }
}

/// The collecting society's own company context.
///
/// Passed explicitly to everything that needs a currency or the company party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// The party representing the society itself.
    pub party: PartyId,
    /// The currency all amounts are kept in.
    pub currency: Currency,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn party(balance: &str, budget: Option<&str>) -> Party {
        Party {
            id: PartyId::from("party_001"),
            name: "Club Basement".to_string(),
            pocket_balance: dec(balance),
            pocket_budget: budget.map(dec),
            pocket_account: Some(AccountId::from("pocket_001")),
        }
    }

    #[test]
    fn test_payable_amount_without_budget_is_balance() {
        assert_eq!(party("120.00", None).payable_amount(), dec("120.00"));
    }

    #[test]
    fn test_payable_amount_capped_by_smaller_budget() {
        assert_eq!(party("120.00", Some("80.00")).payable_amount(), dec("80.00"));
    }

    #[test]
    fn test_payable_amount_ignores_larger_budget() {
        assert_eq!(
            party("120.00", Some("500.00")).payable_amount(),
            dec("120.00")
        );
    }

    #[test]
    fn test_deserialize_party_with_decimal_strings() {
        let yaml = r#"
id: party_002
name: Cafe Rumor
pocket_balance: "75.50"
pocket_account: pocket_002
"#;
        let party: Party = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(party.pocket_balance, dec("75.50"));
        assert!(party.pocket_budget.is_none());
    }
}
