//! Configuration types for royalty distribution.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::models::{Company, PartyId};
use crate::rounding::Currency;

/// The society's flat fee, in percent of each allocated amount.
pub const DEFAULT_FEE_PERCENT: Decimal = Decimal::TEN;

/// Code of the journal all distribution postings go to.
pub const TRANSFER_JOURNAL_CODE: &str = "TRANS";

/// Share of the amount funding performers when creators are also present.
pub const DEFAULT_PERFORMER_SHARE: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Share of the creator-side amount going to composers when texters exist too.
pub const DEFAULT_COMPOSER_SHARE: Decimal = Decimal::from_parts(65, 0, 0, false, 0);

/// Share of the creator-side amount going to texters when composers exist too.
pub const DEFAULT_TEXTER_SHARE: Decimal = Decimal::from_parts(35, 0, 0, false, 0);

const MAX_CURRENCY_DIGITS: u32 = 10;

fn default_fee_percent() -> Decimal {
    DEFAULT_FEE_PERCENT
}

fn default_transfer_journal() -> String {
    TRANSFER_JOURNAL_CODE.to_string()
}

fn default_performer_share() -> Decimal {
    DEFAULT_PERFORMER_SHARE
}

fn default_composer_share() -> Decimal {
    DEFAULT_COMPOSER_SHARE
}

fn default_texter_share() -> Decimal {
    DEFAULT_TEXTER_SHARE
}

fn default_originals_share() -> Decimal {
    DEFAULT_PERFORMER_SHARE
}

fn default_max_depth() -> usize {
    8
}

fn check_percent(field: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(EngineError::InvalidConfig {
            field: field.to_string(),
            message: format!("{} is not between 0 and 100", value),
        });
    }
    Ok(())
}

/// Society-level settings from society.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct SocietyConfig {
    /// The society's display name.
    pub name: String,
    /// The party representing the society in the ledger.
    pub company_party: PartyId,
    /// The currency all amounts are kept in.
    pub currency: Currency,
    /// Flat fee taken from each allocation, in percent.
    #[serde(default = "default_fee_percent")]
    pub fee_percent: Decimal,
    /// Code of the journal used for postings.
    #[serde(default = "default_transfer_journal")]
    pub transfer_journal: String,
    /// Refuse runs whose window overlaps a previous distribution.
    #[serde(default)]
    pub reject_overlapping_windows: bool,
}

impl SocietyConfig {
    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> EngineResult<()> {
        check_percent("fee_percent", self.fee_percent)?;
        if self.currency.digits > MAX_CURRENCY_DIGITS {
            return Err(EngineError::InvalidConfig {
                field: "currency.digits".to_string(),
                message: format!(
                    "{} digits exceeds the maximum of {}",
                    self.currency.digits, MAX_CURRENCY_DIGITS
                ),
            });
        }
        if self.transfer_journal.trim().is_empty() {
            return Err(EngineError::InvalidConfig {
                field: "transfer_journal".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Whether and how derivative creations share with their originals.
///
/// Disabled unless explicitly switched on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OriginalsPolicy {
    /// Follow originals links when allocating.
    #[serde(default)]
    pub enabled: bool,
    /// Percentage of a derivative's amount passed on to its originals.
    #[serde(default = "default_originals_share")]
    pub share: Decimal,
    /// Deepest originals chain that is followed before failing.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for OriginalsPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            share: default_originals_share(),
            max_depth: default_max_depth(),
        }
    }
}

/// Role split percentages from allocation.yaml.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AllocationRules {
    /// Share for performers when creators are present too.
    #[serde(default = "default_performer_share")]
    pub performer_share: Decimal,
    /// Composers' share of the creator side when texters are present too.
    #[serde(default = "default_composer_share")]
    pub composer_share: Decimal,
    /// Texters' share of the creator side when composers are present too.
    ///
    /// Texters receive whatever the composers leave, so this is only read to
    /// check that the creator split adds up to 100.
    #[serde(default = "default_texter_share")]
    pub texter_share: Decimal,
    /// Originals traversal policy.
    #[serde(default)]
    pub originals: OriginalsPolicy,
}

impl Default for AllocationRules {
    fn default() -> Self {
        Self {
            performer_share: DEFAULT_PERFORMER_SHARE,
            composer_share: DEFAULT_COMPOSER_SHARE,
            texter_share: DEFAULT_TEXTER_SHARE,
            originals: OriginalsPolicy::default(),
        }
    }
}

impl AllocationRules {
    /// Checks that the percentages are usable.
    pub fn validate(&self) -> EngineResult<()> {
        check_percent("performer_share", self.performer_share)?;
        check_percent("composer_share", self.composer_share)?;
        check_percent("texter_share", self.texter_share)?;
        check_percent("originals.share", self.originals.share)?;
        if self.composer_share + self.texter_share != Decimal::ONE_HUNDRED {
            return Err(EngineError::InvalidConfig {
                field: "composer_share".to_string(),
                message: format!(
                    "composer_share {} and texter_share {} must add up to 100",
                    self.composer_share, self.texter_share
                ),
            });
        }
        Ok(())
    }
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    society: SocietyConfig,
    rules: AllocationRules,
}

impl EngineConfig {
    /// Creates a configuration from its parts after validating both.
    pub fn new(society: SocietyConfig, rules: AllocationRules) -> EngineResult<Self> {
        society.validate()?;
        rules.validate()?;
        Ok(Self { society, rules })
    }

    /// Returns the society settings.
    pub fn society(&self) -> &SocietyConfig {
        &self.society
    }

    /// Returns the allocation rules.
    pub fn rules(&self) -> &AllocationRules {
        &self.rules
    }

    /// The explicit company context threaded through rounding and posting.
    pub fn company(&self) -> Company {
        Company {
            party: self.society.company_party.clone(),
            currency: self.society.currency.clone(),
        }
    }
}
