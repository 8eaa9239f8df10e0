//! Error types for the royalty distribution engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can abort an allocation or a distribution run.
//! Conditions that are part of normal operation (nothing to distribute, a party
//! with an empty pocket) are not errors and never appear here.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// The main error type for the royalty distribution engine.
///
/// Any error returned from a distribution run means nothing was committed:
/// the run is all-or-nothing and can be re-invoked once the cause is fixed.
///
/// # Example
///
/// ```
/// use royalty_engine::error::EngineError;
///
/// let error = EngineError::JournalNotFound {
///     code: "TRANS".to_string(),
/// };
/// assert_eq!(error.to_string(), "Journal not found: TRANS");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value was parsed but is not acceptable.
    #[error("Invalid configuration value '{field}': {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// A creation referenced by a utilisation or an originals link does not exist.
    #[error("Creation not found: {id}")]
    CreationNotFound {
        /// The missing creation id.
        id: String,
    },

    /// A party referenced by a utilisation does not exist.
    #[error("Party not found: {id}")]
    PartyNotFound {
        /// The missing party id.
        id: String,
    },

    /// A ledger account required for posting is not configured.
    #[error("Missing {kind} account for '{owner}'")]
    MissingAccount {
        /// The kind of account (e.g. "revenue", "pocket", "hat").
        kind: String,
        /// The party, artist or company the account belongs to.
        owner: String,
    },

    /// The journal used for postings could not be resolved.
    #[error("Journal not found: {code}")]
    JournalNotFound {
        /// The journal code that was looked up.
        code: String,
    },

    /// No accounting period encloses the posting date.
    #[error("No accounting period for company '{company}' on {date}")]
    PeriodNotFound {
        /// The company party id.
        company: String,
        /// The posting date.
        date: NaiveDate,
    },

    /// The requested utilisation window is empty or inverted.
    #[error("Invalid distribution window: {from_date} is after {thru_date}")]
    InvalidWindow {
        /// First day of the window.
        from_date: NaiveDate,
        /// Last day of the window.
        thru_date: NaiveDate,
    },

    /// A previous distribution already covers part of the requested window.
    #[error("Distribution '{code}' already covers {from_date}..{thru_date}")]
    OverlappingDistribution {
        /// Code of the conflicting distribution.
        code: String,
        /// First day of the conflicting window.
        from_date: NaiveDate,
        /// Last day of the conflicting window.
        thru_date: NaiveDate,
    },

    /// The originals graph of a creation loops back on itself.
    #[error("Derivation cycle detected at creation '{creation}'")]
    DerivationCycle {
        /// The creation at which the cycle closes.
        creation: String,
    },

    /// The originals graph of a creation is deeper than allowed.
    #[error("Derivation tree of '{creation}' exceeds maximum depth {max_depth}")]
    DerivationTooDeep {
        /// The creation whose tree is too deep.
        creation: String,
        /// The configured ceiling.
        max_depth: usize,
    },

    /// A journal entry did not balance.
    #[error("Unbalanced journal entry: debit {debit} != credit {credit}")]
    UnbalancedMove {
        /// Sum of debit lines.
        debit: Decimal,
        /// Sum of credit lines.
        credit: Decimal,
    },

    /// The store refused to commit a distribution run.
    #[error("Distribution commit rejected: {message}")]
    CommitRejected {
        /// A description of why the commit was refused.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
