//! Request types for the royalty distribution API.
//!
//! This module defines the JSON request bodies for the `/allocate` and
//! `/distributions` endpoints.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::distribution::DistributionRequest;
use crate::error::EngineResult;
use crate::models::CreationId;

/// Request body for the `/allocate` endpoint.
///
/// Previews how an amount would be split across a creation's artists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocateRequest {
    /// The creation to allocate for.
    pub creation_id: CreationId,
    /// The amount to split.
    pub amount: Decimal,
}

/// Request body for the `/distributions` endpoint.
///
/// Every field is optional: the run date defaults to today and the window to
/// the whole month before the run date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunDistributionRequest {
    /// The run date.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// First day of the window.
    #[serde(default)]
    pub from_date: Option<NaiveDate>,
    /// Last day of the window.
    #[serde(default)]
    pub thru_date: Option<NaiveDate>,
}

impl RunDistributionRequest {
    /// Fills in the defaults relative to `today`.
    pub fn resolve(&self, today: NaiveDate) -> EngineResult<DistributionRequest> {
        let defaults = DistributionRequest::for_previous_month(self.date.unwrap_or(today))?;
        Ok(DistributionRequest {
            date: defaults.date,
            from_date: self.from_date.unwrap_or(defaults.from_date),
            thru_date: self.thru_date.unwrap_or(defaults.thru_date),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_empty_request_defaults_to_previous_month() {
        let request: RunDistributionRequest = serde_json::from_str("{}").unwrap();
        let resolved = request.resolve(date("2026-02-03")).unwrap();

        assert_eq!(resolved.date, date("2026-02-03"));
        assert_eq!(resolved.from_date, date("2026-01-01"));
        assert_eq!(resolved.thru_date, date("2026-01-31"));
    }

    #[test]
    fn test_explicit_window_overrides_defaults() {
        let request: RunDistributionRequest = serde_json::from_str(
            r#"{"date": "2026-02-03", "from_date": "2026-01-10", "thru_date": "2026-01-20"}"#,
        )
        .unwrap();
        let resolved = request.resolve(date("2026-05-05")).unwrap();

        assert_eq!(resolved.date, date("2026-02-03"));
        assert_eq!(resolved.from_date, date("2026-01-10"));
        assert_eq!(resolved.thru_date, date("2026-01-20"));
    }

    #[test]
    fn test_allocate_request_accepts_string_amount() {
        let request: AllocateRequest =
            serde_json::from_str(r#"{"creation_id": "c_tide", "amount": "100.00"}"#).unwrap();
        assert_eq!(request.creation_id, CreationId::from("c_tide"));
        assert_eq!(request.amount, Decimal::new(10000, 2));
    }
}
