//! Ledger parameters
//!
//! Parameters arrive as a flat key → value map (dotted keys, numeric
//! values), e.g. loaded from a JSON object by the scheduler:
//!
//! ```text
//! rate.loan               0.05   base loan rate per period
//! rate.deposit            0.01   base time-deposit rate per period
//! rate.sensitivity        0.5    loan-rate response to a capital shortfall
//! term.extended           3      periods a missed loan may be deferred
//! bankruptcy.patience     2      distressed periods before foreclosure
//! capital.target_ratio    0.1    capital / assets kept before dividends
//! leverage.target         0.8    debt / collateral left after foreclosure
//! dividend.payout         1.0    share of excess capital paid out
//! debt.short_term_horizon 12     periods separating short from long debt
//! ```
//!
//! Updates are validated as a whole before any value changes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Flat parameter set as supplied by collaborators
pub type ParamMap = BTreeMap<String, f64>;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Unknown parameter '{0}'")]
    UnknownKey(String),

    #[error("Invalid value {value} for '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: f64,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerParams {
    #[serde(rename = "rate.loan")]
    pub loan_rate: f64,
    #[serde(rename = "rate.deposit")]
    pub deposit_rate: f64,
    #[serde(rename = "rate.sensitivity")]
    pub rate_sensitivity: f64,
    #[serde(rename = "term.extended")]
    pub extended_term: usize,
    #[serde(rename = "bankruptcy.patience")]
    pub patience: usize,
    #[serde(rename = "capital.target_ratio")]
    pub capital_target_ratio: f64,
    #[serde(rename = "leverage.target")]
    pub target_leverage: f64,
    #[serde(rename = "dividend.payout")]
    pub dividend_payout: f64,
    #[serde(rename = "debt.short_term_horizon")]
    pub short_term_horizon: usize,
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self {
            loan_rate: 0.05,
            deposit_rate: 0.01,
            rate_sensitivity: 0.5,
            extended_term: 3,
            patience: 2,
            capital_target_ratio: 0.1,
            target_leverage: 0.8,
            dividend_payout: 1.0,
            short_term_horizon: 12,
        }
    }
}

enum Slot {
    Rate,
    Ratio,
    NonNegative,
    Count { min: usize },
}

fn slot_for(key: &str) -> Option<Slot> {
    Some(match key {
        "rate.loan" | "rate.deposit" => Slot::Rate,
        "rate.sensitivity" | "capital.target_ratio" | "leverage.target" => Slot::NonNegative,
        "dividend.payout" => Slot::Ratio,
        "term.extended" | "debt.short_term_horizon" => Slot::Count { min: 0 },
        "bankruptcy.patience" => Slot::Count { min: 1 },
        _ => return None,
    })
}

fn check(key: &str, value: f64) -> Result<(), ConfigError> {
    let slot = slot_for(key).ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
    let invalid = |reason| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
        reason,
    };
    if !value.is_finite() {
        return Err(invalid("must be finite"));
    }
    match slot {
        Slot::Rate | Slot::NonNegative if value < 0.0 => Err(invalid("must be non-negative")),
        Slot::Ratio if !(0.0..=1.0).contains(&value) => Err(invalid("must lie in [0, 1]")),
        Slot::Count { .. } if value.fract() != 0.0 => Err(invalid("must be a whole number")),
        Slot::Count { min } if value < min as f64 => Err(invalid("below minimum")),
        _ => Ok(()),
    }
}

impl LedgerParams {
    /// Defaults overridden by `map`
    ///
    /// # Example
    /// ```
    /// use credit_ledger_core_rs::ledger::params::{LedgerParams, ParamMap};
    ///
    /// let mut map = ParamMap::new();
    /// map.insert("rate.loan".to_string(), 0.07);
    /// map.insert("bankruptcy.patience".to_string(), 3.0);
    /// let params = LedgerParams::from_map(&map).unwrap();
    /// assert_eq!(params.loan_rate, 0.07);
    /// assert_eq!(params.patience, 3);
    /// ```
    pub fn from_map(map: &ParamMap) -> Result<Self, ConfigError> {
        let mut params = Self::default();
        params.apply(map)?;
        Ok(params)
    }

    /// Apply every entry of `map`, or none of them
    pub fn apply(&mut self, map: &ParamMap) -> Result<(), ConfigError> {
        for (key, &value) in map {
            check(key, value)?;
        }
        for (key, &value) in map {
            match key.as_str() {
                "rate.loan" => self.loan_rate = value,
                "rate.deposit" => self.deposit_rate = value,
                "rate.sensitivity" => self.rate_sensitivity = value,
                "term.extended" => self.extended_term = value as usize,
                "bankruptcy.patience" => self.patience = value as usize,
                "capital.target_ratio" => self.capital_target_ratio = value,
                "leverage.target" => self.target_leverage = value,
                "dividend.payout" => self.dividend_payout = value,
                "debt.short_term_horizon" => self.short_term_horizon = value as usize,
                other => return Err(ConfigError::UnknownKey(other.to_string())),
            }
        }
        Ok(())
    }

    /// Flat view of the current values
    pub fn to_map(&self) -> ParamMap {
        let mut map = ParamMap::new();
        map.insert("rate.loan".to_string(), self.loan_rate);
        map.insert("rate.deposit".to_string(), self.deposit_rate);
        map.insert("rate.sensitivity".to_string(), self.rate_sensitivity);
        map.insert("term.extended".to_string(), self.extended_term as f64);
        map.insert("bankruptcy.patience".to_string(), self.patience as f64);
        map.insert("capital.target_ratio".to_string(), self.capital_target_ratio);
        map.insert("leverage.target".to_string(), self.target_leverage);
        map.insert("dividend.payout".to_string(), self.dividend_payout);
        map.insert(
            "debt.short_term_horizon".to_string(),
            self.short_term_horizon as f64,
        );
        map
    }
}
