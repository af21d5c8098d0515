//! Rate-setting policies
//!
//! Banks differ mainly in how they set rates. Every bank runs the same
//! ledger; the variation is a [`RatePolicy`] evaluated once per period at
//! `open()`. Rates fixed at open apply to every contract originated during
//! that period.
//!
//! # Policy Interface
//!
//! ```rust
//! use credit_ledger_core_rs::ledger::policy::{RateContext, RatePolicy, Rates};
//!
//! struct Teaser;
//!
//! impl RatePolicy for Teaser {
//!     fn name(&self) -> &'static str {
//!         "teaser"
//!     }
//!
//!     fn rates(&mut self, ctx: &RateContext) -> Rates {
//!         let loan = if ctx.period <= 3 { 0.0 } else { ctx.params.loan_rate };
//!         Rates { loan, deposit: ctx.params.deposit_rate }
//!     }
//! }
//! ```
//!
//! Built-in policies are selected through the [`BankKind`] factory.

use crate::ledger::params::LedgerParams;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a policy may look at when setting rates
#[derive(Debug, Clone, Copy)]
pub struct RateContext<'a> {
    /// Period being opened
    pub period: usize,
    pub assets: i64,
    pub capital: i64,
    pub params: &'a LedgerParams,
}

impl RateContext<'_> {
    /// Capital over assets; a bank without assets counts as fully capitalised
    pub fn capital_ratio(&self) -> f64 {
        if self.assets <= 0 {
            return 1.0;
        }
        self.capital as f64 / self.assets as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rates {
    pub loan: f64,
    pub deposit: f64,
}

pub trait RatePolicy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Rates for the period described by `ctx`
    fn rates(&mut self, ctx: &RateContext) -> Rates;
}

/// Configured base rates, unchanged period to period
#[derive(Debug, Clone, Default)]
pub struct FixedRates;

impl RatePolicy for FixedRates {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn rates(&mut self, ctx: &RateContext) -> Rates {
        Rates {
            loan: ctx.params.loan_rate,
            deposit: ctx.params.deposit_rate,
        }
    }
}

/// Raises the loan rate while capital is below its target ratio
///
/// ```text
/// shortfall = max(0, capital.target_ratio − capital / assets)
/// loan      = rate.loan + rate.sensitivity × shortfall
/// deposit   = loan − (rate.loan − rate.deposit)     floored at 0
/// ```
#[derive(Debug, Clone, Default)]
pub struct CapitalTargetingRates;

impl RatePolicy for CapitalTargetingRates {
    fn name(&self) -> &'static str {
        "capital_targeting"
    }

    fn rates(&mut self, ctx: &RateContext) -> Rates {
        let params = ctx.params;
        let shortfall = (params.capital_target_ratio - ctx.capital_ratio()).max(0.0);
        let loan = params.loan_rate + params.rate_sensitivity * shortfall;
        let spread = params.loan_rate - params.deposit_rate;
        Rates {
            loan,
            deposit: (loan - spread).max(0.0),
        }
    }
}

/// Closed set of bank flavours
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BankKind {
    #[default]
    Basic,
    CapitalTargeting,
}

impl BankKind {
    pub fn build_policy(self) -> Box<dyn RatePolicy> {
        match self {
            BankKind::Basic => Box::new(FixedRates),
            BankKind::CapitalTargeting => Box::new(CapitalTargetingRates),
        }
    }
}

impl fmt::Display for BankKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BankKind::Basic => f.write_str("basic"),
            BankKind::CapitalTargeting => f.write_str("capital-targeting"),
        }
    }
}

impl FromStr for BankKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "basic" => Ok(BankKind::Basic),
            "capital-targeting" => Ok(BankKind::CapitalTargeting),
            other => Err(format!("unknown bank kind '{}'", other)),
        }
    }
}
