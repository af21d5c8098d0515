//! Bank balance sheet
//!
//! Running aggregates mutated in the same step as every account-level
//! movement. Each `post_*` method is one posting rule; together they keep
//! `assets - liabilities == capital == reserve` without ever recomputing
//! from scratch. `close()` recomputes anyway and compares.
//!
//! `loanable_funds` is a liquidity pool outside the identity: time-deposit
//! redemptions are paid from it, so lending it out can leave savers rationed.

use crate::ledger::error::LedgerError;
use crate::models::amount::Amount;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    assets: i64,
    liabilities: i64,
    reserve: Amount,
    loanable_funds: Amount,
    outstanding_cheques: i64,
}

impl BalanceSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Σ active loan principal
    pub fn assets(&self) -> i64 {
        self.assets
    }

    /// Σ deposits + Σ time-deposit principal + outstanding cheques
    pub fn liabilities(&self) -> i64 {
        self.liabilities
    }

    pub fn capital(&self) -> i64 {
        self.assets - self.liabilities
    }

    pub fn reserve(&self) -> i64 {
        self.reserve.value()
    }

    pub fn loanable_funds(&self) -> i64 {
        self.loanable_funds.value()
    }

    pub fn outstanding_cheques(&self) -> i64 {
        self.outstanding_cheques
    }

    /// Checked before anything moves, so a rejected loan leaves no trace
    pub(crate) fn post_origination(&mut self, principal: i64) -> Result<(), LedgerError> {
        let assets = checked_add(self.assets, principal)?;
        let liabilities = checked_add(self.liabilities, principal)?;
        self.assets = assets;
        self.liabilities = liabilities;
        self.loanable_funds.drain_up_to(principal);
        Ok(())
    }

    pub(crate) fn post_loan_interest(&mut self, amount: i64) -> Result<(), LedgerError> {
        self.liabilities -= amount;
        self.reserve.credit_nonneg(amount)?;
        Ok(())
    }

    pub(crate) fn post_principal_repaid(&mut self, amount: i64) -> Result<(), LedgerError> {
        self.assets -= amount;
        self.liabilities -= amount;
        self.loanable_funds.credit_nonneg(amount)?;
        Ok(())
    }

    pub(crate) fn post_capitalized(&mut self, amount: i64) -> Result<(), LedgerError> {
        let assets = checked_add(self.assets, amount)?;
        self.reserve.credit_nonneg(amount)?;
        self.assets = assets;
        Ok(())
    }

    /// Charge a loan write-off to the reserve; failure is bank insolvency
    pub(crate) fn post_write_off(&mut self, amount: i64) -> Result<(), LedgerError> {
        if amount > self.reserve.value() {
            return Err(LedgerError::BankInsolvent {
                shortfall: amount - self.reserve.value(),
            });
        }
        self.reserve.debit_nonneg(amount)?;
        self.assets -= amount;
        Ok(())
    }

    pub(crate) fn post_time_deposit_placed(&mut self, amount: i64) -> Result<(), LedgerError> {
        self.loanable_funds.credit(amount)?;
        Ok(())
    }

    pub(crate) fn post_time_deposit_interest(&mut self, amount: i64) -> Result<(), LedgerError> {
        self.reserve.debit_nonneg(amount)?;
        self.liabilities += amount;
        Ok(())
    }

    pub(crate) fn post_time_deposit_redeemed(&mut self, amount: i64) -> Result<(), LedgerError> {
        self.loanable_funds.debit_nonneg(amount)?;
        Ok(())
    }

    /// Early redemption against a defaulting holder's own loans
    pub(crate) fn post_time_deposit_setoff(&mut self, amount: i64) {
        self.loanable_funds.drain_up_to(amount);
    }

    pub(crate) fn post_cheque_issued(&mut self, amount: i64) {
        self.outstanding_cheques += amount;
    }

    pub(crate) fn post_cheque_cleared(&mut self, amount: i64) {
        self.outstanding_cheques -= amount;
    }

    /// Refund of a cheque whose drawer no longer has an open account
    pub(crate) fn post_cheque_forfeited(&mut self, amount: i64) -> Result<(), LedgerError> {
        self.outstanding_cheques -= amount;
        self.liabilities -= amount;
        self.reserve.credit_nonneg(amount)?;
        Ok(())
    }

    pub(crate) fn post_dividend(&mut self, amount: i64) -> Result<(), LedgerError> {
        self.reserve.debit_nonneg(amount)?;
        self.liabilities += amount;
        Ok(())
    }

    /// Compare running counters against independently recomputed totals
    pub(crate) fn verify(&self, assets: i64, liabilities: i64, cheques: i64) -> Result<(), LedgerError> {
        if self.assets != assets {
            return Err(LedgerError::Inconsistent(format!(
                "assets counter {} but loans sum to {}",
                self.assets, assets
            )));
        }
        if self.liabilities != liabilities {
            return Err(LedgerError::Inconsistent(format!(
                "liabilities counter {} but deposits sum to {}",
                self.liabilities, liabilities
            )));
        }
        if self.outstanding_cheques != cheques {
            return Err(LedgerError::Inconsistent(format!(
                "outstanding cheques counter {} but register holds {}",
                self.outstanding_cheques, cheques
            )));
        }
        if self.capital() != self.reserve.value() {
            return Err(LedgerError::Inconsistent(format!(
                "capital {} differs from reserve {}",
                self.capital(),
                self.reserve.value()
            )));
        }
        Ok(())
    }
}

fn checked_add(counter: i64, amount: i64) -> Result<i64, LedgerError> {
    counter.checked_add(amount).ok_or(LedgerError::Overflow {
        balance: counter,
        amount,
    })
}
