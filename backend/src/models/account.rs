//! Account model
//!
//! One holder's demand deposit plus the contracts it is party to:
//! - `loans`: contracts where the holder is the debtor
//! - `time_deposits`: contracts where the holder is the creditor
//!
//! The account is the unit over which the ledger identity is checked:
//! `debt == Σ loans.principal` must hold after every phase. The running
//! `debt` counter is moved in the same step as the contract it mirrors;
//! [`Account::computed_debt`] recomputes it from scratch for `close()`.
//!
//! An account is created by the ledger for a holder, mutated only through
//! ledger operations, and closed permanently on bankruptcy.

use crate::models::amount::{Amount, AmountError};
use crate::models::contract::Contract;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to an account inside one ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub usize);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acct_{:04}", self.0)
    }
}

/// Identifier of the collaborator (household, firm) holding an account
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HolderId(pub String);

impl HolderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    Open,
    Closed { period: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    holder: HolderId,
    deposit: Amount,
    /// Registration order is preserved; rationing relies on it
    loans: Vec<Contract>,
    time_deposits: Vec<Contract>,
    debt: i64,
    status: AccountStatus,
    opened_at: usize,

    /// Rationed during the current period's debt recovery
    illiquid: bool,
    /// Consecutive periods the account was illiquid
    illiquid_streak: usize,
    /// Consecutive periods deposit + collateral could not cover debt
    insolvent_streak: usize,
}

impl Account {
    pub(crate) fn new(id: AccountId, holder: HolderId, period: usize) -> Self {
        Self {
            id,
            holder,
            deposit: Amount::zero(),
            loans: Vec::new(),
            time_deposits: Vec::new(),
            debt: 0,
            status: AccountStatus::Open,
            opened_at: period,
            illiquid: false,
            illiquid_streak: 0,
            insolvent_streak: 0,
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn holder(&self) -> &HolderId {
        &self.holder
    }

    /// Demand deposit balance
    pub fn amount(&self) -> i64 {
        self.deposit.value()
    }

    /// Outstanding loan principal
    pub fn debt(&self) -> i64 {
        self.debt
    }

    pub fn loans(&self) -> &[Contract] {
        &self.loans
    }

    pub fn time_deposits(&self) -> &[Contract] {
        &self.time_deposits
    }

    pub fn status(&self) -> &AccountStatus {
        &self.status
    }

    pub fn is_open(&self) -> bool {
        self.status == AccountStatus::Open
    }

    pub fn opened_at(&self) -> usize {
        self.opened_at
    }

    pub fn is_illiquid(&self) -> bool {
        self.illiquid
    }

    pub fn illiquid_streak(&self) -> usize {
        self.illiquid_streak
    }

    pub fn insolvent_streak(&self) -> usize {
        self.insolvent_streak
    }

    /// Principal of time deposits this holder has placed
    pub fn time_deposit_balance(&self) -> i64 {
        self.time_deposits
            .iter()
            .filter(|c| c.is_active())
            .map(|c| c.principal())
            .sum()
    }

    /// Loans maturing within `horizon` periods of `period`
    pub fn short_term_debt(&self, period: usize, horizon: usize) -> i64 {
        self.active_loans()
            .filter(|c| c.maturity().saturating_sub(period) <= horizon)
            .map(|c| c.principal())
            .sum()
    }

    /// Loans maturing beyond `horizon` periods of `period`
    pub fn long_term_debt(&self, period: usize, horizon: usize) -> i64 {
        self.active_loans()
            .filter(|c| c.maturity().saturating_sub(period) > horizon)
            .map(|c| c.principal())
            .sum()
    }

    /// Loans past their original maturity or non-performing
    pub fn overdue_debt(&self, period: usize) -> i64 {
        self.active_loans()
            .filter(|c| c.is_overdue(period))
            .map(|c| c.principal())
            .sum()
    }

    /// Debt recomputed from the contracts themselves
    pub fn computed_debt(&self) -> i64 {
        self.active_loans().map(|c| c.principal()).sum()
    }

    fn active_loans(&self) -> impl Iterator<Item = &Contract> {
        self.loans.iter().filter(|c| c.is_active())
    }

    pub(crate) fn deposit_mut(&mut self) -> &mut Amount {
        &mut self.deposit
    }

    pub(crate) fn loans_mut(&mut self) -> &mut Vec<Contract> {
        &mut self.loans
    }

    pub(crate) fn time_deposits_mut(&mut self) -> &mut Vec<Contract> {
        &mut self.time_deposits
    }

    /// Loans and deposit borrowed together, for paying loans from the deposit
    pub(crate) fn loans_and_deposit_mut(&mut self) -> (&mut Vec<Contract>, &mut Amount) {
        (&mut self.loans, &mut self.deposit)
    }

    pub(crate) fn time_deposits_and_deposit_mut(&mut self) -> (&mut Vec<Contract>, &mut Amount) {
        (&mut self.time_deposits, &mut self.deposit)
    }

    pub(crate) fn push_loan(&mut self, loan: Contract) -> Result<(), AmountError> {
        self.adjust_debt(loan.principal())?;
        self.loans.push(loan);
        Ok(())
    }

    pub(crate) fn push_time_deposit(&mut self, deposit: Contract) {
        self.time_deposits.push(deposit);
    }

    pub(crate) fn adjust_debt(&mut self, delta: i64) -> Result<(), AmountError> {
        self.debt = self.debt.checked_add(delta).ok_or(AmountError::Overflow {
            balance: self.debt,
            amount: delta,
        })?;
        Ok(())
    }

    pub(crate) fn set_illiquid(&mut self, illiquid: bool) {
        self.illiquid = illiquid;
    }

    pub(crate) fn record_distress(&mut self, illiquid: bool, insolvent: bool) {
        self.illiquid_streak = if illiquid { self.illiquid_streak + 1 } else { 0 };
        self.insolvent_streak = if insolvent { self.insolvent_streak + 1 } else { 0 };
    }

    pub(crate) fn clear_distress(&mut self) {
        self.illiquid_streak = 0;
        self.insolvent_streak = 0;
    }

    pub(crate) fn close(&mut self, period: usize) {
        self.status = AccountStatus::Closed { period };
    }

    /// Drop settled and cancelled contracts, returning how many were removed
    pub(crate) fn prune(&mut self) -> usize {
        let before = self.loans.len() + self.time_deposits.len();
        self.loans.retain(|c| c.is_active());
        self.time_deposits.retain(|c| c.is_active());
        before - self.loans.len() - self.time_deposits.len()
    }
}
