//! Contract model: loans and time deposits
//!
//! A contract is one debt instrument between a creditor and a debtor. The
//! same struct serves both instruments the bank deals in:
//! - **Loan**: the bank is creditor, an account holder is debtor
//! - **TimeDeposit**: an account holder is creditor, the bank is debtor
//!
//! # State machine
//!
//! ```text
//! origin ──> Active(Good) ──missed at maturity, past extended term──> Active(Doubtful)
//!              │    ▲                                                       │
//!              │    └── deferral (maturity + 1)                    missed again: Fatal
//!              ├──payment / cancel to zero──> Settled
//!              └──cancel_all (foreclosure)──> Cancelled
//! ```
//!
//! Principal only ever decreases through `repay`/`payment` (money received)
//! or `cancel`/`cancel_all` (write-off). Interest is billed into
//! `deferred_interest` once per period by `accrue_interest`.
//!
//! CRITICAL: All money values are i64 (minor units); rates are f64

use crate::models::account::AccountId;
use crate::models::amount::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Registration-ordered contract identifier
///
/// Ids are handed out by the ledger from a monotonically increasing counter,
/// so sorting by id gives the order contracts were registered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContractId(pub u64);

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ct_{:08}", self.0)
    }
}

/// One side of a contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Party {
    Bank,
    Account(AccountId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instrument {
    Loan,
    TimeDeposit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractKind {
    /// Principal repaid in installments over the term
    Amortizing,
    /// Principal repaid in full at maturity
    NonAmortizing,
    /// Downgraded after missing its extended maturity; one period left
    NonPerforming,
}

/// Credit quality of an active contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Standing {
    Good,
    Doubtful,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractState {
    Active,
    Settled { period: usize },
    Cancelled { period: usize },
}

/// Result of deferring a missed obligation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferralOutcome {
    /// Maturity pushed forward; standing unchanged
    Deferred { new_maturity: usize },
    /// Extended term exhausted: now non-performing with one extra period
    Downgraded { new_maturity: usize },
    /// A non-performing contract missed again
    Fatal,
}

#[derive(Debug, Error, PartialEq)]
pub enum ContractError {
    #[error("Invalid contract argument: {0}")]
    InvalidArgument(String),

    #[error("Payment amount {amount} must be positive")]
    InvalidAmount { amount: i64 },

    #[error("Payment amount {amount} exceeds outstanding {outstanding}")]
    AmountExceedsOutstanding { amount: i64, outstanding: i64 },

    #[error("Cancel amount {amount} exceeds principal {principal}")]
    AmountExceedsPrincipal { amount: i64, principal: i64 },

    #[error("Contract {0} already settled")]
    AlreadySettled(ContractId),

    #[error("Contract {0} was cancelled")]
    Cancelled(ContractId),

    #[error("Anachronism on contract {contract}: period {period} precedes {reference}")]
    Anachronism {
        contract: ContractId,
        period: usize,
        reference: usize,
    },
}

/// A loan or time deposit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    id: ContractId,
    instrument: Instrument,
    creditor: Party,
    debtor: Party,
    principal: Amount,
    rate: f64,
    origin: usize,
    /// Current maturity, pushed forward by deferrals
    maturity: usize,
    original_maturity: usize,
    /// Last period the contract may still be deferred to; None = unbounded
    extended_maturity: Option<usize>,
    deferred_interest: Amount,
    kind: ContractKind,
    state: ContractState,
    last_accrual: Option<usize>,
}

impl Contract {
    /// Originate a loan from the bank to `debtor`
    ///
    /// # Example
    /// ```
    /// use credit_ledger_core_rs::models::account::AccountId;
    /// use credit_ledger_core_rs::models::contract::{Contract, ContractId};
    ///
    /// let loan = Contract::loan(ContractId(1), AccountId(0), 1_000, 0.05, 1, 12, true, 3).unwrap();
    /// assert_eq!(loan.maturity(), 13);
    /// assert_eq!(loan.extended_maturity(), Some(16));
    /// assert!(!loan.is_due(12));
    /// ```
    #[allow(clippy::too_many_arguments)]
    pub fn loan(
        id: ContractId,
        debtor: AccountId,
        principal: i64,
        rate: f64,
        origin: usize,
        term: usize,
        amortized: bool,
        extended_term: usize,
    ) -> Result<Self, ContractError> {
        let kind = if amortized {
            ContractKind::Amortizing
        } else {
            ContractKind::NonAmortizing
        };
        let mut contract = Self::build(
            id,
            Instrument::Loan,
            Party::Bank,
            Party::Account(debtor),
            principal,
            rate,
            origin,
            term,
            kind,
        )?;
        contract.extended_maturity = Some(contract.maturity + extended_term);
        Ok(contract)
    }

    /// Place a time deposit from `saver` with the bank
    pub fn time_deposit(
        id: ContractId,
        saver: AccountId,
        principal: i64,
        rate: f64,
        origin: usize,
        term: usize,
    ) -> Result<Self, ContractError> {
        Self::build(
            id,
            Instrument::TimeDeposit,
            Party::Account(saver),
            Party::Bank,
            principal,
            rate,
            origin,
            term,
            ContractKind::NonAmortizing,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        id: ContractId,
        instrument: Instrument,
        creditor: Party,
        debtor: Party,
        principal: i64,
        rate: f64,
        origin: usize,
        term: usize,
        kind: ContractKind,
    ) -> Result<Self, ContractError> {
        if principal <= 0 {
            return Err(ContractError::InvalidArgument(format!(
                "principal must be positive, got {}",
                principal
            )));
        }
        if term == 0 {
            return Err(ContractError::InvalidArgument("term must be at least 1".to_string()));
        }
        if !rate.is_finite() || rate < 0.0 {
            return Err(ContractError::InvalidArgument(format!(
                "rate must be a non-negative finite number, got {}",
                rate
            )));
        }
        let maturity = origin + term;
        Ok(Self {
            id,
            instrument,
            creditor,
            debtor,
            principal: Amount::new(principal)
                .map_err(|e| ContractError::InvalidArgument(e.to_string()))?,
            rate,
            origin,
            maturity,
            original_maturity: maturity,
            extended_maturity: None,
            deferred_interest: Amount::zero(),
            kind,
            state: ContractState::Active,
            last_accrual: None,
        })
    }

    pub fn id(&self) -> ContractId {
        self.id
    }

    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    pub fn creditor(&self) -> Party {
        self.creditor
    }

    pub fn debtor(&self) -> Party {
        self.debtor
    }

    pub fn principal(&self) -> i64 {
        self.principal.value()
    }

    pub fn deferred_interest(&self) -> i64 {
        self.deferred_interest.value()
    }

    /// Principal plus billed-but-unpaid interest
    pub fn outstanding(&self) -> i64 {
        self.principal.value() + self.deferred_interest.value()
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn origin(&self) -> usize {
        self.origin
    }

    pub fn maturity(&self) -> usize {
        self.maturity
    }

    pub fn original_maturity(&self) -> usize {
        self.original_maturity
    }

    pub fn extended_maturity(&self) -> Option<usize> {
        self.extended_maturity
    }

    pub fn kind(&self) -> ContractKind {
        self.kind
    }

    pub fn state(&self) -> &ContractState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ContractState::Active
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.state, ContractState::Settled { .. })
    }

    pub fn standing(&self) -> Standing {
        match self.kind {
            ContractKind::NonPerforming => Standing::Doubtful,
            _ => Standing::Good,
        }
    }

    /// True once the (possibly deferred) maturity has been reached
    pub fn is_due(&self, period: usize) -> bool {
        period >= self.maturity
    }

    /// True while the contract is within its (extended) maturity
    pub fn is_valid(&self, period: usize) -> bool {
        period <= self.extended_maturity.unwrap_or(self.maturity)
    }

    /// Past the original maturity or downgraded
    pub fn is_overdue(&self, period: usize) -> bool {
        self.kind == ContractKind::NonPerforming || period > self.original_maturity
    }

    fn ensure_active(&self) -> Result<(), ContractError> {
        match self.state {
            ContractState::Active => Ok(()),
            ContractState::Settled { .. } => Err(ContractError::AlreadySettled(self.id)),
            ContractState::Cancelled { .. } => Err(ContractError::Cancelled(self.id)),
        }
    }

    fn ensure_not_before_origin(&self, period: usize) -> Result<(), ContractError> {
        if period < self.origin {
            return Err(ContractError::Anachronism {
                contract: self.id,
                period,
                reference: self.origin,
            });
        }
        Ok(())
    }

    fn settle_if_done(&mut self, period: usize) {
        if self.principal.is_zero() && self.deferred_interest.is_zero() {
            self.state = ContractState::Settled { period };
        }
    }

    /// Bill one period of interest into `deferred_interest`
    ///
    /// Returns the interest billed. Fails with `Anachronism` when called
    /// before origin or twice for the same period.
    pub fn accrue_interest(&mut self, period: usize) -> Result<i64, ContractError> {
        self.ensure_active()?;
        self.ensure_not_before_origin(period)?;
        if let Some(last) = self.last_accrual {
            if period <= last {
                return Err(ContractError::Anachronism {
                    contract: self.id,
                    period,
                    reference: last + 1,
                });
            }
        }
        self.last_accrual = Some(period);

        let interest = (self.principal.value() as f64 * self.rate).round() as i64;
        self.deferred_interest
            .credit_nonneg(interest.max(0))
            .map_err(|e| ContractError::InvalidArgument(e.to_string()))?;
        Ok(interest.max(0))
    }

    /// Principal installment due in `period`
    pub fn principal_due(&self, period: usize) -> i64 {
        if !self.is_active() {
            return 0;
        }
        let principal = self.principal.value();
        if self.is_due(period) {
            return principal;
        }
        match (self.instrument, self.kind) {
            (Instrument::Loan, ContractKind::Amortizing) if period > self.origin => {
                let remaining_term = (self.maturity - period + 1) as i64;
                principal / remaining_term
            }
            _ => 0,
        }
    }

    /// Pay billed interest
    pub fn pay_interest(&mut self, period: usize, amount: i64) -> Result<(), ContractError> {
        self.ensure_active()?;
        self.ensure_not_before_origin(period)?;
        if amount <= 0 {
            return Err(ContractError::InvalidAmount { amount });
        }
        if amount > self.deferred_interest.value() {
            return Err(ContractError::AmountExceedsOutstanding {
                amount,
                outstanding: self.deferred_interest.value(),
            });
        }
        self.deferred_interest
            .debit(amount)
            .map_err(|e| ContractError::InvalidArgument(e.to_string()))?;
        self.settle_if_done(period);
        Ok(())
    }

    /// Repay principal
    pub fn repay(&mut self, period: usize, amount: i64) -> Result<(), ContractError> {
        self.ensure_active()?;
        self.ensure_not_before_origin(period)?;
        if amount <= 0 {
            return Err(ContractError::InvalidAmount { amount });
        }
        if amount > self.principal.value() {
            return Err(ContractError::AmountExceedsOutstanding {
                amount,
                outstanding: self.principal.value(),
            });
        }
        self.principal
            .debit(amount)
            .map_err(|e| ContractError::InvalidArgument(e.to_string()))?;
        self.settle_if_done(period);
        Ok(())
    }

    /// Apply a payment to deferred interest first, then principal
    ///
    /// Returns `(interest_part, principal_part)`.
    ///
    /// # Example
    /// ```
    /// use credit_ledger_core_rs::models::account::AccountId;
    /// use credit_ledger_core_rs::models::contract::{Contract, ContractId};
    ///
    /// let mut loan = Contract::loan(ContractId(1), AccountId(0), 100, 0.1, 1, 1, false, 0).unwrap();
    /// loan.accrue_interest(1).unwrap();
    /// assert_eq!(loan.payment(1, 30).unwrap(), (10, 20));
    /// assert_eq!(loan.principal(), 80);
    /// ```
    pub fn payment(&mut self, period: usize, amount: i64) -> Result<(i64, i64), ContractError> {
        self.ensure_active()?;
        self.ensure_not_before_origin(period)?;
        if amount <= 0 {
            return Err(ContractError::InvalidAmount { amount });
        }
        if amount > self.outstanding() {
            return Err(ContractError::AmountExceedsOutstanding {
                amount,
                outstanding: self.outstanding(),
            });
        }
        let interest_part = amount.min(self.deferred_interest.value());
        let principal_part = amount - interest_part;
        if interest_part > 0 {
            self.pay_interest(period, interest_part)?;
        }
        if principal_part > 0 {
            self.repay(period, principal_part)?;
        }
        Ok((interest_part, principal_part))
    }

    /// Roll unpaid billed interest into principal. Returns the amount rolled.
    pub fn capitalize_interest(&mut self) -> Result<i64, ContractError> {
        self.ensure_active()?;
        let unpaid = self.deferred_interest.value();
        if unpaid > 0 {
            self.deferred_interest
                .debit(unpaid)
                .map_err(|e| ContractError::InvalidArgument(e.to_string()))?;
            self.principal
                .credit(unpaid)
                .map_err(|e| ContractError::InvalidArgument(e.to_string()))?;
        }
        Ok(unpaid)
    }

    /// Write off `amount` of principal without payment
    pub fn cancel(&mut self, period: usize, amount: i64) -> Result<(), ContractError> {
        self.ensure_active()?;
        if amount <= 0 {
            return Err(ContractError::InvalidAmount { amount });
        }
        if amount > self.principal.value() {
            return Err(ContractError::AmountExceedsPrincipal {
                amount,
                principal: self.principal.value(),
            });
        }
        self.principal
            .debit(amount)
            .map_err(|e| ContractError::InvalidArgument(e.to_string()))?;
        self.settle_if_done(period);
        Ok(())
    }

    /// Write off everything and mark the contract cancelled
    ///
    /// Returns `(principal, deferred_interest)` as they were before the
    /// write-off.
    pub fn cancel_all(&mut self, period: usize) -> Result<(i64, i64), ContractError> {
        self.ensure_active()?;
        let principal = self.principal.drain_up_to(self.principal.value());
        let interest = self
            .deferred_interest
            .drain_up_to(self.deferred_interest.value());
        self.state = ContractState::Cancelled { period };
        Ok((principal, interest))
    }

    /// React to an obligation that was not paid in full in `period`
    ///
    /// Maturity moves to one period past the later of the current maturity
    /// and `period`, so a missed installment before maturity costs exactly
    /// one period of the extension window.
    pub fn defer(&mut self, period: usize) -> Result<DeferralOutcome, ContractError> {
        self.ensure_active()?;
        self.ensure_not_before_origin(period)?;
        let next = self.maturity.max(period) + 1;

        if self.kind == ContractKind::NonPerforming {
            return Ok(DeferralOutcome::Fatal);
        }
        match self.extended_maturity {
            None => {
                self.maturity = next;
                Ok(DeferralOutcome::Deferred { new_maturity: next })
            }
            Some(limit) if next <= limit => {
                self.maturity = next;
                Ok(DeferralOutcome::Deferred { new_maturity: next })
            }
            Some(_) => {
                self.kind = ContractKind::NonPerforming;
                self.maturity = next;
                self.extended_maturity = Some(next);
                Ok(DeferralOutcome::Downgraded { new_maturity: next })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan(principal: i64, rate: f64, term: usize, amortized: bool) -> Contract {
        Contract::loan(ContractId(1), AccountId(0), principal, rate, 1, term, amortized, 2).unwrap()
    }

    #[test]
    fn test_rejects_non_positive_principal() {
        let err = Contract::loan(ContractId(1), AccountId(0), 0, 0.05, 1, 12, true, 0).unwrap_err();
        assert!(matches!(err, ContractError::InvalidArgument(_)));
    }

    #[test]
    fn test_rejects_zero_term() {
        assert!(Contract::time_deposit(ContractId(1), AccountId(0), 10, 0.0, 1, 0).is_err());
    }

    #[test]
    fn test_accrue_twice_same_period_is_anachronism() {
        let mut c = loan(1_000, 0.05, 12, true);
        assert_eq!(c.accrue_interest(1).unwrap(), 50);
        assert!(matches!(
            c.accrue_interest(1),
            Err(ContractError::Anachronism { .. })
        ));
        assert_eq!(c.deferred_interest(), 50);
    }

    #[test]
    fn test_accrue_before_origin_is_anachronism() {
        let mut c = Contract::loan(ContractId(1), AccountId(0), 100, 0.1, 5, 2, false, 0).unwrap();
        assert!(matches!(
            c.accrue_interest(4),
            Err(ContractError::Anachronism { period: 4, reference: 5, .. })
        ));
    }

    #[test]
    fn test_amortizing_schedule() {
        let c = loan(1_200, 0.0, 12, true);
        assert_eq!(c.principal_due(1), 0, "no installment in origin period");
        assert_eq!(c.principal_due(2), 100);
        assert_eq!(c.principal_due(13), 1_200, "all due at maturity");
    }

    #[test]
    fn test_non_amortizing_due_only_at_maturity() {
        let c = loan(500, 0.0, 3, false);
        assert_eq!(c.principal_due(3), 0);
        assert_eq!(c.principal_due(4), 500);
    }

    #[test]
    fn test_full_payment_settles_and_further_payments_fail() {
        let mut c = loan(100, 0.0, 1, false);
        c.repay(2, 100).unwrap();
        assert!(c.is_settled());
        assert_eq!(c.repay(2, 1), Err(ContractError::AlreadySettled(ContractId(1))));
        assert_eq!(c.payment(3, 1), Err(ContractError::AlreadySettled(ContractId(1))));
        assert_eq!(c.principal(), 0);
        assert_eq!(c.deferred_interest(), 0);
    }

    #[test]
    fn test_settlement_requires_interest_cleared() {
        let mut c = loan(100, 0.1, 1, false);
        c.accrue_interest(2).unwrap();
        c.repay(2, 100).unwrap();
        assert!(c.is_active(), "10 of interest still outstanding");
        c.pay_interest(2, 10).unwrap();
        assert!(c.is_settled());
    }

    #[test]
    fn test_cancel_exceeding_principal_fails() {
        let mut c = loan(100, 0.0, 1, false);
        assert_eq!(
            c.cancel(1, 101),
            Err(ContractError::AmountExceedsPrincipal {
                amount: 101,
                principal: 100
            })
        );
        c.cancel(1, 40).unwrap();
        assert_eq!(c.principal(), 60);
    }

    #[test]
    fn test_capitalize_moves_interest_into_principal() {
        let mut c = loan(1_000, 0.05, 12, true);
        c.accrue_interest(1).unwrap();
        assert_eq!(c.capitalize_interest().unwrap(), 50);
        assert_eq!(c.principal(), 1_050);
        assert_eq!(c.deferred_interest(), 0);
    }

    #[test]
    fn test_deferral_then_downgrade_then_fatal() {
        // term 1 from period 1: maturity 2, extended maturity 4
        let mut c = loan(100, 0.0, 1, false);
        assert_eq!(c.defer(2).unwrap(), DeferralOutcome::Deferred { new_maturity: 3 });
        assert_eq!(c.defer(3).unwrap(), DeferralOutcome::Deferred { new_maturity: 4 });
        assert_eq!(c.defer(4).unwrap(), DeferralOutcome::Downgraded { new_maturity: 5 });
        assert_eq!(c.standing(), Standing::Doubtful);
        assert!(c.is_valid(5));
        assert!(!c.is_valid(6));
        assert_eq!(c.defer(5).unwrap(), DeferralOutcome::Fatal);
    }

    #[test]
    fn test_time_deposit_deferral_is_unbounded() {
        let mut td = Contract::time_deposit(ContractId(2), AccountId(1), 50, 0.0, 1, 1).unwrap();
        for period in 2..20 {
            assert_eq!(
                td.defer(period).unwrap(),
                DeferralOutcome::Deferred { new_maturity: period + 1 }
            );
        }
        assert_eq!(td.standing(), Standing::Good);
    }

    #[test]
    fn test_cancel_all_marks_cancelled() {
        let mut c = loan(300, 0.1, 2, false);
        c.accrue_interest(1).unwrap();
        assert_eq!(c.cancel_all(2).unwrap(), (300, 30));
        assert_eq!(c.state(), &ContractState::Cancelled { period: 2 });
        assert_eq!(c.repay(2, 1), Err(ContractError::Cancelled(ContractId(1))));
    }
}
