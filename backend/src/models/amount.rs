//! Amount: the non-negative balance primitive
//!
//! Every deposit, principal and pool in the ledger is an [`Amount`]. It can
//! only move through `credit` and `debit`, both of which reject non-positive
//! values. `debit` refuses to go below zero and `credit` refuses to overflow.
//!
//! CRITICAL: All money values are i64 (minor units)

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AmountError {
    #[error("Invalid amount {amount}: must be positive")]
    InvalidAmount { amount: i64 },

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("Overflow: cannot add {amount} to {balance}")]
    Overflow { balance: i64, amount: i64 },
}

/// Non-negative integer balance
///
/// # Example
/// ```
/// use credit_ledger_core_rs::Amount;
///
/// let mut deposit = Amount::zero();
/// deposit.credit(1_000).unwrap();
/// deposit.debit(400).unwrap();
/// assert_eq!(deposit.value(), 600);
/// assert!(deposit.debit(601).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(i64);

impl Amount {
    pub fn zero() -> Self {
        Self(0)
    }

    /// Build from an opening value. Negative values are rejected.
    pub fn new(value: i64) -> Result<Self, AmountError> {
        if value < 0 {
            return Err(AmountError::InvalidAmount { amount: value });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn credit(&mut self, amount: i64) -> Result<(), AmountError> {
        if amount <= 0 {
            return Err(AmountError::InvalidAmount { amount });
        }
        self.0 = self.0.checked_add(amount).ok_or(AmountError::Overflow {
            balance: self.0,
            amount,
        })?;
        Ok(())
    }

    pub fn debit(&mut self, amount: i64) -> Result<(), AmountError> {
        if amount <= 0 {
            return Err(AmountError::InvalidAmount { amount });
        }
        if amount > self.0 {
            return Err(AmountError::InsufficientFunds {
                required: amount,
                available: self.0,
            });
        }
        self.0 -= amount;
        Ok(())
    }

    /// Credit that treats zero as a no-op (batch payments often round to 0)
    pub(crate) fn credit_nonneg(&mut self, amount: i64) -> Result<(), AmountError> {
        if amount == 0 {
            return Ok(());
        }
        self.credit(amount)
    }

    /// Debit that treats zero as a no-op
    pub(crate) fn debit_nonneg(&mut self, amount: i64) -> Result<(), AmountError> {
        if amount == 0 {
            return Ok(());
        }
        self.debit(amount)
    }

    /// Debit whatever is available up to `amount`, returning what was taken
    pub(crate) fn drain_up_to(&mut self, amount: i64) -> i64 {
        let taken = amount.clamp(0, self.0);
        self.0 -= taken;
        taken
    }
}
