//! Ledger error taxonomy
//!
//! Two classes of failure surface as `Err`:
//! - precondition violations (bad amounts, closed accounts, wrong phase):
//!   the operation is rejected and nothing changes;
//! - consistency failures and bank insolvency: [`LedgerError::is_fatal`]
//!   returns true and the ledger refuses every further call.
//!
//! Illiquidity and bankruptcy of account holders are not errors. They are
//! recorded as events, account flags and report counters.

use crate::core::time::PhaseSequenceError;
use crate::ledger::params::ConfigError;
use crate::models::account::AccountId;
use crate::models::amount::AmountError;
use crate::models::cheque::ChequeId;
use crate::models::contract::ContractError;
use crate::settlement::rationing::RationingError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("Invalid amount {amount}: must be positive")]
    InvalidAmount { amount: i64 },

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("Overflow: cannot add {amount} to {balance}")]
    Overflow { balance: i64, amount: i64 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Account {0} is closed")]
    AccountClosed(AccountId),

    #[error("Unknown cheque {0}")]
    UnknownCheque(ChequeId),

    #[error("Cheque {0} already redeemed")]
    AlreadyRedeemed(ChequeId),

    #[error("Anachronism: expected period {expected}, got {actual}")]
    Anachronism { expected: usize, actual: usize },

    #[error(transparent)]
    PhaseSequence(#[from] PhaseSequenceError),

    #[error("Contract error: {0}")]
    Contract(#[from] ContractError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid sale: {0}")]
    InvalidSale(String),

    #[error("Ledger inconsistency: {0}")]
    Inconsistent(String),

    #[error("Bank insolvent: write-off exceeds reserve by {shortfall}")]
    BankInsolvent { shortfall: i64 },

    #[error("Ledger has failed and accepts no further operations")]
    LedgerFailed,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LedgerError {
    /// Errors after which the ledger state can no longer be trusted
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LedgerError::Inconsistent(_) | LedgerError::BankInsolvent { .. } | LedgerError::LedgerFailed
        )
    }
}

impl From<AmountError> for LedgerError {
    fn from(err: AmountError) -> Self {
        match err {
            AmountError::InvalidAmount { amount } => LedgerError::InvalidAmount { amount },
            AmountError::InsufficientFunds {
                required,
                available,
            } => LedgerError::InsufficientFunds {
                required,
                available,
            },
            AmountError::Overflow { balance, amount } => LedgerError::Overflow { balance, amount },
        }
    }
}

impl From<RationingError> for LedgerError {
    fn from(err: RationingError) -> Self {
        LedgerError::Inconsistent(err.to_string())
    }
}
