//! Cheques
//!
//! A cheque is a single-use bearer claim for a fixed amount, drawn on one
//! account. Issuing it debits the drawer immediately; the funds then sit in
//! the ledger's outstanding-cheque liability until a payee deposits it.
//! The ledger keeps the register of which serials were already redeemed, so
//! cloning a `Cheque` cannot double-spend it.

use crate::models::account::AccountId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unguessable cheque serial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChequeId(Uuid);

impl ChequeId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ChequeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chq_{}", self.0.simple())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cheque {
    id: ChequeId,
    drawer: AccountId,
    amount: i64,
    issued_at: usize,
}

impl Cheque {
    pub(crate) fn new(drawer: AccountId, amount: i64, issued_at: usize) -> Self {
        Self {
            id: ChequeId::generate(),
            drawer,
            amount,
            issued_at,
        }
    }

    pub fn id(&self) -> ChequeId {
        self.id
    }

    pub fn drawer(&self) -> AccountId {
        self.drawer
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Period the cheque was written in; it can only be deposited then
    pub fn issued_at(&self) -> usize {
        self.issued_at
    }
}

/// Ledger-side record of an issued cheque
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ChequeRecord {
    pub drawer: AccountId,
    pub amount: i64,
    pub issued_at: usize,
    pub redeemed: bool,
}
