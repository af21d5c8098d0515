//! Ledger snapshots and state digests
//!
//! A snapshot is the reproducible part of the ledger state: period, books,
//! and every account with its contracts. Cheque serials are random and left
//! out, so two runs with the same seed and the same calls produce the same
//! digest.

use crate::core::time::Phase;
use crate::ledger::book::BalanceSheet;
use crate::ledger::engine::Ledger;
use crate::ledger::error::LedgerError;
use crate::ledger::params::LedgerParams;
use crate::ledger::policy::Rates;
use crate::models::account::{AccountId, AccountStatus, HolderId};
use crate::models::contract::{Contract, ContractKind, ContractState, Instrument};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub period: usize,
    pub phase: Phase,
    pub params: LedgerParams,
    pub rates: Rates,
    pub book: BalanceSheet,
    pub accounts: Vec<AccountSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub id: AccountId,
    pub holder: HolderId,
    pub amount: i64,
    pub debt: i64,
    pub status: AccountStatus,
    pub illiquid_streak: usize,
    pub insolvent_streak: usize,
    pub contracts: Vec<ContractSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractSnapshot {
    pub id: u64,
    pub instrument: Instrument,
    pub kind: ContractKind,
    pub state: ContractState,
    pub principal: i64,
    pub deferred_interest: i64,
    pub rate: f64,
    pub origin: usize,
    pub maturity: usize,
}

impl From<&Contract> for ContractSnapshot {
    fn from(contract: &Contract) -> Self {
        ContractSnapshot {
            id: contract.id().0,
            instrument: contract.instrument(),
            kind: contract.kind(),
            state: contract.state().clone(),
            principal: contract.principal(),
            deferred_interest: contract.deferred_interest(),
            rate: contract.rate(),
            origin: contract.origin(),
            maturity: contract.maturity(),
        }
    }
}

impl From<&Ledger> for LedgerSnapshot {
    fn from(ledger: &Ledger) -> Self {
        let accounts = ledger
            .accounts()
            .iter()
            .map(|account| AccountSnapshot {
                id: account.id(),
                holder: account.holder().clone(),
                amount: account.amount(),
                debt: account.debt(),
                status: account.status().clone(),
                illiquid_streak: account.illiquid_streak(),
                insolvent_streak: account.insolvent_streak(),
                contracts: account
                    .loans()
                    .iter()
                    .chain(account.time_deposits())
                    .map(ContractSnapshot::from)
                    .collect(),
            })
            .collect();
        LedgerSnapshot {
            period: ledger.period(),
            phase: ledger.phase(),
            params: ledger.params().clone(),
            rates: ledger.rates(),
            book: ledger.balance_sheet().clone(),
            accounts,
        }
    }
}

/// SHA-256 of `value` serialised as JSON with sorted object keys
pub fn compute_hash<T: Serialize>(value: &T) -> Result<String, LedgerError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(value)
        .map_err(|e| LedgerError::Serialization(format!("snapshot serialization failed: {}", e)))?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value))
        .map_err(|e| LedgerError::Serialization(format!("snapshot serialization failed: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

impl Ledger {
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot::from(self)
    }

    /// Digest of [`Ledger::snapshot`]
    pub fn state_digest(&self) -> Result<String, LedgerError> {
        compute_hash(&self.snapshot())
    }
}
