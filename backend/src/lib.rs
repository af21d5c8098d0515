//! Credit Ledger Core - Rust Engine
//!
//! Banking ledger and credit-lifecycle engine for turn-based economic
//! simulations: accounts, loans and time deposits, per-period debt recovery
//! with proportional rationing, and foreclosure of insolvent borrowers.
//!
//! # Architecture
//!
//! - **core**: Logical time and the phase state machine
//! - **models**: Domain types (Amount, Contract, Account, Cheque, Event)
//! - **settlement**: Rationing, debt recovery, foreclosure
//! - **ledger**: The bank (balance sheet, parameters, rate policy, engine)
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 minor units, never negative
//! 2. `assets - liabilities == capital == reserve` after every operation
//! 3. Every account's `debt` equals the principal of its active loans
//! 4. All randomness comes from the caller's seeded [`RngManager`]

pub mod core;
pub mod ledger;
pub mod models;
pub mod rng;
pub mod settlement;

// Re-exports for convenience
pub use core::time::{Phase, PhaseClock, PhaseSequenceError};
pub use ledger::{
    BalanceSheet, BankKind, ConfigError, Environment, Ledger, LedgerError, LedgerParams,
    LedgerSnapshot, NullEnvironment, ParamMap, PeriodReport, RatePolicy, Rates, RecoveryReport,
};
pub use models::{
    account::{Account, AccountId, AccountStatus, HolderId},
    amount::{Amount, AmountError},
    cheque::{Cheque, ChequeId},
    contract::{Contract, ContractError, ContractId, ContractKind, ContractState, DeferralOutcome},
    event::{Event, EventLog},
};
pub use rng::RngManager;
pub use settlement::{ForeclosureReport, Rationing, Sale};
