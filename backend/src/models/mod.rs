//! Domain models for the credit ledger

pub mod account;
pub mod amount;
pub mod cheque;
pub mod contract;
pub mod event;

// Re-exports
pub use account::{Account, AccountId, AccountStatus, HolderId};
pub use amount::{Amount, AmountError};
pub use cheque::{Cheque, ChequeId};
pub use contract::{
    Contract, ContractError, ContractId, ContractKind, ContractState, DeferralOutcome, Instrument,
    Party, Standing,
};
pub use event::{Batch, Event, EventLog};
