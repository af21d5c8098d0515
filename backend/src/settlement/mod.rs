//! Settlement of due obligations
//!
//! - `rationing`: pro-rata allocation of cash that cannot cover a batch
//! - `recovery`: the per-period debt-recovery protocol
//! - `foreclosure`: resolution of accounts that stayed distressed too long

pub mod foreclosure;
pub mod rationing;
pub mod recovery;

pub use foreclosure::{foreclose, ForeclosureReport, Sale};
pub use rationing::{ration, split_proportionally, Rationing, RationingError};
pub use recovery::{recover_account, recover_time_deposits, AccountRecovery, BankRecovery};
