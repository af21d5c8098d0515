//! The bank: balance sheet, configuration, rate policy and the period engine

pub mod book;
pub mod engine;
pub mod environment;
pub mod error;
pub mod params;
pub mod policy;
pub mod snapshot;

pub use book::BalanceSheet;
pub use engine::{Ledger, PeriodReport, RecoveryReport};
pub use environment::{Environment, NullEnvironment};
pub use error::LedgerError;
pub use params::{ConfigError, LedgerParams, ParamMap};
pub use policy::{BankKind, CapitalTargetingRates, FixedRates, RateContext, RatePolicy, Rates};
pub use snapshot::{compute_hash, LedgerSnapshot};
