//! Deterministic random number generation
//!
//! The ledger never owns randomness. The simulation owns one [`RngManager`]
//! and lends it to [`crate::Ledger::debt_recovery`], which uses it to shuffle
//! the order in which accounts are visited.

mod xorshift;

pub use xorshift::RngManager;
