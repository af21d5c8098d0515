//! Logical time for the ledger
//!
//! The simulation advances in discrete periods. Within a period the scheduler
//! must drive the ledger through a fixed sequence of phases:
//!
//! ```text
//! Idle --open()--> Open --debt_recovery()--> DebtRecovered
//!      --pay_dividend()--> DividendPaid --close()--> Idle
//! ```
//!
//! Collaborators trade (lend, place deposits, write cheques) only while the
//! period is `Open`. Calling a phase entry point twice, or out of order, is a
//! [`PhaseSequenceError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Phase of the current period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Between two periods (also the state before the first `open()`)
    Idle,
    /// Trading phases: collaborators may lend, borrow and pay
    Open,
    /// Debt recovery has run for this period
    DebtRecovered,
    /// Dividend has been paid (possibly zero) for this period
    DividendPaid,
}

impl Phase {
    fn successor(self) -> Phase {
        match self {
            Phase::Idle => Phase::Open,
            Phase::Open => Phase::DebtRecovered,
            Phase::DebtRecovered => Phase::DividendPaid,
            Phase::DividendPaid => Phase::Idle,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("Phase sequence error in period {period}: cannot {attempted} while {current:?}")]
pub struct PhaseSequenceError {
    pub attempted: &'static str,
    pub current: Phase,
    pub period: usize,
}

/// Period counter plus phase state machine
///
/// # Example
/// ```
/// use credit_ledger_core_rs::core::time::{Phase, PhaseClock};
///
/// let mut clock = PhaseClock::new();
/// assert_eq!(clock.open().unwrap(), 1);
/// clock.advance(Phase::DebtRecovered, "recover debt").unwrap();
/// assert!(clock.advance(Phase::DebtRecovered, "recover debt").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseClock {
    period: usize,
    phase: Phase,
}

impl PhaseClock {
    pub fn new() -> Self {
        Self {
            period: 0,
            phase: Phase::Idle,
        }
    }

    /// Start the next period. Returns the new period number (first is 1).
    pub fn open(&mut self) -> Result<usize, PhaseSequenceError> {
        self.advance(Phase::Open, "open")?;
        self.period += 1;
        Ok(self.period)
    }

    /// Move to `target`, which must be the immediate successor of the
    /// current phase.
    pub fn advance(
        &mut self,
        target: Phase,
        attempted: &'static str,
    ) -> Result<(), PhaseSequenceError> {
        if self.phase.successor() != target {
            return Err(self.error(attempted));
        }
        self.phase = target;
        Ok(())
    }

    /// Fail unless the clock is in `expected`
    pub fn require(&self, expected: Phase, attempted: &'static str) -> Result<(), PhaseSequenceError> {
        if self.phase != expected {
            return Err(self.error(attempted));
        }
        Ok(())
    }

    fn error(&self, attempted: &'static str) -> PhaseSequenceError {
        PhaseSequenceError {
            attempted,
            current: self.phase,
            period: self.period,
        }
    }

    /// Current period (0 before the first `open()`)
    pub fn period(&self) -> usize {
        self.period
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl Default for PhaseClock {
    fn default() -> Self {
        Self::new()
    }
}
