//! Event logging for auditing ledger activity.
//!
//! Every step that moves money is recorded as an [`Event`] tagged with the
//! period it happened in. The log is the audit trail collaborators and tests
//! query after a phase completes; the ledger itself never reads it back.
//!
//! # Example
//!
//! ```rust
//! use credit_ledger_core_rs::models::event::{Event, EventLog};
//! use credit_ledger_core_rs::models::account::{AccountId, HolderId};
//!
//! let mut log = EventLog::new();
//! log.log(Event::AccountOpened {
//!     period: 1,
//!     account: AccountId(0),
//!     holder: HolderId::new("HH_1"),
//! });
//! assert_eq!(log.events_of_type("AccountOpened").len(), 1);
//! ```

use crate::models::account::{AccountId, HolderId};
use crate::models::contract::{ContractId, Party};
use serde::Serialize;

/// Which half of a debt-recovery round a rationing event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Batch {
    Interest,
    Principal,
}

/// Ledger event capturing a state change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Event {
    PeriodOpened {
        period: usize,
        loan_rate: f64,
        deposit_rate: f64,
    },

    AccountOpened {
        period: usize,
        account: AccountId,
        holder: HolderId,
    },

    LoanOriginated {
        period: usize,
        account: AccountId,
        contract: ContractId,
        principal: i64,
        rate: f64,
        maturity: usize,
        amortized: bool,
    },

    TimeDepositPlaced {
        period: usize,
        account: AccountId,
        contract: ContractId,
        principal: i64,
        rate: f64,
        maturity: usize,
    },

    ChequeIssued {
        period: usize,
        account: AccountId,
        amount: i64,
    },

    ChequeDeposited {
        period: usize,
        account: AccountId,
        drawer: AccountId,
        amount: i64,
    },

    /// Unredeemed cheque returned to its drawer at close
    ChequeRefunded {
        period: usize,
        account: AccountId,
        amount: i64,
    },

    /// Borrower paid billed loan interest
    InterestPaid {
        period: usize,
        account: AccountId,
        contract: ContractId,
        amount: i64,
    },

    PrincipalRepaid {
        period: usize,
        account: AccountId,
        contract: ContractId,
        amount: i64,
    },

    /// Unpaid loan interest rolled into principal
    InterestCapitalized {
        period: usize,
        account: AccountId,
        contract: ContractId,
        amount: i64,
    },

    /// Bank paid interest on a time deposit
    DepositInterestPaid {
        period: usize,
        account: AccountId,
        contract: ContractId,
        amount: i64,
    },

    /// Bank redeemed time-deposit principal
    DepositRedeemed {
        period: usize,
        account: AccountId,
        contract: ContractId,
        amount: i64,
    },

    /// A batch of obligations was paid pro rata
    Rationed {
        period: usize,
        payer: Party,
        batch: Batch,
        total_due: i64,
        paid: i64,
    },

    ContractDeferred {
        period: usize,
        account: AccountId,
        contract: ContractId,
        new_maturity: usize,
    },

    ContractDowngraded {
        period: usize,
        account: AccountId,
        contract: ContractId,
        new_maturity: usize,
    },

    ContractSettled {
        period: usize,
        account: AccountId,
        contract: ContractId,
    },

    AccountIlliquid {
        period: usize,
        account: AccountId,
        streak: usize,
    },

    DebtCancelled {
        period: usize,
        account: AccountId,
        contract: ContractId,
        amount: i64,
    },

    SharesSold {
        period: usize,
        account: AccountId,
        buyer: AccountId,
        price: i64,
        share: f64,
    },

    /// The environment's bids were invalid; foreclosure went ahead without buyers
    SalesRejected {
        period: usize,
        account: AccountId,
        reason: String,
    },

    Foreclosure {
        period: usize,
        account: AccountId,
        debt_before: i64,
        cancelled: i64,
        recovered: i64,
        written_off: i64,
    },

    AccountClosed {
        period: usize,
        account: AccountId,
    },

    DividendPaid {
        period: usize,
        account: AccountId,
        amount: i64,
    },

    PeriodClosed {
        period: usize,
        assets: i64,
        liabilities: i64,
        capital: i64,
    },
}

impl Event {
    /// Period the event occurred in
    pub fn period(&self) -> usize {
        match self {
            Event::PeriodOpened { period, .. }
            | Event::AccountOpened { period, .. }
            | Event::LoanOriginated { period, .. }
            | Event::TimeDepositPlaced { period, .. }
            | Event::ChequeIssued { period, .. }
            | Event::ChequeDeposited { period, .. }
            | Event::ChequeRefunded { period, .. }
            | Event::InterestPaid { period, .. }
            | Event::PrincipalRepaid { period, .. }
            | Event::InterestCapitalized { period, .. }
            | Event::DepositInterestPaid { period, .. }
            | Event::DepositRedeemed { period, .. }
            | Event::Rationed { period, .. }
            | Event::ContractDeferred { period, .. }
            | Event::ContractDowngraded { period, .. }
            | Event::ContractSettled { period, .. }
            | Event::AccountIlliquid { period, .. }
            | Event::DebtCancelled { period, .. }
            | Event::SharesSold { period, .. }
            | Event::SalesRejected { period, .. }
            | Event::Foreclosure { period, .. }
            | Event::AccountClosed { period, .. }
            | Event::DividendPaid { period, .. }
            | Event::PeriodClosed { period, .. } => *period,
        }
    }

    /// Short name of the event variant
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::PeriodOpened { .. } => "PeriodOpened",
            Event::AccountOpened { .. } => "AccountOpened",
            Event::LoanOriginated { .. } => "LoanOriginated",
            Event::TimeDepositPlaced { .. } => "TimeDepositPlaced",
            Event::ChequeIssued { .. } => "ChequeIssued",
            Event::ChequeDeposited { .. } => "ChequeDeposited",
            Event::ChequeRefunded { .. } => "ChequeRefunded",
            Event::InterestPaid { .. } => "InterestPaid",
            Event::PrincipalRepaid { .. } => "PrincipalRepaid",
            Event::InterestCapitalized { .. } => "InterestCapitalized",
            Event::DepositInterestPaid { .. } => "DepositInterestPaid",
            Event::DepositRedeemed { .. } => "DepositRedeemed",
            Event::Rationed { .. } => "Rationed",
            Event::ContractDeferred { .. } => "ContractDeferred",
            Event::ContractDowngraded { .. } => "ContractDowngraded",
            Event::ContractSettled { .. } => "ContractSettled",
            Event::AccountIlliquid { .. } => "AccountIlliquid",
            Event::DebtCancelled { .. } => "DebtCancelled",
            Event::SharesSold { .. } => "SharesSold",
            Event::SalesRejected { .. } => "SalesRejected",
            Event::Foreclosure { .. } => "Foreclosure",
            Event::AccountClosed { .. } => "AccountClosed",
            Event::DividendPaid { .. } => "DividendPaid",
            Event::PeriodClosed { .. } => "PeriodClosed",
        }
    }

    /// Account the event is about, if any
    pub fn account_id(&self) -> Option<AccountId> {
        match self {
            Event::AccountOpened { account, .. }
            | Event::LoanOriginated { account, .. }
            | Event::TimeDepositPlaced { account, .. }
            | Event::ChequeIssued { account, .. }
            | Event::ChequeDeposited { account, .. }
            | Event::ChequeRefunded { account, .. }
            | Event::InterestPaid { account, .. }
            | Event::PrincipalRepaid { account, .. }
            | Event::InterestCapitalized { account, .. }
            | Event::DepositInterestPaid { account, .. }
            | Event::DepositRedeemed { account, .. }
            | Event::ContractDeferred { account, .. }
            | Event::ContractDowngraded { account, .. }
            | Event::ContractSettled { account, .. }
            | Event::AccountIlliquid { account, .. }
            | Event::DebtCancelled { account, .. }
            | Event::SharesSold { account, .. }
            | Event::SalesRejected { account, .. }
            | Event::Foreclosure { account, .. }
            | Event::AccountClosed { account, .. }
            | Event::DividendPaid { account, .. } => Some(*account),
            Event::Rationed {
                payer: Party::Account(account),
                ..
            } => Some(*account),
            _ => None,
        }
    }
}

/// Event log for storing and querying ledger events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn events_in_period(&self, period: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.period() == period).collect()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    pub fn events_for_account(&self, account: AccountId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.account_id() == Some(account))
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
