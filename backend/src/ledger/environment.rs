//! Collaborator interface used during foreclosure
//!
//! The ledger does not know what a borrower owns or who might buy it. The
//! simulation supplies an [`Environment`] to `debt_recovery`, which the
//! foreclosure resolver consults for collateral values and share sales and
//! notifies when a holder goes bankrupt.

use crate::models::account::HolderId;
use crate::settlement::foreclosure::{ForeclosureReport, Sale};

pub trait Environment {
    /// Value of what `holder` owns besides its deposit (inventory, capital
    /// goods, equity stakes). Used for the insolvency test and the target
    /// leverage after foreclosure.
    ///
    /// The default of 0 means a borrower who spends its loan is insolvent
    /// from that period on, and is foreclosed with all debt written down once
    /// the streak reaches `bankruptcy.patience`. Simulations where borrowers
    /// buy goods with their loans must override this.
    fn collateral_value(&self, _holder: &HolderId) -> i64 {
        0
    }

    /// Auction the defaulted holder's equity
    fn sell(&mut self, _holder: &HolderId, _period: usize) -> Vec<Sale> {
        Vec::new()
    }

    /// Called at most once per holder, ever, even when the holder loses
    /// several accounts
    fn on_bankrupt(&mut self, _holder: &HolderId, _period: usize) {}

    /// Sent to owners and remaining creditors after each foreclosure
    fn notify_default(&mut self, _report: &ForeclosureReport) {}
}

/// No collateral, no buyers, nobody listening
///
/// Only suitable where borrowers keep their loans on deposit: any debt not
/// covered by the deposit counts as insolvency.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEnvironment;

impl Environment for NullEnvironment {}
