//! Scripted toy economy driving the ledger
//!
//! Firms borrow to cover their wage bill and pay wages by cheque.
//! Households spend part of their deposit at a random firm, save a slice of
//! what is left in time deposits and own the bank. A firm that stays
//! distressed is foreclosed; households bid for its equity and its workers
//! move to a surviving firm.

use crate::error::CliResult;
use credit_ledger_core_rs::{
    AccountId, Environment, ForeclosureReport, HolderId, Ledger, LedgerError, PeriodReport,
    RngManager, Sale,
};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Scenario {
    pub firms: usize,
    pub households: usize,
    pub wage: i64,
    pub seed: u64,
}

/// What the ledger sees of the real side during foreclosure
#[derive(Debug, Default)]
struct Market {
    collateral: HashMap<HolderId, i64>,
    /// Households and the cash they can bid with
    buyers: Vec<(AccountId, i64)>,
    bankrupt: Vec<HolderId>,
}

impl Environment for Market {
    fn collateral_value(&self, holder: &HolderId) -> i64 {
        self.collateral.get(holder).copied().unwrap_or(0)
    }

    fn sell(&mut self, holder: &HolderId, _period: usize) -> Vec<Sale> {
        let value = self.collateral_value(holder);
        if value <= 0 {
            return Vec::new();
        }
        self.buyers.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut bids = Vec::new();
        for (buyer, cash) in self.buyers.iter_mut().take(3) {
            let price = (*cash / 2).min(value / 3);
            if price > 0 {
                *cash -= price;
                bids.push((*buyer, price));
            }
        }
        let share = 1.0 / bids.len().max(1) as f64;
        bids.into_iter()
            .map(|(buyer, price)| Sale { buyer, price, share })
            .collect()
    }

    fn on_bankrupt(&mut self, holder: &HolderId, period: usize) {
        tracing::warn!("period {}: {} is bankrupt", period, holder);
        self.bankrupt.push(holder.clone());
    }

    fn notify_default(&mut self, report: &ForeclosureReport) {
        tracing::info!(
            "{} defaulted on {}: {} recovered, {} written off",
            report.holder,
            report.debt_before,
            report.recovered,
            report.written_off
        );
    }
}

pub struct Economy {
    ledger: Ledger,
    rng: RngManager,
    market: Market,
    firms: Vec<AccountId>,
    households: Vec<AccountId>,
    /// Index into `firms` for every household
    employer: Vec<usize>,
    wage: i64,
}

/// Keep going on rejected operations, stop on fatal ones
fn attempt<T>(result: Result<T, LedgerError>) -> CliResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_fatal() => Err(err.into()),
        Err(err) => {
            tracing::debug!("operation rejected: {}", err);
            Ok(None)
        }
    }
}

impl Economy {
    pub fn new(mut ledger: Ledger, scenario: &Scenario) -> CliResult<Self> {
        let firms = (0..scenario.firms)
            .map(|i| ledger.open_account(format!("FIRM_{}", i)))
            .collect::<Result<Vec<_>, _>>()?;
        let households = (0..scenario.households)
            .map(|i| ledger.open_account(format!("HH_{}", i)))
            .collect::<Result<Vec<_>, _>>()?;
        ledger.set_shareholders(households.iter().map(|&id| (id, 1)).collect())?;

        Ok(Self {
            ledger,
            rng: RngManager::new(scenario.seed),
            market: Market::default(),
            employer: (0..households.len()).map(|i| i % firms.len()).collect(),
            firms,
            households,
            wage: scenario.wage,
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn bankruptcies(&self) -> usize {
        self.market.bankrupt.len()
    }

    fn live_firms(&self) -> Vec<usize> {
        (0..self.firms.len())
            .filter(|&i| {
                self.ledger
                    .account(self.firms[i])
                    .map(|a| a.is_open())
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Run one full period and return the verified books
    pub fn step(&mut self) -> CliResult<PeriodReport> {
        let period = self.ledger.open()?;
        let live = self.live_firms();

        for &f in &live {
            let firm = self.firms[f];
            let workers: Vec<AccountId> = self
                .households
                .iter()
                .zip(&self.employer)
                .filter(|(_, e)| **e == f)
                .map(|(&hh, _)| hh)
                .collect();
            let bill = self.wage * workers.len() as i64;
            if bill > 0 && self.ledger.amount(firm)? < bill {
                attempt(self.ledger.lend(firm, bill * 3, 8, true))?;
            }
            for hh in workers {
                if let Some(cheque) = attempt(self.ledger.issue_cheque(firm, self.wage))? {
                    attempt(self.ledger.deposit_cheque(hh, &cheque))?;
                }
            }
            self.market.collateral.insert(
                self.ledger.account(firm)?.holder().clone(),
                bill * 2,
            );
        }

        for i in 0..self.households.len() {
            let hh = self.households[i];
            let cash = self.ledger.amount(hh)?;
            let spend = cash * self.rng.range(40, 80) / 100;
            if spend > 0 && !live.is_empty() {
                let shop = self.firms[live[self.rng.index(live.len())]];
                if let Some(cheque) = attempt(self.ledger.issue_cheque(hh, spend))? {
                    attempt(self.ledger.deposit_cheque(shop, &cheque))?;
                }
            }
            let left = self.ledger.amount(hh)?;
            if left > 2 * self.wage {
                attempt(self.ledger.place_time_deposit(hh, left / 10, 4))?;
            }
        }

        self.market.buyers = self
            .households
            .iter()
            .map(|&hh| Ok((hh, self.ledger.amount(hh)?)))
            .collect::<Result<Vec<_>, LedgerError>>()?;
        let recovery = self.ledger.debt_recovery(&mut self.rng, &mut self.market)?;

        let survivors = self.live_firms();
        if survivors.is_empty() {
            tracing::warn!("period {}: no firm left to employ households", period);
        } else if !recovery.foreclosures.is_empty() {
            let closed: Vec<usize> = recovery
                .foreclosures
                .iter()
                .filter_map(|r| self.firms.iter().position(|&f| f == r.account))
                .collect();
            for e in self.employer.iter_mut().filter(|e| closed.contains(&**e)) {
                *e = survivors[self.rng.index(survivors.len())];
            }
        }

        self.ledger.pay_dividend()?;
        Ok(self.ledger.close()?)
    }
}
