//! Foreclosure
//!
//! Resolves a borrower flagged by debt recovery (distress streak reached
//! `bankruptcy.patience`, or a non-performing loan missed again):
//!
//! 1. Unless its own funds cover the debt, ask the environment for share
//!    sales and validate them. Invalid bids are dropped, not fatal
//! 2. Set off the holder's own time deposits into its deposit
//! 3. Apply the deposit to loan principal
//! 4. If nothing is owed any more the account recovers and stays open
//! 5. Write debt down to `leverage.target × collateral`
//! 6. Buyers pay (at most the remaining debt); proceeds repay principal
//! 7. Write off whatever is left and close the account for good
//!
//! Write-offs are charged to the bank's reserve. A write-off the reserve
//! cannot absorb is a bank insolvency and stops the ledger. Telling the
//! environment about the closure is left to the caller, which knows whether
//! the holder was already declared bankrupt.

use crate::ledger::book::BalanceSheet;
use crate::ledger::environment::Environment;
use crate::ledger::error::LedgerError;
use crate::ledger::params::LedgerParams;
use crate::models::account::{Account, AccountId, HolderId};
use crate::models::event::{Event, EventLog};
use crate::settlement::rationing::{ration, split_proportionally};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One buyer's bid for part of a defaulted holder's equity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    /// Account the price is paid from
    pub buyer: AccountId,
    pub price: i64,
    /// Fraction of the equity bought, in (0, 1]
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForeclosureReport {
    pub account: AccountId,
    pub holder: HolderId,
    pub period: usize,
    pub debt_before: i64,
    /// Time-deposit principal set off against the loans
    pub setoff: i64,
    /// Written down to the target leverage
    pub cancelled: i64,
    /// Repaid from the deposit and from share sales
    pub recovered: i64,
    /// Written off at closure
    pub written_off: i64,
    pub sales: Vec<Sale>,
}

/// Foreclose the account at `idx`
///
/// Returns `None` when the set-off and deposit cover the debt, in which case
/// the account stays open with its distress streaks cleared.
pub fn foreclose(
    book: &mut BalanceSheet,
    accounts: &mut [Account],
    idx: usize,
    period: usize,
    params: &LedgerParams,
    env: &mut dyn Environment,
    events: &mut EventLog,
) -> Result<Option<ForeclosureReport>, LedgerError> {
    let account = accounts
        .get(idx)
        .ok_or(LedgerError::AccountNotFound(AccountId(idx)))?;
    let id = account.id();
    if !account.is_open() {
        return Err(LedgerError::AccountClosed(id));
    }
    let holder = account.holder().clone();
    let debt_before = account.debt();
    let covered = account.amount() + account.time_deposit_balance() >= debt_before;

    // Bids are checked before any balance moves
    let sales = if covered {
        Vec::new()
    } else {
        accepted_sales(accounts, idx, period, env, events)
    };

    let account = &mut accounts[idx];
    let setoff = set_off_time_deposits(book, account, period, events)?;
    let mut recovered = repay_from_deposit(book, account, period, events)?;

    if account.debt() == 0 {
        account.clear_distress();
        tracing::info!("{} ({}) covered its debt, foreclosure dropped", id, holder);
        return Ok(None);
    }

    let collateral = env.collateral_value(&holder).max(0);
    let account = &mut accounts[idx];
    let target = (params.target_leverage * collateral as f64).floor() as i64;
    let cancelled = (account.debt() - target).clamp(0, account.debt());
    write_down(book, account, period, cancelled, events)?;

    let proceeds = collect_proceeds(accounts, idx, &sales, period, events)?;
    let account = &mut accounts[idx];
    repay_principal(book, account, period, proceeds, events)?;
    recovered += proceeds;

    let written_off = account.debt();
    charge_reserve(book, written_off, id)?;
    for loan in account.loans_mut().iter_mut().filter(|c| c.is_active()) {
        let (principal, _forgone_interest) = loan.cancel_all(period)?;
        if principal > 0 {
            book.post_write_off(principal)?;
            events.log(Event::DebtCancelled {
                period,
                account: id,
                contract: loan.id(),
                amount: principal,
            });
        }
    }
    account.adjust_debt(-written_off)?;

    if account.amount() != 0 {
        return Err(LedgerError::Inconsistent(format!(
            "{} closing with deposit {}",
            id,
            account.amount()
        )));
    }
    account.close(period);
    account.clear_distress();
    events.log(Event::AccountClosed { period, account: id });

    let report = ForeclosureReport {
        account: id,
        holder,
        period,
        debt_before,
        setoff,
        cancelled,
        recovered,
        written_off,
        sales,
    };
    events.log(Event::Foreclosure {
        period,
        account: id,
        debt_before,
        cancelled,
        recovered,
        written_off,
    });
    tracing::info!(
        "foreclosed {} ({}): debt {}, cancelled {}, recovered {}, written off {}",
        id,
        report.holder,
        debt_before,
        cancelled,
        recovered,
        written_off
    );
    Ok(Some(report))
}

fn set_off_time_deposits(
    book: &mut BalanceSheet,
    account: &mut Account,
    period: usize,
    events: &mut EventLog,
) -> Result<i64, LedgerError> {
    let id = account.id();
    let (deposits, deposit) = account.time_deposits_and_deposit_mut();
    let mut total = 0;
    for td in deposits.iter_mut().filter(|c| c.is_active()) {
        let (principal, _) = td.cancel_all(period)?;
        if principal == 0 {
            continue;
        }
        book.post_time_deposit_setoff(principal);
        deposit.credit(principal)?;
        total += principal;
        events.log(Event::DepositRedeemed {
            period,
            account: id,
            contract: td.id(),
            amount: principal,
        });
    }
    Ok(total)
}

fn repay_from_deposit(
    book: &mut BalanceSheet,
    account: &mut Account,
    period: usize,
    events: &mut EventLog,
) -> Result<i64, LedgerError> {
    let cash = account.amount().min(account.debt());
    if cash == 0 {
        return Ok(0);
    }
    account.deposit_mut().debit(cash)?;
    repay_principal(book, account, period, cash, events)?;
    Ok(cash)
}

/// Spread `amount` of incoming cash over loan principal, pro rata
fn repay_principal(
    book: &mut BalanceSheet,
    account: &mut Account,
    period: usize,
    amount: i64,
    events: &mut EventLog,
) -> Result<(), LedgerError> {
    if amount == 0 {
        return Ok(());
    }
    let id = account.id();
    let dues: Vec<i64> = account
        .loans()
        .iter()
        .map(|c| if c.is_active() { c.principal() } else { 0 })
        .collect();
    let outcome = ration(amount, &dues)?;
    if outcome.paid != amount {
        return Err(LedgerError::Inconsistent(format!(
            "{} received {} but only {} principal is outstanding",
            id, amount, outcome.total_due
        )));
    }

    for (loan, &part) in account.loans_mut().iter_mut().zip(&outcome.payments) {
        if part == 0 {
            continue;
        }
        loan.repay(period, part)?;
        book.post_principal_repaid(part)?;
        events.log(Event::PrincipalRepaid {
            period,
            account: id,
            contract: loan.id(),
            amount: part,
        });
    }
    account.adjust_debt(-amount)?;
    Ok(())
}

fn write_down(
    book: &mut BalanceSheet,
    account: &mut Account,
    period: usize,
    amount: i64,
    events: &mut EventLog,
) -> Result<(), LedgerError> {
    if amount == 0 {
        return Ok(());
    }
    let id = account.id();
    charge_reserve(book, amount, id)?;

    let weights: Vec<i64> = account
        .loans()
        .iter()
        .map(|c| if c.is_active() { c.principal() } else { 0 })
        .collect();
    let parts = split_proportionally(amount, &weights)?;
    for (loan, &part) in account.loans_mut().iter_mut().zip(&parts) {
        if part == 0 {
            continue;
        }
        loan.cancel(period, part)?;
        book.post_write_off(part)?;
        events.log(Event::DebtCancelled {
            period,
            account: id,
            contract: loan.id(),
            amount: part,
        });
    }
    account.adjust_debt(-amount)?;
    Ok(())
}

/// Refuse a write-off up front rather than halfway through the loans
fn charge_reserve(book: &BalanceSheet, amount: i64, account: AccountId) -> Result<(), LedgerError> {
    if amount > book.reserve() {
        let shortfall = amount - book.reserve();
        tracing::error!(
            "bank cannot absorb write-off of {} on {}: reserve short by {}",
            amount,
            account,
            shortfall
        );
        return Err(LedgerError::BankInsolvent { shortfall });
    }
    Ok(())
}

/// Ask for bids on the debtor's equity. Invalid bids are logged and dropped.
fn accepted_sales(
    accounts: &[Account],
    debtor: usize,
    period: usize,
    env: &mut dyn Environment,
    events: &mut EventLog,
) -> Vec<Sale> {
    let id = accounts[debtor].id();
    let sales = env.sell(accounts[debtor].holder(), period);
    match validate_sales(accounts, debtor, &sales) {
        Ok(()) => sales,
        Err(err) => {
            tracing::warn!("{} foreclosed without buyers: {}", id, err);
            events.log(Event::SalesRejected {
                period,
                account: id,
                reason: err.to_string(),
            });
            Vec::new()
        }
    }
}

fn validate_sales(accounts: &[Account], debtor: usize, sales: &[Sale]) -> Result<(), LedgerError> {
    let mut total_share = 0.0;
    let mut committed: BTreeMap<usize, i64> = BTreeMap::new();

    for sale in sales {
        let buyer = accounts
            .get(sale.buyer.0)
            .ok_or_else(|| LedgerError::InvalidSale(format!("unknown buyer {}", sale.buyer)))?;
        if sale.buyer.0 == debtor {
            return Err(LedgerError::InvalidSale(format!(
                "{} cannot buy its own equity",
                sale.buyer
            )));
        }
        if !buyer.is_open() {
            return Err(LedgerError::InvalidSale(format!(
                "buyer {} is closed",
                sale.buyer
            )));
        }
        if sale.price <= 0 {
            return Err(LedgerError::InvalidSale(format!(
                "price {} must be positive",
                sale.price
            )));
        }
        if !(sale.share > 0.0 && sale.share <= 1.0) {
            return Err(LedgerError::InvalidSale(format!(
                "share {} outside (0, 1]",
                sale.share
            )));
        }
        total_share += sale.share;

        let bid = committed.entry(sale.buyer.0).or_insert(0);
        *bid += sale.price;
        if *bid > buyer.amount() {
            return Err(LedgerError::InvalidSale(format!(
                "buyer {} bids {} but holds {}",
                sale.buyer,
                *bid,
                buyer.amount()
            )));
        }
    }

    if total_share > 1.0 + 1e-9 {
        return Err(LedgerError::InvalidSale(format!(
            "shares sold add up to {}",
            total_share
        )));
    }
    Ok(())
}

/// Debit buyers for their part of the remaining debt. Returns the total.
fn collect_proceeds(
    accounts: &mut [Account],
    debtor: usize,
    sales: &[Sale],
    period: usize,
    events: &mut EventLog,
) -> Result<i64, LedgerError> {
    if sales.is_empty() {
        return Ok(0);
    }
    let debtor_id = accounts[debtor].id();
    let prices: Vec<i64> = sales.iter().map(|s| s.price).collect();
    let total = prices.iter().sum::<i64>().min(accounts[debtor].debt());
    let parts = split_proportionally(total, &prices)?;

    for (sale, &part) in sales.iter().zip(&parts) {
        accounts[sale.buyer.0].deposit_mut().debit_nonneg(part)?;
        events.log(Event::SharesSold {
            period,
            account: debtor_id,
            buyer: sale.buyer,
            price: part,
            share: sale.share,
        });
    }
    Ok(total)
}
