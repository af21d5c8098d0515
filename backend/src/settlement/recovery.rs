//! Debt recovery
//!
//! Runs once per period after trading. Two sides:
//!
//! **Borrowers** (`recover_account`), visited in shuffled order by the
//! ledger:
//! 1. Bill one period of interest on every active loan
//! 2. Interest batch, paid from the deposit
//! 3. Principal batch (installments and matured loans), paid from what is left
//! 4. Roll unpaid interest into principal
//! 5. Defer loans that are due or missed part of their installment
//!
//! **The bank** (`recover_time_deposits`), after all borrowers:
//! 1. Bill interest on every active time deposit
//! 2. Interest batch, paid from the reserve
//! 3. Redemption batch, paid from loanable funds
//! 4. Defer matured deposits that were not redeemed in full
//!
//! Each batch goes through [`ration`]. After a batch either everything due
//! was paid, or the funding pool is exactly empty; anything else is an
//! engine bug and surfaces as [`LedgerError::Inconsistent`].

use crate::ledger::book::BalanceSheet;
use crate::ledger::error::LedgerError;
use crate::models::account::{Account, AccountId};
use crate::models::contract::{ContractId, DeferralOutcome, Party};
use crate::models::event::{Batch, Event, EventLog};
use crate::settlement::rationing::{ration, Rationing};
use serde::Serialize;

/// What one borrower's recovery round did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountRecovery {
    pub account: AccountId,
    pub interest_due: i64,
    pub interest_paid: i64,
    pub principal_due: i64,
    pub principal_paid: i64,
    pub capitalized: i64,
    /// Either batch was rationed
    pub illiquid: bool,
    /// A non-performing loan missed its last chance
    pub fatal: bool,
}

/// What the bank's time-deposit round did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BankRecovery {
    pub interest_due: i64,
    pub interest_paid: i64,
    pub principal_due: i64,
    pub principal_paid: i64,
    pub deferred: usize,
    pub illiquid: bool,
}

/// Settle one borrower's loans for `period`
pub fn recover_account(
    book: &mut BalanceSheet,
    account: &mut Account,
    period: usize,
    events: &mut EventLog,
) -> Result<AccountRecovery, LedgerError> {
    let id = account.id();

    for loan in account.loans_mut().iter_mut().filter(|c| c.is_active()) {
        loan.accrue_interest(period)?;
    }

    let interest = pay_loan_batch(book, account, period, Batch::Interest, events)?;
    let installments: Vec<i64> = account.loans().iter().map(|c| c.principal_due(period)).collect();
    let principal = pay_loan_batch(book, account, period, Batch::Principal, events)?;

    let mut capitalized = 0;
    for loan in account.loans_mut().iter_mut().filter(|c| c.is_active()) {
        let unpaid = loan.capitalize_interest()?;
        if unpaid > 0 {
            book.post_capitalized(unpaid)?;
            capitalized += unpaid;
            events.log(Event::InterestCapitalized {
                period,
                account: id,
                contract: loan.id(),
                amount: unpaid,
            });
        }
    }
    account.adjust_debt(capitalized)?;

    let mut fatal = false;
    for ((loan, &due), &paid) in account
        .loans_mut()
        .iter_mut()
        .zip(&installments)
        .zip(&principal.payments)
    {
        if !loan.is_active() || !(loan.is_due(period) || paid < due) {
            continue;
        }
        match loan.defer(period)? {
            DeferralOutcome::Deferred { new_maturity } => {
                tracing::warn!("{} deferred {} to period {}", id, loan.id(), new_maturity);
                events.log(Event::ContractDeferred {
                    period,
                    account: id,
                    contract: loan.id(),
                    new_maturity,
                });
            }
            DeferralOutcome::Downgraded { new_maturity } => {
                tracing::warn!("{} loan {} is now non-performing", id, loan.id());
                events.log(Event::ContractDowngraded {
                    period,
                    account: id,
                    contract: loan.id(),
                    new_maturity,
                });
            }
            DeferralOutcome::Fatal => fatal = true,
        }
    }

    let illiquid = interest.is_rationed() || principal.is_rationed();
    account.set_illiquid(illiquid);

    Ok(AccountRecovery {
        account: id,
        interest_due: interest.total_due,
        interest_paid: interest.paid,
        principal_due: principal.total_due,
        principal_paid: principal.paid,
        capitalized,
        illiquid,
        fatal,
    })
}

fn pay_loan_batch(
    book: &mut BalanceSheet,
    account: &mut Account,
    period: usize,
    batch: Batch,
    events: &mut EventLog,
) -> Result<Rationing, LedgerError> {
    let id = account.id();
    let (loans, deposit) = account.loans_and_deposit_mut();

    let dues: Vec<i64> = loans
        .iter()
        .map(|c| match batch {
            Batch::Interest if c.is_active() => c.deferred_interest(),
            Batch::Interest => 0,
            Batch::Principal => c.principal_due(period),
        })
        .collect();
    let outcome = ration(deposit.value(), &dues)?;

    let mut repaid = 0;
    for (loan, &amount) in loans.iter_mut().zip(&outcome.payments) {
        if amount == 0 {
            continue;
        }
        deposit.debit(amount)?;
        match batch {
            Batch::Interest => {
                loan.pay_interest(period, amount)?;
                book.post_loan_interest(amount)?;
                events.log(Event::InterestPaid {
                    period,
                    account: id,
                    contract: loan.id(),
                    amount,
                });
            }
            Batch::Principal => {
                loan.repay(period, amount)?;
                book.post_principal_repaid(amount)?;
                repaid += amount;
                events.log(Event::PrincipalRepaid {
                    period,
                    account: id,
                    contract: loan.id(),
                    amount,
                });
            }
        }
        if loan.is_settled() {
            events.log(Event::ContractSettled {
                period,
                account: id,
                contract: loan.id(),
            });
        }
    }
    let left = deposit.value();
    account.adjust_debt(-repaid)?;

    check_batch(&outcome, left, Party::Account(id), batch, period, events)?;
    Ok(outcome)
}

/// Pay interest on and redeem time deposits for `period`
pub fn recover_time_deposits(
    book: &mut BalanceSheet,
    accounts: &mut [Account],
    period: usize,
    events: &mut EventLog,
) -> Result<BankRecovery, LedgerError> {
    // (contract, account index, position in the account), registration order
    let mut slots: Vec<(ContractId, usize, usize)> = accounts
        .iter()
        .enumerate()
        .filter(|(_, a)| a.is_open())
        .flat_map(|(ai, a)| {
            a.time_deposits()
                .iter()
                .enumerate()
                .filter(|(_, c)| c.is_active())
                .map(move |(ti, c)| (c.id(), ai, ti))
        })
        .collect();
    slots.sort_by_key(|slot| slot.0);

    for &(_, ai, ti) in &slots {
        accounts[ai].time_deposits_mut()[ti].accrue_interest(period)?;
    }

    let interest = pay_deposit_batch(book, accounts, &slots, period, Batch::Interest, events)?;
    let principal = pay_deposit_batch(book, accounts, &slots, period, Batch::Principal, events)?;

    let mut deferred = 0;
    for &(_, ai, ti) in &slots {
        let account_id = accounts[ai].id();
        let td = &mut accounts[ai].time_deposits_mut()[ti];
        if !(td.is_active() && td.is_due(period)) {
            continue;
        }
        if let DeferralOutcome::Deferred { new_maturity } = td.defer(period)? {
            deferred += 1;
            events.log(Event::ContractDeferred {
                period,
                account: account_id,
                contract: td.id(),
                new_maturity,
            });
        }
    }
    if deferred > 0 {
        tracing::warn!("period {}: {} time deposits deferred", period, deferred);
    }

    Ok(BankRecovery {
        interest_due: interest.total_due,
        interest_paid: interest.paid,
        principal_due: principal.total_due,
        principal_paid: principal.paid,
        deferred,
        illiquid: interest.is_rationed() || principal.is_rationed(),
    })
}

fn pay_deposit_batch(
    book: &mut BalanceSheet,
    accounts: &mut [Account],
    slots: &[(ContractId, usize, usize)],
    period: usize,
    batch: Batch,
    events: &mut EventLog,
) -> Result<Rationing, LedgerError> {
    let dues: Vec<i64> = slots
        .iter()
        .map(|&(_, ai, ti)| {
            let td = &accounts[ai].time_deposits()[ti];
            match batch {
                Batch::Interest => td.deferred_interest(),
                Batch::Principal => td.principal_due(period),
            }
        })
        .collect();
    let pool = match batch {
        Batch::Interest => book.reserve(),
        Batch::Principal => book.loanable_funds(),
    };
    let outcome = ration(pool, &dues)?;

    for (&(_, ai, ti), &amount) in slots.iter().zip(&outcome.payments) {
        if amount == 0 {
            continue;
        }
        let account_id = accounts[ai].id();
        let (deposits, deposit) = accounts[ai].time_deposits_and_deposit_mut();
        let td = &mut deposits[ti];
        match batch {
            Batch::Interest => {
                td.pay_interest(period, amount)?;
                book.post_time_deposit_interest(amount)?;
                events.log(Event::DepositInterestPaid {
                    period,
                    account: account_id,
                    contract: td.id(),
                    amount,
                });
            }
            Batch::Principal => {
                td.repay(period, amount)?;
                book.post_time_deposit_redeemed(amount)?;
                events.log(Event::DepositRedeemed {
                    period,
                    account: account_id,
                    contract: td.id(),
                    amount,
                });
            }
        }
        deposit.credit(amount)?;
        if td.is_settled() {
            events.log(Event::ContractSettled {
                period,
                account: account_id,
                contract: td.id(),
            });
        }
    }

    let left = match batch {
        Batch::Interest => book.reserve(),
        Batch::Principal => book.loanable_funds(),
    };
    check_batch(&outcome, left, Party::Bank, batch, period, events)?;
    Ok(outcome)
}

/// Post-conditions shared by every batch
fn check_batch(
    outcome: &Rationing,
    pool_left: i64,
    payer: Party,
    batch: Batch,
    period: usize,
    events: &mut EventLog,
) -> Result<(), LedgerError> {
    if outcome.is_rationed() {
        if pool_left != 0 {
            return Err(LedgerError::Inconsistent(format!(
                "{:?} {:?} batch rationed but {} left in the funding pool",
                payer, batch, pool_left
            )));
        }
        tracing::warn!(
            "{:?} rationed {:?} batch: paid {} of {}",
            payer,
            batch,
            outcome.paid,
            outcome.total_due
        );
        events.log(Event::Rationed {
            period,
            payer,
            batch,
            total_due: outcome.total_due,
            paid: outcome.paid,
        });
    } else if outcome.paid != outcome.total_due {
        return Err(LedgerError::Inconsistent(format!(
            "{:?} {:?} batch paid {} of {} without rationing",
            payer, batch, outcome.paid, outcome.total_due
        )));
    }
    tracing::debug!(
        "{:?} {:?} batch settled: due {}, paid {}",
        payer,
        batch,
        outcome.total_due,
        outcome.paid
    );
    Ok(())
}
