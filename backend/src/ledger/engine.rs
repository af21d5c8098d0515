//! Ledger engine
//!
//! The bank: owns every account, the cheque register and the balance sheet,
//! and runs the period protocol:
//!
//! ```text
//! For each period t:
//! 1. open()          rates set by the bank's policy, trading begins
//! 2. trading         collaborators lend, place deposits, write and cash cheques
//! 3. debt_recovery() borrowers pay interest and installments (shuffled order),
//!                    distressed borrowers are foreclosed, the bank pays savers
//! 4. pay_dividend()  capital above the target ratio goes to shareholders
//! 5. close()         cheques refunded, contracts pruned, books re-verified
//! ```
//!
//! # Failure
//!
//! A fatal error (inconsistent books, bank insolvency) poisons the ledger:
//! every later call returns [`LedgerError::LedgerFailed`]. Debt recovery that
//! stops partway leaves a half-processed period and is treated the same way.
//!
//! # Example
//!
//! ```rust
//! use credit_ledger_core_rs::{BankKind, Ledger, LedgerParams, NullEnvironment, RngManager};
//!
//! let mut ledger = Ledger::new(LedgerParams::default(), BankKind::Basic);
//! let mut rng = RngManager::new(42);
//! let firm = ledger.open_account("FIRM_1").unwrap();
//!
//! ledger.open().unwrap();
//! ledger.lend(firm, 1_000, 12, true).unwrap();
//! ledger.debt_recovery(&mut rng, &mut NullEnvironment).unwrap();
//! ledger.pay_dividend().unwrap();
//! ledger.close().unwrap();
//!
//! assert_eq!(ledger.amount(firm).unwrap(), 950);
//! assert_eq!(ledger.debt(firm).unwrap(), 1_000);
//! ```

use crate::core::time::{Phase, PhaseClock};
use crate::ledger::book::BalanceSheet;
use crate::ledger::environment::Environment;
use crate::ledger::error::LedgerError;
use crate::ledger::params::{LedgerParams, ParamMap};
use crate::ledger::policy::{BankKind, RateContext, RatePolicy, Rates};
use crate::models::account::{Account, AccountId, HolderId};
use crate::models::cheque::{Cheque, ChequeId, ChequeRecord};
use crate::models::contract::{Contract, ContractId};
use crate::models::event::{Event, EventLog};
use crate::rng::RngManager;
use crate::settlement::foreclosure::{foreclose, ForeclosureReport};
use crate::settlement::rationing::split_proportionally;
use crate::settlement::recovery::{recover_account, recover_time_deposits, BankRecovery};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

// ============================================================================
// Reports
// ============================================================================

/// Outcome of one `debt_recovery()` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryReport {
    pub period: usize,
    /// Open accounts, in the order they were visited
    pub visit_order: Vec<AccountId>,
    pub interest_due: i64,
    pub interest_paid: i64,
    pub principal_due: i64,
    pub principal_paid: i64,
    pub capitalized: i64,
    pub illiquid_accounts: Vec<AccountId>,
    /// Accounts that went through foreclosure and were closed
    pub foreclosures: Vec<ForeclosureReport>,
    /// Flagged accounts whose set-off and deposit covered their debt
    pub recovered_accounts: Vec<AccountId>,
    pub bank: BankRecovery,
}

/// Books as verified by `close()`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReport {
    pub period: usize,
    pub assets: i64,
    pub liabilities: i64,
    pub capital: i64,
    pub reserve: i64,
    pub loanable_funds: i64,
    pub loan_rate: f64,
    pub deposit_rate: f64,
    pub open_accounts: usize,
    pub closed_accounts: usize,
    pub contracts_pruned: usize,
    pub cheques_refunded: usize,
    pub dividend: i64,
    /// Bank rationed savers this period
    pub illiquid: bool,
}

// ============================================================================
// Ledger
// ============================================================================

pub struct Ledger {
    kind: BankKind,
    params: LedgerParams,
    policy: Box<dyn RatePolicy>,
    rates: Rates,
    clock: PhaseClock,
    book: BalanceSheet,

    /// Indexed by `AccountId`; accounts are never removed
    accounts: Vec<Account>,
    cheques: HashMap<ChequeId, ChequeRecord>,
    /// Issue order, so close() refunds deterministically
    cheque_order: Vec<ChequeId>,
    shareholders: Vec<(AccountId, i64)>,
    /// Holders already reported through `Environment::on_bankrupt`
    bankrupt_holders: BTreeSet<HolderId>,
    next_contract: u64,

    illiquid: bool,
    dividend: i64,
    events: EventLog,
    failed: bool,
}

impl Ledger {
    pub fn new(params: LedgerParams, kind: BankKind) -> Self {
        let rates = Rates {
            loan: params.loan_rate,
            deposit: params.deposit_rate,
        };
        Self {
            kind,
            params,
            policy: kind.build_policy(),
            rates,
            clock: PhaseClock::new(),
            book: BalanceSheet::new(),
            accounts: Vec::new(),
            cheques: HashMap::new(),
            cheque_order: Vec::new(),
            shareholders: Vec::new(),
            bankrupt_holders: BTreeSet::new(),
            next_contract: 1,
            illiquid: false,
            dividend: 0,
            events: EventLog::new(),
            failed: false,
        }
    }

    /// Build from a flat parameter map
    pub fn from_map(map: &ParamMap, kind: BankKind) -> Result<Self, LedgerError> {
        Ok(Self::new(LedgerParams::from_map(map)?, kind))
    }

    /// Swap in a custom rate policy
    pub fn with_policy(mut self, policy: Box<dyn RatePolicy>) -> Self {
        self.policy = policy;
        self
    }

    // ------------------------------------------------------------------------
    // Guards
    // ------------------------------------------------------------------------

    fn ensure_live(&self) -> Result<(), LedgerError> {
        if self.failed {
            return Err(LedgerError::LedgerFailed);
        }
        Ok(())
    }

    /// Poison the ledger if `result` carries a fatal error
    fn guard<T>(&mut self, result: Result<T, LedgerError>) -> Result<T, LedgerError> {
        if let Err(err) = &result {
            if err.is_fatal() && !self.failed {
                tracing::error!("period {}: ledger failed: {}", self.clock.period(), err);
                self.failed = true;
            }
        }
        result
    }

    fn ensure_trading(&self, attempted: &'static str) -> Result<(), LedgerError> {
        self.ensure_live()?;
        self.clock.require(Phase::Open, attempted)?;
        Ok(())
    }

    fn open_account_mut(&mut self, id: AccountId) -> Result<&mut Account, LedgerError> {
        let account = self
            .accounts
            .get_mut(id.0)
            .ok_or(LedgerError::AccountNotFound(id))?;
        if !account.is_open() {
            return Err(LedgerError::AccountClosed(id));
        }
        Ok(account)
    }

    fn next_contract_id(&mut self) -> ContractId {
        let id = ContractId(self.next_contract);
        self.next_contract += 1;
        id
    }

    // ------------------------------------------------------------------------
    // Phase entry points
    // ------------------------------------------------------------------------

    /// Start the next period. Returns its number.
    pub fn open(&mut self) -> Result<usize, LedgerError> {
        self.ensure_live()?;
        let period = self.clock.open()?;

        let ctx = RateContext {
            period,
            assets: self.book.assets(),
            capital: self.book.capital(),
            params: &self.params,
        };
        self.rates = self.policy.rates(&ctx);
        self.illiquid = false;
        self.dividend = 0;
        for account in &mut self.accounts {
            account.set_illiquid(false);
        }

        self.events.log(Event::PeriodOpened {
            period,
            loan_rate: self.rates.loan,
            deposit_rate: self.rates.deposit,
        });
        tracing::info!(
            "period {} opened: loan rate {:.4}, deposit rate {:.4}",
            period,
            self.rates.loan,
            self.rates.deposit
        );
        Ok(period)
    }

    /// Collect what is due from every borrower and pay what the bank owes
    pub fn debt_recovery(
        &mut self,
        rng: &mut RngManager,
        env: &mut dyn Environment,
    ) -> Result<RecoveryReport, LedgerError> {
        self.ensure_live()?;
        self.clock.advance(Phase::DebtRecovered, "run debt recovery")?;

        let result = self.run_recovery(rng, env);
        if result.is_err() && !self.failed {
            tracing::error!(
                "period {}: debt recovery stopped partway",
                self.clock.period()
            );
            self.failed = true;
        }
        result
    }

    fn run_recovery(
        &mut self,
        rng: &mut RngManager,
        env: &mut dyn Environment,
    ) -> Result<RecoveryReport, LedgerError> {
        let period = self.clock.period();
        let mut visit_order: Vec<AccountId> = self
            .accounts
            .iter()
            .filter(|a| a.is_open())
            .map(|a| a.id())
            .collect();
        rng.shuffle(&mut visit_order);

        let mut report = RecoveryReport {
            period,
            visit_order: visit_order.clone(),
            interest_due: 0,
            interest_paid: 0,
            principal_due: 0,
            principal_paid: 0,
            capitalized: 0,
            illiquid_accounts: Vec::new(),
            foreclosures: Vec::new(),
            recovered_accounts: Vec::new(),
            bank: BankRecovery::default(),
        };
        let mut flagged = Vec::new();

        for &id in &visit_order {
            let account = &mut self.accounts[id.0];
            let rec = recover_account(&mut self.book, account, period, &mut self.events)?;
            report.interest_due += rec.interest_due;
            report.interest_paid += rec.interest_paid;
            report.principal_due += rec.principal_due;
            report.principal_paid += rec.principal_paid;
            report.capitalized += rec.capitalized;

            let collateral = env.collateral_value(account.holder()).max(0);
            let insolvent = account.amount() + collateral < account.debt();
            account.record_distress(rec.illiquid, insolvent);

            if rec.illiquid {
                report.illiquid_accounts.push(id);
                self.events.log(Event::AccountIlliquid {
                    period,
                    account: id,
                    streak: account.illiquid_streak(),
                });
            }
            let patience = self.params.patience;
            if rec.fatal
                || account.illiquid_streak() >= patience
                || account.insolvent_streak() >= patience
            {
                tracing::warn!(
                    "{} flagged for foreclosure (illiquid {}, insolvent {}, fatal {})",
                    id,
                    account.illiquid_streak(),
                    account.insolvent_streak(),
                    rec.fatal
                );
                flagged.push(id);
            }
        }

        for id in flagged {
            match foreclose(
                &mut self.book,
                &mut self.accounts,
                id.0,
                period,
                &self.params,
                env,
                &mut self.events,
            )? {
                Some(closure) => {
                    // A holder may own several accounts; it goes bankrupt once
                    if self.bankrupt_holders.insert(closure.holder.clone()) {
                        env.on_bankrupt(&closure.holder, period);
                    }
                    env.notify_default(&closure);
                    report.foreclosures.push(closure);
                }
                None => report.recovered_accounts.push(id),
            }
        }

        report.bank = recover_time_deposits(&mut self.book, &mut self.accounts, period, &mut self.events)?;
        self.illiquid = report.bank.illiquid;

        tracing::info!(
            "period {} debt recovery: {} accounts, {} illiquid, {} foreclosed",
            period,
            report.visit_order.len(),
            report.illiquid_accounts.len(),
            report.foreclosures.len()
        );
        Ok(report)
    }

    /// Distribute capital above the target ratio. Returns the total paid.
    pub fn pay_dividend(&mut self) -> Result<i64, LedgerError> {
        self.ensure_live()?;
        self.clock.advance(Phase::DividendPaid, "pay dividend")?;
        let result = self.distribute_dividend();
        self.guard(result)
    }

    fn distribute_dividend(&mut self) -> Result<i64, LedgerError> {
        let period = self.clock.period();
        if self.illiquid {
            tracing::info!("period {}: bank illiquid, no dividend", period);
            return Ok(0);
        }

        let required = (self.params.capital_target_ratio * self.book.assets() as f64).ceil() as i64;
        let excess = self.book.capital() - required;
        if excess <= 0 {
            return Ok(0);
        }
        let total = ((excess as f64 * self.params.dividend_payout).floor() as i64)
            .min(self.book.reserve());

        let holders: Vec<(AccountId, i64)> = self
            .shareholders
            .iter()
            .copied()
            .filter(|&(id, weight)| weight > 0 && self.accounts[id.0].is_open())
            .collect();
        if total <= 0 || holders.is_empty() {
            return Ok(0);
        }

        let weights: Vec<i64> = holders.iter().map(|&(_, w)| w).collect();
        let parts = split_proportionally(total, &weights)?;
        for (&(id, _), &amount) in holders.iter().zip(&parts) {
            if amount == 0 {
                continue;
            }
            self.book.post_dividend(amount)?;
            self.accounts[id.0].deposit_mut().credit(amount)?;
            self.events.log(Event::DividendPaid {
                period,
                account: id,
                amount,
            });
        }
        self.dividend = total;
        tracing::info!(
            "period {}: dividend {} paid to {} shareholders",
            period,
            total,
            holders.len()
        );
        Ok(total)
    }

    /// End the period: refund cheques, prune contracts, verify the books
    pub fn close(&mut self) -> Result<PeriodReport, LedgerError> {
        self.ensure_live()?;
        self.clock.advance(Phase::Idle, "close")?;
        let result = self.close_books();
        self.guard(result)
    }

    fn close_books(&mut self) -> Result<PeriodReport, LedgerError> {
        let period = self.clock.period();

        let mut refunded = 0;
        for id in &self.cheque_order {
            let Some(record) = self.cheques.get_mut(id) else {
                continue;
            };
            if record.redeemed {
                continue;
            }
            record.redeemed = true;
            refunded += 1;
            let drawer = &mut self.accounts[record.drawer.0];
            if drawer.is_open() {
                drawer.deposit_mut().credit(record.amount)?;
                self.book.post_cheque_cleared(record.amount);
                tracing::warn!("cheque {} of {} refunded to {}", id, record.amount, record.drawer);
            } else {
                self.book.post_cheque_forfeited(record.amount)?;
                tracing::warn!(
                    "cheque {} of {} forfeited: drawer {} is closed",
                    id,
                    record.amount,
                    record.drawer
                );
            }
            self.events.log(Event::ChequeRefunded {
                period,
                account: record.drawer,
                amount: record.amount,
            });
        }
        self.cheque_order.clear();
        // Every cheque is redeemed or refunded by now; the register starts empty
        self.cheques.retain(|_, record| !record.redeemed);

        let contracts_pruned = self.accounts.iter_mut().map(|a| a.prune()).sum();
        self.check_invariants()?;

        let report = PeriodReport {
            period,
            assets: self.book.assets(),
            liabilities: self.book.liabilities(),
            capital: self.book.capital(),
            reserve: self.book.reserve(),
            loanable_funds: self.book.loanable_funds(),
            loan_rate: self.rates.loan,
            deposit_rate: self.rates.deposit,
            open_accounts: self.accounts.iter().filter(|a| a.is_open()).count(),
            closed_accounts: self.accounts.iter().filter(|a| !a.is_open()).count(),
            contracts_pruned,
            cheques_refunded: refunded,
            dividend: self.dividend,
            illiquid: self.illiquid,
        };
        self.events.log(Event::PeriodClosed {
            period,
            assets: report.assets,
            liabilities: report.liabilities,
            capital: report.capital,
        });
        tracing::info!(
            "period {} closed: assets {}, liabilities {}, capital {}",
            period,
            report.assets,
            report.liabilities,
            report.capital
        );
        Ok(report)
    }

    /// Recompute every aggregate from the accounts and compare
    pub fn check_invariants(&self) -> Result<(), LedgerError> {
        let mut assets = 0;
        let mut liabilities = 0;
        for account in &self.accounts {
            let debt = account.computed_debt();
            if account.debt() != debt {
                return Err(LedgerError::Inconsistent(format!(
                    "{} debt counter {} but loans sum to {}",
                    account.id(),
                    account.debt(),
                    debt
                )));
            }
            if !account.is_open() && (account.amount() != 0 || debt != 0) {
                return Err(LedgerError::Inconsistent(format!(
                    "closed {} still holds deposit {} and debt {}",
                    account.id(),
                    account.amount(),
                    debt
                )));
            }
            for contract in account.loans().iter().chain(account.time_deposits()) {
                if contract.is_settled() && contract.outstanding() != 0 {
                    return Err(LedgerError::Inconsistent(format!(
                        "settled {} still owes {}",
                        contract.id(),
                        contract.outstanding()
                    )));
                }
            }
            assets += debt;
            liabilities += account.amount() + account.time_deposit_balance();
        }

        let cheques: i64 = self
            .cheques
            .values()
            .filter(|c| !c.redeemed)
            .map(|c| c.amount)
            .sum();
        self.book.verify(assets, liabilities + cheques, cheques)
    }

    // ------------------------------------------------------------------------
    // Collaborator operations
    // ------------------------------------------------------------------------

    /// Open an account for `holder`. Allowed in any phase.
    pub fn open_account(&mut self, holder: impl Into<String>) -> Result<AccountId, LedgerError> {
        self.ensure_live()?;
        let id = AccountId(self.accounts.len());
        let holder = HolderId::new(holder);
        let period = self.clock.period();
        self.accounts.push(Account::new(id, holder.clone(), period));
        self.events.log(Event::AccountOpened {
            period,
            account: id,
            holder,
        });
        Ok(id)
    }

    /// Originate a loan at this period's loan rate
    pub fn lend(
        &mut self,
        account: AccountId,
        principal: i64,
        term: usize,
        amortized: bool,
    ) -> Result<ContractId, LedgerError> {
        self.ensure_trading("lend")?;
        if principal <= 0 {
            return Err(LedgerError::InvalidArgument(format!(
                "loan principal must be positive, got {}",
                principal
            )));
        }
        self.open_account_mut(account)?;

        let period = self.clock.period();
        let id = ContractId(self.next_contract);
        let rate = self.rates.loan;
        let loan = Contract::loan(
            id,
            account,
            principal,
            rate,
            period,
            term,
            amortized,
            self.params.extended_term,
        )?;
        let maturity = loan.maturity();

        // The bank's totals bound every account's, so once the books take the
        // loan neither the deposit nor the debt counter can overflow
        self.book.post_origination(principal)?;
        let holder = &mut self.accounts[account.0];
        holder.push_loan(loan)?;
        holder.deposit_mut().credit(principal)?;
        self.next_contract += 1;

        self.events.log(Event::LoanOriginated {
            period,
            account,
            contract: id,
            principal,
            rate,
            maturity,
            amortized,
        });
        tracing::debug!("{} borrowed {} until period {}", account, principal, maturity);
        Ok(id)
    }

    /// Move `amount` from the deposit into a time deposit
    pub fn place_time_deposit(
        &mut self,
        account: AccountId,
        amount: i64,
        term: usize,
    ) -> Result<ContractId, LedgerError> {
        self.ensure_trading("place time deposit")?;
        if amount <= 0 {
            return Err(LedgerError::InvalidArgument(format!(
                "time deposit must be positive, got {}",
                amount
            )));
        }
        let available = self.open_account_mut(account)?.amount();
        if amount > available {
            return Err(LedgerError::InsufficientFunds {
                required: amount,
                available,
            });
        }

        let period = self.clock.period();
        let rate = self.rates.deposit;
        let id = self.next_contract_id();
        let contract = Contract::time_deposit(id, account, amount, rate, period, term)?;
        let maturity = contract.maturity();

        let saver = &mut self.accounts[account.0];
        saver.deposit_mut().debit(amount)?;
        saver.push_time_deposit(contract);
        self.book.post_time_deposit_placed(amount)?;

        self.events.log(Event::TimeDepositPlaced {
            period,
            account,
            contract: id,
            principal: amount,
            rate,
            maturity,
        });
        Ok(id)
    }

    /// Debit the drawer and hand back a single-use cheque
    pub fn issue_cheque(&mut self, drawer: AccountId, amount: i64) -> Result<Cheque, LedgerError> {
        self.ensure_trading("issue cheque")?;
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount { amount });
        }
        let period = self.clock.period();
        self.open_account_mut(drawer)?.deposit_mut().debit(amount)?;
        self.book.post_cheque_issued(amount);

        let cheque = Cheque::new(drawer, amount, period);
        self.cheques.insert(
            cheque.id(),
            ChequeRecord {
                drawer,
                amount,
                issued_at: period,
                redeemed: false,
            },
        );
        self.cheque_order.push(cheque.id());
        self.events.log(Event::ChequeIssued {
            period,
            account: drawer,
            amount,
        });
        Ok(cheque)
    }

    /// Redeem `cheque` into the payee's deposit
    pub fn deposit_cheque(&mut self, payee: AccountId, cheque: &Cheque) -> Result<(), LedgerError> {
        self.ensure_trading("deposit cheque")?;
        let period = self.clock.period();
        self.open_account_mut(payee)?;

        // The register only holds this period's cheques
        if cheque.issued_at() != period {
            return Err(LedgerError::Anachronism {
                expected: cheque.issued_at(),
                actual: period,
            });
        }
        let record = self
            .cheques
            .get(&cheque.id())
            .ok_or(LedgerError::UnknownCheque(cheque.id()))?;
        if record.redeemed {
            return Err(LedgerError::AlreadyRedeemed(cheque.id()));
        }
        if record.amount != cheque.amount()
            || record.drawer != cheque.drawer()
            || record.issued_at != cheque.issued_at()
        {
            return Err(LedgerError::InvalidArgument(format!(
                "cheque {} does not match its register entry",
                cheque.id()
            )));
        }
        let (drawer, amount) = (record.drawer, record.amount);

        self.accounts[payee.0].deposit_mut().credit(amount)?;
        if let Some(record) = self.cheques.get_mut(&cheque.id()) {
            record.redeemed = true;
        }
        self.book.post_cheque_cleared(amount);
        self.events.log(Event::ChequeDeposited {
            period,
            account: payee,
            drawer,
            amount,
        });
        Ok(())
    }

    /// Replace the shareholder register (account, weight)
    pub fn set_shareholders(&mut self, holders: Vec<(AccountId, i64)>) -> Result<(), LedgerError> {
        self.ensure_live()?;
        for &(id, weight) in &holders {
            if id.0 >= self.accounts.len() {
                return Err(LedgerError::AccountNotFound(id));
            }
            if weight < 0 {
                return Err(LedgerError::InvalidArgument(format!(
                    "shareholder weight {} for {} is negative",
                    weight, id
                )));
            }
        }
        self.shareholders = holders;
        Ok(())
    }

    /// Change parameters between periods; all or nothing
    pub fn update_parameters(&mut self, map: &ParamMap) -> Result<(), LedgerError> {
        self.ensure_live()?;
        self.clock.require(Phase::Idle, "update parameters")?;
        self.params.apply(map)?;
        tracing::info!("parameters updated: {} keys", map.len());
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn account(&self, id: AccountId) -> Result<&Account, LedgerError> {
        self.accounts.get(id.0).ok_or(LedgerError::AccountNotFound(id))
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn amount(&self, id: AccountId) -> Result<i64, LedgerError> {
        Ok(self.account(id)?.amount())
    }

    pub fn debt(&self, id: AccountId) -> Result<i64, LedgerError> {
        Ok(self.account(id)?.debt())
    }

    pub fn short_term_debt(&self, id: AccountId) -> Result<i64, LedgerError> {
        let period = self.clock.period();
        Ok(self
            .account(id)?
            .short_term_debt(period, self.params.short_term_horizon))
    }

    pub fn long_term_debt(&self, id: AccountId) -> Result<i64, LedgerError> {
        let period = self.clock.period();
        Ok(self
            .account(id)?
            .long_term_debt(period, self.params.short_term_horizon))
    }

    pub fn overdue_debt(&self, id: AccountId) -> Result<i64, LedgerError> {
        Ok(self.account(id)?.overdue_debt(self.clock.period()))
    }

    /// Entries in the cheque register; only this period's cheques are kept
    pub fn registered_cheques(&self) -> usize {
        self.cheques.len()
    }

    pub fn balance_sheet(&self) -> &BalanceSheet {
        &self.book
    }

    pub fn assets(&self) -> i64 {
        self.book.assets()
    }

    pub fn liabilities(&self) -> i64 {
        self.book.liabilities()
    }

    pub fn capital(&self) -> i64 {
        self.book.capital()
    }

    pub fn period(&self) -> usize {
        self.clock.period()
    }

    pub fn phase(&self) -> Phase {
        self.clock.phase()
    }

    pub fn rates(&self) -> Rates {
        self.rates
    }

    pub fn params(&self) -> &LedgerParams {
        &self.params
    }

    pub fn kind(&self) -> BankKind {
        self.kind
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn shareholders(&self) -> &[(AccountId, i64)] {
        &self.shareholders
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Whether `holder` has lost an account to foreclosure
    pub fn is_bankrupt(&self, holder: &str) -> bool {
        self.bankrupt_holders.contains(&HolderId::new(holder))
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("kind", &self.kind)
            .field("policy", &self.policy.name())
            .field("period", &self.clock.period())
            .field("phase", &self.clock.phase())
            .field("accounts", &self.accounts.len())
            .field("book", &self.book)
            .field("failed", &self.failed)
            .finish()
    }
}
