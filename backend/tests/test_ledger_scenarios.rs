//! End-to-end ledger scenarios
//!
//! CRITICAL: after every close, assets - liabilities == capital == reserve
//! and every account's debt equals the principal of its loans

use credit_ledger_core_rs::{
    AccountId, BankKind, Environment, HolderId, Ledger, LedgerError, LedgerParams, NullEnvironment,
    ParamMap, Phase, PeriodReport, RngManager,
};
use proptest::prelude::*;

fn params(entries: &[(&str, f64)]) -> LedgerParams {
    let map: ParamMap = entries.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    LedgerParams::from_map(&map).unwrap()
}

fn finish_period(ledger: &mut Ledger, rng: &mut RngManager, env: &mut dyn Environment) -> PeriodReport {
    ledger.debt_recovery(rng, env).unwrap();
    ledger.pay_dividend().unwrap();
    ledger.close().unwrap()
}

#[test]
fn test_interest_payment_first_period() {
    let mut ledger = Ledger::new(LedgerParams::default(), BankKind::Basic);
    let mut rng = RngManager::new(12345);
    let firm = ledger.open_account("FIRM").unwrap();

    ledger.open().unwrap();
    ledger.lend(firm, 1_000, 12, true).unwrap();
    let report = finish_period(&mut ledger, &mut rng, &mut NullEnvironment);

    assert_eq!(ledger.amount(firm).unwrap(), 950);
    assert_eq!(ledger.debt(firm).unwrap(), 1_000);
    assert_eq!(report.liabilities, 950);
    assert_eq!(report.assets, 1_000);
    assert_eq!(report.capital, 50);
    assert_eq!(report.reserve, 50);
}

#[test]
fn test_amortizing_loan_runs_to_settlement() {
    let mut ledger = Ledger::new(params(&[("rate.loan", 0.0)]), BankKind::Basic);
    let mut rng = RngManager::new(1);
    let firm = ledger.open_account("FIRM").unwrap();

    ledger.open().unwrap();
    ledger.lend(firm, 1_200, 12, true).unwrap();
    finish_period(&mut ledger, &mut rng, &mut NullEnvironment);
    assert_eq!(ledger.debt(firm).unwrap(), 1_200);

    for _ in 2..=13 {
        ledger.open().unwrap();
        finish_period(&mut ledger, &mut rng, &mut NullEnvironment);
    }
    let account = ledger.account(firm).unwrap();
    assert_eq!(account.debt(), 0);
    assert_eq!(account.amount(), 0);
    assert!(account.loans().is_empty(), "settled loan pruned at close");
    assert_eq!(ledger.assets(), 0);
    assert_eq!(ledger.events().events_of_type("ContractSettled").len(), 1);
}

#[test]
fn test_missed_installment_defers_amortizing_loan() {
    let mut ledger = Ledger::new(
        params(&[("rate.loan", 0.0), ("bankruptcy.patience", 10.0)]),
        BankKind::Basic,
    );
    let mut rng = RngManager::new(2);
    let firm = ledger.open_account("FIRM").unwrap();
    let shop = ledger.open_account("SHOP").unwrap();

    ledger.open().unwrap();
    let loan = ledger.lend(firm, 1_200, 12, true).unwrap();
    let cheque = ledger.issue_cheque(firm, 1_200).unwrap();
    ledger.deposit_cheque(shop, &cheque).unwrap();
    finish_period(&mut ledger, &mut rng, &mut NullEnvironment);
    assert_eq!(ledger.account(firm).unwrap().loans()[0].maturity(), 13);

    ledger.open().unwrap();
    let recovery = ledger.debt_recovery(&mut rng, &mut NullEnvironment).unwrap();
    assert_eq!(recovery.principal_due, 100);
    assert_eq!(recovery.principal_paid, 0);
    assert_eq!(recovery.illiquid_accounts, vec![firm]);

    let contract = &ledger.account(firm).unwrap().loans()[0];
    assert_eq!(contract.id(), loan);
    assert_eq!(contract.maturity(), 14);
    let deferred = ledger.events().events_of_type("ContractDeferred");
    assert_eq!(deferred.len(), 1);
    assert_eq!(deferred[0].period(), 2);
    ledger.pay_dividend().unwrap();
    ledger.close().unwrap();
}

struct Collateral(i64);

impl Environment for Collateral {
    fn collateral_value(&self, _holder: &HolderId) -> i64 {
        self.0
    }
}

#[test]
fn test_spent_loan_is_insolvent_without_collateral() {
    let run = |env: &mut dyn Environment| {
        let mut ledger = Ledger::new(
            params(&[("rate.loan", 0.0), ("bankruptcy.patience", 10.0)]),
            BankKind::Basic,
        );
        let mut rng = RngManager::new(3);
        let firm = ledger.open_account("FIRM").unwrap();
        let shop = ledger.open_account("SHOP").unwrap();
        ledger.open().unwrap();
        ledger.lend(firm, 500, 5, false).unwrap();
        let cheque = ledger.issue_cheque(firm, 500).unwrap();
        ledger.deposit_cheque(shop, &cheque).unwrap();
        finish_period(&mut ledger, &mut rng, env);
        ledger.account(firm).unwrap().insolvent_streak()
    };

    // Goods bought with the loan are invisible to the default environment
    assert_eq!(run(&mut NullEnvironment), 1);
    assert_eq!(run(&mut Collateral(500)), 0);
}

#[test]
fn test_time_deposit_redemption_rationed_across_savers() {
    let mut ledger = Ledger::new(
        params(&[
            ("rate.loan", 0.0),
            ("rate.deposit", 0.0),
            ("bankruptcy.patience", 10.0),
        ]),
        BankKind::Basic,
    );
    let mut rng = RngManager::new(7);
    let funder = ledger.open_account("FUNDER").unwrap();
    let savers: Vec<AccountId> = (1..=3)
        .map(|i| ledger.open_account(format!("SAVER_{}", i)).unwrap())
        .collect();
    let borrower = ledger.open_account("BORROWER").unwrap();

    ledger.open().unwrap();
    ledger.lend(funder, 100, 50, false).unwrap();
    for (&saver, amount) in savers.iter().zip([40, 30, 30]) {
        let cheque = ledger.issue_cheque(funder, amount).unwrap();
        ledger.deposit_cheque(saver, &cheque).unwrap();
        ledger.place_time_deposit(saver, amount, 1).unwrap();
    }
    assert_eq!(ledger.balance_sheet().loanable_funds(), 100);
    ledger.lend(borrower, 29, 50, false).unwrap();
    assert_eq!(ledger.balance_sheet().loanable_funds(), 71);
    finish_period(&mut ledger, &mut rng, &mut NullEnvironment);

    ledger.open().unwrap();
    let recovery = ledger.debt_recovery(&mut rng, &mut NullEnvironment).unwrap();
    assert!(recovery.bank.illiquid);
    assert_eq!(recovery.bank.principal_due, 100);
    assert_eq!(recovery.bank.principal_paid, 71);

    let received: Vec<i64> = savers.iter().map(|&s| ledger.amount(s).unwrap()).collect();
    assert_eq!(received, vec![29, 21, 21]);
    assert_eq!(ledger.balance_sheet().loanable_funds(), 0);

    assert_eq!(ledger.pay_dividend().unwrap(), 0, "no dividend while illiquid");
    let report = ledger.close().unwrap();
    assert!(report.illiquid);
    assert_eq!(ledger.account(savers[0]).unwrap().time_deposit_balance(), 11);
}

#[test]
fn test_phase_entry_points_run_once_in_order() {
    let mut ledger = Ledger::new(LedgerParams::default(), BankKind::Basic);
    let mut rng = RngManager::new(1);

    assert!(matches!(ledger.close(), Err(LedgerError::PhaseSequence(_))));
    assert!(matches!(
        ledger.debt_recovery(&mut rng, &mut NullEnvironment),
        Err(LedgerError::PhaseSequence(_))
    ));

    ledger.open().unwrap();
    assert_eq!(ledger.phase(), Phase::Open);
    assert!(matches!(ledger.pay_dividend(), Err(LedgerError::PhaseSequence(_))));
    ledger.debt_recovery(&mut rng, &mut NullEnvironment).unwrap();
    ledger.pay_dividend().unwrap();
    assert!(matches!(ledger.pay_dividend(), Err(LedgerError::PhaseSequence(_))));
    ledger.close().unwrap();
    assert_eq!(ledger.phase(), Phase::Idle);
    assert_eq!(ledger.period(), 1);
    assert!(!ledger.is_failed());
}

#[test]
fn test_lend_validation() {
    let mut ledger = Ledger::new(LedgerParams::default(), BankKind::Basic);
    let firm = ledger.open_account("FIRM").unwrap();
    ledger.open().unwrap();

    assert!(matches!(
        ledger.lend(firm, 0, 12, true),
        Err(LedgerError::InvalidArgument(_))
    ));
    assert!(matches!(
        ledger.lend(firm, -5, 12, true),
        Err(LedgerError::InvalidArgument(_))
    ));
    assert_eq!(
        ledger.lend(AccountId(42), 100, 12, true),
        Err(LedgerError::AccountNotFound(AccountId(42)))
    );
    assert!(matches!(ledger.lend(firm, 100, 0, true), Err(LedgerError::Contract(_))));
    assert_eq!(ledger.assets(), 0);
}

#[test]
fn test_time_deposit_needs_funds() {
    let mut ledger = Ledger::new(LedgerParams::default(), BankKind::Basic);
    let saver = ledger.open_account("SAVER").unwrap();
    ledger.open().unwrap();
    assert_eq!(
        ledger.place_time_deposit(saver, 10, 3),
        Err(LedgerError::InsufficientFunds {
            required: 10,
            available: 0
        })
    );
}

#[test]
fn test_debt_maturity_buckets() {
    let mut ledger = Ledger::new(params(&[("debt.short_term_horizon", 4.0)]), BankKind::Basic);
    let firm = ledger.open_account("FIRM").unwrap();
    ledger.open().unwrap();
    ledger.lend(firm, 300, 3, false).unwrap();
    ledger.lend(firm, 700, 10, true).unwrap();

    assert_eq!(ledger.short_term_debt(firm).unwrap(), 300);
    assert_eq!(ledger.long_term_debt(firm).unwrap(), 700);
    assert_eq!(ledger.overdue_debt(firm).unwrap(), 0);
}

#[test]
fn test_event_log_records_period_protocol() {
    let mut ledger = Ledger::new(LedgerParams::default(), BankKind::Basic);
    let mut rng = RngManager::new(9);
    let firm = ledger.open_account("FIRM").unwrap();
    ledger.open().unwrap();
    ledger.lend(firm, 1_000, 12, true).unwrap();
    finish_period(&mut ledger, &mut rng, &mut NullEnvironment);

    let log = ledger.events();
    assert_eq!(log.events_of_type("PeriodOpened").len(), 1);
    assert_eq!(log.events_of_type("LoanOriginated").len(), 1);
    assert_eq!(log.events_of_type("InterestPaid").len(), 1);
    assert_eq!(log.events_of_type("PeriodClosed").len(), 1);
    assert!(log.events_for_account(firm).len() >= 3);
    assert!(log.events().iter().all(|e| e.period() <= 1));
}

/// Every holder owns plenty of collateral, so only illiquidity forecloses
struct Wealthy;

impl Environment for Wealthy {
    fn collateral_value(&self, _holder: &HolderId) -> i64 {
        1_000_000_000
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_books_balance_after_every_close(
        seed in any::<u64>(),
        periods in prop::collection::vec(
            prop::collection::vec((0u8..3, 0usize..5, 0usize..5, 1i64..5_000, 1usize..8, any::<bool>()), 0..8),
            1..10,
        ),
    ) {
        let mut ledger = Ledger::new(LedgerParams::default(), BankKind::CapitalTargeting);
        let mut rng = RngManager::new(seed);
        let ids: Vec<AccountId> = (0..5)
            .map(|i| ledger.open_account(format!("AGENT_{}", i)).unwrap())
            .collect();
        ledger.set_shareholders(vec![(ids[0], 2), (ids[1], 1)]).unwrap();

        for ops in periods {
            ledger.open().unwrap();
            for (kind, a, b, amount, term, flag) in ops {
                let result = match kind {
                    0 => ledger.lend(ids[a], amount, term, flag).map(|_| ()),
                    1 => ledger
                        .issue_cheque(ids[a], amount)
                        .and_then(|cheque| if flag { ledger.deposit_cheque(ids[b], &cheque) } else { Ok(()) }),
                    _ => ledger.place_time_deposit(ids[a], amount, term).map(|_| ()),
                };
                if let Err(err) = result {
                    prop_assert!(!err.is_fatal(), "trading error was fatal: {}", err);
                }
            }

            match ledger.debt_recovery(&mut rng, &mut Wealthy) {
                Ok(_) => {}
                Err(LedgerError::BankInsolvent { .. }) => return Ok(()),
                Err(err) => prop_assert!(false, "unexpected recovery error: {}", err),
            }
            ledger.pay_dividend().unwrap();
            let report = ledger.close().unwrap();

            prop_assert_eq!(report.assets - report.liabilities, report.capital);
            prop_assert_eq!(report.capital, report.reserve);
            let debts: i64 = ledger.accounts().iter().map(|a| a.debt()).sum();
            prop_assert_eq!(debts, report.assets);
            for account in ledger.accounts() {
                prop_assert!(account.amount() >= 0);
                prop_assert_eq!(account.debt(), account.computed_debt());
            }
            prop_assert!(ledger.check_invariants().is_ok());
        }
    }
}
