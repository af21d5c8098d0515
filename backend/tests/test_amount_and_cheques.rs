//! Tests for balances and cheques
//!
//! CRITICAL: All money values are i64 (minor units) and never negative

use credit_ledger_core_rs::{
    Amount, AmountError, BankKind, Ledger, LedgerError, LedgerParams, NullEnvironment, RngManager,
};

fn ledger_with_two_accounts() -> (Ledger, credit_ledger_core_rs::AccountId, credit_ledger_core_rs::AccountId) {
    let mut ledger = Ledger::new(LedgerParams::default(), BankKind::Basic);
    let a = ledger.open_account("FIRM_A").unwrap();
    let b = ledger.open_account("HH_B").unwrap();
    ledger.open().unwrap();
    (ledger, a, b)
}

#[test]
fn test_amount_rejects_non_positive_moves() {
    let mut amount = Amount::zero();
    assert_eq!(amount.credit(0), Err(AmountError::InvalidAmount { amount: 0 }));
    assert_eq!(amount.debit(-1), Err(AmountError::InvalidAmount { amount: -1 }));
    assert!(Amount::new(-10).is_err());
}

#[test]
fn test_amount_debit_over_balance_fails() {
    let mut amount = Amount::new(100).unwrap();
    assert_eq!(
        amount.debit(101),
        Err(AmountError::InsufficientFunds {
            required: 101,
            available: 100
        })
    );
    assert_eq!(amount.value(), 100);
}

#[test]
fn test_cheque_moves_loan_proceeds() {
    let (mut ledger, a, b) = ledger_with_two_accounts();
    ledger.lend(a, 1_000, 12, true).unwrap();
    let cheque = ledger.issue_cheque(a, 1_000).unwrap();
    ledger.deposit_cheque(b, &cheque).unwrap();

    assert_eq!(ledger.amount(a).unwrap(), 0);
    assert_eq!(ledger.debt(a).unwrap(), 1_000);
    assert_eq!(ledger.amount(b).unwrap(), 1_000);
    assert_eq!(ledger.debt(b).unwrap(), 0);
    assert_eq!(ledger.liabilities(), 1_000);
    assert_eq!(ledger.balance_sheet().outstanding_cheques(), 0);
}

#[test]
fn test_cheque_over_balance_changes_nothing() {
    let (mut ledger, a, b) = ledger_with_two_accounts();
    ledger.lend(a, 1_000, 12, true).unwrap();

    let err = ledger.issue_cheque(a, 1_001).unwrap_err();
    assert_eq!(
        err,
        LedgerError::InsufficientFunds {
            required: 1_001,
            available: 1_000
        }
    );
    assert_eq!(ledger.amount(a).unwrap(), 1_000);
    assert_eq!(ledger.amount(b).unwrap(), 0);
    assert_eq!(ledger.balance_sheet().outstanding_cheques(), 0);
}

#[test]
fn test_cheque_single_redemption() {
    let (mut ledger, a, b) = ledger_with_two_accounts();
    ledger.lend(a, 500, 12, false).unwrap();
    let cheque = ledger.issue_cheque(a, 200).unwrap();

    ledger.deposit_cheque(b, &cheque).unwrap();
    let copy = cheque.clone();
    assert_eq!(
        ledger.deposit_cheque(b, &copy),
        Err(LedgerError::AlreadyRedeemed(cheque.id()))
    );
    assert_eq!(ledger.amount(b).unwrap(), 200, "second deposit changed nothing");
    assert_eq!(ledger.amount(a).unwrap(), 300);
}

#[test]
fn test_cheque_from_another_ledger_is_unknown() {
    let (mut issuer, a, _) = ledger_with_two_accounts();
    let (mut other, _, b) = ledger_with_two_accounts();
    issuer.lend(a, 100, 5, false).unwrap();
    let cheque = issuer.issue_cheque(a, 50).unwrap();

    assert_eq!(
        other.deposit_cheque(b, &cheque),
        Err(LedgerError::UnknownCheque(cheque.id()))
    );
}

#[test]
fn test_stale_cheque_was_refunded_at_close() {
    let (mut ledger, a, b) = ledger_with_two_accounts();
    let mut rng = RngManager::new(5);
    ledger.lend(a, 1_000, 20, false).unwrap();
    let cheque = ledger.issue_cheque(a, 400).unwrap();

    ledger.debt_recovery(&mut rng, &mut NullEnvironment).unwrap();
    ledger.pay_dividend().unwrap();
    let report = ledger.close().unwrap();
    assert_eq!(report.cheques_refunded, 1);
    assert_eq!(ledger.amount(a).unwrap(), 1_000 - 50);

    ledger.open().unwrap();
    assert_eq!(
        ledger.deposit_cheque(b, &cheque),
        Err(LedgerError::Anachronism {
            expected: 1,
            actual: 2
        })
    );
    assert_eq!(ledger.amount(b).unwrap(), 0);
    assert_eq!(ledger.registered_cheques(), 0);
}

#[test]
fn test_cheque_register_emptied_at_close() {
    let (mut ledger, a, b) = ledger_with_two_accounts();
    let mut rng = RngManager::new(9);
    ledger.lend(a, 10_000, 50, false).unwrap();

    for _ in 0..5 {
        for _ in 0..20 {
            let cheque = ledger.issue_cheque(a, 10).unwrap();
            ledger.deposit_cheque(b, &cheque).unwrap();
        }
        assert_eq!(ledger.registered_cheques(), 20);
        ledger.debt_recovery(&mut rng, &mut NullEnvironment).unwrap();
        ledger.pay_dividend().unwrap();
        ledger.close().unwrap();
        assert_eq!(ledger.registered_cheques(), 0);
        ledger.open().unwrap();
    }
    assert_eq!(ledger.amount(b).unwrap(), 1_000);
}

#[test]
fn test_amount_credit_overflow_rejected() {
    let mut amount = Amount::new(i64::MAX - 5).unwrap();
    assert_eq!(
        amount.credit(6),
        Err(AmountError::Overflow {
            balance: i64::MAX - 5,
            amount: 6
        })
    );
    assert_eq!(amount.value(), i64::MAX - 5);
    amount.credit(5).unwrap();
    assert_eq!(amount.value(), i64::MAX);
}

#[test]
fn test_lend_past_i64_max_leaves_ledger_untouched() {
    let (mut ledger, a, _) = ledger_with_two_accounts();
    ledger.lend(a, i64::MAX, 5, false).unwrap();
    let before = ledger.snapshot();
    let events = ledger.events().len();

    assert_eq!(
        ledger.lend(a, 1, 5, false),
        Err(LedgerError::Overflow {
            balance: i64::MAX,
            amount: 1
        })
    );
    assert!(!ledger.is_failed());
    assert_eq!(ledger.snapshot(), before);
    assert_eq!(ledger.events().len(), events);
    assert_eq!(ledger.debt(a).unwrap(), i64::MAX);
    assert_eq!(ledger.account(a).unwrap().loans().len(), 1);
    ledger.check_invariants().unwrap();
}

#[test]
fn test_cheque_requires_positive_amount() {
    let (mut ledger, a, _) = ledger_with_two_accounts();
    assert_eq!(
        ledger.issue_cheque(a, 0),
        Err(LedgerError::InvalidAmount { amount: 0 })
    );
}
