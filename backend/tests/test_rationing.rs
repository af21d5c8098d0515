//! Tests for proportional rationing
//!
//! CRITICAL: rationed payments sum to exactly the cash available

use credit_ledger_core_rs::settlement::{ration, split_proportionally, RationingError};
use proptest::prelude::*;

#[test]
fn test_exact_shares_have_no_remainder() {
    let r = ration(70, &[40, 30, 30]).unwrap();
    assert_eq!(r.payments, vec![28, 21, 21]);
    assert_eq!(r.paid, 70);
    assert_eq!(r.shortfall(), 30);
}

#[test]
fn test_remainder_goes_to_first_obligation() {
    let r = ration(71, &[40, 30, 30]).unwrap();
    assert_eq!(r.payments, vec![29, 21, 21]);
}

#[test]
fn test_remainder_skips_zero_dues() {
    let r = ration(2, &[0, 1, 1, 1]).unwrap();
    assert_eq!(r.payments, vec![0, 1, 1, 0]);
}

#[test]
fn test_sufficient_cash_pays_in_full() {
    let r = ration(1_000, &[40, 30, 30]).unwrap();
    assert!(!r.is_rationed());
    assert_eq!(r.payments, vec![40, 30, 30]);
    assert_eq!(r.paid, 100);
}

#[test]
fn test_empty_batch() {
    let r = ration(0, &[]).unwrap();
    assert!(r.payments.is_empty());
    assert!(!r.is_rationed());
}

#[test]
fn test_negative_due_rejected() {
    assert_eq!(
        ration(10, &[5, -1]),
        Err(RationingError::NegativeDue { index: 1, due: -1 })
    );
}

#[test]
fn test_split_without_weight() {
    assert_eq!(split_proportionally(0, &[0, 0]).unwrap(), vec![0, 0]);
    assert_eq!(
        split_proportionally(5, &[0, 0]),
        Err(RationingError::NoWeight { amount: 5 })
    );
}

proptest! {
    #[test]
    fn prop_rationing_conserves_cash(
        dues in prop::collection::vec(0i64..1_000_000, 1..20),
        fraction in 0.0f64..1.0,
    ) {
        let total: i64 = dues.iter().sum();
        let cash = (total as f64 * fraction) as i64;
        let r = ration(cash, &dues).unwrap();

        prop_assert_eq!(r.payments.iter().sum::<i64>(), cash.min(total));
        for (p, d) in r.payments.iter().zip(&dues) {
            prop_assert!(*p >= 0 && p <= d);
        }
    }

    #[test]
    fn prop_rationed_payment_within_one_unit_of_share(
        dues in prop::collection::vec(1i64..10_000, 1..10),
        cash_seed in 0i64..10_000,
    ) {
        let total: i64 = dues.iter().sum();
        let cash = cash_seed % total;
        let r = ration(cash, &dues).unwrap();
        for (p, d) in r.payments.iter().zip(&dues) {
            let floor = (cash as i128 * *d as i128 / total as i128) as i64;
            prop_assert!(*p == floor || *p == floor + 1);
        }
    }

    #[test]
    fn prop_split_sums_to_amount(
        weights in prop::collection::vec(0i64..1_000, 1..15),
        amount in 0i64..100_000,
    ) {
        prop_assume!(weights.iter().any(|w| *w > 0));
        let parts = split_proportionally(amount, &weights).unwrap();
        prop_assert_eq!(parts.iter().sum::<i64>(), amount);
    }
}
