//! Parameter maps and rate policies seen through the ledger

use credit_ledger_core_rs::ledger::policy::RateContext;
use credit_ledger_core_rs::{
    BankKind, ConfigError, Ledger, LedgerError, LedgerParams, NullEnvironment, ParamMap,
    RatePolicy, Rates, RngManager,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn map(entries: &[(&str, f64)]) -> ParamMap {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn run_period(ledger: &mut Ledger, rng: &mut RngManager) {
    ledger.debt_recovery(rng, &mut NullEnvironment).unwrap();
    ledger.pay_dividend().unwrap();
    ledger.close().unwrap();
}

#[test]
fn test_params_from_json_object() {
    let json = r#"{ "rate.loan": 0.08, "term.extended": 2, "leverage.target": 0.5 }"#;
    let map: ParamMap = serde_json::from_str(json).unwrap();
    let params = LedgerParams::from_map(&map).unwrap();
    assert_eq!(params.loan_rate, 0.08);
    assert_eq!(params.extended_term, 2);
    assert_eq!(params.target_leverage, 0.5);
    assert_eq!(params.deposit_rate, 0.01, "unlisted keys keep their default");
}

#[test]
fn test_ledger_from_map_rejects_unknown_key() {
    let err = Ledger::from_map(&map(&[("rate.mortgage", 0.03)]), BankKind::Basic).unwrap_err();
    assert_eq!(
        err,
        LedgerError::Config(ConfigError::UnknownKey("rate.mortgage".to_string()))
    );
}

#[test]
fn test_rejected_update_leaves_params_untouched() {
    let mut ledger = Ledger::new(LedgerParams::default(), BankKind::Basic);
    let err = ledger
        .update_parameters(&map(&[("rate.loan", 0.2), ("rate.deposit", -0.01)]))
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Config(ConfigError::InvalidValue { .. })
    ));
    assert_eq!(ledger.params(), &LedgerParams::default());
    assert!(!ledger.is_failed(), "config errors are not fatal");
}

#[test]
fn test_basic_bank_keeps_base_rates() {
    let mut ledger = Ledger::new(LedgerParams::default(), BankKind::Basic);
    let mut rng = RngManager::new(1);
    let firm = ledger.open_account("FIRM").unwrap();
    assert_eq!(ledger.policy_name(), "fixed");

    ledger.open().unwrap();
    ledger.lend(firm, 1_000, 10, false).unwrap();
    run_period(&mut ledger, &mut rng);
    ledger.open().unwrap();
    assert_eq!(ledger.rates(), Rates { loan: 0.05, deposit: 0.01 });
}

#[test]
fn test_capital_targeting_bank_raises_rates_when_thin() {
    let mut ledger = Ledger::new(LedgerParams::default(), BankKind::CapitalTargeting);
    let mut rng = RngManager::new(1);
    let firm = ledger.open_account("FIRM").unwrap();
    assert_eq!(ledger.kind(), BankKind::CapitalTargeting);

    ledger.open().unwrap();
    assert_eq!(ledger.rates().loan, 0.05, "empty book counts as fully capitalised");
    ledger.lend(firm, 1_000, 10, false).unwrap();
    run_period(&mut ledger, &mut rng);
    assert_eq!(ledger.capital(), 50);

    // 5% capital against a 10% target
    ledger.open().unwrap();
    let rates = ledger.rates();
    assert!((rates.loan - 0.075).abs() < 1e-12);
    assert!((rates.deposit - 0.035).abs() < 1e-12);

    // New loans are priced at the period's rate
    let other = ledger.open_account("OTHER").unwrap();
    ledger.lend(other, 1_000, 10, false).unwrap();
    let loan = &ledger.account(other).unwrap().loans()[0];
    assert!((loan.rate() - 0.075).abs() < 1e-12);
}

/// Zero rates for the first periods, then the configured base
struct Teaser {
    periods: usize,
    calls: Arc<AtomicUsize>,
}

impl RatePolicy for Teaser {
    fn name(&self) -> &'static str {
        "teaser"
    }

    fn rates(&mut self, ctx: &RateContext) -> Rates {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if ctx.period <= self.periods {
            Rates { loan: 0.0, deposit: 0.0 }
        } else {
            Rates {
                loan: ctx.params.loan_rate,
                deposit: ctx.params.deposit_rate,
            }
        }
    }
}

#[test]
fn test_custom_policy_consulted_once_per_open() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut ledger = Ledger::new(LedgerParams::default(), BankKind::Basic).with_policy(Box::new(
        Teaser {
            periods: 1,
            calls: Arc::clone(&calls),
        },
    ));
    let mut rng = RngManager::new(1);
    let firm = ledger.open_account("FIRM").unwrap();
    assert_eq!(ledger.policy_name(), "teaser");

    ledger.open().unwrap();
    ledger.lend(firm, 1_000, 10, false).unwrap();
    run_period(&mut ledger, &mut rng);
    assert_eq!(ledger.amount(firm).unwrap(), 1_000, "no interest in the teaser period");

    ledger.open().unwrap();
    assert_eq!(ledger.rates().loan, 0.05);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_parameter_update_applies_from_next_open() {
    let mut ledger = Ledger::new(LedgerParams::default(), BankKind::Basic);
    let mut rng = RngManager::new(1);
    ledger.open().unwrap();
    run_period(&mut ledger, &mut rng);

    ledger
        .update_parameters(&map(&[("rate.loan", 0.09), ("bankruptcy.patience", 4.0)]))
        .unwrap();
    assert_eq!(ledger.params().patience, 4);
    ledger.open().unwrap();
    assert_eq!(ledger.rates().loan, 0.09);
}

#[test]
fn test_bank_kind_names() {
    assert_eq!("basic".parse::<BankKind>(), Ok(BankKind::Basic));
    assert_eq!("Capital_Targeting".parse::<BankKind>(), Ok(BankKind::CapitalTargeting));
    assert_eq!(BankKind::CapitalTargeting.to_string(), "capital-targeting");
    assert!("central".parse::<BankKind>().is_err());
    assert_eq!(BankKind::default(), BankKind::Basic);
}
