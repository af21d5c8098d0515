//! ledger-sim: run the credit ledger against a scripted economy
//!
//! Prints one JSON object per period (the verified books) on stdout and a
//! closing summary with the final state digest. Logs go to stderr; set
//! `RUST_LOG` to override the level.

use clap::Parser;
use credit_ledger_core_rs::{BankKind, Ledger, LedgerParams, ParamMap};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod economy;
mod error;

use economy::{Economy, Scenario};
use error::{CliError, CliResult};

#[derive(Parser)]
#[command(name = "ledger-sim")]
#[command(about = "Run the credit ledger over a toy economy", long_about = None)]
#[command(version)]
struct Cli {
    /// Number of periods to simulate
    #[arg(short = 'n', long, default_value_t = 20)]
    periods: usize,

    /// RNG seed
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// JSON object of ledger parameters (dotted keys)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Bank flavour: basic or capital-targeting
    #[arg(short, long, default_value = "basic")]
    bank: BankKind,

    #[arg(long, default_value_t = 3)]
    firms: usize,

    #[arg(long, default_value_t = 12)]
    households: usize,

    /// Wage per worker per period
    #[arg(long, default_value_t = 100)]
    wage: i64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct RunSummary {
    periods: usize,
    bank: String,
    policy: &'static str,
    bankruptcies: usize,
    events: usize,
    digest: String,
}

fn load_ledger(cli: &Cli) -> CliResult<Ledger> {
    let Some(path) = &cli.params else {
        return Ok(Ledger::new(LedgerParams::default(), cli.bank));
    };
    let raw = std::fs::read_to_string(path)?;
    let map: ParamMap = serde_json::from_str(&raw)?;
    tracing::info!("loaded {} parameters from {}", map.len(), path.display());
    Ok(Ledger::from_map(&map, cli.bank)?)
}

fn run(cli: Cli) -> CliResult<()> {
    if cli.firms == 0 || cli.households == 0 {
        return Err(CliError::InvalidArgument(
            "need at least one firm and one household".to_string(),
        ));
    }
    if cli.wage <= 0 {
        return Err(CliError::InvalidArgument(format!(
            "wage must be positive, got {}",
            cli.wage
        )));
    }

    let scenario = Scenario {
        firms: cli.firms,
        households: cli.households,
        wage: cli.wage,
        seed: cli.seed,
    };
    let mut economy = Economy::new(load_ledger(&cli)?, &scenario)?;

    for _ in 0..cli.periods {
        let report = economy.step()?;
        println!("{}", serde_json::to_string(&report)?);
    }

    let ledger = economy.ledger();
    let summary = RunSummary {
        periods: ledger.period(),
        bank: ledger.kind().to_string(),
        policy: ledger.policy_name(),
        bankruptcies: economy.bankruptcies(),
        events: ledger.events().len(),
        digest: ledger.state_digest()?,
    };
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(err) = run(cli) {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}
