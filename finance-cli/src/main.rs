use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use finance_core::TaxYearConfig;
use finance_data::{BracketTableLoader, BracketTables, ConfigLoader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;
mod utils;

use commands::{
    CapitalGainsArgs, CompoundArgs, Context, IncomeTaxArgs, LoanArgs, MinimumWageArgs,
    MortgageArgs, NetToGrossArgs, PensionArgs, SalaryArgs, SeveranceArgs,
};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Personal finance calculator for Korean salaries, loans and taxes.
///
/// Every amount is in won. Built-in 2025 rates apply unless a rate file or
/// bracket file is given.
#[derive(Debug, Parser)]
#[command(name = "finance", version)]
struct Cli {
    /// TOML file overriding statutory rates.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// CSV file replacing the progressive bracket tables.
    #[arg(long, global = true)]
    brackets: Option<PathBuf>,

    /// Print results as JSON instead of a text report.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Monthly net pay from gross salary.
    Salary(SalaryArgs),
    /// Gross salary needed for a target net pay.
    NetToGross(NetToGrossArgs),
    /// Loan schedule with optional DSR and LTV checks.
    Loan(LoanArgs),
    /// Mortgage with LTV limit and down payment.
    Mortgage(MortgageArgs),
    /// Savings growth with monthly deposits.
    Compound(CompoundArgs),
    /// Simplified national pension projection.
    Pension(PensionArgs),
    /// Severance pay and retirement income tax.
    Severance(SeveranceArgs),
    /// Comprehensive income tax.
    IncomeTax(IncomeTaxArgs),
    /// Capital gains tax on a real estate sale.
    CapitalGains(CapitalGainsArgs),
    /// Minimum wage compliance and monthly wage.
    MinimumWage(MinimumWageArgs),
    /// Print the rate and bracket tables in effect.
    Tables,
}

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to `info` so normal runs are quiet.
/// * Strips timestamps and target names to keep CLI output clean.
/// * Writes to stderr so `--json` output stays parseable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn load_context(cli: &Cli) -> anyhow::Result<Context> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_file(path)
            .with_context(|| format!("Failed to load rates from {}", path.display()))?,
        None => TaxYearConfig::default(),
    };
    let tables = match &cli.brackets {
        Some(path) => BracketTableLoader::load_file(path)
            .with_context(|| format!("Failed to load brackets from {}", path.display()))?,
        None => BracketTables::default(),
    };
    debug!(tax_year = config.tax_year, "Reference data ready");

    Ok(Context {
        config,
        tables,
        json: cli.json,
    })
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let ctx = load_context(&cli)?;

    match &cli.command {
        Command::Salary(args) => commands::salary(&ctx, args),
        Command::NetToGross(args) => commands::net_to_gross(&ctx, args),
        Command::Loan(args) => commands::loan(&ctx, args),
        Command::Mortgage(args) => commands::mortgage(&ctx, args),
        Command::Compound(args) => commands::compound(&ctx, args),
        Command::Pension(args) => commands::pension(&ctx, args),
        Command::Severance(args) => commands::severance(&ctx, args),
        Command::IncomeTax(args) => commands::income_tax(&ctx, args),
        Command::CapitalGains(args) => commands::capital_gains(&ctx, args),
        Command::MinimumWage(args) => commands::minimum_wage(&ctx, args),
        Command::Tables => commands::tables(&ctx),
    }
}
