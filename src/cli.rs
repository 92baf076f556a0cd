//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::allocation::allocate_greedy;
use crate::domain::analysis::{AnalysisConfig, AnalysisReport};
use crate::domain::assets::{parse_codes, parse_holdings, parse_weights};
use crate::domain::config_validation::{
    validate_analysis_config, validate_holdings_config, validate_portfolio_config,
};
use crate::domain::error::QuantfolioError;
use crate::domain::estimate::ReturnEstimate;
use crate::domain::metrics::Metrics;
use crate::domain::optimizer::{Objective, optimize};
use crate::domain::rebalance::{DEFAULT_COST_RATE, RebalancePlan, plan_rebalance};
use crate::domain::simulator::{RebalanceCadence, simulate};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "quantfolio", about = "Portfolio optimization and rebalancing toolkit")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Optimize a portfolio, backtest it, and suggest a purchase
    Optimize {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override [analysis] objective (max_sharpe, min_volatility, equal_weight)
        #[arg(long)]
        objective: Option<String>,
        /// Cash budget for the purchase suggestion (defaults to initial_capital)
        #[arg(long)]
        budget: Option<f64>,
    },
    /// Backtest user-defined weights from [portfolio] weights
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rebalancing guide from [holdings] positions toward [portfolio] weights
    Rebalance {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show price file coverage for the configured codes
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Optimize {
            config,
            output,
            objective,
            budget,
        } => run_optimize(&config, output.as_ref(), objective.as_deref(), budget),
        Command::Backtest { config, output } => run_backtest(&config, output.as_ref()),
        Command::Rebalance { config, output } => run_rebalance(&config, output.as_ref()),
        Command::Info { config } => run_info(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = QuantfolioError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_analysis_config(
    adapter: &dyn ConfigPort,
) -> Result<AnalysisConfig, QuantfolioError> {
    let start_str = adapter
        .get_string("analysis", "start_date")
        .ok_or_else(|| QuantfolioError::ConfigMissing {
            section: "analysis".into(),
            key: "start_date".into(),
        })?;
    let end_str = adapter.get_string("analysis", "end_date").ok_or_else(|| {
        QuantfolioError::ConfigMissing {
            section: "analysis".into(),
            key: "end_date".into(),
        }
    })?;

    let start_date = NaiveDate::parse_from_str(&start_str, "%Y-%m-%d").map_err(|_| {
        QuantfolioError::ConfigInvalid {
            section: "analysis".into(),
            key: "start_date".into(),
            reason: "invalid date format (expected YYYY-MM-DD)".into(),
        }
    })?;
    let end_date = NaiveDate::parse_from_str(&end_str, "%Y-%m-%d").map_err(|_| {
        QuantfolioError::ConfigInvalid {
            section: "analysis".into(),
            key: "end_date".into(),
            reason: "invalid date format (expected YYYY-MM-DD)".into(),
        }
    })?;

    let risk_free_rate = adapter.get_float("analysis", "risk_free_rate", 0.0);
    let objective_name = adapter
        .get_string("analysis", "objective")
        .unwrap_or_else(|| "max_sharpe".to_string());
    let objective = Objective::parse(&objective_name, risk_free_rate).ok_or_else(|| {
        QuantfolioError::ConfigInvalid {
            section: "analysis".into(),
            key: "objective".into(),
            reason: format!("unknown objective '{objective_name}'"),
        }
    })?;

    let cadence_name = adapter
        .get_string("analysis", "cadence")
        .unwrap_or_else(|| "monthly".to_string());
    let cadence = RebalanceCadence::parse(&cadence_name).ok_or_else(|| {
        QuantfolioError::ConfigInvalid {
            section: "analysis".into(),
            key: "cadence".into(),
            reason: format!("unknown cadence '{cadence_name}'"),
        }
    })?;

    Ok(AnalysisConfig {
        start_date,
        end_date,
        initial_capital: adapter.get_float("analysis", "initial_capital", 10_000.0),
        objective,
        cadence,
        transaction_cost_pct: adapter.get_float(
            "analysis",
            "transaction_cost_pct",
            DEFAULT_COST_RATE,
        ),
    })
}

/// Estimate, optimize, simulate, and price a purchase in one pass.
pub fn run_optimize_pipeline(
    data_port: &dyn PriceDataPort,
    codes: &[String],
    config: &AnalysisConfig,
    budget: Option<f64>,
) -> Result<AnalysisReport, QuantfolioError> {
    let prices = data_port.fetch_prices(codes, config.start_date, config.end_date)?;
    let estimate = ReturnEstimate::from_prices(&prices)?;
    let weights = optimize(&estimate, config.objective)?;

    let curve = simulate(&prices, &weights, config.cadence, config.initial_capital)?;
    let metrics = Metrics::from_equity_curve(&curve)?;

    let quotes = prices.latest_prices();
    let allocation = allocate_greedy(
        &weights,
        &quotes,
        budget.unwrap_or(config.initial_capital),
    )?;

    Ok(AnalysisReport {
        objective_label: config.objective.label().to_string(),
        cadence_label: config.cadence.label().to_string(),
        weights: AnalysisReport::display_weights(&weights),
        metrics,
        equity_curve: curve,
        initial_capital: config.initial_capital,
        allocation: Some(allocation),
    })
}

/// Simulate user-defined weights and score the result.
pub fn run_backtest_pipeline(
    data_port: &dyn PriceDataPort,
    codes: &[String],
    weights: &HashMap<String, f64>,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, QuantfolioError> {
    let prices = data_port.fetch_prices(codes, config.start_date, config.end_date)?;
    let curve = simulate(&prices, weights, config.cadence, config.initial_capital)?;
    let metrics = Metrics::from_equity_curve(&curve)?;

    Ok(AnalysisReport {
        objective_label: "custom".to_string(),
        cadence_label: config.cadence.label().to_string(),
        weights: AnalysisReport::display_weights(weights),
        metrics,
        equity_curve: curve,
        initial_capital: config.initial_capital,
        allocation: None,
    })
}

/// Quote the union of held and targeted assets, then plan the migration.
pub fn run_rebalance_pipeline(
    data_port: &dyn PriceDataPort,
    holdings: &HashMap<String, i64>,
    target_weights: &HashMap<String, f64>,
    cost_rate: f64,
) -> Result<RebalancePlan, QuantfolioError> {
    let mut symbols: Vec<String> = holdings
        .keys()
        .chain(target_weights.keys())
        .cloned()
        .collect();
    symbols.sort();
    symbols.dedup();

    let quotes = data_port.latest_quotes(&symbols)?;
    plan_rebalance(holdings, target_weights, &quotes, cost_rate)
}

fn run_optimize(
    config_path: &PathBuf,
    output_path: Option<&PathBuf>,
    objective_override: Option<&str>,
    budget: Option<f64>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_analysis_config(&adapter).and_then(|_| validate_portfolio_config(&adapter)) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let mut config = match build_analysis_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Some(name) = objective_override {
        let risk_free_rate = adapter.get_float("analysis", "risk_free_rate", 0.0);
        config.objective = match Objective::parse(name, risk_free_rate) {
            Some(o) => o,
            None => {
                eprintln!("error: unknown objective '{name}'");
                return ExitCode::from(2);
            }
        };
    }

    let codes = match resolve_codes(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "Optimizing {} assets ({}), {} to {}",
        codes.len(),
        config.objective.label(),
        config.start_date,
        config.end_date
    );

    let data_port = build_data_port(&adapter);
    let report = match run_optimize_pipeline(&data_port, &codes, &config, budget) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    print_analysis_summary(&report);
    write_report(output_path, |path| {
        TextReportAdapter::new().write_analysis(&report, path)
    })
}

fn run_backtest(config_path: &PathBuf, output_path: Option<&PathBuf>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_analysis_config(&adapter).and_then(|_| validate_portfolio_config(&adapter)) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let config = match build_analysis_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let codes = match resolve_codes(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let weights = match resolve_weights(&adapter) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "Backtesting {} assets with custom weights, {} to {}",
        codes.len(),
        config.start_date,
        config.end_date
    );

    let data_port = build_data_port(&adapter);
    let report = match run_backtest_pipeline(&data_port, &codes, &weights, &config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    print_analysis_summary(&report);
    write_report(output_path, |path| {
        TextReportAdapter::new().write_analysis(&report, path)
    })
}

fn run_rebalance(config_path: &PathBuf, output_path: Option<&PathBuf>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_holdings_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let holdings = match adapter
        .get_string("holdings", "positions")
        .ok_or_else(|| QuantfolioError::ConfigMissing {
            section: "holdings".into(),
            key: "positions".into(),
        })
        .and_then(|s| {
            parse_holdings(&s).map_err(|e| QuantfolioError::ConfigInvalid {
                section: "holdings".into(),
                key: "positions".into(),
                reason: e.to_string(),
            })
        }) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let target_weights = match resolve_weights(&adapter) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let cost_rate = adapter.get_float("analysis", "transaction_cost_pct", DEFAULT_COST_RATE);

    eprintln!(
        "Planning rebalance for {} held assets toward {} targets",
        holdings.len(),
        target_weights.len()
    );

    let data_port = build_data_port(&adapter);
    let plan = match run_rebalance_pipeline(&data_port, &holdings, &target_weights, cost_rate)
    {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    print_rebalance_summary(&plan);
    write_report(output_path, |path| {
        TextReportAdapter::new().write_rebalance(&plan, path)
    })
}

fn run_info(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let codes = match resolve_codes(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_port = build_data_port(&adapter);
    match data_port.fetch_prices(&codes, NaiveDate::MIN, NaiveDate::MAX) {
        Ok(prices) => {
            println!(
                "{} assets, {} rows, {} to {}",
                prices.assets().len(),
                prices.len(),
                prices.dates()[0],
                prices.dates()[prices.len() - 1]
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn build_data_port(adapter: &dyn ConfigPort) -> CsvPriceAdapter {
    let path = adapter
        .get_string("data", "csv_path")
        .unwrap_or_else(|| "prices.csv".to_string());
    CsvPriceAdapter::new(PathBuf::from(path))
}

fn resolve_codes(adapter: &dyn ConfigPort) -> Result<Vec<String>, QuantfolioError> {
    let raw = adapter
        .get_string("portfolio", "codes")
        .ok_or_else(|| QuantfolioError::ConfigMissing {
            section: "portfolio".into(),
            key: "codes".into(),
        })?;
    parse_codes(&raw).map_err(|e| QuantfolioError::ConfigInvalid {
        section: "portfolio".into(),
        key: "codes".into(),
        reason: e.to_string(),
    })
}

fn resolve_weights(adapter: &dyn ConfigPort) -> Result<HashMap<String, f64>, QuantfolioError> {
    let raw = adapter
        .get_string("portfolio", "weights")
        .ok_or_else(|| QuantfolioError::ConfigMissing {
            section: "portfolio".into(),
            key: "weights".into(),
        })?;
    parse_weights(&raw).map_err(|e| QuantfolioError::ConfigInvalid {
        section: "portfolio".into(),
        key: "weights".into(),
        reason: e.to_string(),
    })
}

fn print_analysis_summary(report: &AnalysisReport) {
    eprintln!("\n=== Target Weights ===");
    for (asset, weight) in &report.weights {
        eprintln!("  {}:  {:.2}%", asset, weight * 100.0);
    }

    let m = &report.metrics;
    eprintln!("\n=== Backtest ({} rebalancing) ===", report.cadence_label);
    eprintln!("Total Return:     {:.2}%", m.total_return * 100.0);
    eprintln!("Annualized:       {:.2}%", m.annualized_return * 100.0);
    eprintln!("Volatility:       {:.2}%", m.annualized_volatility * 100.0);
    eprintln!("Sharpe Ratio:     {:.2}", m.sharpe_ratio);
    eprintln!("Max Drawdown:     {:.2}%", m.max_drawdown * 100.0);
    if let Some(value) = report.equity_curve.last_value() {
        eprintln!("Final Value:      {:.2}", value);
    }

    if let Some(allocation) = &report.allocation {
        eprintln!("\n=== Suggested Purchase ===");
        let mut shares: Vec<_> = allocation
            .shares
            .iter()
            .filter(|&(_, &count)| count > 0)
            .collect();
        shares.sort_by(|a, b| a.0.cmp(b.0));
        for (asset, count) in shares {
            eprintln!("  {}:  {} shares", asset, count);
        }
        eprintln!("Leftover Cash:    {:.2}", allocation.leftover);
    }
}

fn print_rebalance_summary(plan: &RebalancePlan) {
    eprintln!("\n=== Rebalancing Guide ===");
    for p in &plan.positions {
        let action = match p.shares_delta {
            d if d > 0 => format!("buy {d}"),
            d if d < 0 => format!("sell {}", -d),
            _ => "hold".to_string(),
        };
        eprintln!(
            "  {}:  {} -> {} shares ({}), {:.2}% -> {:.2}%",
            p.asset,
            p.current_shares,
            p.target_shares,
            action,
            p.current_weight * 100.0,
            p.target_weight * 100.0
        );
    }
    eprintln!("Total Value:      {:.2}", plan.total_value);
    eprintln!("Cash To Buy:      {:.2}", plan.cash_needed);
    eprintln!("Estimated Cost:   {:.2}", plan.transaction_cost);
}

fn write_report(
    output_path: Option<&PathBuf>,
    write: impl FnOnce(&str) -> Result<(), QuantfolioError>,
) -> ExitCode {
    match output_path {
        Some(path) => {
            let path_str = path.display().to_string();
            match write(&path_str) {
                Ok(()) => {
                    eprintln!("Report written to {path_str}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("error: {e}");
                    (&e).into()
                }
            }
        }
        None => ExitCode::SUCCESS,
    }
}
