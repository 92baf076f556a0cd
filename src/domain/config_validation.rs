//! Configuration validation.
//!
//! Validates all config fields before any computation runs.

use crate::domain::assets;
use crate::domain::error::QuantfolioError;
use crate::domain::optimizer::Objective;
use crate::domain::simulator::RebalanceCadence;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    validate_csv_path(config)?;
    validate_dates(config)?;
    validate_initial_capital(config)?;
    validate_objective(config)?;
    validate_cadence(config)?;
    validate_risk_free_rate(config)?;
    validate_transaction_cost(config)?;
    Ok(())
}

pub fn validate_portfolio_config(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    match config.get_string("portfolio", "codes") {
        Some(codes) => {
            assets::parse_codes(&codes).map_err(|e| QuantfolioError::ConfigInvalid {
                section: "portfolio".to_string(),
                key: "codes".to_string(),
                reason: e.to_string(),
            })?;
        }
        None => {
            return Err(QuantfolioError::ConfigMissing {
                section: "portfolio".to_string(),
                key: "codes".to_string(),
            });
        }
    }
    if let Some(weights) = config.get_string("portfolio", "weights") {
        assets::parse_weights(&weights).map_err(|e| QuantfolioError::ConfigInvalid {
            section: "portfolio".to_string(),
            key: "weights".to_string(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

pub fn validate_holdings_config(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    match config.get_string("holdings", "positions") {
        Some(positions) => {
            assets::parse_holdings(&positions).map_err(|e| QuantfolioError::ConfigInvalid {
                section: "holdings".to_string(),
                key: "positions".to_string(),
                reason: e.to_string(),
            })?;
            Ok(())
        }
        None => Err(QuantfolioError::ConfigMissing {
            section: "holdings".to_string(),
            key: "positions".to_string(),
        }),
    }
}

fn validate_csv_path(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    match config.get_string("data", "csv_path") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        Some(_) => Err(QuantfolioError::ConfigInvalid {
            section: "data".to_string(),
            key: "csv_path".to_string(),
            reason: "csv_path must not be empty".to_string(),
        }),
        None => Err(QuantfolioError::ConfigMissing {
            section: "data".to_string(),
            key: "csv_path".to_string(),
        }),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    let start_str = config.get_string("analysis", "start_date");
    let end_str = config.get_string("analysis", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date >= end_date {
        return Err(QuantfolioError::ConfigInvalid {
            section: "analysis".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must be before end_date".to_string(),
        });
    }
    Ok(())
}

fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, QuantfolioError> {
    match value {
        None => Err(QuantfolioError::ConfigMissing {
            section: "analysis".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
            QuantfolioError::ConfigInvalid {
                section: "analysis".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            }
        }),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    let value = config.get_float("analysis", "initial_capital", 10_000.0);
    if value <= 0.0 {
        return Err(QuantfolioError::ConfigInvalid {
            section: "analysis".to_string(),
            key: "initial_capital".to_string(),
            reason: "initial_capital must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_objective(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    if let Some(name) = config.get_string("analysis", "objective") {
        if Objective::parse(&name, 0.0).is_none() {
            return Err(QuantfolioError::ConfigInvalid {
                section: "analysis".to_string(),
                key: "objective".to_string(),
                reason: format!(
                    "unknown objective '{}', expected max_sharpe, min_volatility or equal_weight",
                    name
                ),
            });
        }
    }
    Ok(())
}

fn validate_cadence(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    if let Some(name) = config.get_string("analysis", "cadence") {
        if RebalanceCadence::parse(&name).is_none() {
            return Err(QuantfolioError::ConfigInvalid {
                section: "analysis".to_string(),
                key: "cadence".to_string(),
                reason: format!(
                    "unknown cadence '{}', expected none, monthly, quarterly or yearly",
                    name
                ),
            });
        }
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    let value = config.get_float("analysis", "risk_free_rate", 0.0);
    if value < 0.0 || value >= 1.0 {
        return Err(QuantfolioError::ConfigInvalid {
            section: "analysis".to_string(),
            key: "risk_free_rate".to_string(),
            reason: "risk_free_rate must be between 0 and 1".to_string(),
        });
    }
    Ok(())
}

fn validate_transaction_cost(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    let value = config.get_float("analysis", "transaction_cost_pct", 0.001);
    if value < 0.0 {
        return Err(QuantfolioError::ConfigInvalid {
            section: "analysis".to_string(),
            key: "transaction_cost_pct".to_string(),
            reason: "transaction_cost_pct must be non-negative".to_string(),
        });
    }
    Ok(())
}
