//! Rebalancing backtest simulation.
//!
//! Holdings are tracked as per-asset dollar values scaled by each period's
//! return. On a rebalance boundary the day's total is redistributed to the
//! target weights in a single frictionless step.

use chrono::{Datelike, NaiveDate};
use std::collections::{HashMap, HashSet};

use super::error::QuantfolioError;
use super::price_matrix::PriceMatrix;

/// How often the portfolio is reset to its target weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebalanceCadence {
    None,
    Monthly,
    Quarterly,
    Yearly,
}

impl RebalanceCadence {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "none" => Some(RebalanceCadence::None),
            "monthly" | "m" => Some(RebalanceCadence::Monthly),
            "quarterly" | "q" => Some(RebalanceCadence::Quarterly),
            "yearly" | "y" => Some(RebalanceCadence::Yearly),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RebalanceCadence::None => "none",
            RebalanceCadence::Monthly => "monthly",
            RebalanceCadence::Quarterly => "quarterly",
            RebalanceCadence::Yearly => "yearly",
        }
    }

    fn period_key(&self, date: NaiveDate) -> Option<(i32, u32)> {
        match self {
            RebalanceCadence::None => None,
            RebalanceCadence::Monthly => Some((date.year(), date.month())),
            RebalanceCadence::Quarterly => Some((date.year(), (date.month() - 1) / 3)),
            RebalanceCadence::Yearly => Some((date.year(), 0)),
        }
    }
}

/// Portfolio value on a single date.
#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Time series of portfolio value, one point per return date.
#[derive(Debug, Clone, PartialEq)]
pub struct EquityCurve {
    pub points: Vec<EquityPoint>,
}

impl EquityCurve {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_value(&self) -> Option<f64> {
        self.points.first().map(|p| p.value)
    }

    pub fn last_value(&self) -> Option<f64> {
        self.points.last().map(|p| p.value)
    }
}

/// The last observed date within each calendar period of the index.
pub fn rebalance_boundaries(
    dates: &[NaiveDate],
    cadence: RebalanceCadence,
) -> HashSet<NaiveDate> {
    let mut last_in_period: HashMap<(i32, u32), NaiveDate> = HashMap::new();
    for &date in dates {
        if let Some(key) = cadence.period_key(date) {
            let entry = last_in_period.entry(key).or_insert(date);
            if date > *entry {
                *entry = date;
            }
        }
    }
    last_in_period.into_values().collect()
}

/// Simulate holding `weights` over the price history with the given
/// rebalancing cadence, starting from `initial_capital`.
///
/// Weights naming assets absent from the price matrix are dropped and the
/// remainder renormalized before simulation.
pub fn simulate(
    prices: &PriceMatrix,
    weights: &HashMap<String, f64>,
    cadence: RebalanceCadence,
    initial_capital: f64,
) -> Result<EquityCurve, QuantfolioError> {
    if !(initial_capital > 0.0) {
        return Err(QuantfolioError::InvalidInput {
            reason: format!("initial capital must be positive, got {initial_capital}"),
        });
    }

    let mut held: Vec<(usize, f64)> = weights
        .iter()
        .filter_map(|(name, &w)| prices.asset_index(name).map(|col| (col, w)))
        .collect();
    held.sort_by_key(|&(col, _)| col);
    if held.is_empty() {
        return Err(QuantfolioError::DataUnavailable {
            reason: "none of the portfolio assets appear in the price data".into(),
        });
    }
    let total_weight: f64 = held.iter().map(|&(_, w)| w).sum();
    if !(total_weight > 0.0) {
        return Err(QuantfolioError::InvalidInput {
            reason: "portfolio weights sum to zero".into(),
        });
    }
    // Zero-weight entries (clipped dust) hold no capital and need no prices.
    held.retain(|&(_, w)| w > 0.0);

    let returns = prices.returns();
    if returns.is_empty() {
        return Err(QuantfolioError::InsufficientData {
            context: "price history".into(),
            observations: prices.len(),
            minimum: 2,
        });
    }
    for &(col, _) in &held {
        if let Some(t) = (0..prices.len()).find(|&t| !prices.price(t, col).is_finite()) {
            return Err(QuantfolioError::InvalidInput {
                reason: format!(
                    "missing price for {} on {}",
                    prices.assets()[col],
                    prices.dates()[t]
                ),
            });
        }
    }

    let target: Vec<f64> = held.iter().map(|&(_, w)| w / total_weight).collect();
    let boundaries = rebalance_boundaries(prices.dates(), cadence);

    let mut asset_values: Vec<f64> =
        target.iter().map(|w| initial_capital * w).collect();
    let mut points = Vec::with_capacity(returns.len());

    for (t, &date) in returns.dates.iter().enumerate() {
        for (k, &(col, _)) in held.iter().enumerate() {
            asset_values[k] *= 1.0 + returns.rows[t][col];
        }
        let total: f64 = asset_values.iter().sum();
        if boundaries.contains(&date) {
            for (k, value) in asset_values.iter_mut().enumerate() {
                *value = total * target[k];
            }
        }
        points.push(EquityPoint { date, value: total });
    }

    Ok(EquityCurve { points })
}
