//! Migration plan from current integer holdings toward target weights.

use std::collections::{BTreeSet, HashMap};

use super::error::QuantfolioError;

/// Default round-trip transaction fee rate (0.1%).
pub const DEFAULT_COST_RATE: f64 = 0.001;

/// One asset's row in a rebalancing plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionPlan {
    pub asset: String,
    pub current_shares: i64,
    pub current_price: f64,
    pub current_value: f64,
    /// Share of total portfolio value; 0 when the portfolio is worthless.
    pub current_weight: f64,
    pub target_weight: f64,
    pub target_shares: i64,
    /// Positive = buy, negative = sell.
    pub shares_delta: i64,
    /// Absolute traded notional for this asset.
    pub transaction_value: f64,
}

/// Full rebalancing plan over the union of held and targeted assets.
#[derive(Debug, Clone, PartialEq)]
pub struct RebalancePlan {
    pub positions: Vec<PositionPlan>,
    pub total_value: f64,
    /// Gross cash required for the buy side; sale proceeds are not netted.
    pub cash_needed: f64,
    /// Half of gross round-trip notional times the fee rate.
    pub transaction_cost: f64,
}

impl RebalancePlan {
    pub fn buy_count(&self) -> usize {
        self.positions.iter().filter(|p| p.shares_delta > 0).count()
    }

    pub fn sell_count(&self) -> usize {
        self.positions.iter().filter(|p| p.shares_delta < 0).count()
    }
}

/// Compute the share deltas that move `holdings` toward `target_weights` at
/// `prices`, plus the gross cash needed to buy and a transaction-cost
/// estimate at `cost_rate`.
///
/// Target weights are normalized internally; assets with a missing or
/// non-positive price contribute zero value and receive a zero share delta.
pub fn plan_rebalance(
    holdings: &HashMap<String, i64>,
    target_weights: &HashMap<String, f64>,
    prices: &HashMap<String, f64>,
    cost_rate: f64,
) -> Result<RebalancePlan, QuantfolioError> {
    if !(cost_rate >= 0.0) {
        return Err(QuantfolioError::InvalidInput {
            reason: format!("transaction cost rate must be non-negative, got {cost_rate}"),
        });
    }
    let weight_total: f64 = target_weights.values().sum();
    if !target_weights.is_empty() && !(weight_total > 0.0) {
        return Err(QuantfolioError::InvalidInput {
            reason: "target weights must sum to a positive value".into(),
        });
    }

    let quote = |asset: &str| -> f64 {
        prices
            .get(asset)
            .copied()
            .filter(|p| p.is_finite() && *p > 0.0)
            .unwrap_or(0.0)
    };

    let total_value: f64 = holdings
        .iter()
        .map(|(asset, &shares)| shares as f64 * quote(asset))
        .sum();

    let assets: BTreeSet<&String> = holdings.keys().chain(target_weights.keys()).collect();

    let mut positions = Vec::with_capacity(assets.len());
    let mut cash_needed = 0.0;
    let mut gross_notional = 0.0;

    for asset in assets {
        let current_shares = holdings.get(asset).copied().unwrap_or(0);
        let current_price = quote(asset);
        let current_value = current_shares as f64 * current_price;

        let target_weight = if weight_total > 0.0 {
            target_weights.get(asset).copied().unwrap_or(0.0) / weight_total
        } else {
            0.0
        };
        let target_value = total_value * target_weight;

        let value_delta = target_value - current_value;
        let shares_delta = if current_price > 0.0 {
            value_delta / current_price
        } else {
            0.0
        };

        let current_weight = if total_value > 0.0 {
            current_value / total_value
        } else {
            0.0
        };

        if value_delta > 0.0 {
            cash_needed += value_delta;
        }
        gross_notional += value_delta.abs();

        positions.push(PositionPlan {
            asset: asset.clone(),
            current_shares,
            current_price,
            current_value,
            current_weight,
            target_weight,
            target_shares: (current_shares as f64 + shares_delta).round() as i64,
            shares_delta: shares_delta.round() as i64,
            transaction_value: value_delta.abs(),
        });
    }

    // The traded notional is split evenly between the buy and sell sides;
    // the fee is charged once per leg pair.
    let transaction_cost = gross_notional / 2.0 * cost_rate;

    Ok(RebalancePlan {
        positions,
        total_value,
        cash_needed,
        transaction_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn holdings(entries: &[(&str, i64)]) -> HashMap<String, i64> {
        entries.iter().map(|&(k, v)| (k.to_string(), v)).collect()
    }

    fn map(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries.iter().map(|&(k, v)| (k.to_string(), v)).collect()
    }

    fn position<'a>(plan: &'a RebalancePlan, asset: &str) -> &'a PositionPlan {
        plan.positions.iter().find(|p| p.asset == asset).unwrap()
    }

    #[test]
    fn fifty_fifty_target_from_lopsided_holdings() {
        let plan = plan_rebalance(
            &holdings(&[("A", 10), ("B", 5)]),
            &map(&[("A", 0.5), ("B", 0.5)]),
            &map(&[("A", 100.0), ("B", 50.0)]),
            DEFAULT_COST_RATE,
        )
        .unwrap();

        assert_relative_eq!(plan.total_value, 1_250.0);
        let a = position(&plan, "A");
        assert_relative_eq!(a.current_value, 1_000.0);
        assert_relative_eq!(a.current_weight, 0.8);
        assert_relative_eq!(a.target_weight, 0.5);
        // Over target by $375 → sell ~4 shares at $100.
        assert_eq!(a.shares_delta, -4);
        assert_eq!(a.target_shares, 6);

        let b = position(&plan, "B");
        // Under target by $375 → buy ~8 shares at $50 (7.5 rounds up).
        assert_eq!(b.shares_delta, 8);
        assert_eq!(b.target_shares, 13);

        assert_relative_eq!(plan.cash_needed, 375.0);
        // Gross notional 750, halved, at 0.1%.
        assert_relative_eq!(plan.transaction_cost, 375.0 * 0.001);
        assert_eq!(plan.buy_count(), 1);
        assert_eq!(plan.sell_count(), 1);
    }

    #[test]
    fn target_values_recover_total_value() {
        let plan = plan_rebalance(
            &holdings(&[("A", 7), ("B", 21), ("C", 2)]),
            &map(&[("A", 0.2), ("B", 0.3), ("C", 0.5)]),
            &map(&[("A", 311.0), ("B", 18.5), ("C", 92.25)]),
            DEFAULT_COST_RATE,
        )
        .unwrap();
        let recovered: f64 = plan
            .positions
            .iter()
            .map(|p| p.target_shares as f64 * p.current_price)
            .sum();
        // Integer rounding keeps us within one share price per asset.
        assert!((recovered - plan.total_value).abs() < 311.0);
    }

    #[test]
    fn unnormalized_weights_are_normalized() {
        let plan = plan_rebalance(
            &holdings(&[("A", 10)]),
            &map(&[("A", 2.0), ("B", 2.0)]),
            &map(&[("A", 100.0), ("B", 50.0)]),
            0.0,
        )
        .unwrap();
        assert_relative_eq!(position(&plan, "A").target_weight, 0.5);
        assert_relative_eq!(position(&plan, "B").target_weight, 0.5);
    }

    #[test]
    fn held_asset_missing_from_target_is_sold_to_zero() {
        let plan = plan_rebalance(
            &holdings(&[("OLD", 10), ("NEW", 0)]),
            &map(&[("NEW", 1.0)]),
            &map(&[("OLD", 100.0), ("NEW", 20.0)]),
            0.0,
        )
        .unwrap();
        let old = position(&plan, "OLD");
        assert_eq!(old.target_shares, 0);
        assert_eq!(old.shares_delta, -10);
        let new = position(&plan, "NEW");
        assert_eq!(new.shares_delta, 50);
        assert_relative_eq!(plan.cash_needed, 1_000.0);
    }

    #[test]
    fn missing_price_contributes_zero_and_gets_no_delta() {
        let plan = plan_rebalance(
            &holdings(&[("A", 10), ("DARK", 5)]),
            &map(&[("A", 0.5), ("DARK", 0.5)]),
            &map(&[("A", 100.0)]),
            0.0,
        )
        .unwrap();
        assert_relative_eq!(plan.total_value, 1_000.0);
        let dark = position(&plan, "DARK");
        assert_eq!(dark.shares_delta, 0);
        assert_relative_eq!(dark.current_value, 0.0);
        assert_relative_eq!(dark.current_weight, 0.0);
    }

    #[test]
    fn worthless_portfolio_reports_zero_weights() {
        let plan = plan_rebalance(
            &holdings(&[("A", 10)]),
            &map(&[("A", 1.0)]),
            &map(&[]),
            0.0,
        )
        .unwrap();
        assert_relative_eq!(plan.total_value, 0.0);
        let a = position(&plan, "A");
        assert_relative_eq!(a.current_weight, 0.0);
        assert_relative_eq!(a.target_weight, 1.0);
        assert_eq!(a.shares_delta, 0);
    }

    #[test]
    fn cash_needed_ignores_sale_proceeds() {
        // Selling $500 of A funds nothing: the buy side is reported gross.
        let plan = plan_rebalance(
            &holdings(&[("A", 10), ("B", 0)]),
            &map(&[("A", 0.5), ("B", 0.5)]),
            &map(&[("A", 100.0), ("B", 50.0)]),
            0.0,
        )
        .unwrap();
        assert_relative_eq!(plan.cash_needed, 500.0);
    }

    #[test]
    fn zero_weight_sum_is_rejected() {
        let result = plan_rebalance(
            &holdings(&[("A", 10)]),
            &map(&[("A", 0.0)]),
            &map(&[("A", 100.0)]),
            0.0,
        );
        assert!(matches!(result, Err(QuantfolioError::InvalidInput { .. })));
    }

    #[test]
    fn positions_are_sorted_by_asset() {
        let plan = plan_rebalance(
            &holdings(&[("ZZZ", 1), ("AAA", 1)]),
            &map(&[("MMM", 1.0)]),
            &map(&[("ZZZ", 1.0), ("AAA", 1.0), ("MMM", 1.0)]),
            0.0,
        )
        .unwrap();
        let names: Vec<&str> = plan.positions.iter().map(|p| p.asset.as_str()).collect();
        assert_eq!(names, vec!["AAA", "MMM", "ZZZ"]);
    }
}
