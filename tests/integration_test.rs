//! Engine integration tests.
//!
//! Tests cover:
//! - The estimate -> optimize -> simulate -> metrics chain on one dataset
//! - Weight invariants across every objective
//! - Rebalancing cadence effects over multi-month histories
//! - Discrete allocation against optimizer output
//! - Degenerate inputs surfacing the right error at the right stage

mod common;

use chrono::{Datelike, NaiveDate};
use common::*;
use quantfolio::domain::allocation::allocate_greedy;
use quantfolio::domain::error::QuantfolioError;
use quantfolio::domain::estimate::ReturnEstimate;
use quantfolio::domain::metrics::Metrics;
use quantfolio::domain::optimizer::{Objective, optimize};
use quantfolio::domain::price_matrix::PriceMatrix;
use quantfolio::domain::simulator::{RebalanceCadence, simulate};
use quantfolio::ports::data_port::PriceDataPort;
use std::collections::HashMap;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Three months of weekday prices with distinct per-asset behaviour: a
/// low-noise grinder, a volatile riser, and a noisy decliner. The cycle
/// lengths differ per asset so the sample covariance stays full-rank.
fn three_asset_matrix() -> PriceMatrix {
    let mut dates = Vec::new();
    let mut rows = Vec::new();
    let mut day = date(2024, 1, 1);
    let mut t = 0_i32;
    while day < date(2024, 4, 1) {
        if day.weekday().number_from_monday() <= 5 {
            let grind = 100.0
                * (1.0_f64 + 0.0008).powi(t)
                * (1.0 + 0.005 * ((t % 3) as f64 - 1.0));
            let wild = 50.0
                * (1.0_f64 + 0.0015).powi(t)
                * (1.0 + 0.02 * ((t % 5) as f64 - 2.0) / 2.0);
            let slide = 80.0
                * (1.0_f64 - 0.0010).powi(t)
                * (1.0 + 0.01 * ((t % 7) as f64 - 3.0) / 3.0);
            rows.push(vec![grind, wild, slide]);
            dates.push(day);
            t += 1;
        }
        day += chrono::Duration::days(1);
    }
    PriceMatrix::new(
        dates,
        vec!["GRIND".into(), "WILD".into(), "SLIDE".into()],
        rows,
    )
    .unwrap()
}

mod optimization_chain {
    use super::*;

    #[test]
    fn every_objective_yields_normalized_long_only_weights() {
        let prices = three_asset_matrix();
        let estimate = ReturnEstimate::from_prices(&prices).unwrap();

        for objective in [
            Objective::EqualWeight,
            Objective::MinVolatility,
            Objective::MaxSharpe { risk_free_rate: 0.0 },
        ] {
            let weights = optimize(&estimate, objective).unwrap();
            let total: f64 = weights.values().sum();
            assert!(
                (total - 1.0).abs() < 1e-6,
                "{}: weights sum to {total}",
                objective.label()
            );
            for (asset, &w) in &weights {
                assert!(w >= 0.0, "{}: {asset} negative", objective.label());
            }
        }
    }

    #[test]
    fn optimized_weights_survive_the_full_chain() {
        let prices = three_asset_matrix();
        let estimate = ReturnEstimate::from_prices(&prices).unwrap();
        let weights =
            optimize(&estimate, Objective::MaxSharpe { risk_free_rate: 0.0 }).unwrap();

        let curve = simulate(&prices, &weights, RebalanceCadence::Monthly, 10_000.0).unwrap();
        assert_eq!(curve.len(), prices.len() - 1);
        assert!(curve.points.iter().all(|p| p.value > 0.0));

        let metrics = Metrics::from_equity_curve(&curve).unwrap();
        assert!(metrics.max_drawdown <= 0.0);
        assert!(metrics.annualized_volatility >= 0.0);
        assert!(metrics.sharpe_ratio.is_finite());
    }

    #[test]
    fn equal_weight_simulation_matches_across_cadences_at_start() {
        let prices = three_asset_matrix();
        let weights: HashMap<String, f64> = prices
            .assets()
            .iter()
            .map(|a| (a.clone(), 1.0 / 3.0))
            .collect();

        let hold = simulate(&prices, &weights, RebalanceCadence::None, 9_000.0).unwrap();
        let monthly =
            simulate(&prices, &weights, RebalanceCadence::Monthly, 9_000.0).unwrap();

        // Identical up to and including the first rebalance boundary.
        assert!((hold.points[0].value - monthly.points[0].value).abs() < 1e-9);
        // Divergence appears by the end of the horizon.
        let last_hold = hold.last_value().unwrap();
        let last_monthly = monthly.last_value().unwrap();
        assert!((last_hold - last_monthly).abs() > 1e-6);
    }
}

mod allocation_chain {
    use super::*;

    #[test]
    fn optimizer_output_is_allocatable_within_budget() {
        let prices = three_asset_matrix();
        let estimate = ReturnEstimate::from_prices(&prices).unwrap();
        let weights = optimize(&estimate, Objective::MinVolatility).unwrap();
        let quotes = prices.latest_prices();

        let budget = 25_000.0;
        let allocation = allocate_greedy(&weights, &quotes, budget).unwrap();
        let spent = allocation.spent(&quotes);

        assert!(spent <= budget + 1e-6);
        assert!((spent + allocation.leftover - budget).abs() < 1e-6);
    }

    #[test]
    fn ideal_two_asset_split_allocates_exactly() {
        let weights: HashMap<String, f64> =
            [("A".to_string(), 0.5), ("B".to_string(), 0.5)].into();
        let quotes: HashMap<String, f64> =
            [("A".to_string(), 100.0), ("B".to_string(), 50.0)].into();
        let allocation = allocate_greedy(&weights, &quotes, 1_000.0).unwrap();

        assert_eq!(allocation.shares["A"], 5);
        assert_eq!(allocation.shares["B"], 10);
        assert!(allocation.leftover.abs() < 1e-9);
    }
}

mod degenerate_inputs {
    use super::*;

    #[test]
    fn flat_prices_fail_sharpe_but_not_equal_weight() {
        let dates = daily_dates(date(2024, 1, 2), 10);
        let port = MockPriceDataPort::new(dates.clone())
            .with_series("A", vec![100.0; 10])
            .with_series("B", vec![50.0; 10]);
        let prices = port
            .fetch_prices(&symbols(&["A", "B"]), dates[0], dates[9])
            .unwrap();
        let estimate = ReturnEstimate::from_prices(&prices).unwrap();

        // Constant (zero) returns across assets are degenerate for Sharpe.
        assert!(matches!(
            optimize(&estimate, Objective::MaxSharpe { risk_free_rate: 0.0 }),
            Err(QuantfolioError::OptimizationInfeasible { .. })
        ));
        assert!(optimize(&estimate, Objective::EqualWeight).is_ok());
    }

    #[test]
    fn flat_portfolio_has_zero_volatility_and_sharpe() {
        let dates = daily_dates(date(2024, 1, 2), 10);
        let port = MockPriceDataPort::new(dates.clone()).with_series("A", vec![100.0; 10]);
        let prices = port
            .fetch_prices(&symbols(&["A"]), dates[0], dates[9])
            .unwrap();

        let weights: HashMap<String, f64> = [("A".to_string(), 1.0)].into();
        let curve = simulate(&prices, &weights, RebalanceCadence::None, 1_000.0).unwrap();
        let metrics = Metrics::from_equity_curve(&curve).unwrap();

        assert_eq!(metrics.total_return, 0.0);
        assert_eq!(metrics.annualized_volatility, 0.0);
        assert_eq!(metrics.sharpe_ratio, 0.0);
        assert_eq!(metrics.max_drawdown, 0.0);
    }
}
