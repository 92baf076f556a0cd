//! Analysis request settings and the report bundle handed to presentation.

use chrono::NaiveDate;

use super::allocation::Allocation;
use super::metrics::Metrics;
use super::optimizer::Objective;
use super::simulator::{EquityCurve, RebalanceCadence};

/// Parameters of one optimize/backtest request, resolved from config.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub objective: Objective,
    pub cadence: RebalanceCadence,
    pub transaction_cost_pct: f64,
}

/// Read-only display bundle for a completed analysis.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub objective_label: String,
    pub cadence_label: String,
    /// Sorted descending by weight, zero-weight entries omitted.
    pub weights: Vec<(String, f64)>,
    pub metrics: Metrics,
    pub equity_curve: EquityCurve,
    pub initial_capital: f64,
    pub allocation: Option<Allocation>,
}

impl AnalysisReport {
    /// Sort a weight map into display order: heaviest first, zero weights
    /// dropped, name as tie-break.
    pub fn display_weights(
        weights: &std::collections::HashMap<String, f64>,
    ) -> Vec<(String, f64)> {
        let mut entries: Vec<(String, f64)> = weights
            .iter()
            .filter(|&(_, &w)| w > 0.0)
            .map(|(k, &v)| (k.clone(), v))
            .collect();
        entries.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        entries
    }
}
