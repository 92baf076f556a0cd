//! Plain-text report adapter implementing ReportPort.

use std::fmt::Write as _;
use std::fs;

use crate::domain::analysis::AnalysisReport;
use crate::domain::error::QuantfolioError;
use crate::domain::rebalance::RebalancePlan;
use crate::ports::report_port::ReportPort;

pub struct TextReportAdapter;

impl TextReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn render_analysis(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Portfolio analysis ({})", report.objective_label);
    let _ = writeln!(out, "==================");
    let _ = writeln!(out);
    let _ = writeln!(out, "Target weights:");
    for (asset, weight) in &report.weights {
        let _ = writeln!(out, "  {:<10} {:>8.2}%", asset, weight * 100.0);
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Backtest ({} rebalancing, {:.2} initial capital):",
        report.cadence_label, report.initial_capital
    );
    if let (Some(first), Some(last)) = (
        report.equity_curve.points.first(),
        report.equity_curve.points.last(),
    ) {
        let _ = writeln!(out, "  period          {} to {}", first.date, last.date);
        let _ = writeln!(out, "  final value     {:.2}", last.value);
    }
    let m = &report.metrics;
    let _ = writeln!(out, "  total return    {:>8.2}%", m.total_return * 100.0);
    let _ = writeln!(out, "  annual return   {:>8.2}%", m.annualized_return * 100.0);
    let _ = writeln!(
        out,
        "  annual vol      {:>8.2}%",
        m.annualized_volatility * 100.0
    );
    let _ = writeln!(out, "  sharpe ratio    {:>8.2}", m.sharpe_ratio);
    let _ = writeln!(out, "  max drawdown    {:>8.2}%", m.max_drawdown * 100.0);

    if let Some(allocation) = &report.allocation {
        let _ = writeln!(out);
        let _ = writeln!(out, "Suggested purchase:");
        let mut shares: Vec<_> = allocation
            .shares
            .iter()
            .filter(|&(_, &count)| count > 0)
            .collect();
        shares.sort_by(|a, b| a.0.cmp(b.0));
        for (asset, count) in shares {
            let _ = writeln!(out, "  {:<10} {:>6} shares", asset, count);
        }
        let _ = writeln!(out, "  leftover cash   {:.2}", allocation.leftover);
    }
    out
}

fn render_rebalance(plan: &RebalancePlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Rebalancing guide");
    let _ = writeln!(out, "=================");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<10} {:>8} {:>10} {:>10} {:>9} {:>9} {:>8} {:>8}",
        "asset", "shares", "price", "value", "weight", "target", "t.shares", "delta"
    );
    for p in &plan.positions {
        let _ = writeln!(
            out,
            "{:<10} {:>8} {:>10.2} {:>10.2} {:>8.2}% {:>8.2}% {:>8} {:>+8}",
            p.asset,
            p.current_shares,
            p.current_price,
            p.current_value,
            p.current_weight * 100.0,
            p.target_weight * 100.0,
            p.target_shares,
            p.shares_delta
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "total value       {:.2}", plan.total_value);
    let _ = writeln!(out, "cash to buy       {:.2}", plan.cash_needed);
    let _ = writeln!(out, "estimated cost    {:.2}", plan.transaction_cost);
    let _ = writeln!(
        out,
        "actions           {} buys, {} sells",
        plan.buy_count(),
        plan.sell_count()
    );
    out
}

impl ReportPort for TextReportAdapter {
    fn write_analysis(
        &self,
        report: &AnalysisReport,
        output_path: &str,
    ) -> Result<(), QuantfolioError> {
        fs::write(output_path, render_analysis(report))?;
        Ok(())
    }

    fn write_rebalance(
        &self,
        plan: &RebalancePlan,
        output_path: &str,
    ) -> Result<(), QuantfolioError> {
        fs::write(output_path, render_rebalance(plan))?;
        Ok(())
    }
}
